use serde_json::json;
use taskboard_core::{
    Board, Category, Contact, NamespaceKey, Priority, Task, TaskStatus, User,
};

#[test]
fn status_parses_case_insensitively_and_serializes_canonically() {
    for (raw, expected) in [
        ("todo", TaskStatus::Todo),
        ("ToDo", TaskStatus::Todo),
        ("inProgress", TaskStatus::InProgress),
        ("INPROGRESS", TaskStatus::InProgress),
        ("awaitfeedback", TaskStatus::AwaitFeedback),
        (" Done ", TaskStatus::Done),
    ] {
        assert_eq!(raw.parse::<TaskStatus>().unwrap(), expected);
    }
    assert!("blocked".parse::<TaskStatus>().is_err());

    let encoded = serde_json::to_value(TaskStatus::ALL).unwrap();
    assert_eq!(encoded, json!(["todo", "inProgress", "awaitFeedback", "done"]));
}

#[test]
fn task_round_trips_with_camel_case_wire_names() {
    let raw = json!({
        "id": "t1",
        "title": "Wire",
        "description": "check names",
        "dueDate": "2025-03-01",
        "priority": "urgent",
        "category": "Technical Task",
        "contacts": [{"id": "c1", "name": "Ada Lovelace", "email": "ada@example.com",
                      "number": "1", "initials": "AL", "color": "#112233"}],
        "subtasks": [{"text": "one", "completed": true}],
        "status": "awaitFeedback"
    });

    let task: Task = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(task.due_date, "2025-03-01");
    assert_eq!(task.priority, Priority::Urgent);
    assert_eq!(task.category, Category::TechnicalTask);
    assert_eq!(task.status, TaskStatus::AwaitFeedback);
    assert!(task.subtasks[0].completed);
    assert_eq!(serde_json::to_value(&task).unwrap(), raw);
}

#[test]
fn task_lists_stored_as_objects_or_holey_arrays_decode_in_order() {
    let raw = json!({
        "id": "t1",
        "title": "Holes",
        "category": "User Story",
        "contacts": {"1": {"id": "c2"}, "0": {"id": "c1"}},
        "subtasks": [null, {"text": "kept"}, null]
    });

    let task: Task = serde_json::from_value(raw).unwrap();
    let ids = task
        .contacts
        .iter()
        .map(|contact| contact.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(task.subtasks.len(), 1);
    assert!(!task.subtasks[0].completed);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.status, TaskStatus::Todo);
}

#[test]
fn board_with_missing_lists_decodes_as_empty_lists() {
    let board: Board = serde_json::from_value(json!({
        "done": [{"id": "t9", "title": "Old", "category": "User Story", "status": "done"}]
    }))
    .unwrap();
    assert!(board.tasks(TaskStatus::Todo).is_empty());
    assert!(board.tasks(TaskStatus::InProgress).is_empty());
    assert!(board.tasks(TaskStatus::AwaitFeedback).is_empty());
    assert_eq!(board.tasks(TaskStatus::Done).len(), 1);

    let encoded = serde_json::to_value(&board).unwrap();
    assert_eq!(encoded["todo"], json!([]));
    assert_eq!(encoded["awaitFeedback"], json!([]));
}

#[test]
fn user_document_tolerates_null_board_and_keyed_contacts() {
    let user: User = serde_json::from_value(json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "password": "secret",
        "contacts": {"-Na": {"id": "c1", "name": "Alan Turing"}},
        "board": null
    }))
    .unwrap();

    assert!(user.id.is_empty());
    assert_eq!(user.contacts.len(), 1);
    assert!(user.board.is_empty());

    let encoded = serde_json::to_value(&user).unwrap();
    assert!(encoded.get("id").is_none());
}

#[test]
fn unknown_category_is_rejected() {
    let result = serde_json::from_value::<Task>(json!({
        "id": "t1",
        "title": "Bad",
        "category": "Epic"
    }));
    assert!(result.is_err());
    assert!("user-story".parse::<Category>().is_ok());
    assert!("epic".parse::<Category>().is_err());
}

#[test]
fn namespace_key_strips_everything_but_letters_digits_underscore_and_space() {
    assert_eq!(
        NamespaceKey::from_email("ada.lovelace+tag@example.com").as_str(),
        "adalovelacetagexamplecom"
    );
    assert_eq!(
        NamespaceKey::from_email("Under_Score 1@x.io").as_str(),
        "Under_Score 1xio"
    );
    assert_eq!(
        NamespaceKey::from_email("a.b@c.d"),
        NamespaceKey::from_email("ab@cd")
    );
}

#[test]
fn contact_snapshot_decodes_with_missing_optional_fields() {
    let contact: Contact = serde_json::from_value(json!({"id": "c1"})).unwrap();
    assert_eq!(contact.id, "c1");
    assert!(contact.name.is_empty());
    assert!(contact.color.is_empty());
}
