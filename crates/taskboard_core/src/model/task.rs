//! Task and subtask domain model.
//!
//! # Responsibility
//! - Define the task record, its closed enumerations and the creation/edit inputs.
//! - Validate task input before any mutation reaches the board.
//! - Compute subtask progress as a pure function of task state.
//!
//! # Invariants
//! - `status` serializes to one canonical name per state.
//! - Subtasks are addressed by position; removal leaves no gaps.
//! - `due_date` is stored as `YYYY-MM-DD` text to stay compatible with stored data.

use super::contact::Contact;
use super::serde_compat::list_or_map;
use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Wire format for `due_date`.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Stable task identifier. Kept as an opaque string for stored legacy ids.
pub type TaskId = String;

/// Board column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskStatus {
    Todo,
    InProgress,
    AwaitFeedback,
    Done,
}

impl TaskStatus {
    /// Fixed scan order used by lookups and board iteration.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::AwaitFeedback,
        TaskStatus::Done,
    ];

    /// Canonical stored name, also used as the board path segment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inProgress",
            Self::AwaitFeedback => "awaitFeedback",
            Self::Done => "done",
        }
    }

    /// User-facing column title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::AwaitFeedback => "Await feedback",
            Self::Done => "Done",
        }
    }

    /// Parses a status name case-insensitively (`todo`, `toDo`, `inprogress`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "inprogress" => Some(Self::InProgress),
            "awaitfeedback" => Some(Self::AwaitFeedback),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| UnknownValueError::new("task status", value))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value)
            .ok_or_else(|| D::Error::custom(format!("unknown task status `{value}`")))
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    Urgent,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Urgent => "urgent",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl FromStr for Priority {
    type Err = UnknownValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "urgent" => Ok(Self::Urgent),
            _ => Err(UnknownValueError::new("priority", value)),
        }
    }
}

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Technical Task")]
    TechnicalTask,
    #[serde(rename = "User Story")]
    UserStory,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::TechnicalTask => "Technical Task",
            Self::UserStory => "User Story",
        }
    }
}

impl FromStr for Category {
    type Err = UnknownValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "technicaltask" => Ok(Self::TechnicalTask),
            "userstory" => Ok(Self::UserStory),
            _ => Err(UnknownValueError::new("category", value)),
        }
    }
}

/// Parse failure for the closed enumerations above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValueError {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownValueError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl Display for UnknownValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl Error for UnknownValueError {}

/// Checklist entry inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// Stored task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: Priority,
    pub category: Category,
    #[serde(default, deserialize_with = "list_or_map")]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Returns whether a contact snapshot with `contact_id` is assigned.
    pub fn has_contact(&self, contact_id: &str) -> bool {
        self.contacts.iter().any(|contact| contact.id == contact_id)
    }

    pub fn progress(&self) -> Progress {
        compute_progress(self)
    }
}

/// Subtask completion summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// 0..=100; 0 when the task has no subtasks.
    pub percent: f64,
}

/// Computes subtask progress. Pure; never touches storage.
pub fn compute_progress(task: &Task) -> Progress {
    let total = task.subtasks.len();
    let completed = task.subtasks.iter().filter(|s| s.completed).count();
    let percent = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    Progress {
        completed,
        total,
        percent,
    }
}

/// Editable task fields. Subtasks are managed separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub due_date: String,
    pub priority: Priority,
    /// `None` means the user has not picked a category yet.
    pub category: Option<Category>,
    pub contacts: Vec<Contact>,
}

/// Input for task creation: editable fields plus initial subtasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub fields: TaskFields,
    pub subtasks: Vec<Subtask>,
}

/// Task input validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    MissingDueDate,
    InvalidDueDate(String),
    DueDateInPast { due_date: NaiveDate, today: NaiveDate },
    MissingCategory,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::MissingDueDate => write!(f, "task due date is required"),
            Self::InvalidDueDate(value) => {
                write!(f, "task due date `{value}` is not a YYYY-MM-DD date")
            }
            Self::DueDateInPast { due_date, today } => {
                write!(f, "task due date {due_date} is before today ({today})")
            }
            Self::MissingCategory => write!(f, "task category must be selected"),
        }
    }
}

impl Error for TaskValidationError {}

impl TaskFields {
    pub fn new(
        title: impl Into<String>,
        due_date: impl Into<String>,
        category: Option<Category>,
    ) -> Self {
        Self {
            title: title.into(),
            due_date: due_date.into(),
            category,
            ..Self::default()
        }
    }

    /// Validates fields for an edit. Past due dates are accepted so that
    /// overdue tasks stay editable.
    pub fn validate(&self) -> Result<Category, TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        parse_due_date(&self.due_date)?;
        self.category.ok_or(TaskValidationError::MissingCategory)
    }

    /// Validates fields for creation: the due date must not be before `today`.
    pub fn validate_new(&self, today: NaiveDate) -> Result<Category, TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        let due_date = parse_due_date(&self.due_date)?;
        if due_date < today {
            return Err(TaskValidationError::DueDateInPast { due_date, today });
        }
        self.category.ok_or(TaskValidationError::MissingCategory)
    }

    /// Overwrites the editable fields of `task` in place.
    pub(crate) fn apply_to(self, task: &mut Task, category: Category) {
        task.title = self.title.trim().to_string();
        task.description = self.description;
        task.due_date = self.due_date.trim().to_string();
        task.priority = self.priority;
        task.category = category;
        task.contacts = self.contacts;
    }
}

impl TaskDraft {
    pub fn new(fields: TaskFields) -> Self {
        Self {
            fields,
            subtasks: Vec::new(),
        }
    }

    pub fn with_subtasks<I, T>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.subtasks.extend(texts.into_iter().map(Subtask::new));
        self
    }

    /// Builds the stored task with a fresh id. Callers validate first.
    pub(crate) fn into_task(self, category: Category, status: TaskStatus) -> Task {
        let mut task = Task {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            priority: Priority::default(),
            category,
            contacts: Vec::new(),
            subtasks: self
                .subtasks
                .into_iter()
                .filter(|subtask| !subtask.text.trim().is_empty())
                .collect(),
            status,
        };
        self.fields.apply_to(&mut task, category);
        task
    }
}

/// Parses a stored due date. Blank input is reported as missing.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::MissingDueDate);
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map_err(|_| TaskValidationError::InvalidDueDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{
        compute_progress, Category, Priority, Subtask, TaskDraft, TaskFields, TaskStatus,
        TaskValidationError,
    };
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 15).unwrap()
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(TaskStatus::parse("toDo"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("inprogress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("AwaitFeedback"), Some(TaskStatus::AwaitFeedback));
        assert_eq!(TaskStatus::parse("archived"), None);
    }

    #[test]
    fn category_accepts_labels_and_compact_forms() {
        assert_eq!("User Story".parse::<Category>().unwrap(), Category::UserStory);
        assert_eq!("technical-task".parse::<Category>().unwrap(), Category::TechnicalTask);
        assert!("Bug".parse::<Category>().is_err());
    }

    #[test]
    fn validate_new_rejects_each_missing_field() {
        let mut fields = TaskFields::new(" ", "2030-07-01", Some(Category::UserStory));
        assert_eq!(fields.validate_new(today()), Err(TaskValidationError::BlankTitle));

        fields.title = "Ship".to_string();
        fields.due_date = String::new();
        assert_eq!(fields.validate_new(today()), Err(TaskValidationError::MissingDueDate));

        fields.due_date = "07/01/2030".to_string();
        assert!(matches!(
            fields.validate_new(today()),
            Err(TaskValidationError::InvalidDueDate(_))
        ));

        fields.due_date = "2030-06-14".to_string();
        assert!(matches!(
            fields.validate_new(today()),
            Err(TaskValidationError::DueDateInPast { .. })
        ));

        fields.due_date = "2030-06-15".to_string();
        fields.category = None;
        assert_eq!(fields.validate_new(today()), Err(TaskValidationError::MissingCategory));
    }

    #[test]
    fn edit_validation_accepts_past_dates() {
        let fields = TaskFields::new("Old", "2001-01-01", Some(Category::TechnicalTask));
        assert_eq!(fields.validate(), Ok(Category::TechnicalTask));
    }

    #[test]
    fn draft_builds_task_with_generated_id_and_clean_subtasks() {
        let mut fields = TaskFields::new("  Write docs ", "2030-07-01", Some(Category::UserStory));
        fields.priority = Priority::Urgent;
        let task = TaskDraft::new(fields)
            .with_subtasks(["outline", "  ", "review"])
            .into_task(Category::UserStory, TaskStatus::AwaitFeedback);

        assert!(!task.id.is_empty());
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.status, TaskStatus::AwaitFeedback);
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.subtasks, vec![Subtask::new("outline"), Subtask::new("review")]);
    }

    #[test]
    fn progress_is_zero_without_subtasks() {
        let task = TaskDraft::new(TaskFields::new("t", "2030-07-01", Some(Category::UserStory)))
            .into_task(Category::UserStory, TaskStatus::Todo);
        let progress = compute_progress(&task);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percent, 0.0);
        assert_eq!(compute_progress(&task), progress);
    }

    #[test]
    fn progress_counts_completed_subtasks() {
        let mut task = TaskDraft::new(TaskFields::new("t", "2030-07-01", Some(Category::UserStory)))
            .with_subtasks(["a", "b", "c", "d"])
            .into_task(Category::UserStory, TaskStatus::Todo);
        task.subtasks[0].completed = true;
        let progress = task.progress();
        assert_eq!((progress.completed, progress.total), (1, 4));
        assert_eq!(progress.percent, 25.0);
    }
}
