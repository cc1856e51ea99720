use serde_json::json;
use taskboard_core::{
    clear_session, open_cache_in_memory, IdentityService, MemoryRemoteStore, NamespaceKey,
    RemoteUserRepository, SessionCache, SessionContext, SqliteSessionCache, TaskStatus, User,
};

fn ada_context() -> SessionContext {
    SessionContext::new("u1", NamespaceKey::from_email("ada@example.com"))
}

#[test]
fn no_session_resolves_to_none_without_store_access() {
    let conn = open_cache_in_memory().unwrap();
    let store = MemoryRemoteStore::new();
    store.set_offline(true);
    let identity = IdentityService::new(
        RemoteUserRepository::new(&store),
        SqliteSessionCache::new(&conn),
    );

    assert!(identity.active_context().unwrap().is_none());
    assert!(identity.resolve_active_user().unwrap().is_none());
}

#[test]
fn begin_session_then_resolve_reads_the_store_and_normalizes_board() {
    let conn = open_cache_in_memory().unwrap();
    let cache = SqliteSessionCache::new(&conn);
    let store = MemoryRemoteStore::new();
    store
        .seed(
            "users/adaexamplecom/u1",
            json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "password": "pw",
                "board": {
                    "done": [{"id": "t1", "title": "Misfiled", "category": "User Story",
                              "status": "todo"}]
                }
            }),
        )
        .unwrap();
    let identity = IdentityService::new(RemoteUserRepository::new(&store), &cache);

    let ctx = ada_context();
    let mut snapshot = User::new("Ada Lovelace", "ada@example.com", "pw");
    snapshot.id = ctx.user_id.clone();
    identity.begin_session(&ctx, &snapshot).unwrap();

    assert_eq!(cache.get("currentUserId").unwrap().as_deref(), Some("u1"));
    assert_eq!(cache.get("cleanedEmail").unwrap().as_deref(), Some("adaexamplecom"));
    assert_eq!(identity.active_context().unwrap(), Some(ctx));

    let user = identity.resolve_active_user().unwrap().unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.name, "Ada Lovelace");
    assert_eq!(user.board.tasks(TaskStatus::Done)[0].status, TaskStatus::Done);
    assert!(user.board.tasks(TaskStatus::Todo).is_empty());
}

#[test]
fn resolve_ignores_missing_and_unnamed_documents() {
    let conn = open_cache_in_memory().unwrap();
    let store = MemoryRemoteStore::new();
    let identity = IdentityService::new(
        RemoteUserRepository::new(&store),
        SqliteSessionCache::new(&conn),
    );
    let ctx = ada_context();
    identity
        .begin_session(&ctx, &User::new("Ada", "ada@example.com", "pw"))
        .unwrap();

    assert!(identity.resolve_active_user().unwrap().is_none());

    store
        .seed("users/adaexamplecom/u1", json!({"email": "ada@example.com"}))
        .unwrap();
    assert!(identity.resolve_active_user().unwrap().is_none());
}

#[test]
fn snapshot_is_advisory_and_store_stays_authoritative() {
    let conn = open_cache_in_memory().unwrap();
    let store = MemoryRemoteStore::new();
    store
        .seed("users/adaexamplecom/u1", json!({"name": "Stored Name"}))
        .unwrap();
    let identity = IdentityService::new(
        RemoteUserRepository::new(&store),
        SqliteSessionCache::new(&conn),
    );

    identity
        .begin_session(&ada_context(), &User::new("Cached Name", "ada@example.com", "pw"))
        .unwrap();

    assert_eq!(identity.cached_snapshot().unwrap().unwrap().name, "Cached Name");
    assert_eq!(identity.resolve_active_user().unwrap().unwrap().name, "Stored Name");
}

#[test]
fn undecodable_snapshot_reads_as_absent() {
    let conn = open_cache_in_memory().unwrap();
    let cache = SqliteSessionCache::new(&conn);
    let store = MemoryRemoteStore::new();
    cache.set("currentUser", "{broken").unwrap();

    let identity = IdentityService::new(RemoteUserRepository::new(&store), &cache);
    assert!(identity.cached_snapshot().unwrap().is_none());
}

#[test]
fn end_session_and_clear_session_remove_every_key() {
    let conn = open_cache_in_memory().unwrap();
    let cache = SqliteSessionCache::new(&conn);
    let store = MemoryRemoteStore::new();
    let identity = IdentityService::new(RemoteUserRepository::new(&store), &cache);

    identity
        .begin_session(&ada_context(), &User::new("Ada", "ada@example.com", "pw"))
        .unwrap();
    identity.end_session().unwrap();
    for key in ["currentUserId", "cleanedEmail", "currentUser"] {
        assert!(cache.get(key).unwrap().is_none(), "{key} should be cleared");
    }

    identity
        .begin_session(&ada_context(), &User::new("Ada", "ada@example.com", "pw"))
        .unwrap();
    clear_session(&cache).unwrap();
    assert!(identity.active_context().unwrap().is_none());
}
