//! Integration tests for refresh-token sessions.

use chrono::{Duration, Utc};
use guestbook_db::models::session::CreateSession;
use guestbook_db::models::user::CreateUser;
use guestbook_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

async fn new_user(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: "session_owner".to_string(),
            email: "owner@example.com".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn session(user_id: i64, hash: &str, expires_in: Duration) -> CreateSession {
    CreateSession {
        user_id,
        refresh_token_hash: hash.to_string(),
        expires_at: Utc::now() + expires_in,
        user_agent: Some("integration-test".to_string()),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_session_is_found_by_hash(pool: PgPool) {
    let user_id = new_user(&pool).await;
    let created = SessionRepo::create(&pool, &session(user_id, "hash-a", Duration::days(7)))
        .await
        .unwrap();

    let found = SessionRepo::find_by_refresh_token_hash(&pool, "hash-a")
        .await
        .unwrap()
        .expect("session should be active");
    assert_eq!(found.id, created.id);
    assert_eq!(found.user_agent.as_deref(), Some("integration-test"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_session_is_not_found(pool: PgPool) {
    let user_id = new_user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "hash-old", Duration::days(-1)))
        .await
        .unwrap();

    let found = SessionRepo::find_by_refresh_token_hash(&pool, "hash-old")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_only_succeeds_once(pool: PgPool) {
    let user_id = new_user(&pool).await;
    let created = SessionRepo::create(&pool, &session(user_id, "hash-b", Duration::days(7)))
        .await
        .unwrap();

    assert!(SessionRepo::revoke(&pool, created.id).await.unwrap());
    assert!(!SessionRepo::revoke(&pool, created.id).await.unwrap());
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "hash-b")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_and_cleanup(pool: PgPool) {
    let user_id = new_user(&pool).await;
    for hash in ["h1", "h2", "h3"] {
        SessionRepo::create(&pool, &session(user_id, hash, Duration::days(7)))
            .await
            .unwrap();
    }
    SessionRepo::create(&pool, &session(user_id, "h-expired", Duration::days(-3)))
        .await
        .unwrap();

    // The expired session is still unrevoked, so it is counted too.
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 4);
    assert_eq!(SessionRepo::revoke_all_for_user(&pool, user_id).await.unwrap(), 0);
    assert_eq!(SessionRepo::cleanup_expired_for_user(&pool, user_id).await.unwrap(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cleanup_keeps_live_sessions(pool: PgPool) {
    let user_id = new_user(&pool).await;
    let spent = SessionRepo::create(&pool, &session(user_id, "h-spent", Duration::days(7)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session(user_id, "h-live", Duration::days(7)))
        .await
        .unwrap();
    SessionRepo::create(&pool, &session(user_id, "h-stale", Duration::days(-1)))
        .await
        .unwrap();
    assert!(SessionRepo::revoke(&pool, spent.id).await.unwrap());

    assert_eq!(SessionRepo::cleanup_expired_for_user(&pool, user_id).await.unwrap(), 2);
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "h-live")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sessions_are_removed_with_their_user(pool: PgPool) {
    let user_id = new_user(&pool).await;
    SessionRepo::create(&pool, &session(user_id, "hash-c", Duration::days(7)))
        .await
        .unwrap();

    assert!(UserRepo::delete(&pool, user_id).await.unwrap());
    assert!(SessionRepo::find_by_refresh_token_hash(&pool, "hash-c")
        .await
        .unwrap()
        .is_none());
}
