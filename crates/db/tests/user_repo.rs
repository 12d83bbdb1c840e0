//! Integration tests for users and guest types.

use assert_matches::assert_matches;
use guestbook_core::pagination::PageRequest;
use guestbook_db::models::user::{CreateUser, UpdateUser};
use guestbook_db::repositories::{GuestTypeRepo, UserRepo};
use sqlx::PgPool;

fn new_user(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "hash".to_string(),
    }
}

fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.constraint().map(str::to_string),
        _ => None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_find_and_list_users(pool: PgPool) {
    for name in ["alice", "bob", "carol"] {
        UserRepo::create(&pool, &new_user(name)).await.unwrap();
    }

    let bob = UserRepo::find_by_username(&pool, "bob").await.unwrap().unwrap();
    assert_eq!(bob.email, "bob@example.com");
    assert!(UserRepo::find_by_username(&pool, "Bob").await.unwrap().is_none());

    assert_eq!(UserRepo::count(&pool).await.unwrap(), 3);
    let page = UserRepo::list(&pool, PageRequest::new(Some(2), Some(2))).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].username, "carol");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_and_email_name_their_constraint(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dana")).await.unwrap();

    let mut same_name = new_user("dana");
    same_name.email = "other@example.com".to_string();
    let err = UserRepo::create(&pool, &same_name).await.unwrap_err();
    assert_eq!(violated_constraint(&err).as_deref(), Some("uq_users_username"));

    let mut same_email = new_user("dana_two");
    same_email.email = "dana@example.com".to_string();
    let err = UserRepo::create(&pool, &same_email).await.unwrap_err();
    assert_eq!(violated_constraint(&err).as_deref(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_keeps_other_fields(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("erin")).await.unwrap();

    let update = UpdateUser {
        email: Some("erin@new.example.com".to_string()),
        ..UpdateUser::default()
    };
    let updated = UserRepo::update(&pool, user.id, &update).await.unwrap().unwrap();

    assert_eq!(updated.username, "erin");
    assert_eq!(updated.email, "erin@new.example.com");
    assert_eq!(updated.password_hash, "hash");
    assert!(updated.updated_at >= user.updated_at);

    assert!(UserRepo::update(&pool, 777_777, &update).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_guest_type_crud(pool: PgPool) {
    let created = GuestTypeRepo::create(&pool, "Delivery").await.unwrap();
    assert_eq!(GuestTypeRepo::count(&pool).await.unwrap(), 1);

    let renamed = GuestTypeRepo::rename(&pool, created.id, "Courier service")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Courier service");

    let err = GuestTypeRepo::create(&pool, "Courier service").await.unwrap_err();
    assert_matches!(violated_constraint(&err).as_deref(), Some("uq_guest_types_name"));

    assert!(GuestTypeRepo::delete(&pool, created.id).await.unwrap());
    assert!(GuestTypeRepo::find_by_id(&pool, created.id).await.unwrap().is_none());
    assert!(GuestTypeRepo::rename(&pool, created.id, "Ghost type").await.unwrap().is_none());
}
