use crate::common;

use crudkit::domain::base::{FieldValue, Repository, RepositoryError};
use crudkit::domain::filter::{Direction, Filter};
use crudkit::domain::todos::Todo;
use crudkit::domain::users::User;
use crudkit::infrastructure::repositories::postgres::PostgresRepository;
use serial_test::serial;

fn todo(description: &str) -> Vec<(&'static str, FieldValue)> {
    vec![("description", FieldValue::from(description))]
}

#[tokio::test]
#[serial]
async fn test_create_and_find_todo() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<Todo>::new(pool.clone());

    let created = repo.create(todo("Buy milk")).await.unwrap();
    assert_eq!(created.id, 1);
    assert!(!created.is_complete);

    let found = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.description, "Buy milk");
    assert!(repo.find_by_id(99).await.unwrap().is_none());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_filter_order_and_window() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<Todo>::new(pool.clone());

    for i in 0..5 {
        repo.create(todo(&format!("todo {}", i))).await.unwrap();
    }
    repo.update(2, vec![("is_complete", FieldValue::Bool(true))])
        .await
        .unwrap();
    repo.update(4, vec![("is_complete", FieldValue::Bool(true))])
        .await
        .unwrap();

    let done = repo
        .find(&Filter::new().eq("is_complete", true))
        .await
        .unwrap();
    assert_eq!(done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 4]);

    let mut newest = Filter::new();
    newest.order.push(("id", Direction::Desc));
    newest.take = Some(2);
    newest.skip = Some(1);
    let window = repo.find(&newest).await.unwrap();
    assert_eq!(window.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4, 3]);

    let (page, total) = repo
        .find_and_count(&Filter::new().eq("is_complete", false), 2, 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 3);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_update_touches_timestamp() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<Todo>::new(pool.clone());

    let created = repo.create(todo("Buy milk")).await.unwrap();
    let outcome = repo
        .update(created.id, vec![("description", FieldValue::from("Buy bread"))])
        .await
        .unwrap();
    assert_eq!(outcome.affected, 1);

    let updated = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.description, "Buy bread");
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    assert_eq!(repo.update(99, todo("x")).await.unwrap().affected, 0);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_delete_and_count() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<Todo>::new(pool.clone());

    repo.create(todo("a")).await.unwrap();
    repo.create(todo("b")).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 2);

    assert_eq!(repo.delete(1).await.unwrap().affected, 1);
    assert_eq!(repo.delete(1).await.unwrap().affected, 0);
    assert_eq!(repo.count().await.unwrap(), 1);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_unique_username_is_conflict() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<User>::new(pool.clone());

    let fields = vec![
        ("username", FieldValue::from("a@b.com")),
        ("password", FieldValue::from("hash")),
    ];
    let user = repo.create(fields.clone()).await.unwrap();
    assert!(!user.confirmed);

    let result = repo.create(fields).await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    let found = repo
        .find_one(&Filter::new().eq("username", "a@b.com"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.password, "hash");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_missing_required_column_is_invalid() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let repo = PostgresRepository::<User>::new(pool.clone());

    let result = repo
        .create(vec![("username", FieldValue::from("a@b.com"))])
        .await;
    assert!(matches!(result, Err(RepositoryError::Invalid(_))));

    common::cleanup_test_db(&pool).await;
}
