//! PostgreSQL adapter tests. Need a reachable server:
//! `TEST_DATABASE_URL=postgres://localhost/students_test cargo test -- --ignored`

use student_records::store::{SortField, StudentFilter, StudentQuery};
use student_records::{
    ensure_database_exists, ensure_students_table, NewStudent, PgStudentStore, StoreError,
    StudentPatch, StudentStore,
};

fn new_student(name: &str, roll: &str, course: &str) -> NewStudent {
    NewStudent {
        name: name.into(),
        roll_number: roll.into(),
        course: course.into(),
        age: 15,
        std: "10".into(),
        division: "A".into(),
    }
}

/// Fresh schema per test so runs do not see each other's rows.
async fn store(schema: &str) -> PgStudentStore {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => panic!("TEST_DATABASE_URL must be set for ignored tests"),
    };
    if let Err(e) = ensure_database_exists(&url).await {
        panic!("database setup failed: {e}");
    }
    let pool = match sqlx::postgres::PgPoolOptions::new().max_connections(2).connect(&url).await {
        Ok(p) => p,
        Err(e) => panic!("connect failed: {e}"),
    };
    if let Err(e) = sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{schema}\" CASCADE"))
        .execute(&pool)
        .await
    {
        panic!("drop schema failed: {e}");
    }
    if let Err(e) = ensure_students_table(&pool, schema).await {
        panic!("table setup failed: {e}");
    }
    PgStudentStore::new(pool, schema)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn unique_index_rejects_duplicate_roll_number() {
    let store = store("students_test_unique").await;
    if let Err(e) = store.insert(new_student("Asha", "7", "Maths")).await {
        panic!("insert failed: {e}");
    }
    let err = store.insert(new_student("Ravi", "7", "Art")).await.err();
    assert!(matches!(err, Some(StoreError::DuplicateRollNumber)));
    assert_eq!(store.count(&StudentFilter::default()).await.ok(), Some(1));
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn list_filters_sorts_and_paginates() {
    let store = store("students_test_list").await;
    for (name, roll, course) in [
        ("Mathew", "2", "History"),
        ("Ravi", "10", "Applied MATHS"),
        ("Omar", "1", "Biology"),
        ("Lena", "B-4", "Maths"),
    ] {
        if let Err(e) = store.insert(new_student(name, roll, course)).await {
            panic!("insert failed: {e}");
        }
    }

    let query = StudentQuery {
        sort: SortField::RollNumber,
        ..StudentQuery::default()
    };
    let page = match store.list(&query).await {
        Ok(p) => p,
        Err(e) => panic!("list failed: {e}"),
    };
    let rolls: Vec<&str> = page.students.iter().map(|s| s.roll_number.as_str()).collect();
    assert_eq!(rolls, vec!["1", "2", "10", "B-4"]);
    assert_eq!(page.total, 4);

    let search = StudentQuery {
        filter: StudentFilter::new(Some("math"), None),
        limit: 2,
        page: 2,
        ..StudentQuery::default()
    };
    let page = match store.list(&search).await {
        Ok(p) => p,
        Err(e) => panic!("list failed: {e}"),
    };
    assert_eq!(page.total, 3);
    assert_eq!(page.students.len(), 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn update_and_delete_round_trip() {
    let store = store("students_test_update").await;
    let created = match store.insert(new_student("Asha", "7", "Maths")).await {
        Ok(s) => s,
        Err(e) => panic!("insert failed: {e}"),
    };
    let patch = StudentPatch {
        course: Some("Physics".into()),
        ..StudentPatch::default()
    };
    let updated = match store.update(created.id, patch).await {
        Ok(Some(s)) => s,
        other => panic!("update failed: {other:?}"),
    };
    assert_eq!(updated.course, "Physics");
    assert_eq!(updated.name, "Asha");
    assert!(updated.updated_at >= created.updated_at);

    assert_eq!(store.delete(created.id).await.ok(), Some(true));
    assert_eq!(store.delete(created.id).await.ok(), Some(false));
    assert_eq!(store.find_by_id(created.id).await.ok(), Some(None));
}
