//! PostgreSQL-backed store, plus startup provisioning of the database and `students` table.

use super::{StudentFilter, StudentPage, StudentQuery, StudentStore};
use crate::error::StoreError;
use crate::sql::{self, qualified_table, quoted, SqlParam, STUDENTS_TABLE};
use crate::student::{NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
    table: String,
}

impl PgStudentStore {
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgStudentStore {
            pool,
            table: qualified_table(schema, STUDENTS_TABLE),
        }
    }
}

/// Unique-index violations become [`StoreError::DuplicateRollNumber`].
fn map_write_error(err: sqlx::Error) -> StoreError {
    let duplicate = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if duplicate {
        StoreError::DuplicateRollNumber
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        let sql = sql::select_by_id(&self.table);
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>, StoreError> {
        let sql = sql::select_by_roll_number(&self.table);
        tracing::debug!(sql = %sql, roll_number, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(roll_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, roll_number: &str) -> Result<bool, StoreError> {
        let sql = sql::exists_by_roll_number(&self.table);
        tracing::debug!(sql = %sql, roll_number, "query");
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(roll_number)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn list(&self, query: &StudentQuery) -> Result<StudentPage, StoreError> {
        let total = self.count(&query.filter).await?;
        let q = sql::select_page(&self.table, query);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut select = sqlx::query_as::<_, Student>(&q.sql);
        for p in &q.params {
            select = match p {
                SqlParam::Text(s) => select.bind(s.as_str()),
                SqlParam::BigInt(n) => select.bind(*n),
            };
        }
        let students = select.fetch_all(&self.pool).await?;
        Ok(StudentPage { total, students })
    }

    async fn count(&self, filter: &StudentFilter) -> Result<u64, StoreError> {
        let q = sql::select_count(&self.table, filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut count = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            count = match p {
                SqlParam::Text(s) => count.bind(s.as_str()),
                SqlParam::BigInt(n) => count.bind(*n),
            };
        }
        let n = count.fetch_one(&self.pool).await?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let sql = sql::insert(&self.table);
        tracing::debug!(sql = %sql, roll_number = %student.roll_number, "query");
        sqlx::query_as::<_, Student>(&sql)
            .bind(Uuid::new_v4())
            .bind(&student.name)
            .bind(&student.roll_number)
            .bind(&student.course)
            .bind(student.age)
            .bind(&student.std)
            .bind(&student.division)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update(&self, id: Uuid, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let sql = sql::update_by_id(&self.table);
        tracing::debug!(sql = %sql, %id, "query");
        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.roll_number)
            .bind(patch.course)
            .bind(patch.age)
            .bind(patch.std)
            .bind(patch.division)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = sql::delete_by_id(&self.table);
        tracing::debug!(sql = %sql, %id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create `schema` if missing, then the `students` table with its unique roll number index.
pub async fn ensure_students_table(pool: &PgPool, schema: &str) -> Result<(), StoreError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;

    let table = qualified_table(schema, STUDENTS_TABLE);
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            roll_number TEXT NOT NULL,
            course TEXT NOT NULL,
            age INTEGER NOT NULL CHECK (age >= 1),
            std TEXT NOT NULL,
            division TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT students_roll_number_key UNIQUE (roll_number)
        )
        "#,
        table
    );
    sqlx::query(&ddl).execute(pool).await?;
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS students_course_idx ON {} (course)",
        table
    ))
    .execute(pool)
    .await?;
    tracing::info!(schema, "students table ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL: no database path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut split = path_and_query.splitn(2, '?');
    let db_name = split.next().unwrap_or("").trim().to_string();
    let query = split.next().map(|q| format!("?{q}")).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{base}postgres{query}"), db_name))
}
