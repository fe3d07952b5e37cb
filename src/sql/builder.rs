//! Builds parameterized statements for the `students` table.

use crate::store::{SortField, StudentFilter, StudentQuery};

pub const STUDENTS_TABLE: &str = "students";

/// Columns in `Student` field order.
pub const STUDENT_COLUMNS: &str =
    "id, name, roll_number, course, age, std, division, created_at, updated_at";

/// Roll numbers matching this are sorted by their numeric value.
pub const NUMERIC_ROLL_PATTERN: &str = "^[+-]?[0-9]+$";

/// Quote identifier for PostgreSQL (identifiers come from config only).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    BigInt(i64),
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn push_param(&mut self, v: SqlParam) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Search is a literal, case-insensitive substring: metacharacters are escaped before `~*`.
fn push_where(q: &mut QueryBuf, filter: &StudentFilter) -> String {
    let mut parts = Vec::new();
    if let Some(search) = &filter.search {
        let n = q.push_param(SqlParam::Text(regex::escape(search)));
        parts.push(format!("(name ~* ${n} OR course ~* ${n})"));
    }
    if let Some(course) = &filter.course {
        let n = q.push_param(SqlParam::Text(course.clone()));
        parts.push(format!("course = ${n}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// ORDER BY for the list page. Roll numbers are projected to `numeric` so "10" follows "2";
/// non-numeric ones go last in either direction. Text compares bytewise (`COLLATE "C"`).
pub fn order_clause(query: &StudentQuery) -> String {
    let dir = query.order.as_sql();
    match query.sort {
        SortField::Name => format!(" ORDER BY name COLLATE \"C\" {dir}, id {dir}"),
        SortField::RollNumber => format!(
            " ORDER BY CASE WHEN roll_number ~ '{NUMERIC_ROLL_PATTERN}' THEN roll_number::numeric END {dir} NULLS LAST, roll_number COLLATE \"C\" {dir}, id {dir}"
        ),
    }
}

pub fn select_page(table: &str, query: &StudentQuery) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_clause = push_where(&mut q, &query.filter);
    let order = order_clause(query);
    let limit = q.push_param(SqlParam::BigInt(i64::from(query.limit)));
    let offset = q.push_param(SqlParam::BigInt(
        i64::try_from(query.offset()).unwrap_or(i64::MAX),
    ));
    q.sql = format!(
        "SELECT {STUDENT_COLUMNS} FROM {table}{where_clause}{order} LIMIT ${limit} OFFSET ${offset}"
    );
    q
}

pub fn select_count(table: &str, filter: &StudentFilter) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_clause = push_where(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) FROM {table}{where_clause}");
    q
}

pub fn select_by_id(table: &str) -> String {
    format!("SELECT {STUDENT_COLUMNS} FROM {table} WHERE id = $1")
}

pub fn select_by_roll_number(table: &str) -> String {
    format!("SELECT {STUDENT_COLUMNS} FROM {table} WHERE roll_number = $1")
}

pub fn exists_by_roll_number(table: &str) -> String {
    format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE roll_number = $1)")
}

/// Binds: id, name, roll_number, course, age, std, division.
pub fn insert(table: &str) -> String {
    format!(
        "INSERT INTO {table} (id, name, roll_number, course, age, std, division, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW()) RETURNING {STUDENT_COLUMNS}"
    )
}

/// Binds: id, then nullable name, roll_number, course, age, std, division. NULL keeps the stored value.
pub fn update_by_id(table: &str) -> String {
    format!(
        "UPDATE {table} SET \
         name = COALESCE($2, name), \
         roll_number = COALESCE($3, roll_number), \
         course = COALESCE($4, course), \
         age = COALESCE($5, age), \
         std = COALESCE($6, std), \
         division = COALESCE($7, division), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {STUDENT_COLUMNS}"
    )
}

pub fn delete_by_id(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = $1")
}
