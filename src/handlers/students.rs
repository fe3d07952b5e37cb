//! Student handlers: create, list, read, update, delete, roll number check.

use crate::error::{AppError, StoreError};
use crate::response::ApiResponse;
use crate::service::RequestValidator;
use crate::state::AppState;
use crate::store::{SortField, SortOrder, StudentFilter, StudentQuery};
use crate::student::Student;
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

const NOT_FOUND: &str = "Student not found.";
const ROLL_EXISTS: &str = "Roll number already exists.";
const ROLL_TAKEN: &str = "Another student with this roll number already exists.";

const CREATE_FAILED: &str = "Failed to create student.";
const LIST_FAILED: &str = "Failed to fetch student list.";
const READ_FAILED: &str = "Failed to fetch student.";
const UPDATE_FAILED: &str = "Failed to update student.";
const DELETE_FAILED: &str = "Failed to delete student.";
const CHECK_FAILED: &str = "Error checking roll number.";

/// Query for `GET /list`. Values stay raw strings so bad numbers fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search: Option<String>,
    pub course: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn into_student_query(self) -> StudentQuery {
        StudentQuery {
            filter: StudentFilter::new(self.search.as_deref(), self.course.as_deref()),
            sort: SortField::parse(self.sort_by.as_deref()),
            order: SortOrder::parse(self.order.as_deref()),
            page: positive_or(self.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(self.limit.as_deref(), DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }
}

fn positive_or(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentList {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub students: Vec<Student>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRollQuery {
    pub roll_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RollAvailability {
    pub exists: bool,
}

/// Unparseable ids are treated like any other unexpected failure.
fn parse_id(id: &str, failure: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|e| AppError::internal(failure, format!("invalid id '{id}': {e}")))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Student>, AppError> {
    let Json(body) = body?;
    let input = RequestValidator::validate_create(&body)?;
    if input.has_missing_fields() {
        return Err(AppError::BadRequest("All fields are required.".into()));
    }

    let taken = state
        .store
        .exists(&input.roll_number)
        .await
        .map_err(|e| AppError::internal(CREATE_FAILED, e))?;
    if taken {
        tracing::warn!(roll_number = %input.roll_number, "create rejected: duplicate roll number");
        return Err(AppError::Conflict(ROLL_EXISTS.into()));
    }

    let student = state.store.insert(input).await.map_err(|e| match e {
        StoreError::DuplicateRollNumber => AppError::Conflict(ROLL_EXISTS.into()),
        other => AppError::internal(CREATE_FAILED, other),
    })?;
    tracing::info!(id = %student.id, roll_number = %student.roll_number, "student created");
    Ok(ApiResponse::created("Student created successfully.", student))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ApiResponse<StudentList>, AppError> {
    let Query(query) = query?;
    let query = query.into_student_query();
    let page = state
        .store
        .list(&query)
        .await
        .map_err(|e| AppError::internal(LIST_FAILED, e))?;
    Ok(ApiResponse::ok(
        "Students fetched successfully.",
        StudentList {
            total: page.total,
            page: query.page,
            limit: query.limit,
            students: page.students,
        },
    ))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Student>, AppError> {
    let id = parse_id(&id, READ_FAILED)?;
    let student = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| AppError::internal(READ_FAILED, e))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ApiResponse::ok("Student fetched successfully.", student))
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
        .unwrap_or(false)
}

/// A blank body is an empty patch; anything else must be a JSON document.
fn patch_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    if !is_json_content_type(headers) {
        return Err(AppError::BadRequest("Invalid JSON body.".into()));
    }
    let Json(value) = Json::<Value>::from_bytes(bytes)?;
    Ok(value)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiResponse<Student>, AppError> {
    let body = patch_body(&headers, &body?)?;
    let patch = RequestValidator::validate_update(&body)?;
    let id = parse_id(&id, UPDATE_FAILED)?;

    let current = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| AppError::internal(UPDATE_FAILED, e))?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;

    if let Some(roll) = patch.roll_number.as_deref().filter(|r| *r != current.roll_number) {
        let holder = state
            .store
            .find_by_roll_number(roll)
            .await
            .map_err(|e| AppError::internal(UPDATE_FAILED, e))?;
        if holder.is_some_and(|other| other.id != id) {
            tracing::warn!(%id, roll_number = %roll, "update rejected: duplicate roll number");
            return Err(AppError::Conflict(ROLL_TAKEN.into()));
        }
    }

    let student = state
        .store
        .update(id, patch)
        .await
        .map_err(|e| match e {
            StoreError::DuplicateRollNumber => AppError::Conflict(ROLL_TAKEN.into()),
            other => AppError::internal(UPDATE_FAILED, other),
        })?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    tracing::info!(id = %student.id, "student updated");
    Ok(ApiResponse::ok("Student updated successfully.", student))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, DELETE_FAILED)?;
    let removed = state
        .store
        .delete(id)
        .await
        .map_err(|e| AppError::internal(DELETE_FAILED, e))?;
    if !removed {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(%id, "student deleted");
    Ok(ApiResponse::empty(StatusCode::OK, "Student deleted successfully."))
}

pub async fn check_roll(
    State(state): State<AppState>,
    query: Result<Query<CheckRollQuery>, QueryRejection>,
) -> Result<ApiResponse<RollAvailability>, AppError> {
    let Query(query) = query?;
    let roll = query
        .roll_number
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("Roll number is required.".into()))?;
    let exists = state
        .store
        .exists(roll)
        .await
        .map_err(|e| AppError::internal(CHECK_FAILED, e))?;
    let message = if exists {
        "Duplicate found"
    } else {
        "Roll number is available"
    };
    Ok(ApiResponse::ok(message, RollAvailability { exists }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> StudentQuery {
        let mut q = ListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "search" => q.search = v,
                "course" => q.course = v,
                "sortBy" => q.sort_by = v,
                "order" => q.order = v,
                "page" => q.page = v,
                "limit" => q.limit = v,
                other => panic!("unknown key {other}"),
            }
        }
        q.into_student_query()
    }

    #[test]
    fn list_query_defaults() {
        assert_eq!(query(&[]), StudentQuery::default());
    }

    #[test]
    fn bad_page_and_limit_fall_back_to_defaults() {
        let q = query(&[("page", "abc"), ("limit", "0")]);
        assert_eq!(q.page, DEFAULT_PAGE);
        assert_eq!(q.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn limit_is_capped() {
        assert_eq!(query(&[("limit", "5000")]).limit, MAX_LIMIT);
    }

    #[test]
    fn sort_and_order_are_parsed() {
        let q = query(&[("sortBy", "rollNumber"), ("order", "dsc"), ("page", "2"), ("limit", "5")]);
        assert_eq!(q.sort, SortField::RollNumber);
        assert_eq!(q.order, SortOrder::Desc);
        assert_eq!(q.offset(), 5);
    }

    #[test]
    fn patch_body_requires_json_only_when_non_blank() {
        let none = HeaderMap::new();
        assert_eq!(patch_body(&none, b"").ok(), Some(Value::Object(Map::new())));
        assert_eq!(patch_body(&none, b"  \n").ok(), Some(Value::Object(Map::new())));
        assert!(patch_body(&none, br#"{"name":"A"}"#).is_err());

        let mut json = HeaderMap::new();
        json.insert(CONTENT_TYPE, axum::http::HeaderValue::from_static("application/json; charset=utf-8"));
        let body = patch_body(&json, br#"{"name":"A"}"#).ok();
        assert_eq!(body.as_ref().and_then(|v| v["name"].as_str()), Some("A"));
        assert!(patch_body(&json, b"{oops").is_err());
    }
}
