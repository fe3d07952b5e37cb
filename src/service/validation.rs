//! Request validation against the declarative student schema.

use crate::error::AppError;
use crate::student::{NewStudent, StudentPatch};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string; stored trimmed.
    Text,
    /// Whole number within bounds. Integer-valued strings are accepted.
    Integer { min: i64, max: i64 },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// Wire name in the JSON body.
    pub key: &'static str,
    /// Human label used in messages.
    pub label: &'static str,
    pub kind: FieldKind,
}

pub const STUDENT_SCHEMA: &[FieldRule] = &[
    FieldRule { key: "name", label: "Name", kind: FieldKind::Text },
    FieldRule { key: "rollNumber", label: "Roll number", kind: FieldKind::Text },
    FieldRule { key: "course", label: "Course", kind: FieldKind::Text },
    FieldRule {
        key: "age",
        label: "Age",
        kind: FieldKind::Integer { min: 1, max: i32::MAX as i64 },
    },
    FieldRule { key: "std", label: "Standard", kind: FieldKind::Text },
    FieldRule { key: "division", label: "Division", kind: FieldKind::Text },
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Integer(i64),
}

pub struct RequestValidator;

impl RequestValidator {
    /// All schema fields required. Unknown keys are ignored.
    pub fn validate_create(body: &Value) -> Result<NewStudent, AppError> {
        let mut fields = check(body, true)?;
        Ok(NewStudent {
            name: take_text(&mut fields, "name").unwrap_or_default(),
            roll_number: take_text(&mut fields, "rollNumber").unwrap_or_default(),
            course: take_text(&mut fields, "course").unwrap_or_default(),
            age: take_age(&mut fields).unwrap_or_default(),
            std: take_text(&mut fields, "std").unwrap_or_default(),
            division: take_text(&mut fields, "division").unwrap_or_default(),
        })
    }

    /// Every field optional; present, non-null fields are checked like on create.
    pub fn validate_update(body: &Value) -> Result<StudentPatch, AppError> {
        let mut fields = check(body, false)?;
        Ok(StudentPatch {
            name: take_text(&mut fields, "name"),
            roll_number: take_text(&mut fields, "rollNumber"),
            course: take_text(&mut fields, "course"),
            age: take_age(&mut fields),
            std: take_text(&mut fields, "std"),
            division: take_text(&mut fields, "division"),
        })
    }
}

fn take_text(fields: &mut HashMap<&'static str, FieldValue>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(FieldValue::Text(s)) => Some(s),
        _ => None,
    }
}

fn take_age(fields: &mut HashMap<&'static str, FieldValue>) -> Option<i32> {
    match fields.remove("age") {
        Some(FieldValue::Integer(n)) => i32::try_from(n).ok(),
        _ => None,
    }
}

/// Collects every violation in schema order and reports the first.
fn check(body: &Value, required: bool) -> Result<HashMap<&'static str, FieldValue>, AppError> {
    let obj: &Map<String, Value> = body
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object.".into()))?;

    let mut fields = HashMap::new();
    let mut violations = Vec::new();
    for rule in STUDENT_SCHEMA {
        match obj.get(rule.key) {
            None | Some(Value::Null) => {
                if required {
                    violations.push(format!("{} is required", rule.label));
                }
            }
            Some(v) => match check_field(rule, v) {
                Ok(value) => {
                    fields.insert(rule.key, value);
                }
                Err(msg) => violations.push(msg),
            },
        }
    }

    match violations.first() {
        None => Ok(fields),
        Some(first) => {
            tracing::debug!(?violations, "request validation failed");
            Err(AppError::Validation(first.clone()))
        }
    }
}

fn check_field(rule: &FieldRule, v: &Value) -> Result<FieldValue, String> {
    let label = rule.label;
    match rule.kind {
        FieldKind::Text => {
            let s = v.as_str().ok_or_else(|| format!("{label} must be a string"))?;
            let s = s.trim();
            if s.is_empty() {
                return Err(format!("{label} cannot be empty"));
            }
            Ok(FieldValue::Text(s.to_string()))
        }
        FieldKind::Integer { min, max } => {
            let n = match v {
                Value::Number(n) => match n.as_i64() {
                    Some(i) => i,
                    None => whole_number(n.as_f64(), label)?,
                },
                Value::String(s) => {
                    let s = s.trim();
                    if s.is_empty() {
                        return Err(format!("{label} cannot be empty"));
                    }
                    match s.parse::<i64>() {
                        Ok(i) => i,
                        Err(_) => match s.parse::<f64>() {
                            Ok(f) if f.is_finite() => whole_number(Some(f), label)?,
                            _ => return Err(format!("{label} must be a number")),
                        },
                    }
                }
                _ => return Err(format!("{label} must be a number")),
            };
            if n < min {
                return Err(format!("{label} must be at least {min}"));
            }
            if n > max {
                return Err(format!("{label} must be at most {max}"));
            }
            Ok(FieldValue::Integer(n))
        }
    }
}

fn whole_number(f: Option<f64>, label: &str) -> Result<i64, String> {
    match f {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
        Some(f) if f.is_finite() && f.fract() == 0.0 => Err(format!("{label} must be at most {}", i32::MAX)),
        _ => Err(format!("{label} must be an integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "name": "Asha Rao",
            "rollNumber": "12",
            "course": "Mathematics",
            "age": 15,
            "std": "10",
            "division": "A"
        })
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) | AppError::BadRequest(m) => m,
            other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn valid_create_body_yields_typed_student() {
        let student = match RequestValidator::validate_create(&valid_body()) {
            Ok(s) => s,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(student.roll_number, "12");
        assert_eq!(student.age, 15);
        assert!(!student.has_missing_fields());
    }

    #[test]
    fn first_violation_in_schema_order_is_reported() {
        let body = json!({ "course": "", "age": 0 });
        let err = RequestValidator::validate_create(&body).err();
        assert_eq!(err.map(message).as_deref(), Some("Name is required"));
    }

    #[test]
    fn field_messages_follow_schema() {
        let cases = [
            (json!({"name": 5}), "Name must be a string"),
            (json!({"name": "   "}), "Name cannot be empty"),
            (json!({"rollNumber": ""}), "Roll number cannot be empty"),
            (json!({"age": "abc"}), "Age must be a number"),
            (json!({"age": ""}), "Age cannot be empty"),
            (json!({"age": 2.5}), "Age must be an integer"),
            (json!({"age": 0}), "Age must be at least 1"),
            (json!({"age": true}), "Age must be a number"),
            (json!({"std": []}), "Standard must be a string"),
            (json!({"division": ""}), "Division cannot be empty"),
        ];
        for (partial, expected) in cases {
            let mut body = valid_body();
            if let (Some(target), Some(src)) = (body.as_object_mut(), partial.as_object()) {
                for (k, v) in src {
                    target.insert(k.clone(), v.clone());
                }
            }
            let err = RequestValidator::validate_create(&body).err();
            assert_eq!(err.map(message).as_deref(), Some(expected), "body: {body}");
        }
    }

    #[test]
    fn text_is_trimmed_and_numeric_age_string_accepted() {
        let mut body = valid_body();
        body["name"] = json!("  Asha  ");
        body["age"] = json!("16");
        let student = match RequestValidator::validate_create(&body) {
            Ok(s) => s,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(student.name, "Asha");
        assert_eq!(student.age, 16);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut body = valid_body();
        body["nickname"] = json!("A");
        assert!(RequestValidator::validate_create(&body).is_ok());
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = RequestValidator::validate_create(&json!([1, 2])).err();
        assert_eq!(
            err.map(message).as_deref(),
            Some("Request body must be a JSON object.")
        );
    }

    #[test]
    fn update_allows_missing_fields_but_checks_present_ones() {
        let patch = match RequestValidator::validate_update(&json!({"course": "Physics", "age": null})) {
            Ok(p) => p,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(patch.course.as_deref(), Some("Physics"));
        assert_eq!(patch.age, None);
        assert_eq!(patch.name, None);

        let err = RequestValidator::validate_update(&json!({"age": -3})).err();
        assert_eq!(err.map(message).as_deref(), Some("Age must be at least 1"));
    }

    #[test]
    fn age_above_storage_range_is_rejected() {
        let err = RequestValidator::validate_update(&json!({"age": 3_000_000_000_i64})).err();
        assert_eq!(
            err.map(message).as_deref(),
            Some("Age must be at most 2147483647")
        );
    }

    #[test]
    fn non_finite_age_strings_are_not_numbers() {
        for raw in ["NaN", "inf", "-infinity"] {
            let err = RequestValidator::validate_update(&json!({ "age": raw })).err();
            assert_eq!(err.map(message).as_deref(), Some("Age must be a number"), "age: {raw}");
        }
    }
}
