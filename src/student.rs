//! Student record and the typed write payloads produced by validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub roll_number: String,
    pub course: String,
    pub age: i32,
    pub std: String,
    pub division: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new record; text already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub course: String,
    pub age: i32,
    pub std: String,
    pub division: String,
}

impl NewStudent {
    pub fn has_missing_fields(&self) -> bool {
        [
            &self.name,
            &self.roll_number,
            &self.course,
            &self.std,
            &self.division,
        ]
        .iter()
        .any(|s| s.is_empty())
            || self.age < 1
    }

    pub fn into_student(self, id: Uuid, now: DateTime<Utc>) -> Student {
        Student {
            id,
            name: self.name,
            roll_number: self.roll_number,
            course: self.course,
            age: self.age,
            std: self.std,
            division: self.division,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub course: Option<String>,
    pub age: Option<i32>,
    pub std: Option<String>,
    pub division: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self == &StudentPatch::default()
    }

    pub fn apply_to(self, student: &mut Student, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            student.name = v;
        }
        if let Some(v) = self.roll_number {
            student.roll_number = v;
        }
        if let Some(v) = self.course {
            student.course = v;
        }
        if let Some(v) = self.age {
            student.age = v;
        }
        if let Some(v) = self.std {
            student.std = v;
        }
        if let Some(v) = self.division {
            student.division = v;
        }
        student.updated_at = now;
    }
}

/// Numeric view of a roll number. Roll numbers are stored as text; those made of an
/// optional sign and digits order by integer value with no width limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollNumberKey<'a> {
    negative: bool,
    digits: &'a str,
}

impl<'a> RollNumberKey<'a> {
    pub fn parse(roll_number: &'a str) -> Option<Self> {
        let (negative, digits) = match roll_number.as_bytes().first() {
            Some(b'-') => (true, &roll_number[1..]),
            Some(b'+') => (false, &roll_number[1..]),
            _ => (false, roll_number),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = digits.trim_start_matches('0');
        Some(RollNumberKey {
            negative: negative && !digits.is_empty(),
            digits,
        })
    }
}

fn cmp_magnitude(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for RollNumberKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, false) => cmp_magnitude(self.digits, other.digits),
            (true, true) => cmp_magnitude(other.digits, self.digits),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for RollNumberKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RollNumberKey<'_> {
        match RollNumberKey::parse(s) {
            Some(k) => k,
            None => panic!("{s} should be numeric"),
        }
    }

    #[test]
    fn roll_numbers_order_numerically() {
        let mut rolls = vec!["2", "10", "1"];
        rolls.sort_by(|a, b| key(a).cmp(&key(b)));
        assert_eq!(rolls, vec!["1", "2", "10"]);
    }

    #[test]
    fn sign_and_leading_zeros_are_understood() {
        assert_eq!(key("007").cmp(&key("7")), Ordering::Equal);
        assert_eq!(key("-0").cmp(&key("+0")), Ordering::Equal);
        assert!(key("-20") < key("-3"));
        assert!(key("-1") < key("0"));
        assert!(key("99999999999999999999999") > key("1"));
    }

    #[test]
    fn non_numeric_roll_numbers_have_no_key() {
        assert!(RollNumberKey::parse("A-12").is_none());
        assert!(RollNumberKey::parse("").is_none());
        assert!(RollNumberKey::parse("-").is_none());
        assert!(RollNumberKey::parse("1.5").is_none());
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let now = Utc::now();
        let mut student = NewStudent {
            name: "Asha".into(),
            roll_number: "4".into(),
            course: "Maths".into(),
            age: 14,
            std: "9".into(),
            division: "B".into(),
        }
        .into_student(Uuid::new_v4(), now);
        let patch = StudentPatch {
            course: Some("Physics".into()),
            ..StudentPatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut student, now);
        assert_eq!(student.course, "Physics");
        assert_eq!(student.name, "Asha");
        assert_eq!(student.age, 14);
    }
}
