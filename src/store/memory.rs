//! In-process store with the same filter, sort and uniqueness rules as the PostgreSQL one.
//! Text sorts bytewise, like the `COLLATE "C"` ordering of the SQL queries.
//! Used by tests and for running the API without a database.

use super::{SortField, StudentFilter, StudentPage, StudentQuery, StudentStore};
use crate::error::StoreError;
use crate::student::{NewStudent, RollNumberKey, Student, StudentPatch};
use async_trait::async_trait;
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    records: RwLock<Vec<Student>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Student>>, StoreError> {
        self.records
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Student>>, StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

struct Matcher {
    search: Option<Regex>,
    course: Option<String>,
}

impl Matcher {
    fn new(filter: &StudentFilter) -> Result<Self, StoreError> {
        let search = filter
            .search
            .as_deref()
            .map(|term| {
                RegexBuilder::new(&regex::escape(term))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StoreError::Query(e.to_string()))
            })
            .transpose()?;
        Ok(Matcher {
            search,
            course: filter.course.clone(),
        })
    }

    fn matches(&self, s: &Student) -> bool {
        let search_ok = self
            .search
            .as_ref()
            .map(|re| re.is_match(&s.name) || re.is_match(&s.course))
            .unwrap_or(true);
        let course_ok = self.course.as_ref().map(|c| s.course == *c).unwrap_or(true);
        search_ok && course_ok
    }
}

fn compare(a: &Student, b: &Student, query: &StudentQuery) -> Ordering {
    let order = query.order;
    match query.sort {
        SortField::Name => order
            .apply(a.name.cmp(&b.name))
            .then_with(|| order.apply(a.id.cmp(&b.id))),
        SortField::RollNumber => {
            let numeric = match (
                RollNumberKey::parse(&a.roll_number),
                RollNumberKey::parse(&b.roll_number),
            ) {
                (Some(x), Some(y)) => order.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            numeric
                .then_with(|| order.apply(a.roll_number.cmp(&b.roll_number)))
                .then_with(|| order.apply(a.id.cmp(&b.id)))
        }
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError> {
        Ok(self.read()?.iter().find(|s| s.id == id).cloned())
    }

    async fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .find(|s| s.roll_number == roll_number)
            .cloned())
    }

    async fn list(&self, query: &StudentQuery) -> Result<StudentPage, StoreError> {
        let matcher = Matcher::new(&query.filter)?;
        let mut matched: Vec<Student> = self
            .read()?
            .iter()
            .filter(|s| matcher.matches(s))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        matched.sort_by(|a, b| compare(a, b, query));
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let students = matched
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();
        Ok(StudentPage { total, students })
    }

    async fn count(&self, filter: &StudentFilter) -> Result<u64, StoreError> {
        let matcher = Matcher::new(filter)?;
        Ok(self.read()?.iter().filter(|s| matcher.matches(s)).count() as u64)
    }

    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let mut records = self.write()?;
        if records.iter().any(|s| s.roll_number == student.roll_number) {
            return Err(StoreError::DuplicateRollNumber);
        }
        let created = student.into_student(Uuid::new_v4(), Utc::now());
        records.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, patch: StudentPatch) -> Result<Option<Student>, StoreError> {
        let mut records = self.write()?;
        if let Some(roll) = &patch.roll_number {
            if records.iter().any(|s| s.id != id && s.roll_number == *roll) {
                return Err(StoreError::DuplicateRollNumber);
            }
        }
        let Some(student) = records.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        patch.apply_to(student, Utc::now());
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|s| s.id != id);
        Ok(records.len() < before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}
