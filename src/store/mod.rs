//! Persistence for student records: the `StudentStore` seam and its PostgreSQL and in-memory implementations.

mod memory;
mod postgres;
mod query;

pub use memory::MemoryStudentStore;
pub use postgres::{ensure_database_exists, ensure_students_table, PgStudentStore};
pub use query::{SortField, SortOrder, StudentFilter, StudentPage, StudentQuery};

use crate::error::StoreError;
use crate::student::{NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use uuid::Uuid;

/// Single-collection store. Implementations must enforce roll number uniqueness
/// themselves and report a collision as [`StoreError::DuplicateRollNumber`].
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, StoreError>;

    async fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>, StoreError>;

    async fn exists(&self, roll_number: &str) -> Result<bool, StoreError> {
        Ok(self.find_by_roll_number(roll_number).await?.is_some())
    }

    /// One page of matching records plus the unpaginated match count.
    async fn list(&self, query: &StudentQuery) -> Result<StudentPage, StoreError>;

    async fn count(&self, filter: &StudentFilter) -> Result<u64, StoreError>;

    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError>;

    /// Returns `None` when no record has this id.
    async fn update(&self, id: Uuid, patch: StudentPatch) -> Result<Option<Student>, StoreError>;

    /// Returns `false` when no record has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
