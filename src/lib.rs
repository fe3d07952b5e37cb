//! Student records service: REST endpoints over a single `students` collection.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod student;

pub use config::Config;
pub use error::{AppError, ConfigError, StoreError};
pub use response::ApiResponse;
pub use routes::{app, common_routes, student_routes};
pub use state::AppState;
pub use store::{
    ensure_database_exists, ensure_students_table, MemoryStudentStore, PgStudentStore,
    StudentStore,
};
pub use student::{NewStudent, Student, StudentPatch};
