//! Listing parameters: filter, sort, pagination.

use crate::student::Student;
use std::cmp::Ordering;

/// Search term matches `name` or `course` case-insensitively; `course` is an exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub course: Option<String>,
}

impl StudentFilter {
    /// Blank values are treated as absent.
    pub fn new(search: Option<&str>, course: Option<&str>) -> Self {
        let clean = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        StudentFilter {
            search: clean(search),
            course: clean(course),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Name,
    RollNumber,
}

impl SortField {
    /// Only `name` and `rollNumber` are sortable; anything else falls back to `name`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("rollNumber") => SortField::RollNumber,
            _ => SortField::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("dsc") | Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuery {
    pub filter: StudentFilter,
    pub sort: SortField,
    pub order: SortOrder,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for StudentQuery {
    fn default() -> Self {
        StudentQuery {
            filter: StudentFilter::default(),
            sort: SortField::Name,
            order: SortOrder::Asc,
            page: 1,
            limit: 10,
        }
    }
}

impl StudentQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentPage {
    /// Size of the filtered set before pagination.
    pub total: u64,
    pub students: Vec<Student>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_field_falls_back_to_name() {
        assert_eq!(SortField::parse(Some("age")), SortField::Name);
        assert_eq!(SortField::parse(None), SortField::Name);
        assert_eq!(SortField::parse(Some("rollNumber")), SortField::RollNumber);
    }

    #[test]
    fn order_accepts_dsc_and_desc() {
        assert_eq!(SortOrder::parse(Some("dsc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("up")), SortOrder::Asc);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let q = StudentQuery {
            page: 2,
            limit: 5,
            ..StudentQuery::default()
        };
        assert_eq!(q.offset(), 5);
        let first = StudentQuery::default();
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn blank_filter_values_are_dropped() {
        let f = StudentFilter::new(Some("  "), Some(" Maths "));
        assert_eq!(f.search, None);
        assert_eq!(f.course.as_deref(), Some("Maths"));
    }
}
