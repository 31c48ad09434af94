//! Core business logic - framework-agnostic placement, statistics and dashboard operations.
//!
//! Nothing in here logs or renders; failures come back as [`crate::errors::Error`] values.

/// Academic year store operations and the single-active-year rule
pub mod academic_year;
/// Assignment engine: placing and removing students
pub mod assignment;
/// Classroom store operations
pub mod classroom;
/// Dashboard queries for the active year
pub mod dashboard;
/// Grade partitioning for presentation
pub mod grouping;
/// In-process mutual exclusion for placements
pub mod guard;
/// Derived classroom, grade and year statistics
pub mod statistics;
/// Student store operations
pub mod student;
/// Teacher store operations
pub mod teacher;
