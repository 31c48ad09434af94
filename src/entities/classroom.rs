//! Classroom entity - A homeroom within one academic year.
//!
//! `current_count` and `available_spots` are never stored; they are derived from
//! `student_assignments` at read time (see `core::statistics`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Classroom database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classrooms")]
pub struct Model {
    /// Unique identifier for the classroom
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning academic year
    pub academic_year_id: i64,
    /// Name, unique within the academic year (e.g., "1A")
    pub name: String,
    /// Grade label (e.g., "Grade 1")
    #[sea_orm(indexed)]
    pub grade: String,
    /// Maximum number of assignments this classroom may hold
    pub capacity: i32,
    /// Homeroom teacher, if any
    pub teacher_id: Option<i64>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Classroom and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each classroom belongs to one academic year; deleting the year deletes it
    #[sea_orm(
        belongs_to = "super::academic_year::Entity",
        from = "Column::AcademicYearId",
        to = "super::academic_year::Column::Id",
        on_delete = "Cascade"
    )]
    AcademicYear,
    /// Optional homeroom teacher; deleting the teacher clears the reference
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id",
        on_delete = "SetNull"
    )]
    Teacher,
    /// One classroom has many assignments
    #[sea_orm(has_many = "super::student_assignment::Entity")]
    StudentAssignments,
}

impl Related<super::academic_year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicYear.def()
    }
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::student_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
