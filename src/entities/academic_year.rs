//! Academic year entity - A bounded school-calendar period.
//!
//! Every classroom and every assignment is scoped to exactly one academic year.
//! At most one year carries `is_active = true`; see `core::academic_year`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Academic year database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "academic_years")]
pub struct Model {
    /// Unique identifier for the academic year
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "2024-2025")
    pub name: String,
    /// First day of the year
    #[sea_orm(indexed)]
    pub start_date: Date,
    /// Last day of the year
    pub end_date: Date,
    /// Whether this is the year currently accepting assignments
    #[sea_orm(indexed)]
    pub is_active: bool,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between AcademicYear and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One year owns many classrooms
    #[sea_orm(has_many = "super::classroom::Entity")]
    Classrooms,
    /// One year scopes many assignments
    #[sea_orm(has_many = "super::student_assignment::Entity")]
    StudentAssignments,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classrooms.def()
    }
}

impl Related<super::student_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
