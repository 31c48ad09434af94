//! Student entity - Pupils that can be placed into classrooms.
//!
//! `student_id` is the school's external code and is unique. Gender and status are
//! typed enums stored as lowercase strings.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student gender as recorded by the school.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male
    #[sea_orm(string_value = "male")]
    Male,
    /// Female
    #[sea_orm(string_value = "female")]
    Female,
}

impl Gender {
    /// Lowercase label, matching the stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Enrolment status. Only `Active` students count toward totals and the
/// unassigned list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// Enrolled
    #[sea_orm(string_value = "active")]
    Active,
    /// Temporarily not enrolled
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// Left for another school
    #[sea_orm(string_value = "transferred")]
    Transferred,
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// External student code (e.g., "S2024001")
    #[sea_orm(unique)]
    pub student_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth, used to derive the age
    pub date_of_birth: Date,
    /// Gender
    #[sea_orm(indexed)]
    pub gender: Gender,
    /// Current grade label
    #[sea_orm(indexed)]
    pub grade: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// Enrolment status
    pub status: StudentStatus,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// "First Last"
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in completed years on `today`. A birth date in the future yields 0.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many assignments (at most one per academic year)
    #[sea_orm(has_many = "super::student_assignment::Entity")]
    StudentAssignments,
}

impl Related<super::student_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
