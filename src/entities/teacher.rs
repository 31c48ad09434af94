//! Teacher entity - Homeroom teachers that classrooms may reference.
//!
//! The classroom → teacher reference is weak: deleting a teacher clears it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employment status of a teacher, stored as a lowercase string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    /// Currently teaching
    #[sea_orm(string_value = "active")]
    Active,
    /// No longer teaching
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// Teacher database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teachers")]
pub struct Model {
    /// Unique identifier for the teacher
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact address, unique across teachers
    #[sea_orm(unique)]
    pub email: String,
    /// Staff number, unique across teachers
    #[sea_orm(unique)]
    pub employee_id: String,
    /// Employment status
    #[sea_orm(indexed)]
    pub status: TeacherStatus,
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
}

/// Defines relationships between Teacher and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A teacher may be homeroom teacher of several classrooms
    #[sea_orm(has_many = "super::classroom::Entity")]
    Classrooms,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classrooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
