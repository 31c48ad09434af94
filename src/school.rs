//! The school handle - database connection plus the placement guards every writer shares.

use crate::{
    core::{
        assignment,
        dashboard::{self, Dashboard},
        guard::PlacementGuards,
    },
    entities::student_assignment,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Shared state for the dashboard and placement operations.
///
/// Clones share the same connection pool and the same guard registry, so every clone
/// serialises placements against the others. Placements made through a second `School`
/// built from the same database are only protected by the database constraints.
#[derive(Debug, Clone)]
pub struct School {
    database: DatabaseConnection,
    guards: PlacementGuards,
}

impl School {
    /// Creates a new `School` over an initialized database.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            guards: PlacementGuards::new(),
        }
    }

    /// The underlying database connection, for store operations.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Dashboard for the active academic year.
    ///
    /// # Errors
    /// `NoActiveYear` when no year is active.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        dashboard::get_dashboard(&self.database).await
    }

    /// Dashboard for the active academic year with ages evaluated on `today`.
    pub async fn dashboard_as_of(&self, today: NaiveDate) -> Result<Dashboard> {
        dashboard::get_dashboard_as_of(&self.database, today).await
    }

    /// Places a student into a classroom for the classroom's academic year.
    ///
    /// See [`assignment::assign_student`] for the failure cases.
    pub async fn assign_student(
        &self,
        student_id: i64,
        classroom_id: i64,
        actor_id: i64,
    ) -> Result<student_assignment::Model> {
        assignment::assign_student(
            &self.database,
            &self.guards,
            student_id,
            classroom_id,
            actor_id,
        )
        .await
    }

    /// Removes a student's placement for an academic year.
    pub async fn unassign_student(
        &self,
        student_id: i64,
        academic_year_id: i64,
    ) -> Result<student_assignment::Model> {
        assignment::unassign_student(&self.database, &self.guards, student_id, academic_year_id)
            .await
    }
}
