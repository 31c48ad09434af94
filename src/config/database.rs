//! Database configuration module for Homeroom.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite indexes that the derive macros
//! cannot express (notably the one-placement-per-year constraint) are created explicitly.

use crate::config::settings::DatabaseSettings;
use crate::entities::{
    AcademicYear, Classroom, ClassroomColumn, Student, StudentAssignment, StudentAssignmentColumn,
    StudentColumn, Teacher,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Establishes a pooled connection using the given settings.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .sqlx_logging(settings.sqlx_logging);

    let db = Database::connect(options).await?;
    info!("Database connection established");
    Ok(db)
}

/// Opens a fresh in-memory database with every table created.
///
/// The pool is pinned to a single connection because each `SQLite` memory connection is
/// its own database.
pub async fn create_in_memory() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Composite indexes that back the placement invariants and the dashboard lookups.
fn composite_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_classrooms_year_name")
            .table(Classroom)
            .col(ClassroomColumn::AcademicYearId)
            .col(ClassroomColumn::Name)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_classrooms_year_grade")
            .table(Classroom)
            .col(ClassroomColumn::AcademicYearId)
            .col(ClassroomColumn::Grade)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_students_status_grade")
            .table(Student)
            .col(StudentColumn::Status)
            .col(StudentColumn::Grade)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_student_assignments_student_year")
            .table(StudentAssignment)
            .col(StudentAssignmentColumn::StudentId)
            .col(StudentAssignmentColumn::AcademicYearId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_student_assignments_classroom_year")
            .table(StudentAssignment)
            .col(StudentAssignmentColumn::ClassroomId)
            .col(StudentAssignmentColumn::AcademicYearId)
            .if_not_exists()
            .to_owned(),
    ]
}

async fn create_table_for<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }

    debug!(table = entity.table_name(), "Table ensured");
    Ok(())
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Parents are created before children so the foreign keys resolve in declaration order.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table_for(db, &schema, AcademicYear).await?;
    create_table_for(db, &schema, Teacher).await?;
    create_table_for(db, &schema, Classroom).await?;
    create_table_for(db, &schema, Student).await?;
    create_table_for(db, &schema, StudentAssignment).await?;

    for index in composite_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
