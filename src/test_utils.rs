//! Shared test utilities for `Homeroom`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::expect_used)]

use crate::{
    config::{database, settings::DatabaseSettings},
    core::{
        academic_year, classroom,
        student::{self, NewStudent},
        teacher,
    },
    entities::{self, Gender},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

static FILE_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    database::create_in_memory().await
}

/// A database file in the system temp directory, removed (with its WAL files) on drop.
#[derive(Debug)]
pub struct TempDbFile {
    path: PathBuf,
}

impl TempDbFile {
    fn sidecars(&self) -> Vec<PathBuf> {
        ["", "-wal", "-shm", "-journal"]
            .iter()
            .map(|suffix| {
                let mut name = self.path.clone().into_os_string();
                name.push(suffix);
                PathBuf::from(name)
            })
            .collect()
    }
}

impl Drop for TempDbFile {
    fn drop(&mut self) {
        for path in self.sidecars() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Creates a file-backed `SQLite` database behind a pool of several connections, the way
/// the binary runs. Concurrency tests use this instead of the single-connection memory
/// database, which would serialise every transaction by itself.
///
/// Keep the returned [`TempDbFile`] alive for as long as the connection is used.
pub async fn setup_file_test_db() -> Result<(TempDbFile, DatabaseConnection)> {
    let file = TempDbFile {
        path: std::env::temp_dir().join(format!(
            "homeroom-test-{}-{}.sqlite",
            std::process::id(),
            FILE_DB_COUNTER.fetch_add(1, Ordering::SeqCst)
        )),
    };
    // Leftovers from an earlier run with the same process id
    for path in file.sidecars() {
        let _ = std::fs::remove_file(path);
    }

    let settings = DatabaseSettings {
        url: format!("sqlite://{}?mode=rwc", file.path.display()),
        max_connections: 5,
        ..DatabaseSettings::default()
    };
    let db = database::create_connection(&settings).await?;
    database::create_tables(&db).await?;
    Ok((file, db))
}

/// File-backed variant of [`setup_with_active_year`].
pub async fn setup_file_db_with_active_year()
-> Result<(TempDbFile, DatabaseConnection, entities::academic_year::Model)> {
    let (file, db) = setup_file_test_db().await?;
    let year = create_test_year(&db, "2024-2025", true).await?;
    Ok((file, db, year))
}

/// Shorthand for a calendar date. Panics on an invalid date.
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Creates a test academic year.
///
/// # Defaults
/// * `start_date`: September 1st of the year the name starts with (2024 if it doesn't)
/// * `end_date`: June 30th of the following year
pub async fn create_test_year(
    db: &DatabaseConnection,
    name: &str,
    is_active: bool,
) -> Result<entities::academic_year::Model> {
    let first_year = name
        .get(..4)
        .and_then(|y| y.parse::<i32>().ok())
        .unwrap_or(2024);

    academic_year::create_academic_year(
        db,
        name.to_string(),
        date(first_year, 9, 1),
        date(first_year + 1, 6, 30),
        is_active,
    )
    .await
}

/// Sets up a complete test environment with an active "2024-2025" year.
/// Returns (db, year) for common test scenarios.
pub async fn setup_with_active_year() -> Result<(DatabaseConnection, entities::academic_year::Model)>
{
    let db = setup_test_db().await?;
    let year = create_test_year(&db, "2024-2025", true).await?;
    Ok((db, year))
}

/// Creates an active test teacher.
///
/// # Defaults
/// * name: "Test `employee_id`"
/// * email: "<lowercased `employee_id`>@school.test"
pub async fn create_test_teacher(
    db: &DatabaseConnection,
    employee_id: &str,
) -> Result<entities::teacher::Model> {
    teacher::create_teacher(
        db,
        "Test".to_string(),
        employee_id.to_string(),
        format!("{}@school.test", employee_id.to_lowercase()),
        employee_id.to_string(),
    )
    .await
}

/// Creates a test classroom without a homeroom teacher.
pub async fn create_test_classroom(
    db: &DatabaseConnection,
    academic_year_id: i64,
    name: &str,
    grade: &str,
    capacity: i32,
) -> Result<entities::classroom::Model> {
    classroom::create_classroom(
        db,
        academic_year_id,
        name.to_string(),
        grade.to_string(),
        capacity,
        None,
    )
    .await
}

/// Builds the arguments for a test student.
///
/// # Defaults
/// * name: "Student `code`"
/// * `date_of_birth`: 2017-03-15
/// * notes: None
#[must_use]
pub fn new_student(code: &str, gender: Gender, grade: &str) -> NewStudent {
    NewStudent {
        student_id: code.to_string(),
        first_name: "Student".to_string(),
        last_name: code.to_string(),
        date_of_birth: date(2017, 3, 15),
        gender,
        grade: grade.to_string(),
        notes: None,
    }
}

/// Creates an active test student.
pub async fn create_test_student(
    db: &DatabaseConnection,
    code: &str,
    gender: Gender,
    grade: &str,
) -> Result<entities::student::Model> {
    student::create_student(db, new_student(code, gender, grade)).await
}
