//! Student store operations.

use crate::{
    entities::{Gender, Student, StudentAssignment, StudentStatus, student, student_assignment},
    errors::{Error, Result, unique_violation_as},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Arguments for creating a student. New students are always `Active`.
#[derive(Debug, Clone)]
pub struct NewStudent {
    /// External student code, unique across students
    pub student_id: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Gender
    pub gender: Gender,
    /// Grade label
    pub grade: String,
    /// Optional free-form notes
    pub notes: Option<String>,
}

/// Creates an active student.
pub async fn create_student(db: &DatabaseConnection, args: NewStudent) -> Result<student::Model> {
    let code = args.student_id.trim().to_string();
    let first_name = args.first_name.trim().to_string();
    let last_name = args.last_name.trim().to_string();
    let grade = args.grade.trim().to_string();

    if code.is_empty() {
        return Err(Error::validation("Student code cannot be empty"));
    }
    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::validation("Student name cannot be empty"));
    }
    if grade.is_empty() {
        return Err(Error::validation("Student grade cannot be empty"));
    }

    let now = Utc::now();
    student::ActiveModel {
        student_id: Set(code.clone()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        date_of_birth: Set(args.date_of_birth),
        gender: Set(args.gender),
        grade: Set(grade),
        notes: Set(args.notes.filter(|n| !n.trim().is_empty())),
        status: Set(StudentStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| unique_violation_as(e, || format!("Student code {code} is already in use")))
}

/// Finds a student by primary key.
pub async fn get_student_by_id<C>(db: &C, student_id: i64) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by external student code.
pub async fn get_student_by_code<C>(db: &C, code: &str) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::StudentId.eq(code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists active students in insertion order.
pub async fn list_active_students<C>(db: &C) -> Result<Vec<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts active students.
pub async fn count_active_students<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Status.eq(StudentStatus::Active))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Lists students of a grade, any status, in insertion order.
pub async fn list_students_by_grade<C>(db: &C, grade: &str) -> Result<Vec<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Grade.eq(grade))
        .order_by_asc(student::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a student's enrolment status. Existing assignments are left untouched.
pub async fn update_student_status(
    db: &DatabaseConnection,
    student_id: i64,
    status: StudentStatus,
) -> Result<student::Model> {
    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("student", student_id))?;

    let mut active_model: student::ActiveModel = student.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a student and all of their assignments.
pub async fn delete_student(db: &DatabaseConnection, student_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let student = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("student", student_id))?;

    StudentAssignment::delete_many()
        .filter(student_assignment::Column::StudentId.eq(student.id))
        .exec(&txn)
        .await?;

    student.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}
