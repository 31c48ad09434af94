//! Assignment engine - Places students into classrooms for an academic year.
//!
//! Two invariants hold for every classroom and every (student, academic year) pair:
//! - the number of assignments referencing a classroom never exceeds its capacity;
//! - a student holds at most one assignment per academic year.
//!
//! Both checks are read-then-write sequences. `assign_student` runs them under the
//! classroom guard, the (student, year) guard and the write slot from [`PlacementGuards`],
//! inside one database transaction. The unique index on `(student_id, academic_year_id)` backstops the
//! second invariant against writers outside this process. Counts are always derived from
//! `student_assignments`; neither the student nor the classroom row is modified.

use crate::{
    core::guard::PlacementGuards,
    entities::{Classroom, Student, StudentAssignment, student_assignment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};

/// Finds the assignment of a student for one academic year.
pub async fn get_assignment_for_student_in_year<C>(
    db: &C,
    student_id: i64,
    academic_year_id: i64,
) -> Result<Option<student_assignment::Model>>
where
    C: ConnectionTrait,
{
    StudentAssignment::find()
        .filter(student_assignment::Column::StudentId.eq(student_id))
        .filter(student_assignment::Column::AcademicYearId.eq(academic_year_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the assignments of a classroom, oldest first.
pub async fn list_assignments_for_classroom<C>(
    db: &C,
    classroom_id: i64,
) -> Result<Vec<student_assignment::Model>>
where
    C: ConnectionTrait,
{
    StudentAssignment::find()
        .filter(student_assignment::Column::ClassroomId.eq(classroom_id))
        .order_by_asc(student_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every assignment recorded against an academic year, oldest first.
pub async fn list_assignments_for_year<C>(
    db: &C,
    academic_year_id: i64,
) -> Result<Vec<student_assignment::Model>>
where
    C: ConnectionTrait,
{
    StudentAssignment::find()
        .filter(student_assignment::Column::AcademicYearId.eq(academic_year_id))
        .order_by_asc(student_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts the assignments referencing a classroom.
pub async fn count_assignments_for_classroom<C>(db: &C, classroom_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    StudentAssignment::find()
        .filter(student_assignment::Column::ClassroomId.eq(classroom_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Counts the assignments recorded against an academic year.
pub async fn count_assignments_for_year<C>(db: &C, academic_year_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    StudentAssignment::find()
        .filter(student_assignment::Column::AcademicYearId.eq(academic_year_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Assigns a student to a classroom for the classroom's academic year.
///
/// # Errors
/// - `NotFound` if the classroom or the student does not exist
/// - `CapacityExceeded` if the classroom already holds `capacity` assignments
/// - `AlreadyAssigned` if the student is already placed in that academic year
/// - `TransientStoreFailure` if the database is busy; the call may be retried as is
pub async fn assign_student(
    db: &DatabaseConnection,
    guards: &PlacementGuards,
    student_id: i64,
    classroom_id: i64,
    assigned_by: i64,
) -> Result<student_assignment::Model> {
    let _classroom_guard = guards.lock_classroom(classroom_id).await;

    let academic_year_id = Classroom::find_by_id(classroom_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("classroom", classroom_id))?
        .academic_year_id;

    let _student_guard = guards.lock_student_year(student_id, academic_year_id).await;
    let _writer = guards.lock_writer().await;

    let txn = db.begin().await?;

    // Re-read under the guards: the classroom may have been deleted in between.
    let classroom = Classroom::find_by_id(classroom_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("classroom", classroom_id))?;
    let student = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("student", student_id))?;

    let current_count = count_assignments_for_classroom(&txn, classroom.id).await?;
    let capacity = u64::try_from(classroom.capacity).unwrap_or(0);
    if current_count >= capacity {
        return Err(Error::CapacityExceeded {
            classroom: classroom.name,
            capacity: classroom.capacity,
        });
    }

    if get_assignment_for_student_in_year(&txn, student.id, classroom.academic_year_id)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyAssigned {
            student_id: student.id,
            academic_year_id: classroom.academic_year_id,
        });
    }

    let now = Utc::now();
    let assignment = student_assignment::ActiveModel {
        student_id: Set(student.id),
        classroom_id: Set(classroom.id),
        academic_year_id: Set(classroom.academic_year_id),
        assigned_at: Set(now),
        assigned_by: Set(assigned_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::AlreadyAssigned {
            student_id: student.id,
            academic_year_id: classroom.academic_year_id,
        },
        _ => Error::from(e),
    })?;

    txn.commit().await?;
    Ok(assignment)
}

/// Removes a student's placement for an academic year and returns the removed row.
///
/// Takes the same guards as [`assign_student`], so it never interleaves with a placement
/// into the same classroom or of the same student. The classroom is looked up before its
/// guard can be taken; if the placement moved in between, the lookup is repeated.
pub async fn unassign_student(
    db: &DatabaseConnection,
    guards: &PlacementGuards,
    student_id: i64,
    academic_year_id: i64,
) -> Result<student_assignment::Model> {
    let not_found = || Error::not_found("assignment for student", student_id);

    loop {
        let classroom_id = get_assignment_for_student_in_year(db, student_id, academic_year_id)
            .await?
            .ok_or_else(not_found)?
            .classroom_id;

        let _classroom_guard = guards.lock_classroom(classroom_id).await;
        let _student_guard = guards.lock_student_year(student_id, academic_year_id).await;
        let _writer = guards.lock_writer().await;

        let txn = db.begin().await?;

        let assignment = get_assignment_for_student_in_year(&txn, student_id, academic_year_id)
            .await?
            .ok_or_else(not_found)?;
        if assignment.classroom_id != classroom_id {
            txn.rollback().await?;
            continue;
        }
        assignment.clone().delete(&txn).await?;

        txn.commit().await?;
        return Ok(assignment);
    }
}
