//! Classroom store operations.
//!
//! A classroom belongs to exactly one academic year and its name is unique within that
//! year. Occupancy is never stored on the row; see `core::statistics`.

use crate::{
    entities::{AcademicYear, Classroom, StudentAssignment, Teacher, classroom, student_assignment},
    errors::{Error, Result, unique_violation_as},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Creates a classroom in `academic_year_id`.
///
/// Name and grade must not be blank, capacity must be positive, and the year (and teacher,
/// when given) must exist.
pub async fn create_classroom(
    db: &DatabaseConnection,
    academic_year_id: i64,
    name: String,
    grade: String,
    capacity: i32,
    teacher_id: Option<i64>,
) -> Result<classroom::Model> {
    let name = name.trim().to_string();
    let grade = grade.trim().to_string();

    if name.is_empty() {
        return Err(Error::validation("Classroom name cannot be empty"));
    }
    if grade.is_empty() {
        return Err(Error::validation("Classroom grade cannot be empty"));
    }
    if capacity <= 0 {
        return Err(Error::validation(format!(
            "Classroom capacity must be positive, got {capacity}"
        )));
    }

    AcademicYear::find_by_id(academic_year_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("academic year", academic_year_id))?;

    if let Some(teacher_id) = teacher_id {
        Teacher::find_by_id(teacher_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("teacher", teacher_id))?;
    }

    let now = Utc::now();
    classroom::ActiveModel {
        academic_year_id: Set(academic_year_id),
        name: Set(name.clone()),
        grade: Set(grade),
        capacity: Set(capacity),
        teacher_id: Set(teacher_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        unique_violation_as(e, || {
            format!("Classroom {name} already exists in academic year {academic_year_id}")
        })
    })
}

/// Finds a classroom by ID.
pub async fn get_classroom_by_id<C>(db: &C, classroom_id: i64) -> Result<Option<classroom::Model>>
where
    C: ConnectionTrait,
{
    Classroom::find_by_id(classroom_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the classrooms of an academic year in insertion order.
pub async fn list_classrooms_for_year<C>(
    db: &C,
    academic_year_id: i64,
) -> Result<Vec<classroom::Model>>
where
    C: ConnectionTrait,
{
    Classroom::find()
        .filter(classroom::Column::AcademicYearId.eq(academic_year_id))
        .order_by_asc(classroom::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the classrooms of one grade within an academic year, in insertion order.
pub async fn list_classrooms_for_year_and_grade<C>(
    db: &C,
    academic_year_id: i64,
    grade: &str,
) -> Result<Vec<classroom::Model>>
where
    C: ConnectionTrait,
{
    Classroom::find()
        .filter(classroom::Column::AcademicYearId.eq(academic_year_id))
        .filter(classroom::Column::Grade.eq(grade))
        .order_by_asc(classroom::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets or clears the homeroom teacher of a classroom.
pub async fn set_classroom_teacher(
    db: &DatabaseConnection,
    classroom_id: i64,
    teacher_id: Option<i64>,
) -> Result<classroom::Model> {
    let classroom = Classroom::find_by_id(classroom_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("classroom", classroom_id))?;

    if let Some(teacher_id) = teacher_id {
        Teacher::find_by_id(teacher_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("teacher", teacher_id))?;
    }

    let mut active_model: classroom::ActiveModel = classroom.into();
    active_model.teacher_id = Set(teacher_id);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a classroom and its assignments.
pub async fn delete_classroom(db: &DatabaseConnection, classroom_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let classroom = Classroom::find_by_id(classroom_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("classroom", classroom_id))?;

    StudentAssignment::delete_many()
        .filter(student_assignment::Column::ClassroomId.eq(classroom.id))
        .exec(&txn)
        .await?;

    classroom.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        assignment::{assign_student, count_assignments_for_classroom},
        guard::PlacementGuards,
    };
    use crate::entities::Gender;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_classroom_validation() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;

        let result =
            create_classroom(&db, year.id, " ".to_string(), "Grade 1".to_string(), 20, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result =
            create_classroom(&db, year.id, "1A".to_string(), "Grade 1".to_string(), 0, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result =
            create_classroom(&db, 999, "1A".to_string(), "Grade 1".to_string(), 20, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "academic year",
                id: 999
            }
        ));

        let result = create_classroom(
            &db,
            year.id,
            "1A".to_string(),
            "Grade 1".to_string(),
            20,
            Some(42),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "teacher",
                id: 42
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_classroom_name_unique_within_year() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let next_year = create_test_year(&db, "2025-2026", false).await?;

        create_test_classroom(&db, year.id, "1A", "Grade 1", 20).await?;

        let duplicate = create_test_classroom(&db, year.id, "1A", "Grade 1", 20).await;
        assert!(matches!(duplicate.unwrap_err(), Error::Validation { message: _ }));

        // Same name in another year is fine
        let other = create_test_classroom(&db, next_year.id, "1A", "Grade 1", 20).await?;
        assert_eq!(other.academic_year_id, next_year.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_classrooms_filters() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let next_year = create_test_year(&db, "2025-2026", false).await?;

        let a = create_test_classroom(&db, year.id, "1A", "Grade 1", 20).await?;
        let b = create_test_classroom(&db, year.id, "2A", "Grade 2", 20).await?;
        let c = create_test_classroom(&db, year.id, "1B", "Grade 1", 20).await?;
        create_test_classroom(&db, next_year.id, "1A", "Grade 1", 20).await?;

        let all = list_classrooms_for_year(&db, year.id).await?;
        assert_eq!(
            all.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![a.id, b.id, c.id]
        );

        let grade_one = list_classrooms_for_year_and_grade(&db, year.id, "Grade 1").await?;
        assert_eq!(
            grade_one.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![a.id, c.id]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_set_classroom_teacher() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let room = create_test_classroom(&db, year.id, "1A", "Grade 1", 20).await?;
        let teacher = create_test_teacher(&db, "T001").await?;

        let room = set_classroom_teacher(&db, room.id, Some(teacher.id)).await?;
        assert_eq!(room.teacher_id, Some(teacher.id));

        let room = set_classroom_teacher(&db, room.id, None).await?;
        assert_eq!(room.teacher_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_classroom_cascades_to_assignments() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let room = create_test_classroom(&db, year.id, "1A", "Grade 1", 20).await?;
        let student = create_test_student(&db, "S1", Gender::Female, "Grade 1").await?;
        assign_student(&db, &PlacementGuards::new(), student.id, room.id, 1).await?;
        assert_eq!(count_assignments_for_classroom(&db, room.id).await?, 1);

        delete_classroom(&db, room.id).await?;

        assert!(get_classroom_by_id(&db, room.id).await?.is_none());
        assert_eq!(count_assignments_for_classroom(&db, room.id).await?, 0);
        assert!(
            crate::core::student::get_student_by_id(&db, student.id)
                .await?
                .is_some()
        );
        Ok(())
    }
}
