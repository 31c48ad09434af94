//! Teacher store operations.
//!
//! Classrooms reference teachers weakly: deleting a teacher leaves its classrooms in place
//! with no homeroom teacher.

use crate::{
    entities::{Classroom, Teacher, TeacherStatus, classroom, teacher},
    errors::{Error, Result, unique_violation_as},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Creates an active teacher. Email and employee ID must be unique.
pub async fn create_teacher(
    db: &DatabaseConnection,
    first_name: String,
    last_name: String,
    email: String,
    employee_id: String,
) -> Result<teacher::Model> {
    let first_name = first_name.trim().to_string();
    let last_name = last_name.trim().to_string();
    let email = email.trim().to_string();
    let employee_id = employee_id.trim().to_string();

    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::validation("Teacher name cannot be empty"));
    }
    if email.is_empty() || employee_id.is_empty() {
        return Err(Error::validation(
            "Teacher email and employee ID are required",
        ));
    }

    let now = Utc::now();
    teacher::ActiveModel {
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email.clone()),
        employee_id: Set(employee_id.clone()),
        status: Set(TeacherStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        unique_violation_as(e, || {
            format!("A teacher with email {email} or employee ID {employee_id} already exists")
        })
    })
}

/// Finds a teacher by ID.
pub async fn get_teacher_by_id<C>(db: &C, teacher_id: i64) -> Result<Option<teacher::Model>>
where
    C: ConnectionTrait,
{
    Teacher::find_by_id(teacher_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists teachers with the given status, ordered by last then first name.
pub async fn list_teachers_by_status<C>(
    db: &C,
    status: TeacherStatus,
) -> Result<Vec<teacher::Model>>
where
    C: ConnectionTrait,
{
    Teacher::find()
        .filter(teacher::Column::Status.eq(status))
        .order_by_asc(teacher::Column::LastName)
        .order_by_asc(teacher::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a teacher's employment status.
pub async fn update_teacher_status(
    db: &DatabaseConnection,
    teacher_id: i64,
    status: TeacherStatus,
) -> Result<teacher::Model> {
    let teacher = Teacher::find_by_id(teacher_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("teacher", teacher_id))?;

    let mut active_model: teacher::ActiveModel = teacher.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a teacher and clears the teacher reference on their classrooms.
pub async fn delete_teacher(db: &DatabaseConnection, teacher_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let teacher = Teacher::find_by_id(teacher_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("teacher", teacher_id))?;

    Classroom::update_many()
        .col_expr(classroom::Column::TeacherId, Expr::value(Option::<i64>::None))
        .col_expr(classroom::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(classroom::Column::TeacherId.eq(teacher.id))
        .exec(&txn)
        .await?;

    teacher.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::classroom::get_classroom_by_id;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_teacher_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_teacher(
            &db,
            " ".to_string(),
            "Smith".to_string(),
            "smith@school.test".to_string(),
            "T001".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_teacher(
            &db,
            "Jane".to_string(),
            "Smith".to_string(),
            String::new(),
            "T001".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_employee_id_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_teacher(&db, "T001").await?;

        let result = create_teacher(
            &db,
            "Other".to_string(),
            "Person".to_string(),
            "other@school.test".to_string(),
            "T001".to_string(),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_teachers_by_status() -> Result<()> {
        let db = setup_test_db().await?;
        let active = create_test_teacher(&db, "T001").await?;
        let retired = create_test_teacher(&db, "T002").await?;
        update_teacher_status(&db, retired.id, TeacherStatus::Inactive).await?;

        let listed = list_teachers_by_status(&db, TeacherStatus::Active).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, active.id);

        let listed = list_teachers_by_status(&db, TeacherStatus::Inactive).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, TeacherStatus::Inactive);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_teacher_keeps_classroom() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let teacher = create_test_teacher(&db, "T001").await?;
        let room = crate::core::classroom::create_classroom(
            &db,
            year.id,
            "1A".to_string(),
            "Grade 1".to_string(),
            20,
            Some(teacher.id),
        )
        .await?;
        assert_eq!(room.teacher_id, Some(teacher.id));

        delete_teacher(&db, teacher.id).await?;

        assert!(get_teacher_by_id(&db, teacher.id).await?.is_none());
        let room = get_classroom_by_id(&db, room.id).await?.unwrap();
        assert_eq!(room.teacher_id, None);
        Ok(())
    }
}
