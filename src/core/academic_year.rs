//! Academic year store operations.
//!
//! At most one academic year is active at a time. Creating an active year or activating an
//! existing one clears the flag on every other year inside the same transaction.

use crate::{
    entities::{
        AcademicYear, Classroom, StudentAssignment, academic_year, classroom, student_assignment,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Clears `is_active` on every year except `keep_id`.
async fn deactivate_other_years<C>(db: &C, keep_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut update = AcademicYear::update_many()
        .col_expr(academic_year::Column::IsActive, Expr::value(false))
        .col_expr(academic_year::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(academic_year::Column::IsActive.eq(true));
    if let Some(id) = keep_id {
        update = update.filter(academic_year::Column::Id.ne(id));
    }
    update.exec(db).await?;
    Ok(())
}

/// Creates an academic year. When `is_active` is true every other year is deactivated.
///
/// The name must not be blank and `end_date` must not precede `start_date`.
pub async fn create_academic_year(
    db: &DatabaseConnection,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_active: bool,
) -> Result<academic_year::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::validation("Academic year name cannot be empty"));
    }
    if end_date < start_date {
        return Err(Error::validation(format!(
            "Academic year {name} ends ({end_date}) before it starts ({start_date})"
        )));
    }

    let txn = db.begin().await?;

    if is_active {
        deactivate_other_years(&txn, None).await?;
    }

    let now = Utc::now();
    let year = academic_year::ActiveModel {
        name: Set(name),
        start_date: Set(start_date),
        end_date: Set(end_date),
        is_active: Set(is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(year)
}

/// Finds an academic year by its ID.
pub async fn get_academic_year_by_id<C>(
    db: &C,
    academic_year_id: i64,
) -> Result<Option<academic_year::Model>>
where
    C: ConnectionTrait,
{
    AcademicYear::find_by_id(academic_year_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the active academic year, if any.
///
/// Should several rows carry the flag (data written before the single-active rule), the
/// lowest id wins.
pub async fn get_active_academic_year<C>(db: &C) -> Result<Option<academic_year::Model>>
where
    C: ConnectionTrait,
{
    AcademicYear::find()
        .filter(academic_year::Column::IsActive.eq(true))
        .order_by_asc(academic_year::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every academic year, oldest first.
pub async fn list_academic_years<C>(db: &C) -> Result<Vec<academic_year::Model>>
where
    C: ConnectionTrait,
{
    AcademicYear::find()
        .order_by_asc(academic_year::Column::StartDate)
        .order_by_asc(academic_year::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Makes `academic_year_id` the only active year.
pub async fn activate_academic_year(
    db: &DatabaseConnection,
    academic_year_id: i64,
) -> Result<academic_year::Model> {
    let txn = db.begin().await?;

    let year = AcademicYear::find_by_id(academic_year_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("academic year", academic_year_id))?;

    deactivate_other_years(&txn, Some(academic_year_id)).await?;

    let year = if year.is_active {
        year
    } else {
        let mut active_model: academic_year::ActiveModel = year.into();
        active_model.is_active = Set(true);
        active_model.updated_at = Set(Utc::now());
        active_model.update(&txn).await?
    };

    txn.commit().await?;
    Ok(year)
}

/// Deletes an academic year together with its classrooms and every assignment that
/// references the year or one of its classrooms.
pub async fn delete_academic_year(db: &DatabaseConnection, academic_year_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let year = AcademicYear::find_by_id(academic_year_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("academic year", academic_year_id))?;

    let classroom_ids: Vec<i64> = Classroom::find()
        .filter(classroom::Column::AcademicYearId.eq(year.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();

    StudentAssignment::delete_many()
        .filter(
            student_assignment::Column::AcademicYearId
                .eq(year.id)
                .or(student_assignment::Column::ClassroomId.is_in(classroom_ids)),
        )
        .exec(&txn)
        .await?;

    Classroom::delete_many()
        .filter(classroom::Column::AcademicYearId.eq(year.id))
        .exec(&txn)
        .await?;

    year.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}
