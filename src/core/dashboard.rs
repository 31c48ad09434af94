//! Dashboard queries - The two standard views plus the composed dashboard.
//!
//! Everything is read inside one transaction so the classroom list, the unassigned list and
//! the totals describe the same snapshot.

use crate::{
    core::{
        academic_year::get_active_academic_year,
        grouping::GradeGroups,
        statistics::{
            ClassroomStatistics, GradeStatistics, YearStatistics, classroom_statistics_for_year,
            compute_grade_statistics, year_statistics,
        },
        student::list_active_students,
    },
    entities::{Gender, StudentAssignment, academic_year, student_assignment},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashSet;

/// An active student without a placement in the year being viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignedStudent {
    /// Student primary key
    pub id: i64,
    /// "First Last"
    pub full_name: String,
    /// External student code
    pub student_id: String,
    /// Gender
    pub gender: Gender,
    /// Age in completed years at evaluation time
    pub age: u32,
    /// Grade label
    pub grade: String,
}

/// Everything the school overview needs for the active year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// The active academic year
    pub active_year: academic_year::Model,
    /// Classrooms of the year with their statistics, by grade
    pub classrooms_by_grade: GradeGroups<ClassroomStatistics>,
    /// Active students without a placement this year, by grade
    pub unassigned_students_by_grade: GradeGroups<UnassignedStudent>,
    /// Year totals
    pub year_statistics: YearStatistics,
    /// Per-grade totals
    pub grade_statistics: Vec<GradeStatistics>,
}

/// Classrooms of an academic year enriched with statistics, grouped by grade.
pub async fn classrooms_by_grade<C>(
    db: &C,
    academic_year_id: i64,
) -> Result<GradeGroups<ClassroomStatistics>>
where
    C: ConnectionTrait,
{
    let stats = classroom_statistics_for_year(db, academic_year_id).await?;
    Ok(GradeGroups::from_items(stats, |c| c.grade.as_str()))
}

/// Active students with no assignment in `academic_year_id`, grouped by grade.
///
/// Ages are evaluated on `today`.
pub async fn unassigned_students_by_grade<C>(
    db: &C,
    academic_year_id: i64,
    today: NaiveDate,
) -> Result<GradeGroups<UnassignedStudent>>
where
    C: ConnectionTrait,
{
    let placed: HashSet<i64> = StudentAssignment::find()
        .select_only()
        .column(student_assignment::Column::StudentId)
        .filter(student_assignment::Column::AcademicYearId.eq(academic_year_id))
        .into_tuple::<i64>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let unassigned = list_active_students(db)
        .await?
        .into_iter()
        .filter(|s| !placed.contains(&s.id))
        .map(|s| {
            let full_name = s.full_name();
            let age = s.age_on(today);
            UnassignedStudent {
                id: s.id,
                full_name,
                student_id: s.student_id,
                gender: s.gender,
                age,
                grade: s.grade,
            }
        });

    Ok(GradeGroups::from_items(unassigned, |u| u.grade.as_str()))
}

/// Builds the dashboard for the active academic year, evaluating ages on `today`.
///
/// # Errors
/// `NoActiveYear` when no academic year is flagged active. This is distinct from a
/// dashboard that simply has no classrooms or students.
pub async fn get_dashboard_as_of(db: &DatabaseConnection, today: NaiveDate) -> Result<Dashboard> {
    let txn = db.begin().await?;

    let active_year = get_active_academic_year(&txn)
        .await?
        .ok_or(Error::NoActiveYear)?;

    let classrooms_by_grade = classrooms_by_grade(&txn, active_year.id).await?;
    let unassigned_students_by_grade =
        unassigned_students_by_grade(&txn, active_year.id, today).await?;
    let year_statistics = year_statistics(&txn, active_year.id).await?;
    let grade_statistics =
        compute_grade_statistics(&classrooms_by_grade, &unassigned_students_by_grade);

    txn.commit().await?;

    Ok(Dashboard {
        active_year,
        classrooms_by_grade,
        unassigned_students_by_grade,
        year_statistics,
        grade_statistics,
    })
}

/// Builds the dashboard for the active academic year as of today (UTC).
pub async fn get_dashboard(db: &DatabaseConnection) -> Result<Dashboard> {
    get_dashboard_as_of(db, Utc::now().date_naive()).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        academic_year::activate_academic_year, assignment::assign_student,
        guard::PlacementGuards, student::update_student_status,
    };
    use crate::entities::StudentStatus;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_no_active_year_is_an_error() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_year(&db, "2024-2025", false).await?;

        let result = get_dashboard(&db).await;
        assert!(matches!(result.unwrap_err(), Error::NoActiveYear));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_active_year_is_an_empty_dashboard() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;

        let dashboard = get_dashboard(&db).await?;
        assert_eq!(dashboard.active_year.id, year.id);
        assert!(dashboard.classrooms_by_grade.is_empty());
        assert!(dashboard.unassigned_students_by_grade.is_empty());
        assert_eq!(dashboard.year_statistics.total_students, 0);
        assert_eq!(dashboard.year_statistics.assignment_percentage, 0.0);
        assert!(dashboard.grade_statistics.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unassigned_students_by_grade() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let last_year = create_test_year(&db, "2023-2024", false).await?;
        let guards = PlacementGuards::new();
        let room = create_test_classroom(&db, year.id, "1A", "Grade 1", 10).await?;
        let old_room = create_test_classroom(&db, last_year.id, "K", "Kindergarten", 10).await?;

        let placed = create_test_student(&db, "S1", Gender::Male, "Grade 1").await?;
        let placed_last_year = create_test_student(&db, "S2", Gender::Female, "Grade 1").await?;
        let second_grader = create_test_student(&db, "S3", Gender::Female, "Grade 2").await?;
        let transferred = create_test_student(&db, "S4", Gender::Male, "Grade 1").await?;
        let waiting = create_test_student(&db, "S5", Gender::Male, "Grade 1").await?;

        assign_student(&db, &guards, placed.id, room.id, 1).await?;
        assign_student(&db, &guards, placed_last_year.id, old_room.id, 1).await?;
        update_student_status(&db, transferred.id, StudentStatus::Transferred).await?;

        let today = date(2024, 10, 1);
        let groups = unassigned_students_by_grade(&db, year.id, today).await?;

        assert_eq!(groups.grades().collect::<Vec<_>>(), vec!["Grade 1", "Grade 2"]);
        let grade_one: Vec<i64> = groups.get("Grade 1").unwrap().iter().map(|u| u.id).collect();
        assert_eq!(grade_one, vec![placed_last_year.id, waiting.id]);

        let second = &groups.get("Grade 2").unwrap()[0];
        assert_eq!(second.id, second_grader.id);
        assert_eq!(second.student_id, "S3");
        assert_eq!(second.full_name, second_grader.full_name());
        assert_eq!(second.gender, Gender::Female);
        assert_eq!(second.age, second_grader.age_on(today));
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_composition() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let guards = PlacementGuards::new();
        let one_a = create_test_classroom(&db, year.id, "1A", "Grade 1", 2).await?;
        let two_a = create_test_classroom(&db, year.id, "2A", "Grade 2", 3).await?;
        let one_b = create_test_classroom(&db, year.id, "1B", "Grade 1", 2).await?;

        let a = create_test_student(&db, "A", Gender::Male, "Grade 1").await?;
        let b = create_test_student(&db, "B", Gender::Female, "Grade 1").await?;
        create_test_student(&db, "C", Gender::Female, "Grade 2").await?;
        assign_student(&db, &guards, a.id, one_a.id, 1).await?;
        assign_student(&db, &guards, b.id, one_b.id, 1).await?;

        let dashboard = get_dashboard_as_of(&db, date(2024, 10, 1)).await?;

        let grade_one: Vec<i64> = dashboard
            .classrooms_by_grade
            .get("Grade 1")
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(grade_one, vec![one_a.id, one_b.id]);
        assert_eq!(dashboard.classrooms_by_grade.get("Grade 2").unwrap()[0].id, two_a.id);

        assert_eq!(dashboard.unassigned_students_by_grade.total_items(), 1);
        assert_eq!(dashboard.year_statistics.total_students, 3);
        assert_eq!(dashboard.year_statistics.total_assigned, 2);
        assert_eq!(dashboard.year_statistics.total_unassigned, 1);
        assert_eq!(dashboard.year_statistics.total_classrooms, 3);
        assert_eq!(dashboard.year_statistics.assignment_percentage, 66.7);

        assert_eq!(dashboard.grade_statistics.len(), 2);
        assert_eq!(dashboard.grade_statistics[0].assigned, 2);
        assert_eq!(dashboard.grade_statistics[0].available_spots, 2);
        assert_eq!(dashboard.grade_statistics[1].unassigned_students, 1);

        // Same state, same dashboard
        let again = get_dashboard_as_of(&db, date(2024, 10, 1)).await?;
        assert_eq!(again, dashboard);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_follows_the_active_year() -> Result<()> {
        let (db, year) = setup_with_active_year().await?;
        let next_year = create_test_year(&db, "2025-2026", false).await?;
        create_test_classroom(&db, year.id, "1A", "Grade 1", 2).await?;
        create_test_classroom(&db, next_year.id, "2A", "Grade 2", 2).await?;

        activate_academic_year(&db, next_year.id).await?;

        let dashboard = get_dashboard(&db).await?;
        assert_eq!(dashboard.active_year.id, next_year.id);
        assert_eq!(dashboard.classrooms_by_grade.grades().collect::<Vec<_>>(), vec!["Grade 2"]);
        Ok(())
    }
}
