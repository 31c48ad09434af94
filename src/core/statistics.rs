//! Statistics aggregation over the current assignment state.
//!
//! Nothing here is cached: every figure is folded from the raw `classrooms`,
//! `student_assignments` and `students` rows at read time, so the numbers cannot drift from
//! the rows they describe. Ratios are percentages rounded to one decimal and are `0.0`
//! whenever their denominator is zero.

use crate::{
    core::{
        assignment::count_assignments_for_year, classroom::list_classrooms_for_year,
        grouping::GradeGroups, student::count_active_students,
    },
    entities::{
        Classroom, Gender, Student, StudentAssignment, Teacher, classroom, student,
        student_assignment, teacher,
    },
    errors::Result,
};
use sea_orm::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

const UNASSIGNED_TEACHER: &str = "Unassigned";

/// Occupancy and gender split of one classroom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassroomStatistics {
    /// Classroom ID
    pub id: i64,
    /// Classroom name
    pub name: String,
    /// Grade label
    pub grade: String,
    /// Configured capacity
    pub capacity: i32,
    /// Homeroom teacher's full name, or "Unassigned"
    pub teacher_name: String,
    /// Number of assignments referencing the classroom
    pub current_count: i64,
    /// `max(0, capacity - current_count)`
    pub available_spots: i64,
    /// Assigned male students
    pub male_count: i64,
    /// Assigned female students
    pub female_count: i64,
    /// Share of assigned students who are male, in percent
    pub gender_balance: f64,
    /// Share of capacity that is occupied, in percent
    pub fill_rate: f64,
}

/// Totals for one academic year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStatistics {
    /// Active students, regardless of placement
    pub total_students: i64,
    /// Assignments recorded against the year
    pub total_assigned: i64,
    /// `total_students - total_assigned`
    pub total_unassigned: i64,
    /// Classrooms of the year
    pub total_classrooms: i64,
    /// Share of active students that are assigned, in percent
    pub assignment_percentage: f64,
}

/// Totals for one grade within an academic year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeStatistics {
    /// Grade label
    pub grade: String,
    /// Classrooms of this grade
    pub classroom_count: i64,
    /// Sum of their capacities
    pub total_capacity: i64,
    /// Students assigned to those classrooms
    pub assigned: i64,
    /// Sum of their available spots
    pub available_spots: i64,
    /// Assigned male students
    pub male_count: i64,
    /// Assigned female students
    pub female_count: i64,
    /// Active students of this grade without a placement
    pub unassigned_students: i64,
}

/// Rounds to one decimal place, halves away from zero.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole` as a percentage with one decimal, or `0.0` when `whole` is not positive.
#[must_use]
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    // Cast safety: school-sized counts are far below 2^52.
    #[allow(clippy::cast_precision_loss)]
    let ratio = part as f64 / whole as f64;
    round_one_decimal(ratio * 100.0)
}

/// Folds one classroom and its placements into statistics.
///
/// `placements` holds one entry per assignment referencing the classroom, carrying the
/// assigned student's gender when the student row could be joined.
#[must_use]
pub fn compute_classroom_statistics(
    classroom: &classroom::Model,
    teacher: Option<&teacher::Model>,
    placements: &[Option<Gender>],
) -> ClassroomStatistics {
    let count_of = |gender: Gender| {
        let n = placements.iter().filter(|g| **g == Some(gender)).count();
        i64::try_from(n).unwrap_or(i64::MAX)
    };
    let current_count = i64::try_from(placements.len()).unwrap_or(i64::MAX);
    let male_count = count_of(Gender::Male);
    let capacity = i64::from(classroom.capacity);

    ClassroomStatistics {
        id: classroom.id,
        name: classroom.name.clone(),
        grade: classroom.grade.clone(),
        capacity: classroom.capacity,
        teacher_name: teacher
            .map_or_else(|| UNASSIGNED_TEACHER.to_string(), teacher::Model::full_name),
        current_count,
        available_spots: (capacity - current_count).max(0),
        male_count,
        female_count: count_of(Gender::Female),
        gender_balance: percentage(male_count, current_count),
        fill_rate: percentage(current_count, capacity),
    }
}

/// Year-level totals from already-counted figures.
#[must_use]
pub fn compute_year_statistics(
    total_students: i64,
    total_assigned: i64,
    total_classrooms: i64,
) -> YearStatistics {
    YearStatistics {
        total_students,
        total_assigned,
        total_unassigned: total_students - total_assigned,
        total_classrooms,
        assignment_percentage: percentage(total_assigned, total_students),
    }
}

/// Per-grade totals. Grades follow the classroom grouping, followed by grades that only
/// have unassigned students.
#[must_use]
pub fn compute_grade_statistics<U>(
    classrooms: &GradeGroups<ClassroomStatistics>,
    unassigned: &GradeGroups<U>,
) -> Vec<GradeStatistics> {
    let unassigned_in = |grade: &str| {
        unassigned
            .get(grade)
            .map_or(0, |items| i64::try_from(items.len()).unwrap_or(i64::MAX))
    };

    let mut grades: Vec<GradeStatistics> = classrooms
        .iter()
        .map(|group| GradeStatistics {
            grade: group.grade.clone(),
            classroom_count: i64::try_from(group.items.len()).unwrap_or(i64::MAX),
            total_capacity: group.items.iter().map(|c| i64::from(c.capacity)).sum(),
            assigned: group.items.iter().map(|c| c.current_count).sum(),
            available_spots: group.items.iter().map(|c| c.available_spots).sum(),
            male_count: group.items.iter().map(|c| c.male_count).sum(),
            female_count: group.items.iter().map(|c| c.female_count).sum(),
            unassigned_students: unassigned_in(&group.grade),
        })
        .collect();

    for grade in unassigned.grades() {
        if classrooms.get(grade).is_none() {
            grades.push(GradeStatistics {
                grade: grade.to_string(),
                classroom_count: 0,
                total_capacity: 0,
                assigned: 0,
                available_spots: 0,
                male_count: 0,
                female_count: 0,
                unassigned_students: unassigned_in(grade),
            });
        }
    }

    grades
}

/// Statistics for every classroom of an academic year, in insertion order.
pub async fn classroom_statistics_for_year<C>(
    db: &C,
    academic_year_id: i64,
) -> Result<Vec<ClassroomStatistics>>
where
    C: ConnectionTrait,
{
    let classrooms = list_classrooms_for_year(db, academic_year_id).await?;
    let classroom_ids: Vec<i64> = classrooms.iter().map(|c| c.id).collect();

    let teacher_ids: Vec<i64> = classrooms.iter().filter_map(|c| c.teacher_id).collect();
    let teachers: HashMap<i64, teacher::Model> = Teacher::find()
        .filter(teacher::Column::Id.is_in(teacher_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let placements: Vec<(student_assignment::Model, Option<student::Model>)> =
        StudentAssignment::find()
            .filter(student_assignment::Column::ClassroomId.is_in(classroom_ids))
            .find_also_related(Student)
            .all(db)
            .await?;

    let mut genders_by_classroom: HashMap<i64, Vec<Option<Gender>>> = HashMap::new();
    for (assignment, student) in placements {
        genders_by_classroom
            .entry(assignment.classroom_id)
            .or_default()
            .push(student.map(|s| s.gender));
    }

    Ok(classrooms
        .iter()
        .map(|classroom| {
            let teacher = classroom.teacher_id.and_then(|id| teachers.get(&id));
            let genders = genders_by_classroom
                .get(&classroom.id)
                .map_or(&[][..], Vec::as_slice);
            compute_classroom_statistics(classroom, teacher, genders)
        })
        .collect())
}

/// Year totals for an academic year.
pub async fn year_statistics<C>(db: &C, academic_year_id: i64) -> Result<YearStatistics>
where
    C: ConnectionTrait,
{
    let total_students = count_active_students(db).await?;
    let total_assigned = count_assignments_for_year(db, academic_year_id).await?;
    let total_classrooms = Classroom::find()
        .filter(classroom::Column::AcademicYearId.eq(academic_year_id))
        .count(db)
        .await?;

    Ok(compute_year_statistics(
        i64::try_from(total_students).unwrap_or(i64::MAX),
        i64::try_from(total_assigned).unwrap_or(i64::MAX),
        i64::try_from(total_classrooms).unwrap_or(i64::MAX),
    ))
}
