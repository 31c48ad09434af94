//! Plain-text rendering of dashboards for the command line.

use crate::core::{
    dashboard::{Dashboard, UnassignedStudent},
    statistics::{ClassroomStatistics, GradeStatistics},
};
use std::fmt::Write;

/// Formats a percentage with one decimal, like `66.7%`.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Generates a fill bar string for a classroom.
///
/// Creates a text-based bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `fill_rate` - Occupied share of capacity, in percent
/// * `bar_length` - Length of the bar in characters (default 10)
#[must_use]
pub fn format_fill_bar(fill_rate: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped = fill_rate.clamp(0.0, 100.0);

    // clamped is in [0, 100] and length is small, so the product fits in usize.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(empty),
        format_percentage(fill_rate)
    )
}

/// Gender split of assigned students, like `3M / 1F`.
#[must_use]
pub fn format_gender_split(male_count: i64, female_count: i64) -> String {
    format!("{male_count}M / {female_count}F")
}

/// One line per classroom: name, teacher, occupancy, bar and gender split.
#[must_use]
pub fn format_classroom_line(classroom: &ClassroomStatistics) -> String {
    format!(
        "{} ({}) {}/{} {} | {} | {} free",
        classroom.name,
        classroom.teacher_name,
        classroom.current_count,
        classroom.capacity,
        format_fill_bar(classroom.fill_rate, None),
        format_gender_split(classroom.male_count, classroom.female_count),
        classroom.available_spots
    )
}

/// One line per waiting student.
#[must_use]
pub fn format_unassigned_line(student: &UnassignedStudent) -> String {
    format!(
        "{} [{}] {}, age {}",
        student.full_name,
        student.student_id,
        student.gender.as_str(),
        student.age
    )
}

fn format_grade_line(grade: &GradeStatistics) -> String {
    format!(
        "{}: {} classroom(s), {}/{} placed, {} free, {} waiting",
        grade.grade,
        grade.classroom_count,
        grade.assigned,
        grade.total_capacity,
        grade.available_spots,
        grade.unassigned_students
    )
}

/// Renders the whole dashboard as plain text.
#[must_use]
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let year = &dashboard.active_year;
    let totals = &dashboard.year_statistics;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Academic year {} ({} to {})",
        year.name, year.start_date, year.end_date
    );
    let _ = writeln!(
        out,
        "{} students, {} assigned, {} unassigned, {} classrooms, {} placed",
        totals.total_students,
        totals.total_assigned,
        totals.total_unassigned,
        totals.total_classrooms,
        format_percentage(totals.assignment_percentage)
    );

    for grade in &dashboard.grade_statistics {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", format_grade_line(grade));

        if let Some(classrooms) = dashboard.classrooms_by_grade.get(&grade.grade) {
            for classroom in classrooms {
                let _ = writeln!(out, "  {}", format_classroom_line(classroom));
            }
        }
        if let Some(waiting) = dashboard.unassigned_students_by_grade.get(&grade.grade) {
            let _ = writeln!(out, "  Unassigned:");
            for student in waiting {
                let _ = writeln!(out, "    {}", format_unassigned_line(student));
            }
        }
    }

    out
}
