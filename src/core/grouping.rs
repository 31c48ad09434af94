//! Grade partitioning for presentation.
//!
//! Grades keep the order in which they were first seen and items keep insertion order
//! within their grade, unless a caller re-sorts them.

use serde::Serialize;
use std::cmp::Ordering;

/// Items of one grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeGroup<T> {
    /// Grade label shared by every item
    pub grade: String,
    /// Items in insertion order
    pub items: Vec<T>,
}

/// Items partitioned by grade label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GradeGroups<T> {
    groups: Vec<GradeGroup<T>>,
}

impl<T> Default for GradeGroups<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> GradeGroups<T> {
    /// Partitions `items` by the grade returned from `grade_of`.
    pub fn from_items<I, F>(items: I, grade_of: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> &str,
    {
        let mut grouped = Self::default();
        for item in items {
            grouped.push(grade_of(&item).to_string(), item);
        }
        grouped
    }

    /// Appends an item to its grade, opening the grade at the end if it is new.
    pub fn push(&mut self, grade: String, item: T) {
        match self.groups.iter_mut().find(|g| g.grade == grade) {
            Some(group) => group.items.push(item),
            None => self.groups.push(GradeGroup {
                grade,
                items: vec![item],
            }),
        }
    }

    /// Items of one grade, if the grade is present.
    #[must_use]
    pub fn get(&self, grade: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|g| g.grade == grade)
            .map(|g| g.items.as_slice())
    }

    /// Grade labels in group order.
    pub fn grades(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.grade.as_str())
    }

    /// Iterates over the groups.
    pub fn iter(&self) -> std::slice::Iter<'_, GradeGroup<T>> {
        self.groups.iter()
    }

    /// Number of grades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there are no items at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of items across every grade.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Reorders the grades.
    pub fn sort_grades_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.groups.sort_by(|a, b| compare(&a.grade, &b.grade));
    }

    /// Reorders the items inside every grade. The sort is stable.
    pub fn sort_items_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        for group in &mut self.groups {
            group.items.sort_by(&mut compare);
        }
    }
}

impl<'a, T> IntoIterator for &'a GradeGroups<T> {
    type Item = &'a GradeGroup<T>;
    type IntoIter = std::slice::Iter<'a, GradeGroup<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
