//! The student's cart of sections chosen for scheduling.

use crate::catalog::Course;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Ordered set of selected sections, unique by `course_id`.
///
/// Sections are stored as owned copies, so nothing done to the selection is
/// visible in the catalog and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionSet {
    courses: Vec<Course>,
    #[serde(skip)]
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the section if one with the same `course_id` is selected,
    /// otherwise appends a copy of it.
    pub fn toggle(&mut self, course: &Course) -> &Self {
        if self.ids.remove(&course.course_id) {
            self.courses.retain(|c| c.course_id != course.course_id);
            debug!(course_id = %course.course_id, "Removed section from selection");
        } else {
            self.ids.insert(course.course_id.clone());
            self.courses.push(course.clone());
            debug!(course_id = %course.course_id, "Added section to selection");
        }
        self
    }

    /// Keeps only the sections for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Course) -> bool,
    {
        let ids = &mut self.ids;
        self.courses.retain(|course| {
            let kept = keep(course);
            if !kept {
                ids.remove(&course.course_id);
            }
            kept
        });
    }

    /// Empties the selection unconditionally.
    pub fn clear(&mut self) {
        self.courses.clear();
        self.ids.clear();
    }

    pub fn contains(&self, course_id: &str) -> bool {
        self.ids.contains(course_id)
    }

    pub fn get(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    /// Selected sections in the order they were added
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Course> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Sum of credits across the selection, saturating at `u32::MAX`
    pub fn total_credits(&self) -> u32 {
        self.courses
            .iter()
            .map(|c| c.credits)
            .fold(0, u32::saturating_add)
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Course;
    type IntoIter = std::slice::Iter<'a, Course>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
