//! Text filters over a catalog

use super::{Catalog, Course};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Filter configuration for course sections
///
/// Every criterion is a plain string; an empty string matches everything.
/// Active criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the subject code
    pub subject: String,
    /// Substring of the course number as sent by the service
    pub course_number: String,
    /// Case-insensitive substring of the course title
    pub title: String,
    /// Accepted from the filter form but not matched against any field yet
    pub attribute: String,
}

impl FilterCriteria {
    /// Create criteria that match every course
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject filter
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the course number filter
    pub fn with_course_number(mut self, course_number: impl Into<String>) -> Self {
        self.course_number = course_number.into();
        self
    }

    /// Set the title filter
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the attribute filter
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Returns true if no criterion that is evaluated has been set.
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.course_number.is_empty() && self.title.is_empty()
    }

    /// Check if a course passes every active criterion
    pub fn matches(&self, course: &Course) -> bool {
        if !self.subject.is_empty() && !contains_ignore_case(&course.subject, &self.subject) {
            return false;
        }

        if !self.course_number.is_empty() {
            match &course.course_number {
                Some(number) if number.contains(&self.course_number) => {}
                _ => return false,
            }
        }

        if !self.title.is_empty() && !contains_ignore_case(&course.course_name, &self.title) {
            return false;
        }

        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Derives the filtered view of `catalog`.
///
/// Categories left with no matching course are omitted. Empty criteria yield
/// a catalog equal to the input.
pub fn filter_catalog(catalog: &Catalog, criteria: &FilterCriteria) -> Catalog {
    if criteria.is_empty() {
        return catalog.clone();
    }

    let groups: HashMap<_, Vec<Course>> = catalog
        .iter()
        .map(|(category, courses)| {
            let kept = courses
                .iter()
                .filter(|course| criteria.matches(course))
                .cloned()
                .collect();
            (category.clone(), kept)
        })
        .collect();

    let filtered = Catalog::from_groups(groups);
    debug!(
        before = catalog.course_count(),
        after = filtered.course_count(),
        categories = filtered.len(),
        "Applied course filters"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::catalog::tests::{raw, sample_records};

    fn two_section_catalog() -> Catalog {
        build_catalog(vec![
            raw("1", "CS", "5000", "Advanced AI", Some("CS")),
            raw("2", "SE", "5770", "Software Architecture", Some("SE")),
        ])
        .unwrap()
    }

    #[test]
    fn test_subject_filter_is_case_insensitive() {
        let filtered = filter_catalog(
            &two_section_catalog(),
            &FilterCriteria::new().with_subject("cs"),
        );

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get_label("CS").unwrap().len(), 1);
        assert!(filtered.get_label("SE").is_none());
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let catalog = build_catalog(sample_records()).unwrap();
        assert_eq!(filter_catalog(&catalog, &FilterCriteria::new()), catalog);
    }

    #[test]
    fn test_attribute_is_not_evaluated() {
        let catalog = two_section_catalog();
        let criteria = FilterCriteria::new().with_attribute("Honors");
        assert!(criteria.is_empty());
        assert_eq!(filter_catalog(&catalog, &criteria), catalog);
    }

    #[test]
    fn test_course_number_substring() {
        let catalog = build_catalog(sample_records()).unwrap();
        let filtered = filter_catalog(&catalog, &FilterCriteria::new().with_course_number("0"));
        assert_eq!(filtered.course_count(), 4);

        let filtered = filter_catalog(&catalog, &FilterCriteria::new().with_course_number("577"));
        assert_eq!(filtered.course_count(), 1);
        assert!(filtered.get_label("Software Engineering").is_some());
    }

    #[test]
    fn test_missing_course_number_does_not_match() {
        let mut record = raw("9", "MTH", "", "Calculus I", Some("Mathematics"));
        record.course_number = None;
        let catalog = build_catalog(vec![record]).unwrap();

        let filtered = filter_catalog(&catalog, &FilterCriteria::new().with_course_number("1"));
        assert!(filtered.is_empty());

        let filtered = filter_catalog(&catalog, &FilterCriteria::new().with_title("calc"));
        assert_eq!(filtered.course_count(), 1);
    }

    #[test]
    fn test_criteria_are_combined_with_and() {
        let catalog = build_catalog(sample_records()).unwrap();
        let criteria = FilterCriteria::new().with_subject("CS").with_title("software");
        assert!(filter_catalog(&catalog, &criteria).is_empty());
    }

    #[test]
    fn test_adding_criteria_never_grows_result() {
        let catalog = build_catalog(sample_records()).unwrap();
        let steps = [
            FilterCriteria::new(),
            FilterCriteria::new().with_subject("c"),
            FilterCriteria::new().with_subject("c").with_course_number("0"),
            FilterCriteria::new()
                .with_subject("c")
                .with_course_number("0")
                .with_title("intro"),
        ];

        let counts: Vec<_> = steps
            .iter()
            .map(|criteria| filter_catalog(&catalog, criteria).course_count())
            .collect();
        assert!(counts.windows(2).all(|pair| pair[1] <= pair[0]));
        assert_eq!(counts.last(), Some(&1));
    }
}
