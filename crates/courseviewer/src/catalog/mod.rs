//! Course catalog model: grouping of flat section records into categories.

pub mod filter;
mod types;

pub use filter::{filter_catalog, FilterCriteria};
pub use types::*;

use crate::error::CatalogError;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Sections grouped by category.
///
/// Every category holds at least one course and every course appears in
/// exactly one category. Key order carries no meaning; use
/// [`Catalog::sorted_categories`] for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<Category, Vec<Course>>")]
pub struct Catalog {
    groups: HashMap<Category, Vec<Course>>,
}

impl From<HashMap<Category, Vec<Course>>> for Catalog {
    fn from(groups: HashMap<Category, Vec<Course>>) -> Self {
        Catalog::from_groups(groups)
    }
}

impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.groups.serialize(serializer)
    }
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already-grouped courses, dropping any empty category.
    pub(crate) fn from_groups(mut groups: HashMap<Category, Vec<Course>>) -> Self {
        groups.retain(|_, courses| !courses.is_empty());
        Self { groups }
    }

    /// Gets the courses of a category
    pub fn get(&self, category: &Category) -> Option<&[Course]> {
        self.groups.get(category).map(Vec::as_slice)
    }

    /// Gets the courses of a category by its display label
    pub fn get_label(&self, label: &str) -> Option<&[Course]> {
        self.get(&Category::from(label))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, &[Course])> {
        self.groups
            .iter()
            .map(|(category, courses)| (category, courses.as_slice()))
    }

    /// Categories in display order: alphabetical, with `Other` last.
    pub fn sorted_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<_> = self.groups.keys().collect();
        categories.sort();
        categories
    }

    /// All courses, category by category.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.groups.values().flatten()
    }

    /// Looks up a section by its identity key
    pub fn find(&self, course_id: &str) -> Option<&Course> {
        self.courses().find(|course| course.course_id == course_id)
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of sections across all categories
    pub fn course_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Groups the service's flat section list into a [`Catalog`].
///
/// Relative order of records within each category follows the input. Fails
/// with [`CatalogError::MalformedRecord`] on the first record that has no
/// `course_id` or repeats one seen earlier; nothing is dropped or invented.
pub fn build_catalog<I>(records: I) -> Result<Catalog, CatalogError>
where
    I: IntoIterator<Item = RawCourse>,
{
    let mut groups: HashMap<Category, Vec<Course>> = HashMap::new();
    let mut seen_ids = HashSet::new();
    let mut total = 0usize;

    for (index, raw) in records.into_iter().enumerate() {
        let course = raw.into_course(index)?;

        if !seen_ids.insert(course.course_id.clone()) {
            return Err(CatalogError::MalformedRecord {
                index,
                reason: format!("duplicate course_id {}", course.course_id),
            });
        }

        debug!(
            course_id = %course.course_id,
            category = %course.category,
            "Grouping section"
        );
        groups
            .entry(course.category.clone())
            .or_default()
            .push(course);
        total += 1;
    }

    info!(
        sections = total,
        categories = groups.len(),
        "Built course catalog"
    );

    Ok(Catalog::from_groups(groups))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a wire record for tests.
    pub(crate) fn raw(
        id: &str,
        subject: &str,
        number: &str,
        name: &str,
        category: Option<&str>,
    ) -> RawCourse {
        RawCourse {
            course_id: Some(id.to_string()),
            subject: Some(subject.to_string()),
            course_number: Some(number.to_string()),
            course_name: Some(name.to_string()),
            subject_description: category.map(str::to_string),
            ..Default::default()
        }
    }

    pub(crate) fn sample_records() -> Vec<RawCourse> {
        vec![
            raw("1", "CS", "5000", "Advanced AI", Some("Computer Science")),
            raw("2", "SE", "5770", "Software Architecture", Some("Software Engineering")),
            raw("3", "CS", "1050", "Intro to Programming", Some("Computer Science")),
            raw("4", "GEN", "1000", "First Year Seminar", None),
        ]
    }

    #[test]
    fn test_grouping_completeness() {
        let records = sample_records();
        let catalog = build_catalog(records.clone()).unwrap();

        let mut grouped: Vec<_> = catalog.courses().map(|c| c.course_id.clone()).collect();
        grouped.sort();
        let mut input: Vec<_> = records.into_iter().filter_map(|r| r.course_id).collect();
        input.sort();

        assert_eq!(grouped, input);
        assert_eq!(catalog.course_count(), 4);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_grouping_is_stable() {
        let catalog = build_catalog(sample_records()).unwrap();
        let cs: Vec<_> = catalog
            .get_label("Computer Science")
            .unwrap()
            .iter()
            .map(|c| c.course_id.as_str())
            .collect();
        assert_eq!(cs, vec!["1", "3"]);

        assert_eq!(catalog, build_catalog(sample_records()).unwrap());
    }

    #[test]
    fn test_missing_category_goes_to_other() {
        let catalog = build_catalog(sample_records()).unwrap();
        let other = catalog.get(&Category::Other).unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].subject, "GEN");
        assert_eq!(catalog.sorted_categories().last(), Some(&&Category::Other));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let mut records = sample_records();
        records[2].course_id = None;

        let err = build_catalog(records).unwrap_err();
        assert_eq!(
            err,
            CatalogError::MalformedRecord {
                index: 2,
                reason: "missing course_id".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut records = sample_records();
        records.push(raw("2", "SE", "5770", "Software Architecture", None));

        assert!(matches!(
            build_catalog(records),
            Err(CatalogError::MalformedRecord { index: 4, .. })
        ));
    }

    #[test]
    fn test_empty_input_builds_empty_catalog() {
        let catalog = build_catalog(Vec::<RawCourse>::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.course_count(), 0);
    }

    #[test]
    fn test_serializes_as_label_map() {
        let catalog = build_catalog(sample_records()).unwrap();
        let value = serde_json::to_value(&catalog).unwrap();
        assert!(value.get("Software Engineering").is_some());
        assert!(value.get("Other").is_some());

        let back: Catalog = serde_json::from_value(value).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_deserialize_drops_empty_categories() {
        let catalog: Catalog = serde_json::from_value(serde_json::json!({
            "Computer Science": [],
            "Other": [{
                "course_id": "4",
                "subject": "GEN",
                "course_number": "1000",
                "course_name": "First Year Seminar",
                "section": "01",
                "credits": 3,
                "faculty": [],
                "meeting_times": [],
                "category": "Other"
            }]
        }))
        .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get_label("Computer Science").is_none());
        assert_eq!(catalog.course_count(), 1);
        assert_eq!(catalog.sorted_categories(), vec![&Category::Other]);
    }
}
