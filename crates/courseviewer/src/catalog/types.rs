/// Types for term and course section data
use crate::error::CatalogError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Building value the service uses for fully online sections.
pub const ONLINE_BUILDING: &str = "ONLINE";

/// Section code the service uses when no section is assigned.
pub const SECTION_NOT_AVAILABLE: &str = "N/A";

/// Label of the fallback category.
pub const OTHER_CATEGORY: &str = "Other";

static HHMM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3])([0-5]\d)$").unwrap());

/// An academic term as listed by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub code: String,
    pub description: String,
}

/// One scheduled block of a section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub building: String,

    /// 24-hour `HHMM`, empty when not yet scheduled
    #[serde(
        rename = "meeting_begin_time",
        alias = "begin_time",
        default,
        deserialize_with = "string_or_empty"
    )]
    pub begin_time: String,

    #[serde(
        rename = "meeting_end_time",
        alias = "end_time",
        default,
        deserialize_with = "string_or_empty"
    )]
    pub end_time: String,
}

impl MeetingTime {
    pub fn is_online(&self) -> bool {
        self.building == ONLINE_BUILDING
    }

    /// Returns true if both ends of the block are known.
    pub fn is_scheduled(&self) -> bool {
        HHMM_REGEX.is_match(&self.begin_time) && HHMM_REGEX.is_match(&self.end_time)
    }

    pub fn format_begin(&self) -> String {
        format_clock(&self.begin_time)
    }

    pub fn format_end(&self) -> String {
        format_clock(&self.end_time)
    }
}

/// Renders `HHMM` as `HH:MM`, or `TBD` when empty or malformed.
pub fn format_clock(raw: &str) -> String {
    match HHMM_REGEX.captures(raw) {
        Some(caps) => format!("{}:{}", &caps[1], &caps[2]),
        None => "TBD".to_string(),
    }
}

/// Display bucket for a section.
///
/// `Other` is kept as its own variant so call sites never compare against the
/// literal label. Ordering puts every named category before `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Named(String),
    Other,
}

impl Category {
    /// Picks the first non-blank description, falling back to `Other`.
    pub fn derive(subject_description: Option<&str>, course_description: Option<&str>) -> Self {
        [subject_description, course_description]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(|s| Category::from(s.to_string()))
            .unwrap_or(Category::Other)
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Named(name) => name,
            Category::Other => OTHER_CATEGORY,
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, Category::Other)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        if label == OTHER_CATEGORY {
            Category::Other
        } else {
            Category::Named(label)
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category::from(label.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Named(name) => name,
            Category::Other => OTHER_CATEGORY.to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One offered section of a course, validated and ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Sole identity key, unique within a term
    pub course_id: String,
    pub subject: String,
    pub course_number: Option<String>,
    pub course_name: String,
    pub section: String,
    pub credits: u32,
    pub faculty: Vec<String>,
    pub meeting_times: Vec<MeetingTime>,
    pub category: Category,
}

impl Course {
    /// The representative meeting slot shown in listings.
    pub fn primary_meeting(&self) -> Option<&MeetingTime> {
        self.meeting_times.first()
    }

    /// e.g. `"SE 5770"`
    pub fn display_code(&self) -> String {
        match &self.course_number {
            Some(number) => format!("{} {}", self.subject, number),
            None => self.subject.clone(),
        }
    }

    pub fn section_available(&self) -> bool {
        !self.section.is_empty() && self.section != SECTION_NOT_AVAILABLE
    }
}

/// Course record exactly as the service returns it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCourse {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub course_id: Option<String>,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub course_number: Option<String>,

    #[serde(default)]
    pub course_name: Option<String>,

    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub section: Option<String>,

    #[serde(default, deserialize_with = "opt_credits")]
    pub credits: Option<u32>,

    #[serde(default)]
    pub faculty: Option<Vec<String>>,

    #[serde(default)]
    pub meeting_times: Option<Vec<MeetingTime>>,

    #[serde(default)]
    pub subject_description: Option<String>,

    #[serde(default)]
    pub course_description: Option<String>,
}

impl RawCourse {
    /// Validates the identity key and applies defaults to every other field.
    ///
    /// `index` is the record's position in the payload and is only used for
    /// error reporting.
    pub fn into_course(self, index: usize) -> Result<Course, CatalogError> {
        let course_id = match self.course_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(CatalogError::MalformedRecord {
                    index,
                    reason: "missing course_id".to_string(),
                })
            }
        };

        let category = Category::derive(
            self.subject_description.as_deref(),
            self.course_description.as_deref(),
        );

        Ok(Course {
            course_id,
            subject: self.subject.unwrap_or_default(),
            course_number: self.course_number.filter(|n| !n.is_empty()),
            course_name: self.course_name.unwrap_or_default(),
            section: self
                .section
                .unwrap_or_else(|| SECTION_NOT_AVAILABLE.to_string()),
            credits: self.credits.unwrap_or(0),
            faculty: self.faculty.unwrap_or_default(),
            meeting_times: self.meeting_times.unwrap_or_default(),
            category,
        })
    }
}

/// Scalar the service sends either quoted or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Int(i64),
    Float(f64),
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Str(s)) => Some(s),
        Some(StringOrNumber::Int(n)) => Some(n.to_string()),
        Some(StringOrNumber::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

/// Credits must be a whole number that fits in `u32`; anything else
/// (negative, fractional, out of range, unparsable) is treated as absent.
fn opt_credits<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Int(n)) => u32::try_from(n).ok(),
        Some(StringOrNumber::Float(f)) => whole_credits(f),
        Some(StringOrNumber::Str(s)) => s.trim().parse::<f64>().ok().and_then(whole_credits),
        None => None,
    })
}

fn whole_credits(value: f64) -> Option<u32> {
    if value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
