use std::fmt;

use serde::{Deserialize, Serialize};

/// The three course categories the remote store knows about. Every remote
/// route is addressed by type, so a record whose type is unknown must have
/// one inferred before it can be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Blended,
    Live,
    Free,
}

impl CourseType {
    /// Lookup order for per-type fallbacks.
    pub const ALL: [CourseType; 3] = [CourseType::Blended, CourseType::Live, CourseType::Free];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseType::Blended => "blended",
            CourseType::Live => "live",
            CourseType::Free => "free",
        }
    }

    pub fn parse(value: &str) -> Option<CourseType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blended" => Some(CourseType::Blended),
            "live" => Some(CourseType::Live),
            "free" => Some(CourseType::Free),
            _ => None,
        }
    }
}

impl fmt::Display for CourseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub course_type: CourseType,
    pub title: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

/// The (type, id) pair every remote call is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub course_type: CourseType,
    pub course_id: String,
}

impl CourseRef {
    pub fn new(course_type: CourseType, course_id: impl Into<String>) -> Self {
        Self {
            course_type,
            course_id: course_id.into(),
        }
    }
}

impl From<&Course> for CourseRef {
    fn from(course: &Course) -> Self {
        CourseRef::new(course.course_type, course.id.clone())
    }
}
