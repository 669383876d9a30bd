//! Wire shapes for the remote store. Remote records arrive with
//! inconsistent field names depending on which process wrote them, so every
//! field here is optional/aliased and nothing past this module sees a raw
//! record.

use serde::{Deserialize, Serialize};

use crate::models::{
    ContentType, Course, CourseType, CurriculumWeek, Lesson, LiveClass, Section, SyncState, temp_id,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawCourse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<RawCourse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCourse {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "courseType", alias = "type")]
    pub course_type: Option<String>,
    #[serde(default, alias = "categoryType")]
    pub category_type: Option<String>,
    #[serde(default, alias = "classType")]
    pub class_type: Option<String>,
    #[serde(default, alias = "isFree")]
    pub is_free: Option<bool>,
    #[serde(default, alias = "courseTitle")]
    pub course_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "courseImage")]
    pub course_image: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, alias = "courseFee")]
    pub course_fee: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Deterministic type inference for records that carry no usable explicit
/// type. Precedence: explicit type field, free/paid category flags,
/// class-type substring match, price, then `blended`.
pub fn infer_course_type(raw: &RawCourse) -> CourseType {
    if let Some(explicit) = raw.course_type.as_deref().and_then(CourseType::parse) {
        return explicit;
    }

    if raw.is_free == Some(true) {
        return CourseType::Free;
    }
    if let Some(flag) = raw.category_type.as_deref() {
        if flag.eq_ignore_ascii_case("free") {
            return CourseType::Free;
        }
    }

    for field in [
        raw.class_type.as_deref(),
        raw.category_type.as_deref(),
        raw.category.as_deref(),
    ] {
        if let Some(value) = field {
            let value = value.to_ascii_lowercase();
            if value.contains("live") {
                return CourseType::Live;
            }
            if value.contains("blend") {
                return CourseType::Blended;
            }
            if value.contains("free") {
                return CourseType::Free;
            }
        }
    }

    if let Some(fee) = raw.course_fee.or(raw.price) {
        return if fee <= 0.0 {
            CourseType::Free
        } else {
            CourseType::Blended
        };
    }

    CourseType::Blended
}

impl RawCourse {
    /// Normalize a bulk-listing record, inferring the type. Records without
    /// any id are unaddressable and dropped.
    pub fn normalize(self) -> Option<Course> {
        let course_type = infer_course_type(&self);
        self.normalize_as(course_type)
    }

    /// Normalize a record fetched from a typed endpoint, where the type is
    /// already known from the route.
    pub fn normalize_as(self, course_type: CourseType) -> Option<Course> {
        let id = self.id?;
        Some(Course {
            id,
            course_type,
            title: self.course_title.or(self.title).unwrap_or_default(),
            category: self.category,
            image: self.course_image.or(self.thumbnail),
            price: self.course_fee.or(self.price),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: CurriculumData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumData {
    #[serde(default)]
    pub curriculum: Vec<RawWeek>,
    #[serde(default)]
    pub total_weeks: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeek {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    /// The store's own title field, often assigned by a different process
    /// than the one that set `weekTitle`.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "weekTitle")]
    pub week_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "weekDescription")]
    pub week_description: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub lessons: Vec<RawLesson>,
    #[serde(default)]
    pub sections: Vec<RawSection>,
    #[serde(default, alias = "liveClasses")]
    pub live_classes: Vec<RawLiveClass>,
}

/// Canonical id for the week at `index` of a remote response. The store's
/// write path addresses weeks this way regardless of what any record's own
/// id field says.
pub fn positional_week_id(index: usize) -> String {
    format!("week_{}", index + 1)
}

impl RawWeek {
    pub fn display_title(&self) -> &str {
        self.week_title
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }

    /// Title equality against both remote title fields.
    pub fn matches_title(&self, title: &str) -> bool {
        if title.is_empty() {
            return false;
        }
        self.week_title.as_deref() == Some(title) || self.title.as_deref() == Some(title)
    }

    /// Convert the week at `index` of a remote response into the canonical
    /// shape, discarding whatever id the record carried.
    pub fn normalize(self, index: usize) -> CurriculumWeek {
        let title = self.display_title().to_string();
        CurriculumWeek {
            id: positional_week_id(index),
            title,
            description: self
                .week_description
                .or(self.description)
                .unwrap_or_default(),
            order: index as u32 + 1,
            lessons: self
                .lessons
                .into_iter()
                .enumerate()
                .map(|(i, lesson)| lesson.normalize(i))
                .collect(),
            sections: self
                .sections
                .into_iter()
                .enumerate()
                .map(|(i, section)| section.normalize(i))
                .collect(),
            live_classes: self
                .live_classes
                .into_iter()
                .map(RawLiveClass::normalize)
                .collect(),
            sync_state: SyncState::Synced,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLesson {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "contentType")]
    pub content_type: Option<String>,
    #[serde(default, alias = "contentUrl", alias = "url")]
    pub content_url: Option<String>,
    #[serde(default, alias = "durationMinutes", alias = "duration")]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default, alias = "isPreview")]
    pub is_preview: Option<bool>,
}

impl RawLesson {
    pub fn normalize(self, index: usize) -> Lesson {
        Lesson {
            id: self.id.unwrap_or_else(|| temp_id("lesson")),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            content_type: self
                .content_type
                .as_deref()
                .and_then(ContentType::parse)
                .unwrap_or_default(),
            content_url: self.content_url,
            duration_minutes: self.duration_minutes.unwrap_or(0),
            order: self.order.unwrap_or(index as u32 + 1),
            is_preview: self.is_preview.unwrap_or(false),
            sync_state: SyncState::Synced,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl RawSection {
    pub fn normalize(self, index: usize) -> Section {
        Section {
            id: self.id.unwrap_or_else(|| temp_id("section")),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            order: self.order.unwrap_or(index as u32 + 1),
            resources: self.resources,
            sync_state: SyncState::Synced,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLiveClass {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "scheduledAt", alias = "schedule")]
    pub scheduled_at: Option<String>,
    #[serde(default, alias = "durationMinutes", alias = "duration")]
    pub duration_minutes: Option<u32>,
}

impl RawLiveClass {
    pub fn normalize(self) -> LiveClass {
        LiveClass {
            id: self.id.unwrap_or_else(|| temp_id("live")),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            scheduled_at: self.scheduled_at.unwrap_or_default(),
            duration_minutes: self.duration_minutes.unwrap_or(0),
            sync_state: SyncState::Synced,
        }
    }
}

// Write-path bodies. The store expects both naming conventions populated on
// week creation.

#[derive(Debug, Clone, Serialize)]
pub struct CreateWeekBody {
    pub title: String,
    #[serde(rename = "weekTitle")]
    pub week_title: String,
    pub description: String,
    #[serde(rename = "weekDescription")]
    pub week_description: String,
    pub order: u32,
    pub lessons: Vec<Lesson>,
    pub sections: Vec<Section>,
    pub live_classes: Vec<LiveClass>,
}

impl CreateWeekBody {
    /// Week creation never carries children; they are attached one by one
    /// after the week id is settled.
    pub fn from_week(week: &CurriculumWeek) -> Self {
        Self {
            title: week.title.clone(),
            week_title: week.title.clone(),
            description: week.description.clone(),
            week_description: week.description.clone(),
            order: week.order,
            lessons: Vec::new(),
            sections: Vec::new(),
            live_classes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateWeekBody {
    pub title: String,
    #[serde(rename = "weekTitle")]
    pub week_title: String,
    pub description: String,
    #[serde(rename = "weekDescription")]
    pub week_description: String,
    pub order: u32,
}

impl UpdateWeekBody {
    pub fn from_week(week: &CurriculumWeek) -> Self {
        Self {
            title: week.title.clone(),
            week_title: week.title.clone(),
            description: week.description.clone(),
            week_description: week.description.clone(),
            order: week.order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLessonBody {
    pub title: String,
    pub description: String,
    #[serde(rename = "contentType")]
    pub content_type: ContentType,
    #[serde(rename = "contentUrl")]
    pub content_url: Option<String>,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
    pub order: u32,
    #[serde(rename = "isPreview")]
    pub is_preview: bool,
}

impl CreateLessonBody {
    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            content_type: lesson.content_type,
            content_url: lesson.content_url.clone(),
            duration_minutes: lesson.duration_minutes,
            order: lesson.order,
            is_preview: lesson.is_preview,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSectionBody {
    pub title: String,
    pub description: String,
    pub order: u32,
    pub resources: Vec<String>,
}

impl CreateSectionBody {
    pub fn from_section(section: &Section) -> Self {
        Self {
            title: section.title.clone(),
            description: section.description.clone(),
            order: section.order,
            resources: section.resources.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateLiveClassBody {
    pub title: String,
    pub description: String,
    #[serde(rename = "scheduledAt")]
    pub scheduled_at: String,
    #[serde(rename = "durationMinutes")]
    pub duration_minutes: u32,
}

impl CreateLiveClassBody {
    pub fn from_live_class(live_class: &LiveClass) -> Self {
        Self {
            title: live_class.title.clone(),
            description: live_class.description.clone(),
            scheduled_at: live_class.scheduled_at.clone(),
            duration_minutes: live_class.duration_minutes,
        }
    }
}

// Create responses wrap the stored record under an entity key.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedWeekResponse {
    #[serde(default)]
    pub week: RawWeek,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedLessonResponse {
    #[serde(default)]
    pub lesson: RawLesson,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedSectionResponse {
    #[serde(default)]
    pub section: RawSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedLiveClassResponse {
    #[serde(default, alias = "liveClass")]
    pub live_class: RawLiveClass,
}
