use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an entity has been confirmed persisted by the remote store.
/// Local-fallback mutations leave entities in `LocalOnly` until a later
/// operation (or reload) confirms them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    #[default]
    Synced,
    LocalOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumWeek {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub live_classes: Vec<LiveClass>,
    #[serde(default)]
    pub sync_state: SyncState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Video,
    Text,
    Quiz,
    Assignment,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<ContentType> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Some(ContentType::Video),
            "text" => Some(ContentType::Text),
            "quiz" => Some(ContentType::Quiz),
            "assignment" => Some(ContentType::Assignment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content_type: ContentType,
    pub content_url: Option<String>,
    pub duration_minutes: u32,
    pub order: u32,
    pub is_preview: bool,
    #[serde(default)]
    pub sync_state: SyncState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order: u32,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub sync_state: SyncState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveClass {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_at: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub sync_state: SyncState,
}

/// Temporary client-side id for an entity that has not been persisted yet.
pub fn temp_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}

// Request payloads accepted by the editing surface.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWeekRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWeekRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLessonRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub is_preview: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content_type: Option<ContentType>,
    pub content_url: Option<String>,
    pub duration_minutes: Option<u32>,
    pub is_preview: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSectionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub resources: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLiveClassRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub scheduled_at: String,
    #[serde(default = "default_live_class_minutes")]
    pub duration_minutes: u32,
}

fn default_live_class_minutes() -> u32 {
    60
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLiveClassRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<String>,
    pub duration_minutes: Option<u32>,
}
