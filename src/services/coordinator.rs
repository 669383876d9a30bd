use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AppError;
use crate::lms::LmsApi;
use crate::lms::dto::{
    CreateLessonBody, CreateLiveClassBody, CreateSectionBody, CreateWeekBody, UpdateWeekBody,
};
use crate::models::{
    CourseRef, CourseType, CurriculumWeek, Lesson, LiveClass, NewLessonRequest,
    NewLiveClassRequest, NewSectionRequest, NewWeekRequest, Section, SyncState,
    UpdateLessonRequest, UpdateLiveClassRequest, UpdateSectionRequest, UpdateWeekRequest, temp_id,
};
use crate::services::fetcher::CurriculumFetcher;
use crate::services::reconciler::WeekReconciler;
use crate::store::CurriculumStore;

/// Result of a best-effort mutation. `LocalOnly` means the change lives in
/// the store but was not confirmed persisted by the remote; the caller is
/// always told which one happened. Rejections are `Err(AppError)` and leave
/// the store untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationOutcome<T> {
    Persisted { entity: T },
    LocalOnly { entity: T, warning: String },
}

impl<T> MutationOutcome<T> {
    pub fn is_persisted(&self) -> bool {
        matches!(self, MutationOutcome::Persisted { .. })
    }

    pub fn entity(&self) -> &T {
        match self {
            MutationOutcome::Persisted { entity } => entity,
            MutationOutcome::LocalOnly { entity, .. } => entity,
        }
    }
}

fn local_only_warning(what: &str) -> String {
    format!(
        "{} was saved locally at {} but not persisted remotely; it may be lost on reload",
        what,
        Utc::now().to_rfc3339()
    )
}

/// Performs every add/edit/delete of weeks and their children. Child
/// creation pre-verifies the owning week through the reconciler; week
/// mutations and child update/delete are best-effort against the remote
/// with the local tree mutated regardless.
pub struct MutationCoordinator {
    api: Arc<dyn LmsApi>,
    store: Arc<RwLock<CurriculumStore>>,
}

impl MutationCoordinator {
    pub fn new(api: Arc<dyn LmsApi>, store: Arc<RwLock<CurriculumStore>>) -> Self {
        Self { api, store }
    }

    // -- weeks ------------------------------------------------------------

    pub async fn add_week(
        &self,
        course: &CourseRef,
        req: NewWeekRequest,
    ) -> Result<MutationOutcome<CurriculumWeek>, AppError> {
        let order = self.store.read().await.next_week_order();
        let mut week = CurriculumWeek {
            id: format!("week_{}", order),
            title: req.title,
            description: req.description,
            order,
            lessons: Vec::new(),
            sections: Vec::new(),
            live_classes: Vec::new(),
            sync_state: SyncState::Synced,
        };

        let body = CreateWeekBody::from_week(&week);
        match self.api.create_week(course, &body).await {
            Ok(created) => {
                if let Some(id) = created.id {
                    week.id = id;
                }
                self.store.write().await.push_week(week.clone());
                Ok(MutationOutcome::Persisted { entity: week })
            }
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("remote week create failed: {}", e);
                week.sync_state = SyncState::LocalOnly;
                self.store.write().await.push_week(week.clone());
                Ok(MutationOutcome::LocalOnly {
                    entity: week,
                    warning: local_only_warning("week"),
                })
            }
        }
    }

    pub async fn update_week(
        &self,
        course: &CourseRef,
        week_id: &str,
        req: UpdateWeekRequest,
    ) -> Result<MutationOutcome<CurriculumWeek>, AppError> {
        let mut week = self
            .store
            .read()
            .await
            .week(week_id)
            .cloned()
            .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;

        if let Some(title) = req.title {
            week.title = title;
        }
        if let Some(description) = req.description {
            week.description = description;
        }

        let body = UpdateWeekBody::from_week(&week);
        let remote = self.api.update_week(course, week_id, &body).await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote week update for {} failed: {}", week_id, e),
            Ok(()) => {}
        }

        let persisted = remote.is_ok();
        week.sync_state = if persisted {
            SyncState::Synced
        } else {
            SyncState::LocalOnly
        };
        if let Some(stored) = self.store.write().await.week_mut(week_id) {
            stored.title = week.title.clone();
            stored.description = week.description.clone();
            stored.sync_state = week.sync_state;
        }

        if persisted {
            Ok(MutationOutcome::Persisted { entity: week })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: week,
                warning: local_only_warning("week update"),
            })
        }
    }

    pub async fn delete_week(
        &self,
        course: &CourseRef,
        week_id: &str,
    ) -> Result<MutationOutcome<String>, AppError> {
        if self.store.read().await.week(week_id).is_none() {
            return Err(AppError::WeekNotFound(week_id.to_string()));
        }

        let remote = self.api.delete_week(course, week_id).await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote week delete for {} failed: {}", week_id, e),
            Ok(()) => {}
        }

        self.store.write().await.remove_week(week_id);
        if remote.is_ok() {
            Ok(MutationOutcome::Persisted {
                entity: week_id.to_string(),
            })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: week_id.to_string(),
                warning: local_only_warning("week delete"),
            })
        }
    }

    // -- lessons ----------------------------------------------------------

    pub async fn add_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        req: NewLessonRequest,
    ) -> Result<MutationOutcome<Lesson>, AppError> {
        let target_id = self.verified_week_id(course, week_id).await?;

        let order = {
            let store = self.store.read().await;
            let week = store
                .week(&target_id)
                .ok_or_else(|| AppError::WeekNotFound(target_id.clone()))?;
            week.lessons.len() as u32 + 1
        };

        let mut lesson = Lesson {
            id: temp_id("lesson"),
            title: req.title,
            description: req.description,
            content_type: req.content_type,
            content_url: req.content_url,
            duration_minutes: req.duration_minutes,
            order,
            is_preview: req.is_preview,
            sync_state: SyncState::Synced,
        };

        let body = CreateLessonBody::from_lesson(&lesson);
        match self.api.create_lesson(course, &target_id, &body).await {
            Ok(created) => {
                if let Some(id) = created.id {
                    lesson.id = id;
                }
                self.push_lesson(&target_id, lesson.clone()).await?;
                Ok(MutationOutcome::Persisted { entity: lesson })
            }
            Err(e) => self
                .classify_child_failure(course, e, "lesson", || async {
                    lesson.sync_state = SyncState::LocalOnly;
                    self.push_lesson(&target_id, lesson.clone()).await?;
                    Ok(lesson)
                })
                .await,
        }
    }

    pub async fn update_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
        req: UpdateLessonRequest,
    ) -> Result<MutationOutcome<Lesson>, AppError> {
        let mut lesson = {
            let store = self.store.read().await;
            let week = store
                .week(week_id)
                .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
            week.lessons
                .iter()
                .find(|lesson| lesson.id == lesson_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("lesson {}", lesson_id)))?
        };

        if let Some(title) = req.title {
            lesson.title = title;
        }
        if let Some(description) = req.description {
            lesson.description = description;
        }
        if let Some(content_type) = req.content_type {
            lesson.content_type = content_type;
        }
        if let Some(content_url) = req.content_url {
            lesson.content_url = Some(content_url);
        }
        if let Some(duration_minutes) = req.duration_minutes {
            lesson.duration_minutes = duration_minutes;
        }
        if let Some(is_preview) = req.is_preview {
            lesson.is_preview = is_preview;
        }

        let body = CreateLessonBody::from_lesson(&lesson);
        let remote = self
            .api
            .update_lesson(course, week_id, lesson_id, &body)
            .await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote lesson update for {} failed: {}", lesson_id, e),
            Ok(()) => {}
        }

        lesson.sync_state = if remote.is_ok() {
            SyncState::Synced
        } else {
            SyncState::LocalOnly
        };
        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                if let Some(stored) = week.lessons.iter_mut().find(|l| l.id == lesson_id) {
                    *stored = lesson.clone();
                }
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted { entity: lesson })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: lesson,
                warning: local_only_warning("lesson update"),
            })
        }
    }

    pub async fn delete_lesson(
        &self,
        course: &CourseRef,
        week_id: &str,
        lesson_id: &str,
    ) -> Result<MutationOutcome<String>, AppError> {
        self.ensure_child_exists(week_id, format!("lesson {}", lesson_id), |week| {
            week.lessons.iter().any(|lesson| lesson.id == lesson_id)
        })
        .await?;

        let remote = self.api.delete_lesson(course, week_id, lesson_id).await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote lesson delete for {} failed: {}", lesson_id, e),
            Ok(()) => {}
        }

        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                week.lessons.retain(|lesson| lesson.id != lesson_id);
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted {
                entity: lesson_id.to_string(),
            })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: lesson_id.to_string(),
                warning: local_only_warning("lesson delete"),
            })
        }
    }

    // -- sections ---------------------------------------------------------

    pub async fn add_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        req: NewSectionRequest,
    ) -> Result<MutationOutcome<Section>, AppError> {
        let target_id = self.verified_week_id(course, week_id).await?;

        let order = {
            let store = self.store.read().await;
            let week = store
                .week(&target_id)
                .ok_or_else(|| AppError::WeekNotFound(target_id.clone()))?;
            week.sections.len() as u32 + 1
        };

        let mut section = Section {
            id: temp_id("section"),
            title: req.title,
            description: req.description,
            order,
            resources: req.resources,
            sync_state: SyncState::Synced,
        };

        let body = CreateSectionBody::from_section(&section);
        match self.api.create_section(course, &target_id, &body).await {
            Ok(created) => {
                if let Some(id) = created.id {
                    section.id = id;
                }
                self.push_section(&target_id, section.clone()).await?;
                Ok(MutationOutcome::Persisted { entity: section })
            }
            Err(e) => self
                .classify_child_failure(course, e, "section", || async {
                    section.sync_state = SyncState::LocalOnly;
                    self.push_section(&target_id, section.clone()).await?;
                    Ok(section)
                })
                .await,
        }
    }

    pub async fn update_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
        req: UpdateSectionRequest,
    ) -> Result<MutationOutcome<Section>, AppError> {
        let mut section = {
            let store = self.store.read().await;
            let week = store
                .week(week_id)
                .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
            week.sections
                .iter()
                .find(|section| section.id == section_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("section {}", section_id)))?
        };

        if let Some(title) = req.title {
            section.title = title;
        }
        if let Some(description) = req.description {
            section.description = description;
        }
        if let Some(resources) = req.resources {
            section.resources = resources;
        }

        let body = CreateSectionBody::from_section(&section);
        let remote = self
            .api
            .update_section(course, week_id, section_id, &body)
            .await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote section update for {} failed: {}", section_id, e),
            Ok(()) => {}
        }

        section.sync_state = if remote.is_ok() {
            SyncState::Synced
        } else {
            SyncState::LocalOnly
        };
        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                if let Some(stored) = week.sections.iter_mut().find(|s| s.id == section_id) {
                    *stored = section.clone();
                }
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted { entity: section })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: section,
                warning: local_only_warning("section update"),
            })
        }
    }

    pub async fn delete_section(
        &self,
        course: &CourseRef,
        week_id: &str,
        section_id: &str,
    ) -> Result<MutationOutcome<String>, AppError> {
        self.ensure_child_exists(week_id, format!("section {}", section_id), |week| {
            week.sections.iter().any(|section| section.id == section_id)
        })
        .await?;

        let remote = self.api.delete_section(course, week_id, section_id).await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote section delete for {} failed: {}", section_id, e),
            Ok(()) => {}
        }

        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                week.sections.retain(|section| section.id != section_id);
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted {
                entity: section_id.to_string(),
            })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: section_id.to_string(),
                warning: local_only_warning("section delete"),
            })
        }
    }

    // -- live classes -----------------------------------------------------

    pub async fn add_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        req: NewLiveClassRequest,
    ) -> Result<MutationOutcome<LiveClass>, AppError> {
        if course.course_type == CourseType::Free {
            return Err(AppError::BadRequest(
                "live classes are not available for free courses".to_string(),
            ));
        }

        let target_id = self.verified_week_id(course, week_id).await?;

        let mut live_class = LiveClass {
            id: temp_id("live"),
            title: req.title,
            description: req.description,
            scheduled_at: req.scheduled_at,
            duration_minutes: req.duration_minutes,
            sync_state: SyncState::Synced,
        };

        let body = CreateLiveClassBody::from_live_class(&live_class);
        match self.api.create_live_class(course, &target_id, &body).await {
            Ok(created) => {
                if let Some(id) = created.id {
                    live_class.id = id;
                }
                self.push_live_class(&target_id, live_class.clone()).await?;
                Ok(MutationOutcome::Persisted { entity: live_class })
            }
            Err(e) => self
                .classify_child_failure(course, e, "live class", || async {
                    live_class.sync_state = SyncState::LocalOnly;
                    self.push_live_class(&target_id, live_class.clone()).await?;
                    Ok(live_class)
                })
                .await,
        }
    }

    pub async fn update_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
        req: UpdateLiveClassRequest,
    ) -> Result<MutationOutcome<LiveClass>, AppError> {
        let mut live_class = {
            let store = self.store.read().await;
            let week = store
                .week(week_id)
                .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
            week.live_classes
                .iter()
                .find(|live_class| live_class.id == live_class_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("live class {}", live_class_id)))?
        };

        if let Some(title) = req.title {
            live_class.title = title;
        }
        if let Some(description) = req.description {
            live_class.description = description;
        }
        if let Some(scheduled_at) = req.scheduled_at {
            live_class.scheduled_at = scheduled_at;
        }
        if let Some(duration_minutes) = req.duration_minutes {
            live_class.duration_minutes = duration_minutes;
        }

        let body = CreateLiveClassBody::from_live_class(&live_class);
        let remote = self
            .api
            .update_live_class(course, week_id, live_class_id, &body)
            .await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote live class update for {} failed: {}", live_class_id, e),
            Ok(()) => {}
        }

        live_class.sync_state = if remote.is_ok() {
            SyncState::Synced
        } else {
            SyncState::LocalOnly
        };
        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                if let Some(stored) = week
                    .live_classes
                    .iter_mut()
                    .find(|l| l.id == live_class_id)
                {
                    *stored = live_class.clone();
                }
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted { entity: live_class })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: live_class,
                warning: local_only_warning("live class update"),
            })
        }
    }

    pub async fn delete_live_class(
        &self,
        course: &CourseRef,
        week_id: &str,
        live_class_id: &str,
    ) -> Result<MutationOutcome<String>, AppError> {
        self.ensure_child_exists(week_id, format!("live class {}", live_class_id), |week| {
            week.live_classes
                .iter()
                .any(|live_class| live_class.id == live_class_id)
        })
        .await?;

        let remote = self
            .api
            .delete_live_class(course, week_id, live_class_id)
            .await;
        match remote {
            Err(e) if e.is_auth() => return Err(e),
            Err(ref e) => warn!("remote live class delete for {} failed: {}", live_class_id, e),
            Ok(()) => {}
        }

        {
            let mut store = self.store.write().await;
            if let Some(week) = store.week_mut(week_id) {
                week.live_classes
                    .retain(|live_class| live_class.id != live_class_id);
            }
        }

        if remote.is_ok() {
            Ok(MutationOutcome::Persisted {
                entity: live_class_id.to_string(),
            })
        } else {
            Ok(MutationOutcome::LocalOnly {
                entity: live_class_id.to_string(),
                warning: local_only_warning("live class delete"),
            })
        }
    }

    // -- shared plumbing --------------------------------------------------

    /// Pre-verify the owning week. A week that cannot be reconciled rejects
    /// the child mutation outright, before any store change.
    async fn verified_week_id(
        &self,
        course: &CourseRef,
        week_id: &str,
    ) -> Result<String, AppError> {
        let reconciler = WeekReconciler::new(self.api.clone(), self.store.clone());
        let outcome = reconciler.reconcile(course, week_id).await?;
        match outcome.resolved_id(week_id) {
            Some(id) => Ok(id.to_string()),
            None => Err(AppError::WeekNotFound(format!(
                "{} could not be verified against the remote store",
                week_id
            ))),
        }
    }

    /// Shared failure handling for child creation: a "week not found" reply
    /// invalidates the whole tree (refetch, then abort so the caller retries
    /// against fresh data); auth errors abort untouched; anything else
    /// degrades to a local-only append.
    async fn classify_child_failure<T, F, Fut>(
        &self,
        course: &CourseRef,
        error: AppError,
        what: &str,
        fallback: F,
    ) -> Result<MutationOutcome<T>, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if error.is_week_not_found() {
            warn!("remote reports missing week during {} create, reloading curriculum", what);
            let fetcher = CurriculumFetcher::new(self.api.clone());
            let weeks = fetcher.fetch(course).await?;
            self.store.write().await.replace_weeks(weeks);
            return Err(AppError::StaleCurriculum(format!(
                "the target week no longer exists remotely; curriculum was reloaded, please retry adding the {}",
                what
            )));
        }
        if error.is_auth() {
            return Err(error);
        }

        info!("remote {} create failed ({}), keeping a local copy", what, error);
        let entity = fallback().await?;
        Ok(MutationOutcome::LocalOnly {
            entity,
            warning: local_only_warning(what),
        })
    }

    async fn ensure_child_exists<F>(
        &self,
        week_id: &str,
        what: String,
        exists: F,
    ) -> Result<(), AppError>
    where
        F: FnOnce(&CurriculumWeek) -> bool,
    {
        let store = self.store.read().await;
        let week = store
            .week(week_id)
            .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
        if exists(week) {
            Ok(())
        } else {
            Err(AppError::NotFound(what))
        }
    }

    async fn push_lesson(&self, week_id: &str, lesson: Lesson) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let week = store
            .week_mut(week_id)
            .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
        week.lessons.push(lesson);
        Ok(())
    }

    async fn push_section(&self, week_id: &str, section: Section) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let week = store
            .week_mut(week_id)
            .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
        week.sections.push(section);
        Ok(())
    }

    async fn push_live_class(&self, week_id: &str, live_class: LiveClass) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        let week = store
            .week_mut(week_id)
            .ok_or_else(|| AppError::WeekNotFound(week_id.to_string()))?;
        week.live_classes.push(live_class);
        Ok(())
    }
}
