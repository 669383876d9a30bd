use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::lms::LmsApi;
use crate::models::{Course, CourseType};
use crate::store::CourseCache;

/// Finds the owning course record for an id of unknown type: cached bulk
/// listing first, then per-type direct lookups.
pub struct CourseLocator {
    api: Arc<dyn LmsApi>,
    cache: Arc<RwLock<CourseCache>>,
}

/// Outcome of a bulk load. Partial failure of the per-type fallback is a
/// summary entry, not an error.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CourseLoadSummary {
    pub loaded: usize,
    pub failed_types: Vec<CourseType>,
}

impl CourseLocator {
    pub fn new(api: Arc<dyn LmsApi>, cache: Arc<RwLock<CourseCache>>) -> Self {
        Self { api, cache }
    }

    pub async fn locate(&self, course_id: &str) -> Result<Course, AppError> {
        if let Some(course) = self.cache.read().await.find(course_id) {
            return Ok(course.clone());
        }

        if !self.cache.read().await.is_loaded() {
            self.load_all().await?;
            if let Some(course) = self.cache.read().await.find(course_id) {
                return Ok(course.clone());
            }
        }

        // Not in any listing; the id may still resolve through a typed
        // direct lookup.
        for course_type in CourseType::ALL {
            match self.api.get_course(course_type, course_id).await {
                Ok(raw) => {
                    if let Some(course) = raw.normalize_as(course_type) {
                        info!("located course {} via direct {} lookup", course_id, course_type);
                        self.cache.write().await.insert(course.clone());
                        return Ok(course);
                    }
                }
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    debug!("direct {} lookup for {} missed: {}", course_type, course_id, e);
                }
            }
        }

        Err(AppError::CourseNotFound(course_id.to_string()))
    }

    /// Populate the cache from the bulk listing, falling back to the three
    /// per-type listings when the bulk endpoint is down. Types that fail in
    /// the fallback are reported, not fatal.
    pub async fn load_all(&self) -> Result<CourseLoadSummary, AppError> {
        match self.api.list_courses().await {
            Ok(raw_courses) => {
                let courses: Vec<Course> = raw_courses
                    .into_iter()
                    .filter_map(|raw| raw.normalize())
                    .collect();
                let summary = CourseLoadSummary {
                    loaded: courses.len(),
                    failed_types: Vec::new(),
                };
                info!("bulk course load: {} courses", summary.loaded);
                self.cache.write().await.fill(courses);
                Ok(summary)
            }
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("bulk course load failed, trying per-type listings: {}", e);
                self.load_per_type().await
            }
        }
    }

    async fn load_per_type(&self) -> Result<CourseLoadSummary, AppError> {
        let mut courses: Vec<Course> = Vec::new();
        let mut failed_types = Vec::new();

        for course_type in CourseType::ALL {
            match self.api.list_courses_of_type(course_type).await {
                Ok(raw_courses) => {
                    courses.extend(
                        raw_courses
                            .into_iter()
                            .filter_map(|raw| raw.normalize_as(course_type)),
                    );
                }
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!("{} course listing failed: {}", course_type, e);
                    failed_types.push(course_type);
                }
            }
        }

        let summary = CourseLoadSummary {
            loaded: courses.len(),
            failed_types,
        };
        info!(
            "per-type course load: {} courses, {} listings failed",
            summary.loaded,
            summary.failed_types.len()
        );
        self.cache.write().await.fill(courses);
        Ok(summary)
    }
}
