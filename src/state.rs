use std::sync::Arc;

use tokio::sync::RwLock;

use crate::lms::LmsApi;
use crate::store::{CourseCache, CurriculumStore};

#[derive(Clone)]
pub struct AppState {
    pub lms: Arc<dyn LmsApi>,
    pub courses: Arc<RwLock<CourseCache>>,
    pub curriculum: Arc<RwLock<CurriculumStore>>,
}

impl AppState {
    pub fn new(lms: Arc<dyn LmsApi>) -> Self {
        Self {
            lms,
            courses: Arc::new(RwLock::new(CourseCache::default())),
            curriculum: Arc::new(RwLock::new(CurriculumStore::default())),
        }
    }
}
