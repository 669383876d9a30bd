use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use crate::lms::LmsApi;
use crate::services::locator::CourseLocator;
use crate::store::CourseCache;

/// Periodically re-runs the bulk course load so a long-lived editor session
/// does not work from a stale listing.
pub struct CourseCacheRefresher {
    api: Arc<dyn LmsApi>,
    cache: Arc<RwLock<CourseCache>>,
    interval: Duration,
}

impl CourseCacheRefresher {
    pub fn new(
        api: Arc<dyn LmsApi>,
        cache: Arc<RwLock<CourseCache>>,
        interval_secs: u64,
    ) -> Self {
        Self {
            api,
            cache,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Reload in an endless loop. Failures are logged and the loop
    /// continues.
    pub async fn start(self) {
        info!("Starting course cache refresher (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            let locator = CourseLocator::new(self.api.clone(), self.cache.clone());
            match locator.load_all().await {
                Ok(summary) => {
                    info!(
                        "Course cache refreshed - {} courses, {} listings failed",
                        summary.loaded,
                        summary.failed_types.len()
                    );
                }
                Err(e) => {
                    tracing::warn!("Course cache refresh failed: {:?}", e);
                }
            }
        }
    }
}
