use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::lms::LmsApi;
use crate::lms::dto::{CreateWeekBody, positional_week_id};
use crate::models::CourseRef;
use crate::services::fetcher::CurriculumFetcher;
use crate::store::CurriculumStore;

/// How a locally-held week identifier was settled against the remote store.
/// `Unresolved` means no child mutation may be attempted against the week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The identifier already addresses a remote week.
    Verified,
    /// The local identifier was rewritten to a confidently matched remote
    /// week's positional id.
    Remapped { remote_id: String },
    /// No match existed; the week was created remotely and the returned id
    /// adopted.
    Created { remote_id: String },
    Unresolved,
}

impl ReconcileOutcome {
    pub fn is_usable(&self) -> bool {
        !matches!(self, ReconcileOutcome::Unresolved)
    }

    /// The identifier to address the week by after reconciliation.
    pub fn resolved_id<'a>(&'a self, original: &'a str) -> Option<&'a str> {
        match self {
            ReconcileOutcome::Verified => Some(original),
            ReconcileOutcome::Remapped { remote_id } | ReconcileOutcome::Created { remote_id } => {
                Some(remote_id)
            }
            ReconcileOutcome::Unresolved => None,
        }
    }
}

/// Closes the gap between a locally-known week identifier and the positional
/// identifier space the remote store's write path expects. The store's read
/// path can return records whose own id field was assigned by a different
/// process, so an apparent mismatch is usually an addressing problem, not a
/// data-integrity one.
pub struct WeekReconciler {
    api: Arc<dyn LmsApi>,
    store: Arc<RwLock<CurriculumStore>>,
}

impl WeekReconciler {
    pub fn new(api: Arc<dyn LmsApi>, store: Arc<RwLock<CurriculumStore>>) -> Self {
        Self { api, store }
    }

    pub async fn reconcile(
        &self,
        course: &CourseRef,
        week_id: &str,
    ) -> Result<ReconcileOutcome, AppError> {
        let fetcher = CurriculumFetcher::new(self.api.clone());
        let remote = fetcher.fetch_primary_raw(course).await?;

        // Exact hit in the positional id space: nothing to repair.
        if (0..remote.len()).any(|index| positional_week_id(index) == week_id) {
            debug!("week {} verified remotely", week_id);
            return Ok(ReconcileOutcome::Verified);
        }

        let local = {
            let store = self.store.read().await;
            store.week(week_id).cloned()
        };
        let Some(local) = local else {
            warn!("week {} is unknown locally, cannot reconcile", week_id);
            return Ok(ReconcileOutcome::Unresolved);
        };

        let expected_id = format!("week_{}", local.order);
        let matched_index = remote.iter().enumerate().find_map(|(index, raw)| {
            let by_expected_id = raw.id.as_deref() == Some(expected_id.as_str());
            let by_position = index as u32 + 1 == local.order;
            let by_title = raw.matches_title(&local.title);
            if by_expected_id || by_position {
                Some((index, false))
            } else if by_title {
                Some((index, true))
            } else {
                None
            }
        });

        if let Some((index, title_only)) = matched_index {
            let remote_id = positional_week_id(index);
            if title_only {
                // A title-only match can merge two distinct weeks that
                // happen to share a title; there is no tie-break.
                warn!(
                    "week {} matched remote {} by title alone",
                    week_id, remote_id
                );
            }
            info!("remapping week {} -> {}", week_id, remote_id);
            self.store.write().await.remap_week_id(week_id, &remote_id);
            return Ok(ReconcileOutcome::Remapped { remote_id });
        }

        // Nothing to match against: create the week remotely and adopt
        // whatever identifier the store hands back.
        let body = CreateWeekBody::from_week(&local);
        match self.api.create_week(course, &body).await {
            Ok(created) => {
                let remote_id = created.id.unwrap_or(expected_id);
                info!("created remote week for {}, adopting id {}", week_id, remote_id);
                self.store.write().await.remap_week_id(week_id, &remote_id);
                Ok(ReconcileOutcome::Created { remote_id })
            }
            Err(e) if e.is_auth() => Err(e),
            Err(e) => {
                warn!("remote create for week {} failed: {}", week_id, e);
                Ok(ReconcileOutcome::Unresolved)
            }
        }
    }
}
