//! Branch promotion
//!
//! A `Stable Beta` build becomes `Stable` once the vendor confirms it. This
//! is the only in-place change to an ingested release.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::Result;
use crate::storage::{
    Branch, Candidate, Method, PromotionOutcome, SeaOrmStorage, UpdateType,
};

pub struct PromotionService {
    storage: Arc<SeaOrmStorage>,
}

impl PromotionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Promote the `Full` release `(version, method)` from `Stable Beta` to
    /// `Stable`. Repeating the call yields `AlreadyStable`.
    pub async fn promote(&self, version: &str, method: Method) -> Result<PromotionOutcome> {
        let Some(update) = self.storage.update_by_version(version, method).await? else {
            debug!("Promotion skipped, no {} release {}", method, version);
            return Ok(PromotionOutcome::NotFound);
        };

        let outcome = match update.branch {
            Branch::Stable => PromotionOutcome::AlreadyStable,
            Branch::StableBeta => {
                if self.storage.promote_stable_beta(update.id).await? {
                    info!(
                        "PromotionService: {} {} ({}) promoted to Stable",
                        update.codename, version, method
                    );
                    PromotionOutcome::Promoted
                } else {
                    // lost a race with another promotion of the same row
                    PromotionOutcome::AlreadyStable
                }
            }
            _ => PromotionOutcome::NotPromotable,
        };
        Ok(outcome)
    }

    /// Promote the stored counterpart of an incoming `Stable` `Full` OS build.
    ///
    /// Returns `None` when the candidate is not a promotion signal.
    pub async fn observe(&self, candidate: &Candidate) -> Result<Option<PromotionOutcome>> {
        match candidate {
            Candidate::Update(update)
                if update.branch == Branch::Stable && update.update_type == UpdateType::Full =>
            {
                self.promote(&update.version, update.method).await.map(Some)
            }
            _ => Ok(None),
        }
    }
}
