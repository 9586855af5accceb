use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::model::leave_draft::LeaveDraft;

/// Per-user storage of in-progress leave drafts.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Existing draft, or a freshly stored empty one.
    async fn get_or_create(&self, user_id: &str) -> LeaveDraft;
    async fn save(&self, user_id: &str, draft: LeaveDraft);
    /// No-op when absent.
    async fn remove(&self, user_id: &str);
    async fn has(&self, user_id: &str) -> bool;
}

/// In-memory drafts; lost on restart. Untouched drafts expire after the idle TTL.
pub struct MokaDraftStore {
    drafts: Cache<String, LeaveDraft>,
}

impl MokaDraftStore {
    pub fn new(max_capacity: u64, idle_ttl: Duration) -> Self {
        Self {
            drafts: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }
}

#[async_trait]
impl DraftStore for MokaDraftStore {
    async fn get_or_create(&self, user_id: &str) -> LeaveDraft {
        self.drafts
            .get_with(user_id.to_string(), async {
                tracing::info!(user_id, "Leave draft created");
                LeaveDraft::new(user_id)
            })
            .await
    }

    async fn save(&self, user_id: &str, draft: LeaveDraft) {
        self.drafts.insert(user_id.to_string(), draft).await;
    }

    async fn remove(&self, user_id: &str) {
        self.drafts.invalidate(user_id).await;
    }

    async fn has(&self, user_id: &str) -> bool {
        self.drafts.contains_key(user_id)
    }
}
