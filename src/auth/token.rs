// Shared token slot
// Single writer (the refresher), any number of readers

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A token together with the instant it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    token: String,
    obtained_at: DateTime<Utc>,
}

/// Most recently obtained gateway token
///
/// Cloning is cheap and every clone observes the same slot. Readers only see
/// the unset value or a fully written token; the lock is held just long enough
/// to copy the value in or out.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<Option<Snapshot>>>,
}

impl SharedToken {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, or `None` before the first successful authentication
    pub async fn get(&self) -> Option<String> {
        let slot = self.inner.read().await;
        slot.as_ref().map(|s| s.token.clone())
    }

    /// Whether a token has ever been published
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// When the current token was obtained
    pub async fn obtained_at(&self) -> Option<DateTime<Utc>> {
        let slot = self.inner.read().await;
        slot.as_ref().map(|s| s.obtained_at)
    }

    /// Publish a freshly obtained token
    pub(crate) async fn set(&self, token: String) {
        let snapshot = Snapshot {
            token,
            obtained_at: Utc::now(),
        };

        let mut slot = self.inner.write().await;
        *slot = Some(snapshot);
    }
}
