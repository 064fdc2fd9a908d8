use crate::redeem::types::TokenEntry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Ordered set of credentials shared by every redemption on one engine.
///
/// Iteration order is insertion order. Removal is permanent for the lifetime
/// of the pool.
#[derive(Debug, Clone, Default)]
pub struct TokenPool {
    entries: Arc<Mutex<Vec<TokenEntry>>>,
}

impl TokenPool {
    /// Builds the pool. A token listed twice keeps its first entry.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = TokenEntry>,
    {
        let mut unique: Vec<TokenEntry> = Vec::new();
        for entry in entries {
            if !unique.iter().any(|existing| existing.token == entry.token) {
                unique.push(entry);
            }
        }

        Self {
            entries: Arc::new(Mutex::new(unique)),
        }
    }

    pub async fn snapshot(&self) -> Vec<TokenEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.entries.lock().await.iter().any(|e| e.token == token)
    }

    /// Returns whether the token was still present.
    pub async fn remove(&self, token: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|e| e.token != token);
        entries.len() != before
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Short, log-safe form of a credential.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if visible.len() == token.len() {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insertion_order_and_duplicates() {
        let pool = TokenPool::new(vec![
            TokenEntry::new("first"),
            TokenEntry::new("second").with_payment_source("pm_1"),
            TokenEntry::new("first").with_payment_source("ignored"),
        ]);

        let snapshot = pool.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].token, "first");
        assert_eq!(snapshot[0].payment_source_id, None);
        assert_eq!(snapshot[1].payment_source_id.as_deref(), Some("pm_1"));
    }

    #[tokio::test]
    async fn test_remove_is_permanent() {
        let pool = TokenPool::new(vec![TokenEntry::new("a"), TokenEntry::new("b")]);

        assert!(pool.remove("a").await);
        assert!(!pool.remove("a").await);
        assert!(!pool.contains("a").await);
        assert_eq!(pool.len().await, 1);

        // Clones share the same entries.
        let clone = pool.clone();
        clone.remove("b").await;
        assert!(pool.is_empty().await);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("MTIzNDU2Nzg5.abc.def"), "MTIzND***");
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token(""), "***");
    }
}
