//! Search service: ranked post ids resolved to timeline entries

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::search::SearchIndex;
use crate::store::Store;
use crate::types::TimelineEntry;

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn Store>,
    index: Arc<dyn SearchIndex>,
    max_results: u32,
}

impl SearchService {
    pub fn new(store: Arc<dyn Store>, index: Arc<dyn SearchIndex>, max_results: u32) -> Self {
        Self {
            store,
            index,
            max_results,
        }
    }

    /// Posts matching every term of `query`, best match first
    ///
    /// Ids the index returns for posts no longer in the store are skipped.
    pub async fn search(&self, query: &str) -> Result<Vec<TimelineEntry>> {
        let ids = self.index.search(query, self.max_results).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rank: HashMap<_, _> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut entries = self.store.posts_by_ids(&ids).await?;
        entries.sort_by_key(|e| rank.get(&e.post.id).copied().unwrap_or(usize::MAX));

        tracing::debug!("Search {:?} matched {} posts", query, entries.len());
        Ok(entries)
    }
}
