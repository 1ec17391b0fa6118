//! # Paginated Fetcher - Bulk Read Module
//!
//! Turns a page-based read endpoint into one complete, ordered collection.
//!
//! ## Algorithm
//!
//! - Start at offset 0 and request `page_size` items.
//! - Append whatever came back, in provider order, without deduplication.
//! - Advance the offset by `page_size` and repeat.
//! - Stop on an empty or absent page, or on a short page (fewer items than
//!   requested), which is the last one by definition.
//!
//! Each page request runs under the shared [`RetryPolicy`]. A page that
//! still fails after the budget aborts the whole fetch. A half-assembled
//! collection is never returned.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::FetchConfig;
use crate::core::retry::{RetryPolicy, Sleeper};
use crate::error::Result;

/// Offset and size of one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub start: usize,
    pub size: usize,
}

/// A remote collection readable one page at a time.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    /// Short name used in log lines.
    fn describe(&self) -> String;

    /// The page at `page`, or `None` / an empty vec once exhausted.
    async fn fetch_page(&self, page: Pagination) -> Result<Option<Vec<Self::Item>>>;
}

pub struct PaginatedFetcher {
    page_size: usize,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PaginatedFetcher {
    pub fn new(page_size: usize, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            page_size: page_size.max(1),
            policy,
            sleeper,
        }
    }

    /// Fetcher for the small-page transaction history endpoints.
    pub fn for_transactions(config: &FetchConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::new(config.transactions_page_size, config.retry_policy(), sleeper)
    }

    /// Fetcher for the large-page collection endpoints (tokens, holders).
    pub fn for_collections(config: &FetchConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::new(config.collection_page_size, config.retry_policy(), sleeper)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn fetch_all<S>(&self, source: &S) -> Result<Vec<S::Item>>
    where
        S: PageSource + ?Sized,
    {
        self.fetch_all_with(source, |_| {}).await
    }

    /// Like [`fetch_all`](Self::fetch_all), calling `on_progress` with the
    /// running item count after every non-empty page.
    pub async fn fetch_all_with<S, F>(&self, source: &S, mut on_progress: F) -> Result<Vec<S::Item>>
    where
        S: PageSource + ?Sized,
        F: FnMut(usize) + Send,
    {
        let name = source.describe();
        let mut items = Vec::new();
        let mut start = 0;

        loop {
            let page = Pagination {
                start,
                size: self.page_size,
            };
            let operation = format!("fetch {name} from {start}");
            let fetched = self
                .policy
                .run(self.sleeper.as_ref(), &operation, move || source.fetch_page(page))
                .await?;

            let Some(batch) = fetched.filter(|b| !b.is_empty()) else {
                debug!("{}: exhausted at offset {}", name, start);
                break;
            };
            let received = batch.len();
            items.extend(batch);
            on_progress(items.len());
            debug!("{}: {} items at offset {} ({} total)", name, received, start, items.len());

            if received < self.page_size {
                break;
            }
            start += self.page_size;
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{MockPages, RecordingSleeper};
    use std::time::Duration;

    fn fetcher(page_size: usize, attempts: u32) -> PaginatedFetcher {
        PaginatedFetcher::new(
            page_size,
            RetryPolicy::new(attempts, Duration::from_millis(250)),
            Arc::new(RecordingSleeper::default()),
        )
    }

    #[tokio::test]
    async fn short_last_page_ends_fetch() {
        let pages = MockPages::new(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9], vec![10]]);

        let items = fetcher(3, 1).fetch_all(&pages).await.unwrap();

        assert_eq!(items, (1..=10).collect::<Vec<_>>());
        let starts: Vec<usize> = pages.requests().iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![0, 3, 6, 9]);
        assert!(pages.requests().iter().all(|p| p.size == 3));
    }

    #[tokio::test]
    async fn empty_page_ends_fetch() {
        let pages = MockPages::new(vec![vec!["a", "b"], vec![]]);
        let items = fetcher(2, 1).fetch_all(&pages).await.unwrap();
        assert_eq!(items, vec!["a", "b"]);
        assert_eq!(pages.requests().len(), 2);
    }

    #[tokio::test]
    async fn absent_first_page_is_empty_collection() {
        let pages: MockPages<u32> = MockPages::new(Vec::new());
        let items = fetcher(100, 1).fetch_all(&pages).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(pages.requests().len(), 1);
    }

    #[tokio::test]
    async fn transient_page_failure_is_retried() {
        let pages = MockPages::new(vec![vec![1, 2], vec![3]]);
        pages.fail_next(2);

        let items = fetcher(2, 3).fetch_all(&pages).await.unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(pages.requests().len(), 4);
    }

    #[tokio::test]
    async fn single_attempt_surfaces_the_failure() {
        let pages = MockPages::new(vec![vec![1, 2]]);
        pages.fail_next(1);

        let result = fetcher(2, 1).fetch_all(&pages).await;

        assert!(matches!(result, Err(Error::RetryLimitExceeded { attempts: 1, .. })));
    }

    #[tokio::test]
    async fn reports_running_progress() {
        let pages = MockPages::new(vec![vec![0; 4], vec![0; 4], vec![0; 1]]);
        let mut seen = Vec::new();

        fetcher(4, 1).fetch_all_with(&pages, |n| seen.push(n)).await.unwrap();

        assert_eq!(seen, vec![4, 8, 9]);
    }
}
