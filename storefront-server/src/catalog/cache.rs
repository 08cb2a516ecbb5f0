//! Per-view search result cache
//!
//! One `SearchCache` belongs to one catalog view. A text search fetches the
//! whole matching set once; category and sort changes re-derive from the
//! cached set, and paging walks a cursor over the derived list.
//!
//! Searches are two-phase so the store fetch can run without holding the
//! cache: `begin_search` issues a [`SearchTicket`], `complete_search` applies
//! the fetched outcome only if that ticket is still the latest one issued.

use super::engine::{self, SearchOutcome};
use shared::models::{Product, ProductStatus};
use shared::query::{CatalogPage, SearchRequest, SortOrder};
use std::collections::BTreeMap;

/// Proof that a search was issued; carries the request to run
#[derive(Debug, Clone)]
pub struct SearchTicket {
    seq: u64,
    request: SearchRequest,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct SearchCache {
    page_size: usize,
    term: Option<String>,
    status: Option<ProductStatus>,
    category_id: Option<i64>,
    sort: SortOrder,
    /// Text+status filtered result of the last applied search
    matched: Option<Vec<Product>>,
    counts: BTreeMap<i64, usize>,
    /// Category filtered and sorted view of `matched`
    filtered: Vec<Product>,
    cursor: usize,
    /// Sequence number of the latest issued search
    issued: u64,
}

impl SearchCache {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            term: None,
            status: None,
            category_id: None,
            sort: SortOrder::default(),
            matched: None,
            counts: BTreeMap::new(),
            filtered: Vec::new(),
            cursor: 0,
            issued: 0,
        }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn status(&self) -> Option<ProductStatus> {
        self.status
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Whether a search result is currently cached
    pub fn has_results(&self) -> bool {
        self.matched.is_some()
    }

    /// Reset cached results and issue a new search for `term`.
    ///
    /// Category, sort and status selections survive; they belong to the view.
    pub fn begin_search(&mut self, term: &str) -> SearchTicket {
        self.drop_results();
        self.term = Some(term.to_string());
        self.issued += 1;
        SearchTicket {
            seq: self.issued,
            request: SearchRequest {
                query: Some(term.to_string()),
                // category is applied locally so it can change without a refetch
                category_id: None,
                status: self.status,
                sort: self.sort,
            },
        }
    }

    /// Store a finished search and return its first page.
    ///
    /// Returns `None` when a newer search (or a clear) was issued after this
    /// ticket; the outcome is discarded.
    pub fn complete_search(&mut self, ticket: SearchTicket, outcome: SearchOutcome) -> Option<CatalogPage> {
        if ticket.seq != self.issued {
            tracing::debug!(
                ticket = ticket.seq,
                latest = self.issued,
                "Discarding stale search result"
            );
            return None;
        }
        self.counts = outcome.category_counts;
        self.matched = Some(outcome.matched);
        Some(self.rederive())
    }

    /// Next page from the cursor. `None` when nothing is cached.
    pub fn load_more(&mut self) -> Option<CatalogPage> {
        self.matched.as_ref()?;
        Some(self.next_page())
    }

    /// Change the category filter. Re-derives from the cache when a search
    /// result is held; otherwise only records the selection.
    pub fn set_category(&mut self, category_id: Option<i64>) -> Option<CatalogPage> {
        self.category_id = category_id;
        self.matched.is_some().then(|| self.rederive())
    }

    /// Change the sort order; same caching rules as [`Self::set_category`]
    pub fn set_sort(&mut self, sort: SortOrder) -> Option<CatalogPage> {
        self.sort = sort;
        self.matched.is_some().then(|| self.rederive())
    }

    /// Change the status filter. The cached set was fetched with the old
    /// status, so it is dropped and the current term re-searched.
    pub fn set_status(&mut self, status: Option<ProductStatus>) -> Option<SearchTicket> {
        self.status = status;
        match self.term.clone() {
            Some(term) => Some(self.begin_search(&term)),
            None => {
                self.drop_results();
                None
            }
        }
    }

    /// Forget the search entirely; in-flight searches are invalidated too
    pub fn clear_search(&mut self) {
        self.drop_results();
        self.term = None;
        self.issued += 1;
    }

    fn drop_results(&mut self) {
        self.matched = None;
        self.counts.clear();
        self.filtered.clear();
        self.cursor = 0;
    }

    fn rederive(&mut self) -> CatalogPage {
        let matched = self.matched.as_deref().unwrap_or_default();
        self.filtered = engine::derive_view(matched, self.category_id, self.sort);
        self.cursor = 0;
        self.next_page()
    }

    fn next_page(&mut self) -> CatalogPage {
        let offset = self.cursor;
        let end = (offset + self.page_size).min(self.filtered.len());
        let items = self.filtered[offset..end].to_vec();
        self.cursor = end;
        CatalogPage {
            items,
            offset,
            has_more: self.cursor < self.filtered.len(),
            total_count: self.filtered.len(),
            category_counts: self.counts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::engine::tests::{Fixed, product};

    fn catalog(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| {
                let mut p = product(i as i64 + 1, &format!("Filter {i}"), &format!("F-{i}"), (i % 7) as f64);
                p.category_id = Some(if i % 2 == 0 { 10 } else { 20 });
                p
            })
            .collect()
    }

    async fn run(cache: &mut SearchCache, source: &Fixed, term: &str) -> CatalogPage {
        let ticket = cache.begin_search(term);
        let outcome = engine::search(source, ticket.request()).await.unwrap();
        cache.complete_search(ticket, outcome).unwrap()
    }

    fn ids(items: &[Product]) -> Vec<i64> {
        items.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn pages_cover_every_item_once_in_order() {
        for n in 0..=23 {
            for page_size in 1..=7 {
                let source = Fixed(catalog(n));
                let mut cache = SearchCache::new(page_size);
                cache.set_sort(SortOrder::PriceAsc);

                let first = run(&mut cache, &source, "filter").await;
                let mut seen = ids(&first.items);
                let mut has_more = first.has_more;
                let mut calls = 0;
                while has_more {
                    let page = cache.load_more().unwrap();
                    assert_eq!(page.offset, seen.len());
                    seen.extend(ids(&page.items));
                    has_more = page.has_more;
                    calls += 1;
                }

                assert_eq!(calls, n.div_ceil(page_size).saturating_sub(1));
                assert_eq!(seen.len(), first.total_count);
                let mut expected = source.0.clone();
                engine::sort_products(&mut expected, SortOrder::PriceAsc);
                assert_eq!(seen, ids(&expected));
            }
        }
    }

    #[tokio::test]
    async fn load_more_past_the_end_is_empty() {
        let source = Fixed(catalog(3));
        let mut cache = SearchCache::new(5);
        let first = run(&mut cache, &source, "filter").await;
        assert!(!first.has_more);
        let page = cache.load_more().unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn category_and_sort_rederive_without_fetch() {
        let mut cache = SearchCache::new(50);
        run(&mut cache, &Fixed(catalog(10)), "filter").await;

        // the source is gone; only the cached set can answer
        let page = cache.set_category(Some(20)).unwrap();
        assert_eq!(page.total_count, 5);
        assert!(page.items.iter().all(|p| p.category_id == Some(20)));
        assert_eq!(page.category_counts.get(&10), Some(&5));

        let page = cache.set_sort(SortOrder::DateAsc).unwrap();
        assert_eq!(ids(&page.items), [2, 4, 6, 8, 10]);
        assert_eq!(page.offset, 0);
    }

    #[tokio::test]
    async fn stale_search_is_discarded() {
        let source = Fixed(catalog(6));
        let mut cache = SearchCache::new(10);

        let slow = cache.begin_search("filter");
        let fast = cache.begin_search("filter 3");
        let fast_outcome = engine::search(&source, fast.request()).await.unwrap();
        let slow_outcome = engine::search(&source, slow.request()).await.unwrap();

        let page = cache.complete_search(fast, fast_outcome).unwrap();
        assert_eq!(page.total_count, 1);
        assert!(cache.complete_search(slow, slow_outcome).is_none());
        assert_eq!(cache.term(), Some("filter 3"));
        assert_eq!(cache.load_more().unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn status_change_reissues_with_new_status() {
        let mut items = catalog(4);
        items[0].status = ProductStatus::OutOfStock;
        let source = Fixed(items);
        let mut cache = SearchCache::new(10);
        run(&mut cache, &source, "filter").await;

        let ticket = cache.set_status(Some(ProductStatus::OutOfStock)).unwrap();
        assert!(!cache.has_results());
        assert_eq!(ticket.request().status, Some(ProductStatus::OutOfStock));
        assert_eq!(ticket.request().query.as_deref(), Some("filter"));

        let outcome = engine::search(&source, ticket.request()).await.unwrap();
        let page = cache.complete_search(ticket, outcome).unwrap();
        assert_eq!(ids(&page.items), [1]);
    }

    #[tokio::test]
    async fn clear_drops_state_and_in_flight_results() {
        let source = Fixed(catalog(4));
        let mut cache = SearchCache::new(10);
        run(&mut cache, &source, "filter").await;

        let pending = cache.begin_search("filter");
        cache.clear_search();
        let outcome = engine::search(&source, pending.request()).await.unwrap();

        assert!(cache.complete_search(pending, outcome).is_none());
        assert!(cache.term().is_none());
        assert!(cache.load_more().is_none());
        assert!(cache.set_status(None).is_none());
    }
}
