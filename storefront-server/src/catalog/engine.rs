//! Product search, filter and sort
//!
//! The store is asked for the complete product set (status equality is the
//! only filter it applies); word matching, category filtering, counting and
//! sorting happen in memory.

use super::normalize::{normalize, normalize_field, search_words};
use crate::db::repository::{RepoResult, product};
use async_trait::async_trait;
use shared::error::{AppError, AppResult};
use shared::models::{Product, ProductStatus};
use shared::query::{SearchRequest, SortOrder};
use sqlx::SqlitePool;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Where the engine reads products from
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Every product, optionally restricted to one status
    async fn fetch_products(&self, status: Option<ProductStatus>) -> RepoResult<Vec<Product>>;
}

#[async_trait]
impl ProductSource for SqlitePool {
    async fn fetch_products(&self, status: Option<ProductStatus>) -> RepoResult<Vec<Product>> {
        match status {
            Some(status) => product::find_by_status(self, status).await,
            None => product::find_all(self).await,
        }
    }
}

/// Result of one engine run
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Text and status filtered, before category filtering
    pub matched: Vec<Product>,
    /// Category filtered and sorted
    pub items: Vec<Product>,
    pub total_count: usize,
    /// Effective category -> count over `matched`
    pub category_counts: BTreeMap<i64, usize>,
}

/// AND over words, OR over name / part number / brand / OEM.
pub fn text_matches(product: &Product, words: &[String]) -> bool {
    let fields = [
        normalize(&product.name),
        normalize(&product.part_number),
        normalize_field(product.brand.as_deref().into()),
        normalize_field(product.oem.as_deref().into()),
    ];
    words
        .iter()
        .all(|word| fields.iter().any(|f| f.contains(word.as_str())))
}

/// Apply the free-text query.
///
/// Blank query: everything passes. A query with text that normalizes to no
/// words (only punctuation): nothing passes.
pub fn filter_by_text(products: Vec<Product>, query: Option<&str>) -> Vec<Product> {
    let Some(query) = query.filter(|q| !q.trim().is_empty()) else {
        return products;
    };
    let words = search_words(query);
    if words.is_empty() {
        return Vec::new();
    }
    products
        .into_iter()
        .filter(|p| text_matches(p, &words))
        .collect()
}

/// Count products per effective category (subcategory, else category)
pub fn count_by_effective_category(products: &[Product]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for id in products.iter().filter_map(Product::effective_category_id) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

/// Collation key for name ordering: case-folded with `ё` sorted as `е`
pub fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

fn compare_names(a: &Product, b: &Product) -> Ordering {
    collation_key(&a.name)
        .cmp(&collation_key(&b.name))
        .then_with(|| a.name.cmp(&b.name))
}

/// Sort in place. Equal keys fall back to id so output is deterministic.
pub fn sort_products(products: &mut [Product], sort: SortOrder) {
    match sort {
        SortOrder::DateDesc => products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id))),
        SortOrder::DateAsc => products.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))),
        SortOrder::PriceAsc => products.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.id.cmp(&b.id))),
        SortOrder::PriceDesc => products.sort_by(|a, b| b.price.total_cmp(&a.price).then(a.id.cmp(&b.id))),
        SortOrder::NameAsc => products.sort_by(|a, b| compare_names(a, b).then(a.id.cmp(&b.id))),
        SortOrder::NameDesc => products.sort_by(|a, b| compare_names(b, a).then(a.id.cmp(&b.id))),
    }
}

/// Category filter plus sort over an already text-filtered set
pub fn derive_view(matched: &[Product], category_id: Option<i64>, sort: SortOrder) -> Vec<Product> {
    let mut items: Vec<Product> = match category_id {
        Some(id) => matched.iter().filter(|p| p.belongs_to(id)).cloned().collect(),
        None => matched.to_vec(),
    };
    sort_products(&mut items, sort);
    items
}

/// Run a full search against the store
pub async fn search<S>(source: &S, request: &SearchRequest) -> AppResult<SearchOutcome>
where
    S: ProductSource + ?Sized,
{
    let products = source.fetch_products(request.status).await.map_err(|e| {
        tracing::error!(error = %e, "Product search failed");
        AppError::search_failed("Product search failed")
    })?;

    let mut matched = filter_by_text(products, request.query.as_deref());
    if let Some(status) = request.status {
        matched.retain(|p| p.status == status);
    }

    let category_counts = count_by_effective_category(&matched);
    let items = derive_view(&matched, request.category_id, request.sort);

    tracing::debug!(
        query = ?request.query,
        matched = matched.len(),
        returned = items.len(),
        "Catalog search"
    );

    Ok(SearchOutcome {
        total_count: items.len(),
        matched,
        items,
        category_counts,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repository::RepoError;
    use chrono::{Duration, Utc};
    use shared::models::{ProductCondition, SeoMeta};

    pub(crate) fn product(id: i64, name: &str, part: &str, price: f64) -> Product {
        let created = Utc::now() - Duration::minutes(100 - id);
        Product {
            id,
            name: name.into(),
            description: None,
            price,
            original_price: None,
            category_id: None,
            subcategory_id: None,
            status: ProductStatus::InStock,
            condition: ProductCondition::New,
            brand: None,
            part_number: part.into(),
            oem: None,
            compatibility: Vec::new(),
            year: None,
            car_brand: None,
            car_model: None,
            images: Vec::new(),
            seo: SeoMeta::default(),
            views: 0,
            inquiries: 0,
            created_at: created,
            updated_at: created,
            updated_by: None,
        }
    }

    pub(crate) struct Fixed(pub Vec<Product>);

    #[async_trait]
    impl ProductSource for Fixed {
        async fn fetch_products(&self, status: Option<ProductStatus>) -> RepoResult<Vec<Product>> {
            Ok(self
                .0
                .iter()
                .filter(|p| status.is_none_or(|s| p.status == s))
                .cloned()
                .collect())
        }
    }

    struct Broken;

    #[async_trait]
    impl ProductSource for Broken {
        async fn fetch_products(&self, _: Option<ProductStatus>) -> RepoResult<Vec<Product>> {
            Err(RepoError::Database("connection reset".into()))
        }
    }

    fn ids(items: &[Product]) -> Vec<i64> {
        items.iter().map(|p| p.id).collect()
    }

    #[test]
    fn words_are_and_fields_are_or() {
        let mut p1 = product(1, "Brake Pad Front", "BP-100", 10.0);
        p1.brand = Some("Bosch".into());
        let p2 = product(2, "Brake Disc", "BD-200", 20.0);
        let mut p3 = product(3, "Oil Filter", "OF-1", 5.0);
        p3.oem = Some("BP100".into());

        let found = filter_by_text(vec![p1, p2, p3], Some("brake bosch"));
        assert_eq!(ids(&found), [1]);
    }

    #[test]
    fn punctuation_variants_meet() {
        let p = product(1, "Filter", "W-712/75", 1.0);
        assert_eq!(filter_by_text(vec![p.clone()], Some("w 712 75")).len(), 1);
        assert_eq!(filter_by_text(vec![p.clone()], Some("712.75")).len(), 1);
        assert_eq!(filter_by_text(vec![p], Some("71275")).len(), 0);
    }

    #[test]
    fn blank_and_punctuation_only_queries() {
        let all = vec![product(1, "A", "1", 1.0), product(2, "B", "2", 1.0)];
        assert_eq!(filter_by_text(all.clone(), None).len(), 2);
        assert_eq!(filter_by_text(all.clone(), Some("   ")).len(), 2);
        assert!(filter_by_text(all, Some("-- //")).is_empty());
    }

    #[test]
    fn name_sort_is_case_and_yo_insensitive() {
        let mut items = vec![
            product(1, "ёлочный фильтр", "1", 1.0),
            product(2, "Ель", "2", 1.0),
            product(3, "ежевика", "3", 1.0),
            product(4, "Жгут", "4", 1.0),
            product(5, "абажур", "5", 1.0),
        ];
        sort_products(&mut items, SortOrder::NameAsc);
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["абажур", "ежевика", "ёлочный фильтр", "Ель", "Жгут"]);

        sort_products(&mut items, SortOrder::NameDesc);
        assert_eq!(items[0].name, "Жгут");
        assert_eq!(items[4].name, "абажур");
    }

    #[test]
    fn equal_names_keep_id_order_both_ways() {
        let mut items = vec![product(9, "Фара", "9", 1.0), product(4, "Фара", "4", 1.0), product(6, "Бампер", "6", 1.0)];
        sort_products(&mut items, SortOrder::NameAsc);
        assert_eq!(ids(&items), [6, 4, 9]);
        sort_products(&mut items, SortOrder::NameDesc);
        assert_eq!(ids(&items), [4, 9, 6]);
    }

    #[test]
    fn price_and_date_sorts_break_ties_by_id() {
        let mut items = vec![
            product(3, "c", "3", 5.0),
            product(1, "a", "1", 5.0),
            product(2, "b", "2", 1.0),
        ];
        sort_products(&mut items, SortOrder::PriceAsc);
        assert_eq!(ids(&items), [2, 1, 3]);
        sort_products(&mut items, SortOrder::PriceDesc);
        assert_eq!(ids(&items), [1, 3, 2]);
        sort_products(&mut items, SortOrder::DateDesc);
        assert_eq!(ids(&items), [3, 2, 1]);
        sort_products(&mut items, SortOrder::DateAsc);
        assert_eq!(ids(&items), [1, 2, 3]);
    }

    #[tokio::test]
    async fn counts_ignore_category_filter() {
        let mut a = product(1, "Pad A", "1", 1.0);
        a.category_id = Some(10);
        let mut b = product(2, "Pad B", "2", 1.0);
        b.category_id = Some(10);
        b.subcategory_id = Some(11);
        let mut c = product(3, "Pad C", "3", 1.0);
        c.category_id = Some(20);
        let source = Fixed(vec![a, b, c]);

        let outcome = search(
            &source,
            &SearchRequest {
                query: Some("pad".into()),
                category_id: Some(11),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(ids(&outcome.items), [2]);
        assert_eq!(outcome.total_count, 1);
        assert_eq!(outcome.matched.len(), 3);
        assert_eq!(outcome.category_counts, BTreeMap::from([(10, 1), (11, 1), (20, 1)]));
    }

    #[tokio::test]
    async fn category_filter_matches_either_reference() {
        let mut a = product(1, "A", "1", 1.0);
        a.category_id = Some(10);
        let mut b = product(2, "B", "2", 1.0);
        b.category_id = Some(20);
        b.subcategory_id = Some(10);
        let outcome = search(
            &Fixed(vec![a, b]),
            &SearchRequest {
                category_id: Some(10),
                sort: SortOrder::DateAsc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&outcome.items), [1, 2]);
    }

    #[tokio::test]
    async fn status_filter_is_equality() {
        let mut a = product(1, "A", "1", 1.0);
        a.status = ProductStatus::Discontinued;
        let b = product(2, "B", "2", 1.0);
        let outcome = search(
            &Fixed(vec![a, b]),
            &SearchRequest {
                status: Some(ProductStatus::InStock),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ids(&outcome.items), [2]);
    }

    #[tokio::test]
    async fn store_failure_is_search_failed() {
        let err = search(&Broken, &SearchRequest::default()).await.unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::SearchFailed);
    }
}
