//! Category product counts
//!
//! Counts are always recomputed from a full product scan and grouped by
//! effective category; nothing maintains them incrementally.

use super::engine::count_by_effective_category;
use crate::db::repository::{RepoResult, category, product};
use shared::models::Product;
use sqlx::SqlitePool;
use std::collections::HashMap;

/// Effective category -> number of products
pub fn effective_counts(products: &[Product]) -> HashMap<i64, usize> {
    count_by_effective_category(products).into_iter().collect()
}

/// Recompute and persist `product_count` on every category
pub async fn recalculate_category_counts(pool: &SqlitePool) -> RepoResult<HashMap<i64, usize>> {
    let products = product::find_all(pool).await?;
    let counts = effective_counts(&products);
    category::store_product_counts(pool, &counts).await?;
    tracing::info!(
        products = products.len(),
        categories = counts.len(),
        "Category product counts recalculated"
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{CategoryCreate, ProductCreate};

    #[tokio::test]
    async fn counts_group_by_subcategory_first() {
        let db = DbService::in_memory().await.unwrap();
        let root = category::create(
            &db.pool,
            CategoryCreate {
                name: "Lighting".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let child = category::create(
            &db.pool,
            CategoryCreate {
                name: "Headlights".into(),
                parent_id: Some(root.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let empty = category::create(
            &db.pool,
            CategoryCreate {
                name: "Mirrors".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for (part, sub) in [("H1", Some(child.id)), ("H2", Some(child.id)), ("L1", None)] {
            product::create(
                &db.pool,
                ProductCreate {
                    name: format!("Lamp {part}"),
                    part_number: part.into(),
                    price: 10.0,
                    category_id: Some(root.id),
                    subcategory_id: sub,
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        }

        let counts = recalculate_category_counts(&db.pool).await.unwrap();
        assert_eq!(counts.get(&child.id), Some(&2));
        assert_eq!(counts.get(&root.id), Some(&1));

        let stored = |id| {
            let pool = db.pool.clone();
            async move { category::find_by_id(&pool, id).await.unwrap().unwrap().product_count }
        };
        assert_eq!(stored(child.id).await, 2);
        assert_eq!(stored(root.id).await, 1);
        assert_eq!(stored(empty.id).await, 0);
    }
}
