//! Category Repository

use super::{RepoError, RepoResult, decode_list, encode_list};
use crate::utils::slug::slugify;
use shared::models::{Category, CategoryCreate, CategoryUpdate, SeoMeta};
use shared::util::{datetime_from_millis, now_millis, snowflake_id};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

const COLUMNS: &str = "id, name, slug, description, image, parent_id, sort_order, is_active, product_count, seo_title, seo_description, seo_keywords, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: Option<String>,
    description: Option<String>,
    image: Option<String>,
    parent_id: Option<i64>,
    sort_order: i32,
    is_active: bool,
    product_count: i64,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Option<String>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        let created_at = datetime_from_millis(row.created_at);
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            image: row.image,
            parent_id: row.parent_id,
            order: row.sort_order,
            is_active: row.is_active,
            product_count: row.product_count,
            seo: SeoMeta {
                title: row.seo_title,
                description: row.seo_description,
                keywords: decode_list(row.seo_keywords),
                slug: None,
            },
            created_at,
            updated_at: row.updated_at.map_or(created_at, |ms| datetime_from_millis(Some(ms))),
        }
    }
}

/// Every category, active or not, in display order
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT {COLUMNS} FROM categories ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Category::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let row = sqlx::query_as::<_, CategoryRow>(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Category::from))
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    if let Some(parent_id) = data.parent_id {
        if find_by_id(pool, parent_id).await?.is_none() {
            return Err(RepoError::Validation(format!("Parent category {parent_id} not found")));
        }
    }

    let id = snowflake_id();
    let now = now_millis();
    let seo = data.seo.unwrap_or_default();
    let slug = data
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(&data.name));

    sqlx::query(
        "INSERT INTO categories (id, name, slug, description, image, parent_id, sort_order, is_active, product_count, seo_title, seo_description, seo_keywords, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&slug)
    .bind(&data.description)
    .bind(&data.image)
    .bind(data.parent_id)
    .bind(data.order.unwrap_or(0))
    .bind(data.is_active.unwrap_or(true))
    .bind(&seo.title)
    .bind(&seo.description)
    .bind(encode_list(&seo.keywords))
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    if data.parent_id == Some(id) {
        return Err(RepoError::Validation("Category cannot be its own parent".into()));
    }
    if let Some(parent_id) = data.parent_id {
        if find_by_id(pool, parent_id).await?.is_none() {
            return Err(RepoError::Validation(format!("Parent category {parent_id} not found")));
        }
    }

    let seo = data.seo;
    let rows = sqlx::query(
        "UPDATE categories SET name = COALESCE(?1, name), slug = COALESCE(?2, slug), description = COALESCE(?3, description), image = COALESCE(?4, image), parent_id = COALESCE(?5, parent_id), sort_order = COALESCE(?6, sort_order), is_active = COALESCE(?7, is_active), seo_title = COALESCE(?8, seo_title), seo_description = COALESCE(?9, seo_description), seo_keywords = COALESCE(?10, seo_keywords), updated_at = ?11 WHERE id = ?12",
    )
    .bind(data.name)
    .bind(data.slug)
    .bind(data.description)
    .bind(data.image)
    .bind(data.parent_id)
    .bind(data.order)
    .bind(data.is_active)
    .bind(seo.as_ref().and_then(|s| s.title.clone()))
    .bind(seo.as_ref().and_then(|s| s.description.clone()))
    .bind(seo.as_ref().map(|s| encode_list(&s.keywords)))
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Ids of `root` and every descendant, collected with an explicit worklist.
///
/// Parent cycles in stored data are tolerated: each id is visited once.
pub fn collect_subtree(categories: &[Category], root: i64) -> Vec<i64> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for c in categories {
        if let Some(parent) = c.parent_id {
            children.entry(parent).or_default().push(c.id);
        }
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }
    order
}

/// Delete a category and all of its descendants in one transaction.
/// Returns the number of rows removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<usize> {
    let all = find_all(pool).await?;
    if !all.iter().any(|c| c.id == id) {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    let ids = collect_subtree(&all, id);

    let mut tx = pool.begin().await?;
    for cid in &ids {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(cid)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(ids.len())
}

/// Persist recomputed counts; categories absent from `counts` get 0.
pub async fn store_product_counts(pool: &SqlitePool, counts: &HashMap<i64, usize>) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE categories SET product_count = 0")
        .execute(&mut *tx)
        .await?;
    for (id, count) in counts {
        sqlx::query("UPDATE categories SET product_count = ? WHERE id = ?")
            .bind(*count as i64)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn create_payload(name: &str, parent_id: Option<i64>, order: i32) -> CategoryCreate {
        CategoryCreate {
            name: name.into(),
            parent_id,
            order: Some(order),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn delete_cascades_to_all_descendants() {
        let db = DbService::in_memory().await.unwrap();
        let engine = create(&db.pool, create_payload("Двигатель", None, 1)).await.unwrap();
        let filters = create(&db.pool, create_payload("Фильтры", Some(engine.id), 1))
            .await
            .unwrap();
        create(&db.pool, create_payload("Масляные", Some(filters.id), 1))
            .await
            .unwrap();
        let body = create(&db.pool, create_payload("Кузов", None, 2)).await.unwrap();

        assert_eq!(engine.slug.as_deref(), Some("dvigatel"));

        let removed = delete(&db.pool, engine.id).await.unwrap();
        assert_eq!(removed, 3);

        let left = find_all(&db.pool).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, body.id);
    }

    #[tokio::test]
    async fn update_rejects_self_parent_and_missing_parent() {
        let db = DbService::in_memory().await.unwrap();
        let c = create(&db.pool, create_payload("Brakes", None, 0)).await.unwrap();

        let err = update(
            &db.pool,
            c.id,
            CategoryUpdate {
                parent_id: Some(c.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let err = create(&db.pool, create_payload("Orphan", Some(42), 0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn store_counts_resets_missing_categories() {
        let db = DbService::in_memory().await.unwrap();
        let a = create(&db.pool, create_payload("A", None, 0)).await.unwrap();
        let b = create(&db.pool, create_payload("B", None, 1)).await.unwrap();

        store_product_counts(&db.pool, &HashMap::from([(a.id, 3), (b.id, 1)]))
            .await
            .unwrap();
        store_product_counts(&db.pool, &HashMap::from([(a.id, 2)]))
            .await
            .unwrap();

        assert_eq!(find_by_id(&db.pool, a.id).await.unwrap().unwrap().product_count, 2);
        assert_eq!(find_by_id(&db.pool, b.id).await.unwrap().unwrap().product_count, 0);
    }

    #[test]
    fn subtree_survives_parent_cycles() {
        let now = chrono::Utc::now();
        let cat = |id: i64, parent: Option<i64>| Category {
            id,
            name: format!("c{id}"),
            slug: None,
            description: None,
            image: None,
            parent_id: parent,
            order: 0,
            is_active: true,
            product_count: 0,
            seo: SeoMeta::default(),
            created_at: now,
            updated_at: now,
        };
        let cats = vec![cat(1, Some(3)), cat(2, Some(1)), cat(3, Some(2)), cat(4, None)];
        let mut ids = collect_subtree(&cats, 1);
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
