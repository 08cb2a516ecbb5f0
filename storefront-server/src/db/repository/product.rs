//! Product Repository

use super::{RepoError, RepoResult, decode_enum, decode_list, encode_list};
use crate::utils::slug::product_slug;
use shared::models::{Product, ProductCreate, ProductStatus, ProductUpdate, SeoMeta};
use shared::query::SortOrder;
use shared::util::{datetime_from_millis, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, description, price, original_price, category_id, subcategory_id, status, condition, brand, part_number, oem, compatibility, year, car_brand, car_model, images, seo_title, seo_description, seo_keywords, slug, views, inquiries, created_at, updated_at, updated_by";

/// Missing status is read as in stock; SQL filters must agree.
const STATUS_EXPR: &str = "COALESCE(status, 'in_stock')";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    original_price: Option<f64>,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
    status: Option<String>,
    condition: Option<String>,
    brand: Option<String>,
    part_number: String,
    oem: Option<String>,
    compatibility: Option<String>,
    year: Option<i32>,
    car_brand: Option<String>,
    car_model: Option<String>,
    images: Option<String>,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Option<String>,
    slug: Option<String>,
    views: i64,
    inquiries: i64,
    created_at: Option<i64>,
    updated_at: Option<i64>,
    updated_by: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let created_at = datetime_from_millis(row.created_at);
        Product {
            status: decode_enum(row.status.as_deref(), "status", &row.id),
            condition: decode_enum(row.condition.as_deref(), "condition", &row.id),
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            category_id: row.category_id,
            subcategory_id: row.subcategory_id,
            brand: row.brand,
            part_number: row.part_number,
            oem: row.oem,
            compatibility: decode_list(row.compatibility),
            year: row.year,
            car_brand: row.car_brand,
            car_model: row.car_model,
            images: decode_list(row.images),
            seo: SeoMeta {
                title: row.seo_title,
                description: row.seo_description,
                keywords: decode_list(row.seo_keywords),
                slug: row.slug,
            },
            views: row.views,
            inquiries: row.inquiries,
            created_at,
            updated_at: row.updated_at.map_or(created_at, |ms| datetime_from_millis(Some(ms))),
            updated_by: row.updated_by,
        }
    }
}

/// Server-side browse filter (no text query)
#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    pub category_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub sort: SortOrder,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::DateDesc => "created_at DESC, id DESC",
        SortOrder::DateAsc => "created_at ASC, id ASC",
        SortOrder::PriceAsc => "price ASC, id ASC",
        SortOrder::PriceDesc => "price DESC, id DESC",
        SortOrder::NameAsc => "name COLLATE NOCASE ASC, id ASC",
        SortOrder::NameDesc => "name COLLATE NOCASE DESC, id DESC",
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find_by_status(pool: &SqlitePool, status: ProductStatus) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE {STATUS_EXPR} = ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Product::from))
}

/// First stored product with this exact part number (oldest wins)
pub async fn find_by_part_number(pool: &SqlitePool, part_number: &str) -> RepoResult<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE part_number = ? ORDER BY created_at ASC, id ASC LIMIT 1"
    ))
    .bind(part_number)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Product::from))
}

pub async fn find_page(pool: &SqlitePool, query: &BrowseQuery) -> RepoResult<(Vec<Product>, u64)> {
    let limit = query.limit.max(1);
    let offset = u64::from(query.page.max(1) - 1) * u64::from(limit);
    let filter = format!(
        "(?1 IS NULL OR category_id = ?1 OR subcategory_id = ?1) AND (?2 IS NULL OR {STATUS_EXPR} = ?2)"
    );
    let status = query.status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {filter}"))
        .bind(query.category_id)
        .bind(status)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE {filter} ORDER BY {} LIMIT ?3 OFFSET ?4",
        order_clause(query.sort)
    ))
    .bind(query.category_id)
    .bind(status)
    .bind(i64::from(limit))
    .bind(offset as i64)
    .fetch_all(pool)
    .await?;

    Ok((rows.into_iter().map(Product::from).collect(), total.max(0) as u64))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Product count per stored status value
pub async fn count_by_status(pool: &SqlitePool) -> RepoResult<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT {STATUS_EXPR} AS s, COUNT(*) FROM products GROUP BY s ORDER BY s"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Most viewed products
pub async fn find_most_viewed(pool: &SqlitePool, limit: u32) -> RepoResult<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {COLUMNS} FROM products WHERE views > 0 ORDER BY views DESC, id ASC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
}

/// Write a fully-formed product as a new row
pub async fn insert(conn: &mut SqliteConnection, p: &Product) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO products ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)"
    ))
    .bind(p.id)
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price)
    .bind(p.original_price)
    .bind(p.category_id)
    .bind(p.subcategory_id)
    .bind(p.status.as_str())
    .bind(p.condition.as_str())
    .bind(&p.brand)
    .bind(&p.part_number)
    .bind(&p.oem)
    .bind(encode_list(&p.compatibility))
    .bind(p.year)
    .bind(&p.car_brand)
    .bind(&p.car_model)
    .bind(encode_list(&p.images))
    .bind(&p.seo.title)
    .bind(&p.seo.description)
    .bind(encode_list(&p.seo.keywords))
    .bind(&p.seo.slug)
    .bind(p.views)
    .bind(p.inquiries)
    .bind(p.created_at.timestamp_millis())
    .bind(p.updated_at.timestamp_millis())
    .bind(&p.updated_by)
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrite every editable column. Counters and `created_at` are left alone.
pub async fn replace(conn: &mut SqliteConnection, p: &Product) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE products SET name = ?1, description = ?2, price = ?3, original_price = ?4, category_id = ?5, subcategory_id = ?6, status = ?7, condition = ?8, brand = ?9, part_number = ?10, oem = ?11, compatibility = ?12, year = ?13, car_brand = ?14, car_model = ?15, images = ?16, seo_title = ?17, seo_description = ?18, seo_keywords = ?19, slug = ?20, updated_at = ?21, updated_by = ?22 WHERE id = ?23",
    )
    .bind(&p.name)
    .bind(&p.description)
    .bind(p.price)
    .bind(p.original_price)
    .bind(p.category_id)
    .bind(p.subcategory_id)
    .bind(p.status.as_str())
    .bind(p.condition.as_str())
    .bind(&p.brand)
    .bind(&p.part_number)
    .bind(&p.oem)
    .bind(encode_list(&p.compatibility))
    .bind(p.year)
    .bind(&p.car_brand)
    .bind(&p.car_model)
    .bind(encode_list(&p.images))
    .bind(&p.seo.title)
    .bind(&p.seo.description)
    .bind(encode_list(&p.seo.keywords))
    .bind(&p.seo.slug)
    .bind(p.updated_at.timestamp_millis())
    .bind(&p.updated_by)
    .bind(p.id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {} not found", p.id)));
    }
    Ok(())
}

pub async fn delete_with(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Build a new product record from a create payload
pub fn new_product(data: ProductCreate, operator: Option<&str>) -> Product {
    let now = datetime_from_millis(Some(now_millis()));
    let mut seo = data.seo.unwrap_or_default();
    if seo.slug.as_deref().is_none_or(|s| s.trim().is_empty()) {
        seo.slug = Some(product_slug(&data.name, &data.part_number));
    }
    Product {
        id: snowflake_id(),
        name: data.name,
        description: data.description,
        price: data.price,
        original_price: data.original_price,
        category_id: data.category_id,
        subcategory_id: data.subcategory_id,
        status: data.status.unwrap_or_default(),
        condition: data.condition.unwrap_or_default(),
        brand: data.brand,
        part_number: data.part_number.trim().to_string(),
        oem: data.oem,
        compatibility: data.compatibility,
        year: data.year,
        car_brand: data.car_brand,
        car_model: data.car_model,
        images: data.images,
        seo,
        views: 0,
        inquiries: 0,
        created_at: now,
        updated_at: now,
        updated_by: operator.map(str::to_string),
    }
}

pub async fn create(pool: &SqlitePool, data: ProductCreate, operator: Option<&str>) -> RepoResult<Product> {
    let product = new_product(data, operator);
    let mut conn = pool.acquire().await?;
    insert(&mut conn, &product).await?;
    Ok(product)
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: ProductUpdate,
    operator: Option<&str>,
) -> RepoResult<Product> {
    let mut product = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;

    if let Some(v) = data.name {
        product.name = v;
    }
    if let Some(v) = data.description {
        product.description = Some(v);
    }
    if let Some(v) = data.price {
        product.price = v;
    }
    if let Some(v) = data.original_price {
        product.original_price = Some(v);
    }
    if let Some(v) = data.category_id {
        product.category_id = Some(v);
    }
    if let Some(v) = data.subcategory_id {
        product.subcategory_id = Some(v);
    }
    if let Some(v) = data.status {
        product.status = v;
    }
    if let Some(v) = data.condition {
        product.condition = v;
    }
    if let Some(v) = data.brand {
        product.brand = Some(v);
    }
    if let Some(v) = data.part_number {
        product.part_number = v.trim().to_string();
    }
    if let Some(v) = data.oem {
        product.oem = Some(v);
    }
    if let Some(v) = data.compatibility {
        product.compatibility = v;
    }
    if let Some(v) = data.year {
        product.year = Some(v);
    }
    if let Some(v) = data.car_brand {
        product.car_brand = Some(v);
    }
    if let Some(v) = data.car_model {
        product.car_model = Some(v);
    }
    if let Some(v) = data.images {
        product.images = v;
    }
    if let Some(v) = data.seo {
        product.seo = v;
    }
    product.updated_at = datetime_from_millis(Some(now_millis()));
    product.updated_by = operator.map(str::to_string);

    let mut conn = pool.acquire().await?;
    replace(&mut conn, &product).await?;
    Ok(product)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut conn = pool.acquire().await?;
    delete_with(&mut conn, id).await
}

pub async fn increment_views(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE products SET views = views + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn increment_inquiries(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE products SET inquiries = inquiries + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::ProductCondition;

    fn sample(name: &str, part: &str, price: f64) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            part_number: part.into(),
            price,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_find_by_part_number() {
        let db = DbService::in_memory().await.unwrap();
        let created = create(&db.pool, sample("Oil filter", " W712 ", 9.5), Some("op-1"))
            .await
            .unwrap();
        assert_eq!(created.part_number, "W712");
        assert_eq!(created.seo.slug.as_deref(), Some("oil-filter-w712"));

        let found = find_by_part_number(&db.pool, "W712").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.updated_by.as_deref(), Some("op-1"));
        assert_eq!(found.status, ProductStatus::InStock);
    }

    #[tokio::test]
    async fn legacy_rows_are_defaulted_on_read() {
        let db = DbService::in_memory().await.unwrap();
        sqlx::query("INSERT INTO products (id, name, price, part_number, status, compatibility) VALUES (1, 'Legacy', 5, 'L-1', 'weird', 'oops')")
            .execute(&db.pool)
            .await
            .unwrap();

        let p = find_by_id(&db.pool, 1).await.unwrap().unwrap();
        assert_eq!(p.status, ProductStatus::InStock);
        assert_eq!(p.condition, ProductCondition::New);
        assert!(p.compatibility.is_empty());
        assert_eq!(p.created_at, p.updated_at);
    }

    #[tokio::test]
    async fn update_keeps_counters_and_created_at() {
        let db = DbService::in_memory().await.unwrap();
        let p = create(&db.pool, sample("Spark plug", "SP-1", 3.0), None).await.unwrap();
        increment_views(&db.pool, p.id).await.unwrap();
        increment_inquiries(&db.pool, p.id).await.unwrap();

        let updated = update(
            &db.pool,
            p.id,
            ProductUpdate {
                price: Some(4.0),
                status: Some(ProductStatus::OnOrder),
                ..Default::default()
            },
            Some("op-2"),
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 4.0);

        let stored = find_by_id(&db.pool, p.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 1);
        assert_eq!(stored.inquiries, 1);
        assert_eq!(stored.status, ProductStatus::OnOrder);
        assert_eq!(stored.created_at.timestamp_millis(), p.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn browse_page_filters_by_category_or_subcategory() {
        let db = DbService::in_memory().await.unwrap();
        let mut a = sample("A", "A-1", 1.0);
        a.category_id = Some(10);
        let mut b = sample("B", "B-1", 2.0);
        b.category_id = Some(20);
        b.subcategory_id = Some(10);
        let mut c = sample("C", "C-1", 3.0);
        c.category_id = Some(20);
        for p in [a, b, c] {
            create(&db.pool, p, None).await.unwrap();
        }

        let (items, total) = find_page(
            &db.pool,
            &BrowseQuery {
                category_id: Some(10),
                sort: SortOrder::PriceDesc,
                page: 1,
                limit: 10,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), ["B", "A"]);

        let (page2, total) = find_page(
            &db.pool,
            &BrowseQuery {
                sort: SortOrder::PriceAsc,
                page: 2,
                limit: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 3);
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].name, "C");
    }

    #[tokio::test]
    async fn status_filter_treats_missing_as_in_stock() {
        let db = DbService::in_memory().await.unwrap();
        sqlx::query("INSERT INTO products (id, name, price, part_number) VALUES (1, 'No status', 5, 'N-1')")
            .execute(&db.pool)
            .await
            .unwrap();
        let in_stock = find_by_status(&db.pool, ProductStatus::InStock).await.unwrap();
        assert_eq!(in_stock.len(), 1);
        let discontinued = find_by_status(&db.pool, ProductStatus::Discontinued).await.unwrap();
        assert!(discontinued.is_empty());
    }
}
