//! Category Model

use super::product::SeoMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
///
/// One level of nesting is rendered: roots (`parent_id == None`) and their
/// direct children. Deeper records are kept but never displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    /// Display order among siblings
    pub order: i32,
    pub is_active: bool,
    /// Cached count, recomputed after imports
    pub product_count: i64,
    #[serde(default)]
    pub seo: SeoMeta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub seo: Option<SeoMeta>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub order: Option<i32>,
    pub is_active: Option<bool>,
    pub seo: Option<SeoMeta>,
}

/// Root category with its direct children, as rendered in navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// Navigation node annotated with product counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNodeWithCount {
    #[serde(flatten)]
    pub category: Category,
    /// Own products plus the products of every child
    pub count: usize,
    pub children: Vec<CategoryChildCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChildCount {
    #[serde(flatten)]
    pub category: Category,
    pub count: usize,
}
