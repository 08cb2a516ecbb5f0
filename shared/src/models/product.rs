//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    InStock,
    OnOrder,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OnOrder => "on_order",
            Self::OutOfStock => "out_of_stock",
            Self::Discontinued => "discontinued",
        }
    }

    /// Whether the part can be shipped (in stock or orderable)
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::InStock | Self::OnOrder)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in_stock" => Ok(Self::InStock),
            "on_order" => Ok(Self::OnOrder),
            "out_of_stock" => Ok(Self::OutOfStock),
            "discontinued" => Ok(Self::Discontinued),
            other => Err(format!("unknown product status '{other}'")),
        }
    }
}

/// Physical condition of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    #[default]
    New,
    Used,
    Refurbished,
}

impl ProductCondition {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Refurbished => "refurbished",
        }
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "new" => Ok(Self::New),
            "used" => Ok(Self::Used),
            "refurbished" => Ok(Self::Refurbished),
            other => Err(format!("unknown product condition '{other}'")),
        }
    }
}

/// SEO metadata shared by products and categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub slug: Option<String>,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Strike-through price shown when the current price is a markdown
    pub original_price: Option<f64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub status: ProductStatus,
    pub condition: ProductCondition,
    pub brand: Option<String>,
    /// Natural key used by import reconciliation
    pub part_number: String,
    pub oem: Option<String>,
    #[serde(default)]
    pub compatibility: Vec<String>,
    pub year: Option<i32>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    /// Image references (storage keys or URLs)
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub seo: SeoMeta,
    pub views: i64,
    pub inquiries: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl Product {
    /// Subcategory when present, otherwise the category.
    pub fn effective_category_id(&self) -> Option<i64> {
        self.subcategory_id.or(self.category_id)
    }

    /// Matches either the category or the subcategory reference.
    pub fn belongs_to(&self, category_id: i64) -> bool {
        self.category_id == Some(category_id) || self.subcategory_id == Some(category_id)
    }
}

/// Create product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub condition: Option<ProductCondition>,
    pub brand: Option<String>,
    pub part_number: String,
    pub oem: Option<String>,
    #[serde(default)]
    pub compatibility: Vec<String>,
    pub year: Option<i32>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub seo: Option<SeoMeta>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub status: Option<ProductStatus>,
    pub condition: Option<ProductCondition>,
    pub brand: Option<String>,
    pub part_number: Option<String>,
    pub oem: Option<String>,
    pub compatibility: Option<Vec<String>>,
    pub year: Option<i32>,
    pub car_brand: Option<String>,
    pub car_model: Option<String>,
    pub images: Option<Vec<String>>,
    pub seo: Option<SeoMeta>,
}
