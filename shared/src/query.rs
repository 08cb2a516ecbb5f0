//! Catalog query and paging types

use crate::models::{Product, ProductStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Catalog sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first
    #[default]
    DateDesc,
    DateAsc,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DateDesc => "date_desc",
            Self::DateAsc => "date_asc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_desc" => Ok(Self::DateDesc),
            "date_asc" => Ok(Self::DateAsc),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Search parameters understood by the catalog engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Page handed to the storefront from a cached search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    /// Position of the first item within the filtered list
    pub offset: usize,
    pub has_more: bool,
    /// Size of the category-filtered list
    pub total_count: usize,
    /// Effective category id -> count, computed before category filtering
    pub category_counts: BTreeMap<i64, usize>,
}

/// Paged list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            total.div_ceil(u64::from(limit)) as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Everything on one page
    pub fn single_page(data: Vec<T>) -> Self {
        let total = data.len() as u64;
        Self {
            data,
            total,
            page: 1,
            limit: total as u32,
            total_pages: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response() {
        let resp = PaginatedResponse::new(vec!["a", "b", "c"], 101, 2, 10);
        assert_eq!(resp.total, 101);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 11);

        let single = PaginatedResponse::single_page(vec![1, 2]);
        assert_eq!(single.total_pages, 1);
        assert_eq!(single.limit, 2);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("price_asc".parse::<SortOrder>(), Ok(SortOrder::PriceAsc));
        assert_eq!(SortOrder::default(), SortOrder::DateDesc);
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_search_request_defaults() {
        let req: SearchRequest = serde_json::from_str(r#"{"query":"bosch"}"#).unwrap();
        assert_eq!(req.query.as_deref(), Some("bosch"));
        assert_eq!(req.sort, SortOrder::DateDesc);
        assert!(req.category_id.is_none());
    }
}
