//! Inquiry Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inquiry workflow status. Transitions are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    #[default]
    New,
    InProgress,
    Completed,
    Cancelled,
}

impl InquiryStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown inquiry status '{other}'")),
        }
    }
}

/// Customer question about a part, optionally with a counter-offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub proposed_price: Option<f64>,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create inquiry payload (public form)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryCreate {
    pub product_id: Option<i64>,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub proposed_price: Option<f64>,
}

/// Status change payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryStatusUpdate {
    pub status: InquiryStatus,
}
