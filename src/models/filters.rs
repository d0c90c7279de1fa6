use mongodb::bson::{doc, Document};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

// ── Query parameters ──────────────────────────────────────────────────────────

/// Raw list query string. Kept as text so bad numbers surface as our own 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilters {
    pub max_price: Option<String>,
    pub prefix: Option<String>,
    pub limit: Option<String>,
}

/// Parsed list query: two optional AND-ed conditions plus a result cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub max_price: Option<i64>,
    pub prefix: Option<String>,
    pub limit: Option<i64>,
}

impl TryFrom<InventoryFilters> for ListQuery {
    type Error = AppError;

    fn try_from(filters: InventoryFilters) -> AppResult<Self> {
        let max_price = parse_truncated("maxPrice", filters.max_price)?;
        let limit = parse_truncated("limit", filters.limit)?;
        if limit.is_some_and(|limit| limit < 1) {
            return Err(AppError::BadRequest(
                "limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            max_price,
            prefix: filters.prefix.filter(|prefix| !prefix.is_empty()),
            limit,
        })
    }
}

impl ListQuery {
    /// Builds the store filter document. The prefix is escaped so it always
    /// matches literally.
    pub fn to_filter(&self) -> Document {
        let mut filter = doc! {};

        if let Some(max_price) = self.max_price {
            filter.insert("price", doc! { "$lte": max_price });
        }

        if let Some(ref prefix) = self.prefix {
            filter.insert(
                "product",
                doc! {
                    "$regex": format!("^{}", regex::escape(prefix)),
                    "$options": "i",
                },
            );
        }

        filter
    }
}

/// Decimal input is truncated toward zero; empty values count as absent.
fn parse_truncated(name: &str, raw: Option<String>) -> AppResult<Option<i64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Ok(Some(value));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value.trunc() as i64)),
        _ => Err(AppError::BadRequest(format!("{name} must be a number"))),
    }
}
