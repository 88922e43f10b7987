//! Canonical transaction record shared by ingestion, storage and reporting.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// A single normalized financial movement.
///
/// Field names on the wire follow the spreadsheet/document format
/// (`type`, `subType`, `userId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned id, or a `local-*` id before first persistence
    #[serde(default)]
    pub id: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Signed amount in the ledger currency
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub category: Category,
    #[serde(rename = "subType", default)]
    pub sub_category: Category,
    #[serde(rename = "userId", default)]
    pub owner_id: String,
}

/// Partial update applied by category reassignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(rename = "subType", skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<Category>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: Category,
        sub_category: Category,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            category,
            sub_category,
            owner_id: owner_id.into(),
        }
    }

    /// `YYYY-MM` key of the month this transaction falls in.
    pub fn period_key(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// Apply a reassignment in place.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(sub_category) = &patch.sub_category {
            self.sub_category = sub_category.clone();
        }
    }
}

impl TransactionPatch {
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            sub_category: None,
        }
    }

    pub fn with_sub_category(mut self, sub_category: Category) -> Self {
        self.sub_category = Some(sub_category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.sub_category.is_none()
    }
}
