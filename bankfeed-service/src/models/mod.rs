//! Provider-agnostic account and transaction shapes.
//!
//! Every provider adapter normalizes its native response into these types
//! before anything leaves this service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Last digits of the account number, when the provider exposes them.
    pub mask: Option<String>,
    pub balance: Balance,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub institution: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Balance {
    pub current: f64,
    pub available: Option<f64>,
}

/// A single normalized transaction.
///
/// Sign convention: spending is positive, inflows are negative. Plaid is
/// natively debit-positive and passes through; SimpleFIN is debit-negative
/// and gets inverted during normalization.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub name: String,
    #[serde(rename = "merchantName", skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Vec<String>,
    pub pending: bool,
}

/// Sort transactions most-recent-first.
///
/// The sort is stable; ordering of transactions that share a date is
/// whatever the providers returned and is deliberately unspecified.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}
