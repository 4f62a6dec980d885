//! Persisted record shapes.
//!
//! Field names follow the camelCase JSON the rest of the site writes into
//! local storage, so existing slots decode unchanged.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_USER_STATUS: &str = "active";

/// Emails are identities and compare case-insensitively.
pub fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Calendar date in UTC as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Millisecond timestamp id. Two records created in the same millisecond share it.
pub fn generate_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub date: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub plan: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    pub duration: String,
    pub start_date: String,
    pub end_date: String,
    pub status: InvestmentStatus,
}

/// One entry of `registeredUsers`.
///
/// Keys this type does not know about are kept in `extra` and written back
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investments: Option<Vec<Investment>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Missing balance reads as zero.
    pub fn balance_or_zero(&self) -> Decimal {
        self.balance.unwrap_or_default()
    }

    /// New record for an email not yet registered. Absent patch fields get defaults.
    pub fn from_patch(patch: UserPatch) -> Self {
        let mut record = Self {
            email: patch.email.clone(),
            name: String::new(),
            password: String::new(),
            balance: Some(Decimal::ZERO),
            status: DEFAULT_USER_STATUS.to_string(),
            joined: today(),
            is_verified: None,
            transactions: None,
            investments: None,
            extra: Map::new(),
        };
        record.apply(patch);
        record
    }

    /// Shallow merge: fields present in the patch win, the rest stay.
    pub fn apply(&mut self, patch: UserPatch) {
        let UserPatch {
            email,
            name,
            password,
            balance,
            status,
            joined,
            is_verified,
        } = patch;

        self.email = email;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(password) = password {
            self.password = password;
        }
        if let Some(balance) = balance {
            self.balance = Some(balance);
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(joined) = joined {
            self.joined = joined;
        }
        if let Some(is_verified) = is_verified {
            self.is_verified = Some(is_verified);
        }
    }
}

/// Partial update for [`UserRecord`]. `email` identifies the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: String,
    pub name: Option<String>,
    pub password: Option<String>,
    pub balance: Option<Decimal>,
    pub status: Option<String>,
    pub joined: Option<String>,
    pub is_verified: Option<bool>,
}

impl UserPatch {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// The `user` slot: who is signed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    pub fn balance_or_zero(&self) -> Decimal {
        self.balance.unwrap_or_default()
    }

    /// Overwrites the public fields with the authoritative record's values.
    pub fn project(mut self, record: &UserRecord) -> Self {
        self.email = record.email.clone();
        self.name = record.name.clone();
        self.balance = Some(record.balance_or_zero());
        self.status = record.status.clone();
        self.joined = record.joined.clone();
        self.is_verified = record.is_verified;
        self
    }
}

impl From<&UserRecord> for SessionUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            email: record.email.clone(),
            name: record.name.clone(),
            balance: Some(record.balance_or_zero()),
            status: record.status.clone(),
            joined: record.joined.clone(),
            is_verified: record.is_verified,
            extra: Map::new(),
        }
    }
}
