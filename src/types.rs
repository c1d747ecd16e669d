//! Shared domain types decoded from API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's registration status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registration {
    #[default]
    Dummy,
    Confirmed,
    Invited,
}

/// How often an expense repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    Never,
    Weekly,
    Fortnightly,
    Monthly,
    Yearly,
}

impl RepeatInterval {
    /// The wire name used in form fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Weekly => "weekly",
            Self::Fortnightly => "fortnightly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// The kind of group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    #[default]
    Other,
    Apartment,
    House,
    Trip,
}

impl GroupType {
    /// The wire name used in form fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Trip => "trip",
        }
    }
}

/// Avatar URLs at several sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// Per-notification-type email preferences, only present for the current
/// user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSet {
    pub added_as_friend: bool,
    pub added_to_group: bool,
    pub expense_added: bool,
    pub expense_updated: bool,
    pub bills: bool,
    pub payments: bool,
    pub monthly_summary: bool,
    pub announcements: bool,
}

/// An account on the service.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub picture: Picture,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "registration_status", default)]
    pub registration: Registration,

    // Only populated for the current user.
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// The last time notifications were marked as read.
    #[serde(default)]
    pub notifications_read: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notifications_count: i64,
    #[serde(default)]
    pub notifications: Option<NotificationSet>,
}

/// An expense category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
}

/// An amount owed in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub currency_code: String,
    pub amount: String,
}
