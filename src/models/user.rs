// Copyright (c) TradePulse Team
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::schema::users;

/// Account role. The account service owns these rows; the feed engine only
/// reads them to decide content eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Free,
    Premium,
    Legacy,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Free => "free",
            Role::Premium => "premium",
            Role::Legacy => "legacy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "free" => Some(Role::Free),
            "premium" => Some(Role::Premium),
            "legacy" => Some(Role::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Free,
    Trial,
    Premium,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Premium => "premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(SubscriptionStatus::Free),
            "trial" => Some(SubscriptionStatus::Trial),
            "premium" => Some(SubscriptionStatus::Premium),
            _ => None,
        }
    }
}

/// Content classification of a post, derived from its `message_type` and
/// `post_type` columns. `Signal` and `TradingAlert` are gated behind the
/// trading-access predicate in `feed::visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentClass {
    General,
    Signal,
    TradingAlert,
    Advertisement,
}

impl ContentClass {
    /// Parse a `message_type` value. Only the restricted classes are valid
    /// message types; everything else is represented as a null column.
    pub fn from_message_type(s: &str) -> Option<Self> {
        match s {
            "signal" => Some(ContentClass::Signal),
            "trading_alert" => Some(ContentClass::TradingAlert),
            _ => None,
        }
    }

    pub fn as_message_type(&self) -> Option<&'static str> {
        match self {
            ContentClass::Signal => Some("signal"),
            ContentClass::TradingAlert => Some("trading_alert"),
            _ => None,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, ContentClass::Signal | ContentClass::TradingAlert)
    }
}

/// Post kind: ordinary community post or an announcement/ad slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    General,
    Ad,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::General => "general",
            PostKind::Ad => "ad",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(PostKind::General),
            "ad" => Some(PostKind::Ad),
            _ => None,
        }
    }
}

/// User descriptor consumed by the feed engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub handle: String,
    pub role: Role,
    pub subscription_status: SubscriptionStatus,
    pub is_beta_user: bool,
}

/// Raw database row for a user.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub handle: String,
    pub role: String,
    pub subscription_status: String,
    pub is_beta_user: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = FeedError;

    fn try_from(row: UserRow) -> Result<Self, FeedError> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| FeedError::Storage(format!("unknown role '{}'", row.role)))?;
        let subscription_status = SubscriptionStatus::parse(&row.subscription_status)
            .ok_or_else(|| {
                FeedError::Storage(format!(
                    "unknown subscription status '{}'",
                    row.subscription_status
                ))
            })?;

        Ok(User {
            id: row.id,
            handle: row.handle,
            role,
            subscription_status,
            is_beta_user: row.is_beta_user,
        })
    }
}
