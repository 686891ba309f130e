//! Users

use serde::{Deserialize, Serialize};

use crate::{payments::SavedPaymentMethod, wire::null_as_default};

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer
    #[default]
    User,

    /// Shop administrator
    Admin,
}

/// User profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub id: u64,

    /// Given name
    #[serde(default)]
    pub first_name: String,

    /// Family name
    #[serde(default)]
    pub last_name: String,

    /// Contact email
    pub email: String,

    /// Account role
    #[serde(default)]
    pub role: Role,

    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Shipping address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Billing address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,

    /// Saved, redacted payment methods
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_methods: Vec<SavedPaymentMethod>,
}

impl User {
    /// Given and family name joined by a space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
