//! Checkout errors and the messages shown for them.

use thiserror::Error;

use storefront::{checkout::ValidationError, documents::DocumentError};

use crate::api::{ApiError, BackendMessage};

/// Shown when the backend reports products that can no longer be ordered.
pub const PRODUCTS_UNAVAILABLE: &str =
    "Some products are no longer available: update your cart and try again.";

/// Shown when order creation fails without a usable backend message.
pub const ORDER_FAILED: &str = "We could not place your order. Please try again.";

/// Shown when opted-in profile changes could not be saved.
pub const PROFILE_SAVE_FAILED: &str = "We could not save your details. Please try again.";

/// Shown when a saved payment method could not be removed.
pub const METHOD_REMOVAL_FAILED: &str = "We could not remove the payment method. Please try again.";

/// Shown when the profile could not be loaded on checkout entry.
pub const SAVED_METHODS_UNAVAILABLE: &str = "Could not load saved payment methods";

/// Attached to a completed order whose documents were not stored.
pub const DOCUMENTS_NOT_SAVED: &str = "Order confirmed, but the documents could not be saved";

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session is signed out; the front end should send the user to sign in.
    #[error("Sign in to complete your order")]
    LoginRequired,

    /// The draft failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Placement was attempted before the review step
    #[error("Review your order before placing it")]
    NotReviewed,

    /// Saved payment methods could not be fetched
    #[error("{SAVED_METHODS_UNAVAILABLE}")]
    Load(#[source] ApiError),

    /// Opted-in profile or payment method changes were not saved
    #[error("{message}")]
    Profile {
        /// Text shown to the user
        message: &'static str,

        /// Failed backend call
        #[source]
        source: ApiError,
    },

    /// The backend refused the order
    #[error("{message}")]
    Order {
        /// Text shown to the user, see [`friendly_order_error`]
        message: String,

        /// Failed backend call
        #[source]
        source: ApiError,
    },

    /// The invoice or summary could not be rendered
    #[error("failed to render order documents: {0}")]
    Document(#[from] DocumentError),
}

impl CheckoutError {
    /// Whether the error is shown inline rather than handled by navigation.
    pub fn is_inline(&self) -> bool {
        !matches!(self, Self::LoginRequired)
    }
}

/// Message to show for a failed order placement.
///
/// A list of backend messages shows its first entry unchanged. A single message reporting
/// unavailable products becomes a friendlier text, other single messages are shown as is, and
/// failures without a usable message fall back to a generic text.
pub fn friendly_order_error(error: &ApiError) -> String {
    match error.backend_message() {
        Some(BackendMessage::Many(messages)) => messages
            .first()
            .cloned()
            .unwrap_or_else(|| ORDER_FAILED.to_string()),
        Some(BackendMessage::One(message)) if !message.trim().is_empty() => {
            if reports_unavailable_products(message) {
                PRODUCTS_UNAVAILABLE.to_string()
            } else {
                message.clone()
            }
        }
        _ => ORDER_FAILED.to_string(),
    }
}

fn reports_unavailable_products(message: &str) -> bool {
    message.contains("Prodotti non validi") || message.contains("non disponibili")
}
