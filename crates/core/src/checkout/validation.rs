//! Checkout validation
//!
//! Rules run in a fixed order and the first failure is reported alone.

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    cart::Cart,
    payments::{
        PaymentMethodKind, SavedPaymentMethod, digits, is_grouped_card_number,
        is_valid_cvv, is_valid_email, is_valid_future_expiry,
    },
};

use super::{
    draft::CheckoutDraft,
    payment::{NewPaymentMethod, PaymentDraft},
};

const MIN_PHONE_DIGITS: usize = 8;

/// A checkout rule that failed. `Display` is the message shown to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Contact email missing or malformed
    #[error("Enter a valid email address")]
    InvalidEmail,

    /// Fewer than eight phone digits
    #[error("Enter a valid phone number")]
    InvalidPhone,

    /// Shipping address blank
    #[error("Enter a shipping address")]
    MissingShippingAddress,

    /// Billing address blank
    #[error("Enter a billing address")]
    MissingBillingAddress,

    /// Saved-method mode without a resolvable selection
    #[error("Select a saved payment method or enter a new one")]
    NoSavedMethodSelected,

    /// Security code is not three digits
    #[error("Enter a valid CVV")]
    InvalidCvv,

    /// Cardholder name blank
    #[error("Enter the name on the card")]
    MissingCardHolder,

    /// Card number is not 16 grouped digits
    #[error("Invalid card number: use 16 digits formatted as 1234 5678 9012 3456")]
    InvalidCardNumber,

    /// Expiry malformed or in the past
    #[error("Invalid expiry date (MM/YY)")]
    InvalidExpiry,

    /// PayPal email malformed
    #[error("Enter a valid PayPal email")]
    InvalidPayPalEmail,

    /// Nothing to order
    #[error("Your cart is empty")]
    EmptyCart,

    /// A line asks for more than is in stock
    #[error("Product out of stock: update your cart to continue.")]
    OutOfStock,
}

/// What validation looks at.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutContext<'a> {
    /// Live cart
    pub cart: &'a Cart,

    /// Form state
    pub draft: &'a CheckoutDraft,

    /// Saved methods on the profile
    pub saved_methods: &'a [SavedPaymentMethod],

    /// Current date for expiry checks
    pub today: Date,
}

/// Checks every checkout rule in order.
///
/// # Errors
///
/// Returns the first failing rule.
pub fn validate(context: &CheckoutContext<'_>) -> Result<(), ValidationError> {
    let draft = context.draft;

    if draft.email.trim().is_empty() || !is_valid_email(&draft.email) {
        return Err(ValidationError::InvalidEmail);
    }

    if digits(&draft.phone).len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone);
    }

    if draft.shipping_address.trim().is_empty() {
        return Err(ValidationError::MissingShippingAddress);
    }

    if draft.effective_billing_address().trim().is_empty() {
        return Err(ValidationError::MissingBillingAddress);
    }

    validate_payment(&draft.payment, context.saved_methods, context.today)?;

    if context.cart.is_empty() {
        return Err(ValidationError::EmptyCart);
    }

    if context.cart.has_out_of_stock_lines() {
        return Err(ValidationError::OutOfStock);
    }

    Ok(())
}

fn validate_payment(
    payment: &PaymentDraft,
    saved: &[SavedPaymentMethod],
    today: Date,
) -> Result<(), ValidationError> {
    match payment {
        PaymentDraft::Saved { method_id, cvv } => {
            let selected = method_id
                .as_deref()
                .and_then(|id| saved.iter().find(|method| method.id == id))
                .ok_or(ValidationError::NoSavedMethodSelected)?;

            if selected.method == PaymentMethodKind::Card && !is_valid_cvv(cvv.as_str()) {
                return Err(ValidationError::InvalidCvv);
            }
        }
        PaymentDraft::New(NewPaymentMethod::Card(card)) => {
            if card.holder.trim().is_empty() {
                return Err(ValidationError::MissingCardHolder);
            }

            if card.number_digits().len() != 16 || !is_grouped_card_number(&card.number) {
                return Err(ValidationError::InvalidCardNumber);
            }

            if !is_valid_future_expiry(&card.expiry, today) {
                return Err(ValidationError::InvalidExpiry);
            }

            if !is_valid_cvv(&card.cvv) {
                return Err(ValidationError::InvalidCvv);
            }
        }
        PaymentDraft::New(NewPaymentMethod::PayPal { email }) => {
            if !is_valid_email(email.trim()) {
                return Err(ValidationError::InvalidPayPalEmail);
            }
        }
        PaymentDraft::New(NewPaymentMethod::Bank) => {}
    }

    Ok(())
}
