//! Checkout
//!
//! The pure half of checkout: the form draft, its validation rules, payment labels, the
//! profile update for opted-in saves, and the order payload. Going from a validated draft to
//! something sendable is [`prepare_order`].

use jiff::Zoned;

use crate::{
    payments::BankTransferDetails,
    snapshot::{CustomerDetails, OrderCapture},
};

mod draft;
mod order;
mod payment;
mod profile;
mod validation;

pub use draft::CheckoutDraft;
pub use order::{NewOrder, NewOrderLine, order_notes};
pub use payment::{
    CardDetails, NewPaymentMethod, PaymentDraft, PaymentSummary, SecurityCode, describe_payment,
    normalize_email,
};
pub use profile::{ProfilePatch, checkout_profile_patch, wants_profile_update};
pub use validation::{CheckoutContext, ValidationError, validate};

/// A validated order ready to send, with the capture its documents will be rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedOrder {
    /// Payload for the backend
    pub payload: NewOrder,

    /// Cart and customer details at submission time
    pub capture: OrderCapture,

    /// Method charged and its label
    pub payment: PaymentSummary,
}

/// Validates the checkout and builds the order payload and document capture.
///
/// # Errors
///
/// Returns the first failing [`ValidationError`].
pub fn prepare_order(
    context: &CheckoutContext<'_>,
    bank: &BankTransferDetails,
    ordered_at: Zoned,
) -> Result<PreparedOrder, ValidationError> {
    validate(context)?;

    let draft = context.draft;

    let payment = describe_payment(&draft.payment, context.saved_methods, bank)
        .ok_or(ValidationError::NoSavedMethodSelected)?;

    let payload = NewOrder::from_checkout(context.cart, draft, &payment);

    let customer = CustomerDetails {
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        shipping_address: draft.shipping_address.clone(),
        billing_address: draft.effective_billing_address().to_string(),
        payment_label: payment.label.clone(),
        notes: draft.notes.trim().to_string(),
    };

    let capture = OrderCapture::new(context.cart, customer, ordered_at);

    Ok(PreparedOrder {
        payload,
        capture,
        payment,
    })
}
