//! Profile updates
//!
//! Builds the partial profile update sent when the customer opts to save their details or a
//! newly entered payment method.

use serde::{Deserialize, Serialize};

use crate::payments::{BankTransferDetails, PaymentMethodKind, SavedPaymentMethod};

use super::{
    draft::CheckoutDraft,
    payment::{NewPaymentMethod, PaymentDraft, normalize_email},
};

/// Partial profile update. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Contact phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Shipping address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Billing address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<String>,

    /// Full replacement list of saved methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<SavedPaymentMethod>>,
}

impl ProfilePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// A patch replacing only the saved methods.
    pub fn payment_methods(methods: Vec<SavedPaymentMethod>) -> Self {
        Self {
            payment_methods: Some(methods),
            ..Self::default()
        }
    }
}

/// Whether the draft asks for anything to be saved to the profile.
pub fn wants_profile_update(draft: &CheckoutDraft) -> bool {
    draft.save_profile || (draft.save_payment_method && !draft.payment.uses_saved_method())
}

/// Builds the profile update for the opted-in parts of the draft.
///
/// `existing` is the profile's current method list. A new method is only appended when none of
/// `existing` already matches it, and becomes the default only when `existing` is empty.
/// `new_id` is called at most once, for the appended method.
pub fn checkout_profile_patch(
    draft: &CheckoutDraft,
    existing: &[SavedPaymentMethod],
    bank: &BankTransferDetails,
    new_id: impl FnOnce() -> String,
) -> ProfilePatch {
    let mut patch = ProfilePatch::default();

    if draft.save_profile {
        patch.email = Some(draft.email.trim().to_string());
        patch.phone = Some(draft.phone.trim().to_string());
        patch.address = Some(draft.shipping_address.trim().to_string());
        patch.billing_address = Some(draft.effective_billing_address().trim().to_string());
    }

    if draft.save_payment_method
        && let PaymentDraft::New(entry) = &draft.payment
        && let Some(method) = method_to_save(entry, existing, bank, new_id)
    {
        let mut methods = existing.to_vec();
        methods.push(method);

        patch.payment_methods = Some(methods);
    }

    patch
}

fn method_to_save(
    entry: &NewPaymentMethod,
    existing: &[SavedPaymentMethod],
    bank: &BankTransferDetails,
    new_id: impl FnOnce() -> String,
) -> Option<SavedPaymentMethod> {
    let is_default = existing.is_empty();

    match entry {
        NewPaymentMethod::Card(card) => {
            let brand = card.brand().to_string();
            let last4 = card.last4();

            let duplicate = existing.iter().any(|method| {
                method.method == PaymentMethodKind::Card
                    && method.card_brand.as_deref() == Some(brand.as_str())
                    && method.card_last4.as_deref() == Some(last4.as_str())
                    && method.card_expiry.as_deref() == Some(card.expiry.as_str())
            });

            (!duplicate).then(|| {
                SavedPaymentMethod::card(new_id(), card.brand(), &last4, &card.expiry, is_default)
            })
        }
        NewPaymentMethod::PayPal { email } => {
            let email = normalize_email(email);

            let duplicate = existing.iter().any(|method| {
                method.method == PaymentMethodKind::PayPal
                    && method
                        .paypal_email
                        .as_deref()
                        .is_some_and(|saved| saved.to_lowercase() == email)
            });

            (!duplicate).then(|| SavedPaymentMethod::paypal(new_id(), &email, is_default))
        }
        NewPaymentMethod::Bank => {
            let last4 = bank.iban_last4();

            let duplicate = existing.iter().any(|method| {
                method.method == PaymentMethodKind::Bank
                    && method.bank_iban_last4.as_deref() == Some(last4.as_str())
            });

            (!duplicate).then(|| SavedPaymentMethod::bank(new_id(), bank, is_default))
        }
    }
}
