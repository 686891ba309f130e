//! Payment entry and labels

use std::fmt;

use zeroize::Zeroize;

use crate::payments::{
    BankTransferDetails, CardBrand, PaymentMethodKind, SavedPaymentMethod, digits, last_chars,
};

/// Card fields as typed by the customer. Wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    /// Name printed on the card
    pub holder: String,

    /// Card number, `1234 5678 9012 3456`
    pub number: String,

    /// Expiry, `MM/YY`
    pub expiry: String,

    /// Security code
    pub cvv: String,
}

impl CardDetails {
    /// Card number digits only.
    pub fn number_digits(&self) -> String {
        digits(&self.number)
    }

    /// Brand inferred from the number.
    pub fn brand(&self) -> CardBrand {
        CardBrand::infer(&self.number_digits())
    }

    /// Last four digits of the number.
    pub fn last4(&self) -> String {
        last_chars(&self.number_digits(), 4)
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CardDetails(**redacted**)")
    }
}

impl Drop for CardDetails {
    fn drop(&mut self) {
        self.number.zeroize();
        self.expiry.zeroize();
        self.cvv.zeroize();
    }
}

/// A payment method entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewPaymentMethod {
    /// Card
    Card(CardDetails),

    /// PayPal account
    PayPal {
        /// Account email as typed
        email: String,
    },

    /// Transfer to the shop's bank account
    Bank,
}

impl NewPaymentMethod {
    /// Empty entry for `kind`.
    pub fn empty(kind: PaymentMethodKind) -> Self {
        match kind {
            PaymentMethodKind::Card => Self::Card(CardDetails::default()),
            PaymentMethodKind::PayPal => Self::PayPal {
                email: String::new(),
            },
            PaymentMethodKind::Bank => Self::Bank,
        }
    }

    /// Kind of the entry.
    pub fn kind(&self) -> PaymentMethodKind {
        match self {
            Self::Card(_) => PaymentMethodKind::Card,
            Self::PayPal { .. } => PaymentMethodKind::PayPal,
            Self::Bank => PaymentMethodKind::Bank,
        }
    }
}

/// Security code typed for a saved card. Wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecurityCode(String);

impl SecurityCode {
    /// Wrap a typed code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as typed.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecurityCode(**redacted**)")
    }
}

impl Drop for SecurityCode {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// How the customer is paying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDraft {
    /// A method already saved on the profile
    Saved {
        /// Selected method, if any
        method_id: Option<String>,

        /// Security code, required for saved cards
        cvv: SecurityCode,
    },

    /// A freshly entered method
    New(NewPaymentMethod),
}

impl Default for PaymentDraft {
    fn default() -> Self {
        Self::New(NewPaymentMethod::empty(PaymentMethodKind::Card))
    }
}

impl PaymentDraft {
    /// Select a saved method.
    pub fn saved(method_id: impl Into<String>) -> Self {
        Self::Saved {
            method_id: Some(method_id.into()),
            cvv: SecurityCode::default(),
        }
    }

    /// Whether a saved method is in use.
    pub fn uses_saved_method(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// The selected saved method id, if any.
    pub fn saved_method_id(&self) -> Option<&str> {
        match self {
            Self::Saved { method_id, .. } => method_id.as_deref(),
            Self::New(_) => None,
        }
    }

    /// The security code typed for this payment, if the kind asks for one.
    pub fn cvv(&self) -> Option<&str> {
        match self {
            Self::Saved { cvv, .. } => Some(cvv.as_str()),
            Self::New(NewPaymentMethod::Card(card)) => Some(&card.cvv),
            Self::New(_) => None,
        }
    }
}

/// The method recorded on an order and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    /// Kind of method charged
    pub method: PaymentMethodKind,

    /// Human-readable, masked label
    pub label: String,
}

/// Derives the method and label for the current payment entry.
///
/// A saved selection uses the stored label. A selection that no longer resolves to a saved
/// method yields `None`.
pub fn describe_payment(
    payment: &PaymentDraft,
    saved: &[SavedPaymentMethod],
    bank: &BankTransferDetails,
) -> Option<PaymentSummary> {
    match payment {
        PaymentDraft::Saved { method_id, .. } => {
            let id = method_id.as_deref()?;
            let method = saved.iter().find(|method| method.id == id)?;

            Some(PaymentSummary {
                method: method.method,
                label: method.masked_label.clone(),
            })
        }
        PaymentDraft::New(entry) => {
            let label = match entry {
                NewPaymentMethod::Card(card) => format!("{} • ****{}", card.brand(), card.last4()),
                NewPaymentMethod::PayPal { email } => {
                    format!("PayPal • {}", normalize_email(email))
                }
                NewPaymentMethod::Bank => format!(
                    "Bank transfer to {}, account holder {}",
                    bank.iban, bank.holder
                ),
            };

            Some(PaymentSummary {
                method: entry.kind(),
                label,
            })
        }
    }
}

/// Trims and lower-cases an email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
