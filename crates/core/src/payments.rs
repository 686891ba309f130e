//! Payment methods
//!
//! Saved payment methods only ever hold redacted data: a brand, the last four digits and an
//! expiry for cards, an email for PayPal and the last four IBAN characters for bank transfers.
//! Raw card numbers, CVVs and full IBANs never reach a [`SavedPaymentMethod`].

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Payment method kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethodKind {
    /// Credit or debit card
    #[default]
    Card,

    /// PayPal account
    PayPal,

    /// Bank transfer
    Bank,
}

/// A payment method stored on the user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPaymentMethod {
    /// Identifier, client- or server-assigned
    pub id: String,

    /// Kind of method
    pub method: PaymentMethodKind,

    /// Display-safe label
    pub masked_label: String,

    /// Whether this method is preselected at checkout
    #[serde(default)]
    pub is_default: bool,

    /// PayPal account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paypal_email: Option<String>,

    /// Card brand label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_brand: Option<String>,

    /// Last four card digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,

    /// Card expiry, `MM/YY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_expiry: Option<String>,

    /// Last four IBAN characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_iban_last4: Option<String>,
}

impl SavedPaymentMethod {
    /// A saved card, labelled `Brand • **** **** **** 1234 • MM/YY`.
    pub fn card(id: String, brand: CardBrand, last4: &str, expiry: &str, is_default: bool) -> Self {
        Self {
            id,
            method: PaymentMethodKind::Card,
            masked_label: format!("{brand} • **** **** **** {last4} • {expiry}"),
            is_default,
            paypal_email: None,
            card_brand: Some(brand.to_string()),
            card_last4: Some(last4.to_string()),
            card_expiry: Some(expiry.to_string()),
            bank_iban_last4: None,
        }
    }

    /// A saved PayPal account. `email` should already be normalised.
    pub fn paypal(id: String, email: &str, is_default: bool) -> Self {
        Self {
            id,
            method: PaymentMethodKind::PayPal,
            masked_label: format!("PayPal • {}", mask_email(email)),
            is_default,
            paypal_email: Some(email.to_string()),
            card_brand: None,
            card_last4: None,
            card_expiry: None,
            bank_iban_last4: None,
        }
    }

    /// A saved bank transfer to the shop's account.
    pub fn bank(id: String, bank: &BankTransferDetails, is_default: bool) -> Self {
        let last4 = bank.iban_last4();
        let stars = "*".repeat(bank.iban.chars().count().saturating_sub(4).max(4));

        Self {
            id,
            method: PaymentMethodKind::Bank,
            masked_label: format!("Bank transfer • {stars}{last4}"),
            is_default,
            paypal_email: None,
            card_brand: None,
            card_last4: None,
            card_expiry: None,
            bank_iban_last4: Some(last4),
        }
    }
}

/// Card network inferred from the leading digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    /// Starts with `4`
    Visa,

    /// Starts with `51`–`55`
    Mastercard,

    /// Starts with `34` or `37`
    Amex,

    /// Anything else
    Other,
}

impl CardBrand {
    /// Infers the brand from a digits-only card number.
    pub fn infer(digits: &str) -> Self {
        let mut chars = digits.chars();

        match (chars.next(), chars.next()) {
            (Some('4'), _) => Self::Visa,
            (Some('5'), Some('1'..='5')) => Self::Mastercard,
            (Some('3'), Some('4' | '7')) => Self::Amex,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "Amex",
            Self::Other => "Card",
        })
    }
}

/// Bank account the shop asks transfers to be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransferDetails {
    /// Full IBAN, shown to the user
    pub iban: String,

    /// Account holder
    pub holder: String,
}

impl Default for BankTransferDetails {
    fn default() -> Self {
        Self {
            iban: "IT60X0542811101000000123456".to_string(),
            holder: "Static S.r.l.".to_string(),
        }
    }
}

impl BankTransferDetails {
    /// Last four IBAN characters.
    pub fn iban_last4(&self) -> String {
        last_chars(&self.iban, 4)
    }
}

/// Keeps only ASCII digits.
pub fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Last `n` characters of `value`.
pub fn last_chars(value: &str, n: usize) -> String {
    let skip = value.chars().count().saturating_sub(n);

    value.chars().skip(skip).collect()
}

/// Formats card input as up to 16 digits in groups of four, e.g. `4111 1111 1111 1111`.
pub fn format_card_number(value: &str) -> String {
    let digits: String = digits(value).chars().take(16).collect();

    let mut formatted = String::with_capacity(19);

    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && idx % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }

    formatted
}

/// Formats expiry input as `MM/YY`, keeping at most four digits.
pub fn format_expiry(value: &str) -> String {
    let digits: String = digits(value).chars().take(4).collect();

    if digits.len() <= 2 {
        return digits;
    }

    let month: String = digits.chars().take(2).collect();
    let year: String = digits.chars().skip(2).collect();

    format!("{month}/{year}")
}

/// Whether a card number is 16 digits written as four space-separated groups.
pub fn is_grouped_card_number(value: &str) -> bool {
    let value = value.trim();

    value.chars().count() == 19
        && value.chars().enumerate().all(|(idx, c)| {
            if idx % 5 == 4 {
                c.is_whitespace()
            } else {
                c.is_ascii_digit()
            }
        })
}

/// Whether `value` is a `MM/YY` expiry whose month is not before `today`'s month.
pub fn is_valid_future_expiry(value: &str, today: Date) -> bool {
    let Some((month, year)) = value.split_once('/') else {
        return false;
    };

    if month.len() != 2 || year.len() != 2 || !is_all_digits(month) || !is_all_digits(year) {
        return false;
    }

    let (Ok(month), Ok(year)) = (month.parse::<i16>(), year.parse::<i16>()) else {
        return false;
    };

    if !(1..=12).contains(&month) {
        return false;
    }

    let year = 2000 + year;
    let current_year = today.year();
    let current_month = i16::from(today.month());

    year > current_year || (year == current_year && month >= current_month)
}

/// Whether `value` is exactly three digits.
pub fn is_valid_cvv(value: &str) -> bool {
    value.len() == 3 && is_all_digits(value)
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Basic `local@domain.tld` shape check with no whitespace anywhere.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some(at) = value.char_indices().skip(1).find_map(|(idx, c)| (c == '@').then_some(idx))
    else {
        return false;
    };

    value
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > at + 1 && idx + 1 < value.len())
}

/// Masks an email for display, keeping the first two characters of the local part.
pub fn mask_email(value: &str) -> String {
    let mut parts = value.split('@');

    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return "***@***".to_string();
    };

    if local.is_empty() || domain.is_empty() {
        return "***@***".to_string();
    }

    let keep = if local.chars().count() <= 2 { 1 } else { 2 };
    let visible: String = local.chars().take(keep).collect();

    format!("{visible}***@{domain}")
}

/// Sorts default methods first, keeping list order otherwise.
pub fn sort_default_first(methods: &mut [SavedPaymentMethod]) {
    methods.sort_by_key(|method| !method.is_default);
}

/// Methods with `id` removed. When no default is left, the first remaining method becomes it.
pub fn without_method(methods: &[SavedPaymentMethod], id: &str) -> Vec<SavedPaymentMethod> {
    let mut remaining: Vec<SavedPaymentMethod> = methods
        .iter()
        .filter(|method| method.id != id)
        .cloned()
        .collect();

    if !remaining.iter().any(|method| method.is_default)
        && let Some(first) = remaining.first_mut()
    {
        first.is_default = true;
    }

    remaining
}
