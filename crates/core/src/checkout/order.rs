//! Order payload

use rust_decimal::Decimal;
use serde::Serialize;
use smallvec::SmallVec;

use crate::{cart::Cart, payments::PaymentMethodKind, products::ProductId};

use super::{draft::CheckoutDraft, payment::PaymentSummary};

const NOTES_SEPARATOR: &str = " | ";

/// A line of the order sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    /// Product identifier
    pub product_id: ProductId,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit as shown to the customer
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub unit_price: Decimal,
}

/// Order creation payload. Carries no raw card data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Lines in cart order
    pub items: Vec<NewOrderLine>,

    /// Shipping address
    pub shipping_address: String,

    /// Notes, contact and payment details joined by ` | `
    pub notes: String,
}

impl NewOrder {
    /// Builds the payload from the cart and a validated draft.
    pub fn from_checkout(cart: &Cart, draft: &CheckoutDraft, payment: &PaymentSummary) -> Self {
        let items = cart
            .lines()
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.product.price,
            })
            .collect();

        Self {
            items,
            shipping_address: draft.shipping_address.clone(),
            notes: order_notes(draft, payment),
        }
    }
}

/// Joins the non-empty note fragments.
///
/// Card payments record only a masked placeholder of the security code's length.
pub fn order_notes(draft: &CheckoutDraft, payment: &PaymentSummary) -> String {
    let mut fragments: SmallVec<[String; 5]> = SmallVec::new();

    fragments.push(draft.notes.trim().to_string());
    fragments.push(format!("Contact: {} / {}", draft.email, draft.phone));
    fragments.push(format!("Payment method: {}", payment.label));

    if payment.method == PaymentMethodKind::Card {
        let length = draft.payment.cvv().map_or(0, |cvv| cvv.chars().count());
        fragments.push(format!("CVV provided: {}", "*".repeat(length)));
    }

    fragments.push(format!("Billing address: {}", draft.effective_billing_address()));

    fragments.retain(|fragment| !fragment.is_empty());

    fragments.join(NOTES_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        checkout::payment::{CardDetails, NewPaymentMethod, PaymentDraft},
        products::find_in_catalogue,
    };

    use super::*;

    fn draft(notes: &str) -> CheckoutDraft {
        CheckoutDraft {
            email: "ada@example.com".to_string(),
            phone: "3331234567".to_string(),
            shipping_address: "Via Roma 1".to_string(),
            payment: PaymentDraft::New(NewPaymentMethod::Card(CardDetails {
                holder: "Ada Lovelace".to_string(),
                number: "4111 1111 1111 1111".to_string(),
                expiry: "12/30".to_string(),
                cvv: "123".to_string(),
            })),
            notes: notes.to_string(),
            ..CheckoutDraft::default()
        }
    }

    fn card_summary() -> PaymentSummary {
        PaymentSummary {
            method: PaymentMethodKind::Card,
            label: "Visa • ****1111".to_string(),
        }
    }

    #[test]
    fn card_notes_mask_the_security_code() {
        let notes = order_notes(&draft("  Ring twice "), &card_summary());

        assert_eq!(
            notes,
            "Ring twice | Contact: ada@example.com / 3331234567 | Payment method: Visa • ****1111 \
             | CVV provided: *** | Billing address: Via Roma 1"
        );
    }

    #[test]
    fn blank_notes_and_non_card_methods_skip_fragments() {
        let summary = PaymentSummary {
            method: PaymentMethodKind::Bank,
            label: "Bank transfer".to_string(),
        };

        let mut draft = draft("   ");
        draft.payment = PaymentDraft::New(NewPaymentMethod::Bank);

        assert_eq!(
            order_notes(&draft, &summary),
            "Contact: ada@example.com / 3331234567 | Payment method: Bank transfer \
             | Billing address: Via Roma 1"
        );
    }

    #[test]
    fn payload_carries_no_card_number() -> TestResult {
        let mut cart = Cart::new();
        cart.add(find_in_catalogue(2).ok_or("missing product")?, 3);

        let order = NewOrder::from_checkout(&cart, &draft(""), &card_summary());
        let json = serde_json::to_string(&order)?;

        assert!(!json.contains("4111 1111"));
        assert!(json.contains("CVV provided: ***"));
        assert!(json.contains(r#""productId":2"#));
        assert!(json.contains(r#""unitPrice":129.99"#));

        Ok(())
    }
}
