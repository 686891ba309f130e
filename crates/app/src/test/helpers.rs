//! Shared fixtures for app tests.

use jiff::{
    Timestamp, Zoned,
    tz::{self, TimeZone},
};
use rust_decimal::Decimal;

use storefront::{
    checkout::{CardDetails, CheckoutDraft, NewPaymentMethod, PaymentDraft},
    orders::{Order, OrderId, OrderLine, OrderStatus},
    payments::format_card_number,
    products::{Product, ProductId, find_in_catalogue},
    users::{Role, User},
};

/// Signed-in customer used across tests.
pub fn user() -> User {
    User {
        id: 1,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        role: Role::User,
        phone: Some("+39 333 1234567".to_string()),
        address: Some("Via Roma 1, Milano".to_string()),
        billing_address: None,
        payment_methods: Vec::new(),
    }
}

/// Catalogue product by id.
pub fn product(id: ProductId) -> Result<Product, &'static str> {
    find_in_catalogue(id).ok_or("product missing from catalogue")
}

/// 2026-10-14 10:00:00.123 in Rome.
pub fn now() -> Zoned {
    Timestamp::constant(1_791_964_800, 123_000_000).to_zoned(TimeZone::fixed(tz::offset(2)))
}

/// A draft paying with a fresh Visa card, ready for review.
pub fn card_draft() -> CheckoutDraft {
    let mut draft = CheckoutDraft::for_user(&user());

    draft.payment = PaymentDraft::New(NewPaymentMethod::Card(CardDetails {
        holder: "Ada Lovelace".to_string(),
        number: format_card_number("4111111111111111"),
        expiry: "12/30".to_string(),
        cvv: "123".to_string(),
    }));

    draft
}

/// A historical order with the given lines.
pub fn order(id: OrderId, status: OrderStatus, items: Vec<OrderLine>) -> Order {
    let total = items
        .iter()
        .map(|line| line.unit_price * Decimal::from(line.quantity))
        .sum();

    Order {
        id,
        total,
        status,
        created_at: Timestamp::UNIX_EPOCH,
        items,
        documents: Vec::new(),
    }
}
