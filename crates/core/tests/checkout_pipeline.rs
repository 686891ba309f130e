//! Integration tests for going from a cart and a filled-in draft to rendered documents.

use jiff::{Timestamp, civil::date, tz::TimeZone};
use rust_decimal::Decimal;
use testresult::TestResult;

use storefront::{
    cart::Cart,
    checkout::{
        CardDetails, CheckoutContext, CheckoutDraft, NewPaymentMethod, PaymentDraft,
        ValidationError, prepare_order,
    },
    documents::render_all,
    payments::{BankTransferDetails, PaymentMethodKind, format_card_number},
    products::find_in_catalogue,
};

fn draft() -> CheckoutDraft {
    CheckoutDraft {
        email: "ada@example.com".to_string(),
        phone: "+39 333 1234567".to_string(),
        shipping_address: "Via Roma 1, Milano".to_string(),
        payment: PaymentDraft::New(NewPaymentMethod::Card(CardDetails {
            holder: "Ada Lovelace".to_string(),
            number: format_card_number("4111111111111111"),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        })),
        notes: "Ring twice".to_string(),
        ..CheckoutDraft::default()
    }
}

#[test]
fn cart_to_documents() -> TestResult {
    let product = find_in_catalogue(2).ok_or("missing product")?;

    let mut cart = Cart::new();
    cart.add(product.clone(), 1);
    cart.add(product, 2);

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Decimal::new(389_97, 2));

    let draft = draft();
    let context = CheckoutContext {
        cart: &cart,
        draft: &draft,
        saved_methods: &[],
        today: date(2026, 10, 14),
    };

    let ordered_at = Timestamp::from_millisecond(1_760_000_000_000)?.to_zoned(TimeZone::UTC);
    let prepared = prepare_order(&context, &BankTransferDetails::default(), ordered_at)?;

    assert_eq!(prepared.payment.method, PaymentMethodKind::Card);
    assert_eq!(prepared.payment.label, "Visa • ****1111");
    assert_eq!(prepared.payload.items.len(), 1);
    assert!(prepared.payload.notes.starts_with("Ring twice | Contact: "));

    let snapshot = prepared.capture.assign(101);
    let (invoice, summary) = render_all(&snapshot)?;

    cart.add(find_in_catalogue(3).ok_or("missing product")?, 4);
    cart.set_quantity(2, 1);
    cart.clear();

    let (invoice_again, summary_again) = render_all(&snapshot)?;

    assert_eq!(invoice_again.bytes, invoice.bytes);
    assert_eq!(summary_again.bytes, summary.bytes);

    assert_eq!(snapshot.total(), Decimal::new(389_97, 2));
    assert!(!invoice.bytes.is_empty());
    assert!(!summary.bytes.is_empty());
    assert_ne!(invoice.bytes, summary.bytes);
    assert!(invoice.file_name.contains("-101-"));
    assert!(summary.file_name.contains("-101-"));

    Ok(())
}

#[test]
fn empty_cart_never_reaches_a_payload() {
    let cart = Cart::new();
    let draft = draft();

    let context = CheckoutContext {
        cart: &cart,
        draft: &draft,
        saved_methods: &[],
        today: date(2026, 10, 14),
    };

    let result = prepare_order(
        &context,
        &BankTransferDetails::default(),
        Timestamp::UNIX_EPOCH.to_zoned(TimeZone::UTC),
    );

    assert_eq!(result.err(), Some(ValidationError::EmptyCart));
}
