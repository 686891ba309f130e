//! Order snapshots
//!
//! Documents are rendered from a copy of the order fixed at submission time rather than from the
//! live cart. An [`OrderCapture`] is taken right before the order is sent; once the backend
//! assigns an id it becomes an [`OrderDocumentSnapshot`], which has no mutating methods.

use jiff::Zoned;
use rust_decimal::Decimal;

use crate::{
    cart::{Cart, CartLine},
    money::line_total,
    orders::OrderId,
    products::ProductSpecs,
};

/// A cart line as it was when the order was submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotLine {
    /// Product name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Decimal,

    /// Product specs, falling back to the catalogue ones
    pub specs: Option<ProductSpecs>,
}

impl SnapshotLine {
    /// Unit price times quantity.
    pub fn subtotal(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

impl From<&CartLine> for SnapshotLine {
    fn from(line: &CartLine) -> Self {
        Self {
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: line.product.price,
            specs: line.product.specs_or_fallback(),
        }
    }
}

/// What the customer entered, as printed on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    /// Contact email
    pub email: String,

    /// Contact phone
    pub phone: String,

    /// Shipping address
    pub shipping_address: String,

    /// Billing address
    pub billing_address: String,

    /// Masked payment method label
    pub payment_label: String,

    /// Free-text notes, trimmed
    pub notes: String,
}

/// Order contents captured before submission, still waiting for an order id.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCapture {
    ordered_at: Zoned,
    lines: Vec<SnapshotLine>,
    total: Decimal,
    customer: CustomerDetails,
}

impl OrderCapture {
    /// Copies the cart lines and total.
    pub fn new(cart: &Cart, customer: CustomerDetails, ordered_at: Zoned) -> Self {
        Self {
            ordered_at,
            lines: cart.lines().iter().map(SnapshotLine::from).collect(),
            total: cart.total(),
            customer,
        }
    }

    /// Captured lines
    pub fn lines(&self) -> &[SnapshotLine] {
        &self.lines
    }

    /// Captured total
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Fixes the capture under the id the backend assigned.
    pub fn assign(self, order_id: OrderId) -> OrderDocumentSnapshot {
        OrderDocumentSnapshot {
            order_id,
            ordered_at: self.ordered_at,
            lines: self.lines,
            total: self.total,
            customer: self.customer,
        }
    }
}

/// Immutable input to document rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDocumentSnapshot {
    order_id: OrderId,
    ordered_at: Zoned,
    lines: Vec<SnapshotLine>,
    total: Decimal,
    customer: CustomerDetails,
}

impl OrderDocumentSnapshot {
    /// Order id
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Submission time
    pub fn ordered_at(&self) -> &Zoned {
        &self.ordered_at
    }

    /// Lines
    pub fn lines(&self) -> &[SnapshotLine] {
        &self.lines
    }

    /// Total charged
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Customer details
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Last six digits of the submission time in Unix milliseconds, zero padded.
    pub fn timestamp_suffix(&self) -> String {
        let millis = self.ordered_at.timestamp().as_millisecond();

        format!("{:06}", millis.rem_euclid(1_000_000))
    }

    /// Submission date as `dd/mm/yyyy` in the captured time zone.
    pub fn formatted_date(&self) -> String {
        self.ordered_at.strftime("%d/%m/%Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, tz::TimeZone};
    use testresult::TestResult;

    use crate::products::find_in_catalogue;

    use super::*;

    fn ordered_at() -> Result<Zoned, jiff::Error> {
        let timestamp = Timestamp::from_millisecond(1_760_000_123_456)?;

        Ok(timestamp.to_zoned(TimeZone::fixed(jiff::tz::offset(2))))
    }

    #[test]
    fn capture_is_independent_of_the_live_cart() -> TestResult {
        let mut cart = Cart::new();
        cart.add(find_in_catalogue(2).ok_or("missing product")?, 3);

        let capture = OrderCapture::new(&cart, CustomerDetails::default(), ordered_at()?);

        cart.clear();
        cart.add(find_in_catalogue(1).ok_or("missing product")?, 1);

        let snapshot = capture.assign(42);

        assert_eq!(snapshot.lines().len(), 1);
        assert_eq!(
            snapshot.lines().first().map(|line| line.name.as_str()),
            Some("Parallette M")
        );
        assert_eq!(snapshot.total(), Decimal::new(389_97, 2));

        Ok(())
    }

    #[test]
    fn missing_specs_fall_back_by_slug() -> TestResult {
        let mut product = find_in_catalogue(1).ok_or("missing product")?;
        product.specs = None;

        let mut cart = Cart::new();
        cart.add(product, 1);

        let capture = OrderCapture::new(&cart, CustomerDetails::default(), ordered_at()?);

        let specs = capture
            .lines()
            .first()
            .and_then(|line| line.specs.clone())
            .ok_or("expected fallback specs")?;

        assert_eq!(specs.height, "30 cm");

        Ok(())
    }

    #[test]
    fn suffix_and_date_follow_the_capture_time() -> TestResult {
        let snapshot =
            OrderCapture::new(&Cart::new(), CustomerDetails::default(), ordered_at()?).assign(7);

        assert_eq!(snapshot.timestamp_suffix(), "123456");
        assert_eq!(snapshot.formatted_date(), "09/10/2025");

        Ok(())
    }
}
