//! Orders

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{documents::DocumentKind, products::ProductId, wire::null_as_default};

/// Backend-assigned order identifier.
pub type OrderId = u64;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed but not yet confirmed
    Pending,

    /// Confirmed and being prepared
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Received by the customer
    Delivered,

    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Whether the order still needs completing.
    pub fn is_incomplete(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Product reference embedded in an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    /// Product identifier
    pub id: ProductId,

    /// Product name at the time of the order
    pub name: String,
}

/// A line of a historical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Line identifier
    pub id: u64,

    /// Product identifier, when the backend sends it flat
    #[serde(default)]
    pub product_id: Option<ProductId>,

    /// Units ordered
    pub quantity: u32,

    /// Price paid per unit
    pub unit_price: Decimal,

    /// Embedded product, when the backend expands it
    #[serde(default)]
    pub product: Option<OrderProduct>,
}

impl OrderLine {
    /// Product identifier from either the flat field or the embedded product.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
            .or_else(|| self.product.as_ref().map(|product| product.id))
    }
}

/// Metadata for a document stored against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    /// Document identifier
    pub id: u64,

    /// Invoice or summary
    #[serde(rename = "type")]
    pub kind: DocumentKind,

    /// Stored filename
    pub file_name: String,

    /// Stored MIME type
    pub mime_type: String,

    /// Upload time
    pub created_at: Timestamp,
}

/// A past order as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    pub id: OrderId,

    /// Amount charged
    pub total: Decimal,

    /// Current status
    pub status: OrderStatus,

    /// Placement time
    pub created_at: Timestamp,

    /// Ordered lines
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderLine>,

    /// Stored documents
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<DocumentMeta>,
}

impl Order {
    /// Whether a document of `kind` was stored for this order.
    pub fn has_document(&self, kind: DocumentKind) -> bool {
        self.documents.iter().any(|document| document.kind == kind)
    }
}

/// Orders split for display: pending ones first, everything else after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderGroups<'a> {
    /// Orders with status pending
    pub incomplete: Vec<&'a Order>,

    /// Orders with any other status
    pub confirmed: Vec<&'a Order>,
}

/// Partitions orders into incomplete and confirmed groups, preserving order.
pub fn group_orders(orders: &[Order]) -> OrderGroups<'_> {
    let (incomplete, confirmed): (Vec<&Order>, Vec<&Order>) = orders
        .iter()
        .partition(|order| order.status.is_incomplete());

    OrderGroups {
        incomplete,
        confirmed,
    }
}
