//! Documents
//!
//! Renders an [`OrderDocumentSnapshot`] into the two PDFs attached to every order: an invoice
//! carrying the customer's details and notes, and a summary with the item breakdown only.
//!
//! Rendering reads nothing but the snapshot, so the same snapshot always yields the same bytes.

use std::{fmt, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{orders::OrderId, snapshot::OrderDocumentSnapshot};

mod invoice;
mod layout;
mod summary;

pub use invoice::render_invoice;
pub use summary::render_summary;

/// MIME type of every generated document.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Errors raised while writing a PDF.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Building or encoding a PDF object failed.
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Serialising the finished document failed.
    #[error("failed to write PDF: {0}")]
    Io(#[from] io::Error),
}

/// Document kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Invoice with customer and payment details
    Invoice,

    /// Item breakdown
    Summary,
}

impl DocumentKind {
    /// Prefix of the document code and filename.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Summary => "SUM",
        }
    }

    /// Wire name, as used in document request paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Summary => "summary",
        }
    }

    /// Filename used when a stored document comes back without one.
    pub fn fallback_file_name(self, order_id: OrderId) -> String {
        format!("{}-{order_id}.pdf", self.as_str())
    }

    /// Document code for a snapshot, e.g. `INV-42-123456`.
    pub fn code(self, snapshot: &OrderDocumentSnapshot) -> String {
        format!(
            "{}-{}-{}",
            self.prefix(),
            snapshot.order_id(),
            snapshot.timestamp_suffix()
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated PDF and its filename.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Invoice or summary
    pub kind: DocumentKind,

    /// `<PREFIX>-<orderId>-<last6>.pdf`
    pub file_name: String,

    /// PDF bytes
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }
}

impl fmt::Debug for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedDocument")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Renders both documents for a snapshot, invoice first.
///
/// # Errors
///
/// Returns a [`DocumentError`] if either PDF cannot be written.
pub fn render_all(
    snapshot: &OrderDocumentSnapshot,
) -> Result<(RenderedDocument, RenderedDocument), DocumentError> {
    Ok((render_invoice(snapshot)?, render_summary(snapshot)?))
}
