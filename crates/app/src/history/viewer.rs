//! On-demand viewing of stored order documents.

use std::{fmt, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::warn;

use storefront::{
    documents::{DocumentKind, PDF_MIME_TYPE},
    orders::OrderId,
};

use crate::{
    api::CommerceApi,
    blobs::{BlobRegistry, ObjectUrl},
    history::HistoryError,
};

/// A fetched document and the URL it is shown from.
#[derive(Debug)]
pub struct OpenDocument {
    /// Order the document belongs to
    pub order_id: OrderId,
    /// Invoice or summary
    pub kind: DocumentKind,
    /// Backend name, or `<kind>-<order>.pdf`
    pub file_name: String,
    /// Backend type, or `application/pdf`
    pub mime_type: String,
    /// Live until the document is replaced or closed
    pub url: ObjectUrl,
}

/// A single document pane. Opening a document replaces the previous one and releases its URL.
pub struct DocumentViewer {
    api: Arc<dyn CommerceApi>,
    blobs: BlobRegistry,
    current: Option<OpenDocument>,
}

impl fmt::Debug for DocumentViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentViewer")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl DocumentViewer {
    /// An empty viewer.
    #[must_use]
    pub fn new(api: Arc<dyn CommerceApi>, blobs: BlobRegistry) -> Self {
        Self {
            api,
            blobs,
            current: None,
        }
    }

    /// The document on show.
    pub fn current(&self) -> Option<&OpenDocument> {
        self.current.as_ref()
    }

    /// Fetch and show a stored document.
    ///
    /// A failed fetch leaves the current document open.
    ///
    /// # Errors
    ///
    /// Returns an error when the document cannot be fetched or decoded.
    pub async fn open(
        &mut self,
        order_id: OrderId,
        kind: DocumentKind,
    ) -> Result<&OpenDocument, HistoryError> {
        let stored = self
            .api
            .order_document(order_id, kind)
            .await
            .map_err(|error| {
                warn!(%error, order = order_id, %kind, "failed to fetch order document");
                HistoryError::DocumentFetch(error)
            })?;

        let bytes = BASE64.decode(stored.data_base64.trim()).map_err(|error| {
            warn!(%error, order = order_id, %kind, "stored order document is not valid base64");
            HistoryError::DocumentDecode(error)
        })?;

        let mime_type = non_empty_or(stored.mime_type, || PDF_MIME_TYPE.to_string());
        let file_name = non_empty_or(stored.file_name, || kind.fallback_file_name(order_id));

        self.close();

        let url = self.blobs.create(bytes, &mime_type);

        Ok(self.current.insert(OpenDocument {
            order_id,
            kind,
            file_name,
            mime_type,
            url,
        }))
    }

    /// Close the pane and release its URL.
    pub fn close(&mut self) {
        self.current = None;
    }
}

fn non_empty_or(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}
