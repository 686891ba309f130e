//! Order history
//!
//! Lists past orders split into incomplete and confirmed groups, shows their stored documents
//! through a [`DocumentViewer`], and puts a past order back into the cart.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{debug, info, warn};

use storefront::orders::{Order, OrderGroups, group_orders};

use crate::{
    api::{ApiError, CommerceApi},
    cart::CartStore,
    context::AppContext,
    session::SessionStore,
};

mod viewer;

pub use viewer::{DocumentViewer, OpenDocument};

/// Failures while browsing past orders.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No one is signed in
    #[error("Sign in to see your orders")]
    LoginRequired,

    /// The order list could not be fetched
    #[error("Could not load your orders")]
    Load(#[source] ApiError),

    /// The stored document could not be fetched
    #[error("Document not available")]
    DocumentFetch(#[source] ApiError),

    /// The stored document was not valid base64
    #[error("Document not available")]
    DocumentDecode(#[source] base64::DecodeError),

    /// The order has no lines
    #[error("This order has no products to reorder")]
    NothingToReorder,

    /// Adding a line to the server cart failed
    #[error("Could not add this order to your cart")]
    Reorder(#[source] ApiError),
}

/// The signed-in user's orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderList {
    /// Newest first, as the backend returns them
    pub orders: Vec<Order>,
}

impl OrderList {
    /// Pending orders apart from the rest.
    pub fn groups(&self) -> OrderGroups<'_> {
        group_orders(&self.orders)
    }

    /// Order with the given id.
    pub fn find(&self, id: u64) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }
}

/// Past orders of the signed-in user.
#[derive(Clone)]
pub struct OrderHistory {
    api: Arc<dyn CommerceApi>,
    session: SessionStore,
    cart: CartStore,
}

impl fmt::Debug for OrderHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderHistory")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl OrderHistory {
    /// History over the shared stores.
    #[must_use]
    pub fn new(context: &AppContext) -> Self {
        Self {
            api: context.api.clone(),
            session: context.session.clone(),
            cart: context.cart.clone(),
        }
    }

    /// Fetch the order list.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::LoginRequired`] when signed out, or [`HistoryError::Load`]
    /// when the backend call fails.
    pub async fn load(&self) -> Result<OrderList, HistoryError> {
        self.require_session()?;

        let orders = self.api.orders().await.map_err(|error| {
            warn!(%error, "failed to load order history");
            HistoryError::Load(error)
        })?;

        Ok(OrderList { orders })
    }

    /// Add every line of `order` to the server cart, re-sync, and open the cart.
    ///
    /// Lines are added one at a time in order; lines without a resolvable product are skipped.
    ///
    /// A failed re-sync leaves the local cart as it was and still opens it.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NothingToReorder`] for an order without lines, or
    /// [`HistoryError::Reorder`] on the first failed add.
    pub async fn reorder(&self, order: &Order) -> Result<(), HistoryError> {
        self.require_session()?;

        if order.items.is_empty() {
            return Err(HistoryError::NothingToReorder);
        }

        for line in &order.items {
            let Some(product) = line.product_id() else {
                debug!(order = order.id, line = line.id, "skipping line without a product");
                continue;
            };

            self.api
                .add_cart_item(product, line.quantity)
                .await
                .map_err(|error| {
                    warn!(%error, order = order.id, product, "reorder failed");
                    HistoryError::Reorder(error)
                })?;
        }

        if let Err(error) = self.cart.sync_from_backend().await {
            warn!(%error, order = order.id, "cart re-sync after reorder failed");
        }

        self.cart.open_cart();

        info!(order = order.id, "order added back to the cart");

        Ok(())
    }

    fn require_session(&self) -> Result<(), HistoryError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(HistoryError::LoginRequired)
        }
    }
}
