//! Commerce API
//!
//! The contract the storefront expects from its backend. Every operation is scoped to the
//! session the implementation was built with; unauthenticated calls simply fail.

use async_trait::async_trait;
use mockall::automock;

use storefront::{
    checkout::{NewOrder, ProfilePatch},
    documents::DocumentKind,
    orders::{Order, OrderId},
    products::ProductId,
    users::User,
};

pub mod errors;
pub mod http;
pub mod models;

pub use errors::{ApiError, BackendMessage};
pub use http::HttpCommerceApi;
pub use models::{
    AuthResponse, CreatedOrder, Credentials, DocumentUpload, NewAccount, PasswordChange,
    ServerCart, ServerCartItem, StoredDocument,
};

/// Backend operations the storefront depends on.
#[automock]
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Exchange credentials for an access token and the user it belongs to.
    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError>;

    /// Create an account and sign it in.
    async fn register(&self, account: NewAccount) -> Result<AuthResponse, ApiError>;

    /// Fetch the signed-in user.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Apply a partial profile update and return the updated user.
    async fn update_current_user(&self, patch: ProfilePatch) -> Result<User, ApiError>;

    /// Replace the password after checking the current one.
    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError>;

    /// Fetch the server-side cart.
    async fn cart(&self) -> Result<ServerCart, ApiError>;

    /// Add units of a product to the server cart.
    async fn add_cart_item(&self, product: ProductId, quantity: u32) -> Result<(), ApiError>;

    /// Set the quantity of a server cart line.
    async fn update_cart_item(&self, product: ProductId, quantity: u32) -> Result<(), ApiError>;

    /// Drop a server cart line.
    async fn remove_cart_item(&self, product: ProductId) -> Result<(), ApiError>;

    /// Empty the server cart.
    async fn clear_cart(&self) -> Result<(), ApiError>;

    /// Place an order.
    async fn create_order(&self, order: NewOrder) -> Result<CreatedOrder, ApiError>;

    /// Attach generated documents to an existing order.
    async fn upload_documents(
        &self,
        order: OrderId,
        documents: Vec<DocumentUpload>,
    ) -> Result<(), ApiError>;

    /// List the signed-in user's orders, newest first as the backend returns them.
    async fn orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Fetch one stored document of an order.
    async fn order_document(
        &self,
        order: OrderId,
        kind: DocumentKind,
    ) -> Result<StoredDocument, ApiError>;
}
