//! `reqwest` implementation of the commerce API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use storefront::{
    checkout::{NewOrder, ProfilePatch},
    documents::DocumentKind,
    orders::{Order, OrderId},
    products::ProductId,
    users::User,
};

use crate::{
    api::{
        CommerceApi,
        errors::{ApiError, ErrorBody},
        models::{
            AuthResponse, CartItemBody, CreatedOrder, Credentials, DocumentUpload,
            DocumentUploadBody, NewAccount, PasswordChange, ServerCart, StoredDocument,
        },
    },
    session::SessionStore,
};

/// HTTP client for the storefront backend.
///
/// The bearer token is read from the session on every request, so signing in or out takes
/// effect immediately.
#[derive(Debug, Clone)]
pub struct HttpCommerceApi {
    base_url: String,
    http: Client,
    session: SessionStore,
}

impl HttpCommerceApi {
    /// Client for `base_url` with a default `reqwest` client.
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self::with_client(base_url, Client::new(), session)
    }

    /// Client for `base_url` over an existing `reqwest` client. Trailing slashes are dropped.
    #[must_use]
    pub fn with_client(base_url: impl Into<String>, http: Client, session: SessionStore) -> Self {
        let mut base_url = base_url.into();

        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            http,
            session,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let request = self.http.request(method, url);

        match self.session.token() {
            Some(token) => request.bearer_auth(token.expose()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message);

        debug!(status = status.as_u16(), ?message, "backend request failed");

        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json(self.request(Method::GET, path)).await
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut request = self.request(method, path);

        if let Some(body) = body {
            request = request.json(body);
        }

        self.send(request).await?;

        Ok(())
    }
}

#[async_trait]
impl CommerceApi for HttpCommerceApi {
    async fn login(&self, credentials: Credentials) -> Result<AuthResponse, ApiError> {
        self.json(self.request(Method::POST, "/auth/login").json(&credentials))
            .await
    }

    async fn register(&self, account: NewAccount) -> Result<AuthResponse, ApiError> {
        self.json(self.request(Method::POST, "/auth/register").json(&account))
            .await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    async fn update_current_user(&self, patch: ProfilePatch) -> Result<User, ApiError> {
        self.json(self.request(Method::PATCH, "/auth/me").json(&patch))
            .await
    }

    async fn change_password(&self, change: PasswordChange) -> Result<(), ApiError> {
        self.call(Method::PATCH, "/auth/me/password", Some(&change))
            .await
    }

    async fn cart(&self) -> Result<ServerCart, ApiError> {
        self.get("/cart").await
    }

    async fn add_cart_item(&self, product: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = CartItemBody {
            product_id: Some(product),
            quantity,
        };

        self.call(Method::POST, "/cart/items", Some(&body)).await
    }

    async fn update_cart_item(&self, product: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = CartItemBody {
            product_id: None,
            quantity,
        };

        self.call(Method::PUT, &format!("/cart/items/{product}"), Some(&body))
            .await
    }

    async fn remove_cart_item(&self, product: ProductId) -> Result<(), ApiError> {
        self.call::<()>(Method::DELETE, &format!("/cart/items/{product}"), None)
            .await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.call::<()>(Method::DELETE, "/cart", None).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<CreatedOrder, ApiError> {
        self.json(self.request(Method::POST, "/orders").json(&order))
            .await
    }

    async fn upload_documents(
        &self,
        order: OrderId,
        documents: Vec<DocumentUpload>,
    ) -> Result<(), ApiError> {
        let body = DocumentUploadBody {
            documents: &documents,
        };

        self.call(Method::POST, &format!("/orders/{order}/documents"), Some(&body))
            .await
    }

    async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders").await
    }

    async fn order_document(
        &self,
        order: OrderId,
        kind: DocumentKind,
    ) -> Result<StoredDocument, ApiError> {
        self.get(&format!("/orders/{order}/documents/{}", kind.as_str()))
            .await
    }
}
