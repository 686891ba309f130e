//! Commerce API request and response bodies.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use storefront::{
    cart::CartLine,
    documents::{DocumentKind, RenderedDocument},
    orders::OrderId,
    products::{Product, ProductId},
    users::User,
    wire::null_as_default,
};

/// Login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Plain password, zeroed on drop
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Registration request body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account email
    pub email: String,
    /// Plain password, zeroed on drop
    pub password: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl Drop for NewAccount {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Password change request body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    /// Checked by the backend
    pub current_password: String,
    /// At least [`MIN_PASSWORD_LEN`](crate::account::MIN_PASSWORD_LEN) characters
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange(**redacted**)")
    }
}

impl Drop for PasswordChange {
    fn drop(&mut self) {
        self.current_password.zeroize();
        self.new_password.zeroize();
    }
}

/// Login and registration response.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for later requests
    pub access_token: String,
    /// The signed-in user
    pub user: User,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"**redacted**")
            .field("user", &self.user)
            .finish()
    }
}

/// A line of the server-side cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerCartItem {
    /// Catalogue entry as the backend knows it
    pub product: Product,
    /// Units in the cart
    pub quantity: u32,
}

impl From<ServerCartItem> for CartLine {
    fn from(item: ServerCartItem) -> Self {
        CartLine {
            product: item.product,
            quantity: item.quantity,
        }
    }
}

/// The server-side cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCart {
    /// Lines in server order; `null` decodes as empty
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ServerCartItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartItemBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) product_id: Option<ProductId>,
    pub(crate) quantity: u32,
}

/// Order creation response. Only the id is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedOrder {
    /// Zero when the backend omitted it
    #[serde(default)]
    pub id: OrderId,
}

impl CreatedOrder {
    /// The assigned id, when the backend returned a usable one.
    pub fn order_id(self) -> Option<OrderId> {
        (self.id > 0).then_some(self.id)
    }
}

/// A generated document encoded for upload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    /// Invoice or summary
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Name stored with the order
    pub file_name: String,
    /// Always `application/pdf` for rendered documents
    pub mime_type: String,
    /// Standard base64 of the PDF bytes
    pub data_base64: String,
}

impl From<&RenderedDocument> for DocumentUpload {
    fn from(document: &RenderedDocument) -> Self {
        Self {
            kind: document.kind,
            file_name: document.file_name.clone(),
            mime_type: document.mime_type().to_string(),
            data_base64: BASE64.encode(&document.bytes),
        }
    }
}

impl fmt::Debug for DocumentUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentUpload")
            .field("kind", &self.kind)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data_base64.len())
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentUploadBody<'a> {
    pub(crate) documents: &'a [DocumentUpload],
}

/// A stored document as returned by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    /// Empty when the backend has none
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_name: String,
    /// Empty when the backend has none
    #[serde(default, deserialize_with = "null_as_default")]
    pub mime_type: String,
    /// Standard base64 of the stored bytes
    pub data_base64: String,
}

impl fmt::Debug for StoredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredDocument")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data_base64.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn null_collections_and_names_decode_as_empty() -> TestResult {
        let cart: ServerCart = serde_json::from_str(r#"{"items":null}"#)?;
        let auth: AuthResponse = serde_json::from_str(
            r#"{"accessToken":"t","user":{"id":1,"email":"a@b.co","paymentMethods":null}}"#,
        )?;
        let document: StoredDocument = serde_json::from_str(
            r#"{"fileName":null,"mimeType":null,"dataBase64":"JVBERi0="}"#,
        )?;

        assert!(cart.items.is_empty());
        assert!(auth.user.payment_methods.is_empty());
        assert!(document.file_name.is_empty());
        assert!(document.mime_type.is_empty());

        Ok(())
    }

    #[test]
    fn created_order_without_id_has_none() -> TestResult {
        let created: CreatedOrder = serde_json::from_str("{}")?;

        assert_eq!(created.order_id(), None);
        assert_eq!(CreatedOrder { id: 9 }.order_id(), Some(9));

        Ok(())
    }

    #[test]
    fn uploads_use_backend_field_names() -> TestResult {
        let document = RenderedDocument {
            kind: DocumentKind::Invoice,
            file_name: "INV-1-000001.pdf".to_string(),
            bytes: b"%PDF-1.5".to_vec(),
        };

        let json = serde_json::to_value(DocumentUpload::from(&document))?;

        assert_eq!(
            json,
            serde_json::json!({
                "type": "invoice",
                "fileName": "INV-1-000001.pdf",
                "mimeType": "application/pdf",
                "dataBase64": "JVBERi0xLjU=",
            })
        );

        Ok(())
    }

    #[test]
    fn credentials_debug_hides_password() {
        let credentials = Credentials {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
        };

        assert!(!format!("{credentials:?}").contains("hunter22"));
    }
}
