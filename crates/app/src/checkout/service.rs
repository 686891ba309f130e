//! Checkout orchestration over the live session, cart and backend.

use std::{fmt, sync::Arc};

use tracing::{error, info, warn};
use uuid::Uuid;

use storefront::{
    checkout::{
        CheckoutContext, CheckoutDraft, PaymentDraft, PreparedOrder, ProfilePatch,
        checkout_profile_patch, prepare_order, validate, wants_profile_update,
    },
    documents::{RenderedDocument, render_all},
    orders::OrderId,
    payments::{
        BankTransferDetails, PaymentMethodKind, SavedPaymentMethod, sort_default_first,
        without_method,
    },
    snapshot::OrderDocumentSnapshot,
    users::User,
};

use crate::{
    api::{ApiError, CommerceApi, DocumentUpload},
    blobs::{BlobRegistry, ObjectUrl},
    cart::CartStore,
    checkout::errors::{
        CheckoutError, DOCUMENTS_NOT_SAVED, METHOD_REMOVAL_FAILED, PROFILE_SAVE_FAILED,
        friendly_order_error,
    },
    clock::Clock,
    context::AppContext,
    session::SessionStore,
};

/// A generated document and the URL it can be previewed at.
#[derive(Debug)]
pub struct GeneratedDocument {
    /// Rendered PDF
    pub document: RenderedDocument,
    /// Revoked when the document is dropped
    pub url: ObjectUrl,
}

/// Outcome of a placed order.
#[derive(Debug)]
pub struct CompletedOrder {
    /// Id assigned by the backend, when it returned one
    pub order_id: Option<OrderId>,

    /// Invoice and summary, empty when no id came back
    pub documents: Vec<GeneratedDocument>,

    /// Non-blocking problem to surface next to the confirmation
    pub warning: Option<&'static str>,
}

/// Where a checkout visit is.
#[derive(Debug, Default)]
pub enum CheckoutStep {
    /// Filling in the draft
    #[default]
    Editing,
    /// Validated draft awaiting confirmation
    Review,
    /// Order placed
    Completed(CompletedOrder),
}

impl CheckoutStep {
    /// Whether the draft is waiting on confirmation.
    pub fn is_review(&self) -> bool {
        matches!(self, Self::Review)
    }
}

/// One checkout visit: the draft being edited, the step it is on, and the current error.
pub struct CheckoutSession {
    api: Arc<dyn CommerceApi>,
    session: SessionStore,
    cart: CartStore,
    clock: Arc<dyn Clock>,
    blobs: BlobRegistry,
    bank: BankTransferDetails,
    draft: CheckoutDraft,
    saved_methods: Vec<SavedPaymentMethod>,
    step: CheckoutStep,
    error: Option<String>,
}

impl fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("draft", &self.draft)
            .field("saved_methods", &self.saved_methods.len())
            .field("step", &self.step)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl CheckoutSession {
    /// Start a visit with the draft prefilled from the signed-in user.
    #[must_use]
    pub fn new(context: &AppContext) -> Self {
        let mut draft = CheckoutDraft::default();

        if let Some(user) = context.session.user() {
            draft.prefill(&user);
        }

        Self {
            api: context.api.clone(),
            session: context.session.clone(),
            cart: context.cart.clone(),
            clock: context.clock.clone(),
            blobs: context.blobs.clone(),
            bank: context.bank.clone(),
            draft,
            saved_methods: Vec::new(),
            step: CheckoutStep::Editing,
            error: None,
        }
    }

    /// The draft as currently filled in.
    pub fn draft(&self) -> &CheckoutDraft {
        &self.draft
    }

    /// The draft for editing. Any shown error stays until the next transition.
    pub fn draft_mut(&mut self) -> &mut CheckoutDraft {
        &mut self.draft
    }

    /// Saved methods, default first.
    pub fn saved_methods(&self) -> &[SavedPaymentMethod] {
        &self.saved_methods
    }

    /// Current step.
    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    /// The placed order, once checkout has completed.
    pub fn completed(&self) -> Option<&CompletedOrder> {
        match &self.step {
            CheckoutStep::Completed(completed) => Some(completed),
            CheckoutStep::Editing | CheckoutStep::Review => None,
        }
    }

    /// Message to show inline, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Account shown for bank transfers.
    pub fn bank(&self) -> &BankTransferDetails {
        &self.bank
    }

    /// Refresh the profile, pre-fill the draft and select the first saved method.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::LoginRequired`] when signed out, or [`CheckoutError::Load`]
    /// when the profile could not be fetched.
    pub async fn load(&mut self) -> Result<(), CheckoutError> {
        self.require_session()?;

        let user = self.api.current_user().await.map_err(|source| {
            warn!(%source, "failed to load profile for checkout");
            self.fail(CheckoutError::Load(source))
        })?;

        self.session.update_user(user.clone());
        self.draft.prefill(&user);
        self.adopt_methods(user);
        self.draft.select_initial_method(&self.saved_methods);
        self.error = None;

        Ok(())
    }

    /// Select a saved method, asking again for its security code.
    pub fn select_saved_method(&mut self, id: &str) {
        if self.saved_methods.iter().any(|method| method.id == id) {
            self.draft.payment = PaymentDraft::saved(id);
        }
    }

    /// Switch to entering a new method of `kind`.
    pub fn use_new_method(&mut self, kind: PaymentMethodKind) {
        self.draft.use_new_method(kind);
    }

    /// Validate, save what the user opted into, and move to review.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or [`CheckoutError::Profile`] when opted-in
    /// changes could not be saved. The step is left unchanged.
    pub async fn go_to_review(&mut self) -> Result<(), CheckoutError> {
        if matches!(self.step, CheckoutStep::Completed(_)) {
            return Err(CheckoutError::NotReviewed);
        }

        self.require_session()?;

        let today = self.clock.now().date();
        let cart = self.cart.snapshot();

        let context = CheckoutContext {
            cart: &cart,
            draft: &self.draft,
            saved_methods: &self.saved_methods,
            today,
        };

        if let Err(error) = validate(&context) {
            return Err(self.fail(error.into()));
        }

        if wants_profile_update(&self.draft) {
            self.save_profile().await?;
        }

        self.step = CheckoutStep::Review;
        self.error = None;

        Ok(())
    }

    /// Return from review to editing.
    pub fn back_to_editing(&mut self) {
        if self.step.is_review() {
            self.step = CheckoutStep::Editing;
        }
    }

    /// Submit the reviewed order, render its documents and upload them.
    ///
    /// # Errors
    ///
    /// Returns validation and backend failures, staying on review. Document problems after
    /// the order was created only produce a warning on the completed order.
    pub async fn place_order(&mut self) -> Result<(), CheckoutError> {
        if !self.step.is_review() {
            return Err(CheckoutError::NotReviewed);
        }

        self.require_session()?;

        let cart = self.cart.snapshot();
        let ordered_at = self.clock.now();

        let context = CheckoutContext {
            cart: &cart,
            draft: &self.draft,
            saved_methods: &self.saved_methods,
            today: ordered_at.date(),
        };

        let PreparedOrder {
            payload, capture, ..
        } = match prepare_order(&context, &self.bank, ordered_at) {
            Ok(prepared) => prepared,
            Err(error) => return Err(self.fail(error.into())),
        };

        let created = match self.api.create_order(payload).await {
            Ok(created) => created,
            Err(source) => {
                warn!(%source, "order placement failed");

                return Err(self.fail(CheckoutError::Order {
                    message: friendly_order_error(&source),
                    source,
                }));
            }
        };

        let mut completed = CompletedOrder {
            order_id: created.order_id(),
            documents: Vec::new(),
            warning: None,
        };

        if let Some(order_id) = completed.order_id {
            info!(order = order_id, total = %capture.total(), "order placed");

            let (documents, warning) = self.finish_documents(&capture.assign(order_id)).await;

            completed.documents = documents;
            completed.warning = warning;
        } else {
            warn!("backend accepted the order without returning an id");
        }

        drop(self.cart.clear_cart());
        self.draft.reset_payment_entry();
        self.error = None;
        self.step = CheckoutStep::Completed(completed);

        Ok(())
    }

    /// Remove a saved method from the profile.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Profile`] when the profile could not be updated.
    pub async fn remove_saved_method(&mut self, id: &str) -> Result<(), CheckoutError> {
        self.require_session()?;

        let remaining = without_method(&self.saved_methods, id);

        let user = match self
            .api
            .update_current_user(ProfilePatch::payment_methods(remaining))
            .await
        {
            Ok(user) => user,
            Err(source) => {
                warn!(%source, "failed to remove saved payment method");

                return Err(self.fail(CheckoutError::Profile {
                    message: METHOD_REMOVAL_FAILED,
                    source,
                }));
            }
        };

        self.session.update_user(user.clone());
        self.adopt_methods(user);

        if self.draft.payment.saved_method_id() == Some(id) {
            self.draft.select_initial_method(&self.saved_methods);
        }

        self.error = None;

        Ok(())
    }

    async fn save_profile(&mut self) -> Result<(), CheckoutError> {
        match self.patch_profile().await {
            Ok(user) => {
                self.session.update_user(user.clone());
                self.adopt_methods(user);

                Ok(())
            }
            Err(source) => {
                warn!(%source, "failed to save checkout details to the profile");

                Err(self.fail(CheckoutError::Profile {
                    message: PROFILE_SAVE_FAILED,
                    source,
                }))
            }
        }
    }

    /// Patch the opted-in details onto the profile as it currently stands on the backend.
    async fn patch_profile(&self) -> Result<User, ApiError> {
        let existing = self.api.current_user().await?;

        let patch = checkout_profile_patch(
            &self.draft,
            &existing.payment_methods,
            &self.bank,
            || Uuid::now_v7().to_string(),
        );

        if patch.is_empty() {
            return Ok(existing);
        }

        self.api.update_current_user(patch).await
    }

    /// Render both documents and upload them, returning whatever could be previewed and the
    /// warning to show when something went wrong.
    async fn finish_documents(
        &self,
        snapshot: &OrderDocumentSnapshot,
    ) -> (Vec<GeneratedDocument>, Option<&'static str>) {
        let documents = match self.render(snapshot) {
            Ok(documents) => documents,
            Err(error) => {
                error!(%error, order = snapshot.order_id(), "failed to render order documents");

                return (Vec::new(), Some(DOCUMENTS_NOT_SAVED));
            }
        };

        let uploads: Vec<DocumentUpload> = documents
            .iter()
            .map(|generated| DocumentUpload::from(&generated.document))
            .collect();

        match self
            .api
            .upload_documents(snapshot.order_id(), uploads)
            .await
        {
            Ok(()) => (documents, None),
            Err(error) => {
                warn!(%error, order = snapshot.order_id(), "failed to upload order documents");

                (documents, Some(DOCUMENTS_NOT_SAVED))
            }
        }
    }

    fn render(
        &self,
        snapshot: &OrderDocumentSnapshot,
    ) -> Result<Vec<GeneratedDocument>, CheckoutError> {
        let (invoice, summary) = render_all(snapshot)?;

        Ok([invoice, summary]
            .into_iter()
            .map(|document| GeneratedDocument {
                url: self
                    .blobs
                    .create(document.bytes.clone(), document.mime_type()),
                document,
            })
            .collect())
    }

    fn adopt_methods(&mut self, user: User) {
        self.saved_methods = user.payment_methods;
        sort_default_first(&mut self.saved_methods);
    }

    fn require_session(&self) -> Result<(), CheckoutError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CheckoutError::LoginRequired)
        }
    }

    fn fail(&mut self, error: CheckoutError) -> CheckoutError {
        if error.is_inline() {
            self.error = Some(error.to_string());
        }

        error
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use storefront::{
        cart::Cart,
        checkout::ValidationError,
        documents::DocumentKind,
        payments::CardBrand,
        products::Product,
    };

    use super::*;
    use crate::{
        checkout::errors::{PRODUCTS_UNAVAILABLE, SAVED_METHODS_UNAVAILABLE},
        storage::{CART_KEY, load_state},
        test::{
            context::TestContext,
            helpers::{card_draft, product, user},
        },
    };

    fn saved_visa(id: &str, is_default: bool) -> SavedPaymentMethod {
        SavedPaymentMethod::card(id.to_string(), CardBrand::Visa, "1111", "12/30", is_default)
    }

    fn saved_paypal(id: &str, is_default: bool) -> SavedPaymentMethod {
        SavedPaymentMethod::paypal(id.to_string(), "ada@example.com", is_default)
    }

    /// Signed-in context with two medium parallettes in the cart.
    async fn with_cart() -> Result<TestContext, &'static str> {
        let context = TestContext::signed_in();

        context.app.cart.add_item(product(2)?, 2).finished().await;

        Ok(context)
    }

    /// A loaded checkout paying with a new Visa card.
    async fn ready_checkout(context: &TestContext) -> Result<CheckoutSession, CheckoutError> {
        let mut checkout = context.app.checkout();

        checkout.load().await?;
        checkout.draft_mut().payment = card_draft().payment;

        Ok(checkout)
    }

    #[tokio::test]
    async fn order_is_placed_with_documents_and_the_cart_emptied() -> TestResult {
        let context = TestContext::signed_in();

        context.app.cart.add_item(product(2)?, 1).finished().await;
        context.app.cart.add_item(product(2)?, 2).finished().await;

        let cart = context.app.cart.snapshot();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), Decimal::new(389_97, 2));

        let mut checkout = ready_checkout(&context).await?;

        checkout.go_to_review().await?;
        assert!(checkout.step().is_review());

        checkout.place_order().await?;

        let completed = checkout.completed().ok_or("checkout did not complete")?;

        assert_eq!(completed.order_id, Some(101));
        assert_eq!(completed.warning, None);
        assert_eq!(completed.documents.len(), 2);

        for generated in &completed.documents {
            assert!(generated.document.file_name.contains("-101-"));
            assert!(!generated.document.bytes.is_empty());
            assert!(context.app.blobs.resolve(generated.url.as_str()).is_some());
            assert!(
                context
                    .backend
                    .stored_document(101, generated.document.kind)
                    .is_some()
            );
        }

        assert_ne!(
            completed.documents.first().map(|generated| &generated.document.file_name),
            completed.documents.get(1).map(|generated| &generated.document.file_name),
        );

        let placed = context.backend.placed_orders();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed.first().map(|order| order.items.len()), Some(1));

        assert!(context.app.cart.snapshot().is_empty());

        let stored: Cart = load_state(context.storage.as_ref(), CART_KEY, 1);
        assert!(stored.is_empty());

        assert!(!checkout.draft().save_payment_method);

        Ok(())
    }

    #[tokio::test]
    async fn order_notes_mask_the_security_code() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        checkout.go_to_review().await?;
        checkout.place_order().await?;

        let placed = context.backend.placed_orders();
        let notes = &placed.first().ok_or("no order placed")?.notes;

        assert!(notes.contains("CVV provided: ***"));
        assert!(!notes.contains("4111 1111 1111 1111"));

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_cannot_go_to_review() -> TestResult {
        let context = TestContext::signed_in();
        let mut checkout = ready_checkout(&context).await?;

        let result = checkout.go_to_review().await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::EmptyCart))
        ));
        assert!(matches!(checkout.step(), CheckoutStep::Editing));
        assert!(checkout.error().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn quantities_beyond_stock_are_rejected() -> TestResult {
        let context = TestContext::new();

        let scarce = Product {
            stock: 3,
            ..product(2)?
        };

        drop(context.app.cart.add_item(scarce, 5));
        context.sign_in();

        let mut checkout = ready_checkout(&context).await?;

        assert!(matches!(
            checkout.go_to_review().await,
            Err(CheckoutError::Validation(ValidationError::OutOfStock))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn signed_out_checkout_requires_login_without_an_inline_error() {
        let context = TestContext::new();
        let mut checkout = context.app.checkout();

        assert!(matches!(
            checkout.load().await,
            Err(CheckoutError::LoginRequired)
        ));
        assert!(matches!(
            checkout.go_to_review().await,
            Err(CheckoutError::LoginRequired)
        ));
        assert_eq!(checkout.error(), None);
    }

    #[tokio::test]
    async fn load_selects_the_default_method_first() -> TestResult {
        let context = TestContext::new();

        context.backend.set_user(User {
            payment_methods: vec![saved_paypal("pp", false), saved_visa("visa", true)],
            ..user()
        });
        context.sign_in();

        let mut checkout = context.app.checkout();
        checkout.load().await?;

        assert_eq!(
            checkout.saved_methods().first().map(|method| method.id.as_str()),
            Some("visa")
        );
        assert_eq!(checkout.draft().payment.saved_method_id(), Some("visa"));
        assert_eq!(checkout.draft().email, "ada@example.com");

        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_load_shows_an_inline_error() -> TestResult {
        let context = with_cart().await?;

        context.backend.fail_current_user();

        let mut checkout = context.app.checkout();

        assert!(matches!(checkout.load().await, Err(CheckoutError::Load(_))));
        assert_eq!(checkout.error(), Some(SAVED_METHODS_UNAVAILABLE));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_cards_are_not_saved_again() -> TestResult {
        let context = TestContext::new();

        context.backend.set_user(User {
            payment_methods: vec![saved_visa("visa", true)],
            ..user()
        });
        context.sign_in();
        context.app.cart.add_item(product(1)?, 1).finished().await;

        let mut checkout = ready_checkout(&context).await?;
        checkout.draft_mut().save_payment_method = true;

        checkout.go_to_review().await?;

        assert!(context.backend.profile_patches().is_empty());
        assert_eq!(checkout.saved_methods().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn first_saved_method_becomes_the_default() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        checkout.draft_mut().save_payment_method = true;
        checkout.go_to_review().await?;

        let patches = context.backend.profile_patches();
        assert_eq!(patches.len(), 1);

        let methods = patches
            .first()
            .and_then(|patch| patch.payment_methods.clone())
            .ok_or("no methods patched")?;

        assert_eq!(methods.len(), 1);
        assert!(methods.iter().all(|method| method.is_default));
        assert_eq!(
            methods.first().and_then(|method| method.card_brand.as_deref()),
            Some("Visa")
        );

        assert_eq!(checkout.saved_methods().len(), 1);
        assert_eq!(
            context.app.session.user().map(|user| user.payment_methods.len()),
            Some(1)
        );

        Ok(())
    }

    #[tokio::test]
    async fn failed_profile_save_blocks_review() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        context.backend.fail_profile_updates();
        checkout.draft_mut().save_profile = true;

        assert!(matches!(
            checkout.go_to_review().await,
            Err(CheckoutError::Profile { .. })
        ));
        assert_eq!(checkout.error(), Some(PROFILE_SAVE_FAILED));
        assert!(matches!(checkout.step(), CheckoutStep::Editing));

        Ok(())
    }

    #[tokio::test]
    async fn failed_order_stays_on_review_and_keeps_the_cart() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        checkout.go_to_review().await?;
        context
            .backend
            .fail_orders_with("Prodotti non validi o non disponibili");

        assert!(matches!(
            checkout.place_order().await,
            Err(CheckoutError::Order { .. })
        ));
        assert_eq!(checkout.error(), Some(PRODUCTS_UNAVAILABLE));
        assert!(checkout.step().is_review());
        assert_eq!(context.app.cart.count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn failed_upload_keeps_previews_and_warns() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        context.backend.fail_uploads();

        checkout.go_to_review().await?;
        checkout.place_order().await?;

        let completed = checkout.completed().ok_or("checkout did not complete")?;

        assert_eq!(completed.warning, Some(DOCUMENTS_NOT_SAVED));
        assert_eq!(completed.documents.len(), 2);
        assert!(
            context
                .backend
                .stored_document(101, DocumentKind::Invoice)
                .is_none()
        );
        assert!(context.app.cart.snapshot().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn order_without_an_id_completes_without_documents() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        context.backend.omit_order_ids();

        checkout.go_to_review().await?;
        checkout.place_order().await?;

        let completed = checkout.completed().ok_or("checkout did not complete")?;

        assert_eq!(completed.order_id, None);
        assert!(completed.documents.is_empty());
        assert_eq!(completed.warning, None);
        assert_eq!(context.app.blobs.live(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn orders_must_be_reviewed_first() -> TestResult {
        let context = with_cart().await?;
        let mut checkout = ready_checkout(&context).await?;

        assert!(matches!(
            checkout.place_order().await,
            Err(CheckoutError::NotReviewed)
        ));
        assert!(context.backend.placed_orders().is_empty());

        checkout.go_to_review().await?;
        checkout.back_to_editing();

        assert!(matches!(checkout.step(), CheckoutStep::Editing));

        Ok(())
    }

    #[tokio::test]
    async fn removing_the_selected_method_reselects() -> TestResult {
        let context = TestContext::new();

        context.backend.set_user(User {
            payment_methods: vec![saved_visa("visa", true), saved_paypal("pp", false)],
            ..user()
        });
        context.sign_in();

        let mut checkout = context.app.checkout();
        checkout.load().await?;

        assert_eq!(checkout.draft().payment.saved_method_id(), Some("visa"));

        checkout.remove_saved_method("visa").await?;

        assert_eq!(checkout.saved_methods().len(), 1);
        assert_eq!(checkout.draft().payment.saved_method_id(), Some("pp"));
        assert!(
            checkout
                .saved_methods()
                .first()
                .is_some_and(|method| method.is_default)
        );
        assert_eq!(context.backend.user().payment_methods.len(), 1);

        Ok(())
    }
}
