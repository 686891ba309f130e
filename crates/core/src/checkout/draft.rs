//! Checkout draft

use crate::{
    payments::{PaymentMethodKind, SavedPaymentMethod},
    users::User,
};

use super::payment::{NewPaymentMethod, PaymentDraft};

/// Everything typed into the checkout form. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDraft {
    /// Contact email
    pub email: String,

    /// Contact phone
    pub phone: String,

    /// Shipping address
    pub shipping_address: String,

    /// Billing address, used only when it differs from shipping
    pub billing_address: String,

    /// Bill to the shipping address
    pub same_billing_as_shipping: bool,

    /// Payment selection
    pub payment: PaymentDraft,

    /// Save contact and address fields to the profile
    pub save_profile: bool,

    /// Save a newly entered payment method to the profile
    pub save_payment_method: bool,

    /// Free-text notes
    pub notes: String,
}

impl Default for CheckoutDraft {
    fn default() -> Self {
        Self {
            email: String::new(),
            phone: String::new(),
            shipping_address: String::new(),
            billing_address: String::new(),
            same_billing_as_shipping: true,
            payment: PaymentDraft::default(),
            save_profile: false,
            save_payment_method: false,
            notes: String::new(),
        }
    }
}

impl CheckoutDraft {
    /// A draft prefilled from the profile.
    pub fn for_user(user: &User) -> Self {
        let mut draft = Self::default();
        draft.prefill(user);
        draft
    }

    /// Copies contact and address fields from the profile, blanking those it lacks.
    pub fn prefill(&mut self, user: &User) {
        self.email.clone_from(&user.email);
        self.phone = user.phone.clone().unwrap_or_default();
        self.shipping_address = user.address.clone().unwrap_or_default();
        self.billing_address = user.billing_address.clone().unwrap_or_default();
    }

    /// Billing address that will be used: the shipping one when they are the same.
    pub fn effective_billing_address(&self) -> &str {
        if self.same_billing_as_shipping {
            &self.shipping_address
        } else {
            &self.billing_address
        }
    }

    /// Points the payment at the first of `methods` (already sorted default-first), or at a new
    /// card when there are none.
    pub fn select_initial_method(&mut self, methods: &[SavedPaymentMethod]) {
        self.payment = match methods.first() {
            Some(method) => PaymentDraft::saved(method.id.clone()),
            None => PaymentDraft::default(),
        };
    }

    /// Switches to entering a fresh method of `kind`.
    pub fn use_new_method(&mut self, kind: PaymentMethodKind) {
        if let PaymentDraft::New(entry) = &self.payment
            && entry.kind() == kind
        {
            return;
        }

        self.payment = PaymentDraft::New(NewPaymentMethod::empty(kind));
    }

    /// Clears typed payment data and the save flags after an order went through.
    ///
    /// The saved-method selection survives; only its security code is cleared.
    pub fn reset_payment_entry(&mut self) {
        self.payment = match self.payment.saved_method_id() {
            Some(id) => PaymentDraft::saved(id),
            None => PaymentDraft::New(NewPaymentMethod::empty(PaymentMethodKind::Card)),
        };

        self.save_profile = false;
        self.save_payment_method = false;
    }
}
