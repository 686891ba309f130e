use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Args;

use storefront::{
    checkout::{CardDetails, NewPaymentMethod, PaymentDraft, SecurityCode, describe_payment},
    money::format_price,
    payments::{PaymentMethodKind, format_card_number, format_expiry},
};
use storefront_app::{
    checkout::{CheckoutSession, CompletedOrder},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Pay with a saved method; defaults to the profile's default method
    #[arg(long, conflicts_with_all = ["card_number", "paypal_email", "bank"])]
    saved: Option<String>,

    /// Card security code, for saved or new cards
    #[arg(long)]
    cvv: Option<String>,

    /// Pay with a new card
    #[arg(long, requires_all = ["card_holder", "card_expiry"])]
    card_number: Option<String>,

    #[arg(long)]
    card_holder: Option<String>,

    /// Card expiry as MM/YY
    #[arg(long)]
    card_expiry: Option<String>,

    /// Pay with a PayPal account
    #[arg(long, conflicts_with = "card_number")]
    paypal_email: Option<String>,

    /// Pay by bank transfer
    #[arg(long, conflicts_with_all = ["card_number", "paypal_email"])]
    bank: bool,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    shipping_address: Option<String>,

    /// Bill to a different address than the shipping one
    #[arg(long)]
    billing_address: Option<String>,

    #[arg(long, default_value = "")]
    notes: String,

    /// Save contact and address fields to the profile
    #[arg(long)]
    save_profile: bool,

    /// Save the new payment method to the profile
    #[arg(long)]
    save_method: bool,

    /// Where to write the generated documents
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

pub(crate) async fn run(context: &AppContext, args: &CheckoutArgs) -> Result<(), String> {
    let mut checkout = context.checkout();

    checkout.load().await.map_err(|error| error.to_string())?;

    fill_draft(&mut checkout, args)?;

    checkout
        .go_to_review()
        .await
        .map_err(|error| error.to_string())?;

    print_review(context, &checkout);

    checkout
        .place_order()
        .await
        .map_err(|error| error.to_string())?;

    let completed = checkout
        .completed()
        .ok_or_else(|| "checkout did not complete".to_string())?;

    report(context, completed, &args.output_dir)
}

fn fill_draft(checkout: &mut CheckoutSession, args: &CheckoutArgs) -> Result<(), String> {
    if let Some(id) = &args.saved {
        if !checkout.saved_methods().iter().any(|method| method.id == *id) {
            return Err(format!("no saved payment method {id}"));
        }

        checkout.select_saved_method(id);
    } else if let Some(number) = &args.card_number {
        checkout.draft_mut().payment = PaymentDraft::New(NewPaymentMethod::Card(CardDetails {
            holder: args.card_holder.clone().unwrap_or_default(),
            number: format_card_number(number),
            expiry: format_expiry(args.card_expiry.as_deref().unwrap_or_default()),
            cvv: args.cvv.clone().unwrap_or_default(),
        }));
    } else if let Some(email) = &args.paypal_email {
        checkout.draft_mut().payment = PaymentDraft::New(NewPaymentMethod::PayPal {
            email: email.clone(),
        });
    } else if args.bank {
        checkout.use_new_method(PaymentMethodKind::Bank);
    }

    let draft = checkout.draft_mut();

    if let (PaymentDraft::Saved { cvv, .. }, Some(code)) = (&mut draft.payment, &args.cvv) {
        *cvv = SecurityCode::new(code.as_str());
    }

    if let Some(email) = &args.email {
        draft.email.clone_from(email);
    }

    if let Some(phone) = &args.phone {
        draft.phone.clone_from(phone);
    }

    if let Some(address) = &args.shipping_address {
        draft.shipping_address.clone_from(address);
    }

    if let Some(billing) = &args.billing_address {
        draft.same_billing_as_shipping = false;
        draft.billing_address.clone_from(billing);
    }

    draft.notes.clone_from(&args.notes);
    draft.save_profile = args.save_profile;
    draft.save_payment_method = args.save_method;

    Ok(())
}

fn print_review(context: &AppContext, checkout: &CheckoutSession) {
    let draft = checkout.draft();
    let cart = context.cart.snapshot();

    println!("ship to: {}", draft.shipping_address);
    println!("bill to: {}", draft.effective_billing_address());
    println!("contact: {} / {}", draft.email, draft.phone);

    let payment = describe_payment(&draft.payment, checkout.saved_methods(), checkout.bank());

    if let Some(payment) = payment {
        println!("payment: {}", payment.label);
    }

    for line in cart.lines() {
        println!(
            "  {} x{}  {}",
            line.product.name,
            line.quantity,
            format_price(line.subtotal())
        );
    }

    println!("total: {}", format_price(cart.total()));
}

fn report(
    context: &AppContext,
    completed: &CompletedOrder,
    output_dir: &Path,
) -> Result<(), String> {
    match completed.order_id {
        Some(id) => println!("order {id} placed"),
        None => println!("order placed"),
    }

    if !completed.documents.is_empty() {
        fs::create_dir_all(output_dir)
            .map_err(|error| format!("failed to create {}: {error}", output_dir.display()))?;
    }

    for generated in &completed.documents {
        let blob = context
            .blobs
            .resolve(generated.url.as_str())
            .ok_or_else(|| format!("{} is no longer available", generated.url))?;

        let path = output_dir.join(&generated.document.file_name);

        fs::write(&path, &blob.bytes)
            .map_err(|error| format!("failed to write {}: {error}", path.display()))?;

        println!("{}: {}", generated.document.kind, path.display());
    }

    if let Some(warning) = completed.warning {
        println!("warning: {warning}");
    }

    Ok(())
}
