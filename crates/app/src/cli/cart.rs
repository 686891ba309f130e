use clap::{Args, Subcommand};

use storefront::{
    money::format_price,
    products::{ProductId, catalogue, find_in_catalogue},
};
use storefront_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum CartSubcommand {
    /// Show the cart lines and total
    Show,

    /// Add units of a product
    Add {
        product: ProductId,

        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },

    /// Set a line's quantity; zero or less removes it
    Set {
        product: ProductId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product's line
    Remove { product: ProductId },

    /// Empty the cart
    Clear,

    /// Replace the local cart with the server cart
    Sync,
}

pub(crate) fn list_catalogue() {
    for product in catalogue() {
        println!(
            "{:>3}  {:<24} {:>12}  stock {}",
            product.id,
            product.name,
            format_price(product.price),
            product.stock
        );
    }
}

pub(crate) async fn run(context: &AppContext, command: &CartCommand) -> Result<(), String> {
    let cart = &context.cart;

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product, quantity } => {
            let product = find_in_catalogue(product)
                .ok_or_else(|| format!("unknown product {product}"))?;

            cart.add_item(product, quantity).finished().await;
        }
        CartSubcommand::Set { product, quantity } => {
            cart.update_quantity(product, quantity).finished().await;
        }
        CartSubcommand::Remove { product } => cart.remove_item(product).finished().await,
        CartSubcommand::Clear => cart.clear_cart().finished().await,
        CartSubcommand::Sync => cart
            .sync_from_backend()
            .await
            .map_err(|error| format!("failed to sync cart: {error}"))?,
    }

    show(context);

    Ok(())
}

fn show(context: &AppContext) {
    let cart = context.cart.snapshot();

    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    for line in cart.lines() {
        let flag = if line.is_out_of_stock() {
            "  (exceeds stock)"
        } else {
            ""
        };

        println!(
            "{:>3}  {:<24} x{:<3} {:>12}{flag}",
            line.product.id,
            line.product.name,
            line.quantity,
            format_price(line.subtotal())
        );
    }

    println!("total: {}", format_price(cart.total()));
}
