//! Cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    money::line_total,
    products::{Product, ProductId},
};

/// A product and how many units of it are in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product
    pub product: Product,

    /// Units, always positive
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    pub fn subtotal(&self) -> Decimal {
        line_total(self.product.price, self.quantity)
    }

    /// Whether this line asks for more than the backend says is available.
    pub fn is_out_of_stock(&self) -> bool {
        self.product.is_sold_out() || self.quantity > self.product.stock
    }
}

/// Cart
///
/// Holds at most one line per product id and never a line with zero quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CartParts")]
pub struct Cart {
    lines: Vec<CartLine>,
    is_open: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartParts {
    #[serde(default)]
    lines: Vec<CartLine>,

    #[serde(default)]
    is_open: bool,
}

impl From<CartParts> for Cart {
    fn from(parts: CartParts) -> Self {
        let mut cart = Cart::from_lines(parts.lines);
        cart.is_open = parts.is_open;
        cart
    }
}

impl Cart {
    /// Create an empty, closed cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from arbitrary lines, merging duplicate products and dropping empty lines.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        cart.replace_lines(lines);
        cart
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for the given product, if any.
    pub fn line(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product)
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the cart drawer is shown.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Adds `quantity` units of `product`, merging into an existing line, and opens the cart.
    ///
    /// A zero quantity leaves the lines untouched but still opens the cart.
    pub fn add(&mut self, product: Product, quantity: u32) {
        self.is_open = true;

        if quantity == 0 {
            return;
        }

        match self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Removes the line for `product`. Returns whether a line was removed.
    pub fn remove(&mut self, product: ProductId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.product.id != product);

        self.lines.len() != before
    }

    /// Sets the quantity of an existing line; zero or negative removes it.
    pub fn set_quantity(&mut self, product: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove(product);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product)
        {
            line.quantity = quantity;
        }
    }

    /// Replaces every line, keeping the visibility flag.
    pub fn replace_lines(&mut self, lines: impl IntoIterator<Item = CartLine>) {
        let mut merged: Vec<CartLine> = Vec::new();

        for line in lines {
            if line.quantity == 0 {
                continue;
            }

            match merged
                .iter_mut()
                .find(|existing| existing.product.id == line.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }

        self.lines = merged;
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Shows the cart.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Hides the cart.
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Flips the cart visibility.
    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Sum of every line's price times quantity.
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of every line's quantity.
    pub fn count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Lines that cannot be fulfilled with the current stock.
    pub fn out_of_stock_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.is_out_of_stock())
    }

    /// Whether any line blocks checkout because of stock.
    pub fn has_out_of_stock_lines(&self) -> bool {
        self.out_of_stock_lines().next().is_some()
    }
}
