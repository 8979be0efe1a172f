//! The shopping cart store.
//!
//! The cart owns its line items exclusively. Invariants held by every
//! operation: at most one line item per product id, and a stored quantity is
//! always at least 1 (an item adjusted to zero or below is removed, never
//! kept at zero).

use autoparts_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;

/// A product paired with a purchased quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: Product,
    pub quantity: u32,
}

impl LineItem {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// In-memory shopping cart.
///
/// All operations are synchronous and touch nothing but the cart itself.
/// Totals are derived on every call, never cached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Add one unit of `product`.
    ///
    /// Increments the existing line item if the product is already in the
    /// cart; otherwise appends a new line item with quantity 1. Existing
    /// item order is preserved.
    pub fn add_item(&mut self, product: Product) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(LineItem {
                product,
                quantity: 1,
            });
        }
    }

    /// Remove the line item for `id`. No-op if the product is not in the
    /// cart.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|i| i.product.id != id);
    }

    /// Change the quantity of the line item for `id` by `delta` (any
    /// magnitude). A resulting quantity of zero or below removes the item.
    /// No-op if the product is not in the cart.
    pub fn adjust_quantity(&mut self, id: ProductId, delta: i64) {
        let Some(pos) = self.items.iter().position(|i| i.product.id == id) else {
            return;
        };
        let Some(item) = self.items.get_mut(pos) else {
            return;
        };

        let new_quantity = i64::from(item.quantity).saturating_add(delta);
        if new_quantity <= 0 {
            self.items.remove(pos);
        } else {
            item.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        }
    }

    /// Empty the cart. Used after a successful order submission.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price × quantity over all line items. Zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Sum of quantities over all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// The current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Part {id}"),
            article: format!("ART-{id}"),
            price: Decimal::from(price),
            image: String::new(),
            category: "Двигатель".to_string(),
            in_stock: true,
            quantity: None,
            manufacturer: None,
            supplier: None,
        }
    }

    #[test]
    fn test_repeated_add_accumulates_one_line() {
        let mut cart = Cart::default();
        for _ in 0..5 {
            cart.add_item(product(1, 500));
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_new_items_append_in_order() {
        let mut cart = Cart::default();
        cart.add_item(product(2, 100));
        cart.add_item(product(1, 200));
        cart.add_item(product(2, 100));

        let ids: Vec<i64> = cart.items().iter().map(|i| i.product.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_adjust_quantity_updates_exactly() {
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));
        cart.add_item(product(2, 300));

        cart.adjust_quantity(ProductId::new(1), 3);
        assert_eq!(cart.items().first().unwrap().quantity, 4);
        // Unrelated item untouched
        assert_eq!(cart.items().get(1).unwrap().quantity, 1);
    }

    #[test]
    fn test_adjust_quantity_to_zero_removes() {
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));
        cart.add_item(product(1, 500));

        cart.adjust_quantity(ProductId::new(1), -2);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_quantity_large_negative_removes() {
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));

        cart.adjust_quantity(ProductId::new(1), -100);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_quantity_missing_product_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));

        cart.adjust_quantity(ProductId::new(99), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_missing_product_is_noop() {
        let mut cart = Cart::default();
        cart.remove_item(ProductId::new(99));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_scenario() {
        // Product A (price 500, qty 2) and product B (price 1200, qty 1)
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));
        cart.add_item(product(1, 500));
        cart.add_item(product(2, 1200));

        assert_eq!(cart.total_price(), Decimal::from(2200));
        assert_eq!(cart.item_count(), 3);

        cart.remove_item(ProductId::new(1));
        assert_eq!(cart.total_price(), Decimal::from(1200));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::default();
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_quantity_never_zero_in_store() {
        let mut cart = Cart::default();
        cart.add_item(product(1, 500));
        cart.adjust_quantity(ProductId::new(1), -1);

        // Removed entirely, not retained at zero
        assert!(cart.items().is_empty());
    }
}
