//! Cart types.

use tienda_core::{Price, PriceError, ProductId};

/// One cart line joined with the current product data.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    /// Current unit price.
    pub price: Price,
    /// Units currently in stock.
    pub stock: i32,
    pub quantity: i32,
}

impl CartLine {
    /// Line total for display.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.saturating_mul(self.quantity)
    }

    /// Whether the requested quantity is currently available.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity <= self.stock
    }
}

/// A user's cart with its computed total.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total: Price,
}

impl Cart {
    /// Build a cart, computing the total from the lines.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total does not fit.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, PriceError> {
        let total = Price::total(lines.iter().map(|l| (l.price, l.quantity)))?;
        Ok(Self { lines, total })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    /// The first line that asks for more than is in stock.
    #[must_use]
    pub fn first_unavailable(&self) -> Option<&CartLine> {
        self.lines.iter().find(|l| !l.is_available())
    }
}

/// Clamp a requested quantity change against stock.
///
/// Returns the quantity to store, or `None` when the request must be rejected
/// (non-positive request, or nothing left to add).
#[must_use]
pub fn quantity_after_add(current: i32, requested: i32, stock: i32) -> Option<i32> {
    if requested <= 0 {
        return None;
    }
    let wanted = current.checked_add(requested)?;
    (wanted <= stock).then_some(wanted)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: i64, stock: i32, quantity: i32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Producto {id}"),
            image_url: None,
            price: Price::from_minor(price).unwrap(),
            stock,
            quantity,
        }
    }

    #[test]
    fn test_cart_total_and_count() {
        let cart = Cart::from_lines(vec![line(1, 299_000, 20, 2), line(2, 199_000, 35, 1)]).unwrap();
        assert_eq!(cart.total.minor_units(), 797_000);
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
        assert!(cart.first_unavailable().is_none());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::from_lines(Vec::new()).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total, Price::ZERO);
    }

    #[test]
    fn test_first_unavailable() {
        let cart = Cart::from_lines(vec![line(1, 10, 5, 5), line(2, 10, 1, 2)]).unwrap();
        assert_eq!(
            cart.first_unavailable().map(|l| l.product_id),
            Some(ProductId::new(2))
        );
    }

    #[test]
    fn test_quantity_after_add() {
        assert_eq!(quantity_after_add(0, 1, 20), Some(1));
        assert_eq!(quantity_after_add(2, 3, 5), Some(5));
        assert_eq!(quantity_after_add(2, 4, 5), None);
        assert_eq!(quantity_after_add(0, 0, 5), None);
        assert_eq!(quantity_after_add(0, -1, 5), None);
        assert_eq!(quantity_after_add(i32::MAX, 1, i32::MAX), None);
    }
}
