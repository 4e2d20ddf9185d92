use serde::Serialize;
use utoipa::ToSchema;

use crate::cart::Cart;
use crate::models::CartSnapshot;

/// Cart as rendered to the client: the lines plus the derived totals.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: CartSnapshot,
    pub total: i64,
    pub item_count: u32,
}

impl CartView {
    pub fn of(cart: &Cart) -> Self {
        Self {
            lines: cart.snapshot(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}
