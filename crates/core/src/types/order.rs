//! Order records as served by the `getOrders` query.

use serde::{Deserialize, Serialize};

use crate::{OrderId, ProductId, UserId};

/// An order placed by a single user.
///
/// Orders are always fetched scoped to exactly one selected user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Order total as the server reports it (no currency attached).
    pub total_price: f64,
}
