//! Conversions from generated GraphQL response types to domain types.

use orderdesk_core::{Order, OrderId, ProductId, User, UserId};

use super::queries::{create_user, get_orders, get_users};

pub fn convert_user(user: get_users::GetUsersUsers) -> User {
    User {
        id: UserId::new(user.id),
        name: user.name,
        email: user.email,
    }
}

pub fn convert_created_user(user: create_user::CreateUserCreateUser) -> User {
    User {
        id: UserId::new(user.id),
        name: user.name,
        email: user.email,
    }
}

pub fn convert_order(order: get_orders::GetOrdersGetOrders) -> Order {
    Order {
        id: OrderId::new(order.id),
        user_id: UserId::new(order.user_id),
        product_id: ProductId::new(order.product_id),
        quantity: order.quantity,
        total_price: order.total_price,
    }
}
