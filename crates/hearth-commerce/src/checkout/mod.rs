//! Checkout module.
//!
//! Server-side cart pricing, shipping addresses and orders.

pub(crate) mod address;
mod cart;
mod order;

pub use address::ShippingAddress;
pub use cart::{price_items, subtotal, CartItem, Quote, MAX_LINE_QUANTITY};
pub use order::{Order, OrderItem, OrderStatus, PaymentDetails};

#[cfg(test)]
pub(crate) use order::tests as fixtures;
