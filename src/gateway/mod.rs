//! External payment gateways

pub mod payu;

pub use payu::{CreatedOrder, Notification, OrderUrls, PayuClient};
