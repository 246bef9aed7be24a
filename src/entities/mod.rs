pub mod client;
pub mod inventory_item;
pub mod order_labor;
pub mod order_part;
pub mod service_order;
pub mod user;
