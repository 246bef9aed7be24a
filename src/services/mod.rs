pub mod clients;
pub mod inventory;
pub mod orders;
