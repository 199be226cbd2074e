pub mod core;
pub mod engine;
pub mod portfolio;
pub mod price;
pub mod scope;
pub mod stock;
pub mod store;
pub mod user;
