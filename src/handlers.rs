pub mod assets;
pub mod auth;
pub mod catalog;
pub mod customers;
pub mod ledger;
pub mod merchants;
pub mod reports;
pub mod users;
