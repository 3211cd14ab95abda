pub mod auth;
pub mod clients;
pub mod companies;
pub mod health;
pub mod interactions;
pub mod leads;
pub mod users;
