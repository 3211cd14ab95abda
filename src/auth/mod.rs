//! Accounts, credentials, sessions, and security tokens.

pub mod account;
pub mod account_service;
pub mod authentication_service;
pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod principal;
pub mod token;
pub mod token_service;
pub mod validation;

pub use account::{AccountResponse, CreateAccountRequest, UpdateAccountRequest, UserAccount};
pub use account_service::AccountService;
pub use authentication_service::AuthenticationService;
pub use jwt::{Claims, JwtService};
pub use principal::{LoginRequest, LoginResponse, Principal};
pub use token::{SecurityToken, TokenPurpose};
pub use token_service::TokenService;
