//! CRM domain models: leads, clients, companies, and interaction logs.

pub mod client;
pub mod company;
pub mod interaction;
pub mod lead;

pub use client::{Client, ClientResponse, CreateClientRequest, UpdateClientRequest};
pub use company::{Company, CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};
pub use interaction::{
    CreateInteractionRequest, InteractionKind, InteractionResponse, LeadInteraction,
    UpdateInteractionRequest,
};
pub use lead::{CreateLeadRequest, Lead, LeadResponse, LeadStatus, UpdateLeadRequest};
