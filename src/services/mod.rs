//! Business services: the generic lifecycle engine and its per-entity
//! instantiations.

pub mod client_service;
pub mod company_service;
pub mod interaction_service;
pub mod lead_service;
pub mod lifecycle;

pub use client_service::{ClientService, CSM_ROLE, SA_ROLE};
pub use company_service::CompanyService;
pub use interaction_service::InteractionService;
pub use lead_service::LeadService;
pub use lifecycle::{Entity, EntityStore, LifecycleHooks, LifecycleService, NoHooks};
