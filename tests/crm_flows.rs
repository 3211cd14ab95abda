//! End-to-end lead, client, company, and interaction flows.

use std::sync::Arc;

use chrono::Utc;

use pipedesk::auth::UserAccount;
use pipedesk::config::DatabaseConfig;
use pipedesk::crm::{
    CreateClientRequest, CreateCompanyRequest, CreateInteractionRequest, CreateLeadRequest,
    InteractionKind, LeadStatus, UpdateClientRequest, UpdateCompanyRequest, UpdateLeadRequest,
};
use pipedesk::domain::UserId;
use pipedesk::errors::Error;
use pipedesk::services::{
    ClientService, CompanyService, EntityStore, InteractionService, LeadService,
};
use pipedesk::storage::repositories::{
    SqlxClientRepository, SqlxCompanyRepository, SqlxInteractionRepository, SqlxLeadRepository,
    SqlxUserAccountRepository,
};
use pipedesk::storage::{create_pool, DbPool};

struct TestContext {
    leads: LeadService,
    clients: ClientService,
    companies: CompanyService,
    interactions: InteractionService,
    user_repo: Arc<SqlxUserAccountRepository>,
}

async fn test_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite://:memory:".to_string(),
        max_connections: 1,
        auto_migrate: true,
        ..Default::default()
    };
    create_pool(&config).await.expect("test pool")
}

async fn setup() -> TestContext {
    let pool = test_pool().await;

    let lead_repo = Arc::new(SqlxLeadRepository::new(pool.clone()));
    let client_repo = Arc::new(SqlxClientRepository::new(pool.clone()));
    let company_repo = Arc::new(SqlxCompanyRepository::new(pool.clone()));
    let interaction_repo = Arc::new(SqlxInteractionRepository::new(pool.clone()));
    let user_repo = Arc::new(SqlxUserAccountRepository::new(pool));

    TestContext {
        leads: LeadService::new(lead_repo.clone()),
        clients: ClientService::new(client_repo, user_repo.clone()),
        companies: CompanyService::new(company_repo),
        interactions: InteractionService::new(interaction_repo, lead_repo),
        user_repo,
    }
}

fn lead_request(email: &str) -> CreateLeadRequest {
    CreateLeadRequest {
        full_name: "Morgan Reyes".to_string(),
        email: email.to_string(),
        phone: None,
        company_name: Some("Acme Corp".to_string()),
        status: None,
        source: Some("webform".to_string()),
        notes: None,
    }
}

async fn plant_user(ctx: &TestContext, id: &str, roles: &[&str]) {
    let now = Utc::now();
    let account = UserAccount {
        id: UserId::from_str_unchecked(id),
        full_name: format!("Staff {}", id),
        email: format!("{}@example.com", id),
        password_hash: "x".to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        active: true,
        created_at: now,
        updated_at: now,
    };
    ctx.user_repo.insert(&account).await.expect("insert user");
}

#[tokio::test]
async fn new_lead_defaults_to_new_status() {
    let ctx = setup().await;

    let lead = ctx.leads.create(lead_request("morgan@example.com")).await.expect("create");
    assert_eq!(lead.status, LeadStatus::New);

    let mut explicit = lead_request("other@example.com");
    explicit.status = Some(LeadStatus::Contacted);
    let lead = ctx.leads.create(explicit).await.expect("create explicit");
    assert_eq!(lead.status, LeadStatus::Contacted);
}

#[tokio::test]
async fn duplicate_lead_email_is_rejected() {
    let ctx = setup().await;

    ctx.leads.create(lead_request("morgan@example.com")).await.expect("first");
    let err = ctx.leads.create(lead_request("Morgan@Example.com")).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

#[tokio::test]
async fn empty_lead_update_changes_nothing_but_updated_at() {
    let ctx = setup().await;
    let lead = ctx.leads.create(lead_request("morgan@example.com")).await.expect("create");

    let updated =
        ctx.leads.update(lead.id.as_str(), UpdateLeadRequest::default()).await.expect("update");

    assert_eq!(updated.full_name, lead.full_name);
    assert_eq!(updated.email, lead.email);
    assert_eq!(updated.status, lead.status);
    assert_eq!(updated.company_name, lead.company_name);
    assert_eq!(updated.created_at, lead.created_at);
    assert!(updated.updated_at >= lead.updated_at);
}

#[tokio::test]
async fn lead_status_filter_returns_matching_only() {
    let ctx = setup().await;

    ctx.leads.create(lead_request("a@example.com")).await.expect("a");
    let mut contacted = lead_request("b@example.com");
    contacted.status = Some(LeadStatus::Contacted);
    ctx.leads.create(contacted).await.expect("b");

    let new_leads = ctx.leads.list_by_status(LeadStatus::New).await.expect("filter");
    assert_eq!(new_leads.len(), 1);
    assert_eq!(new_leads[0].email, "a@example.com");

    assert!(ctx.leads.list_by_status(LeadStatus::Lost).await.expect("filter").is_empty());
}

#[tokio::test]
async fn lead_email_change_checks_other_leads() {
    let ctx = setup().await;

    ctx.leads.create(lead_request("first@example.com")).await.expect("first");
    let second = ctx.leads.create(lead_request("second@example.com")).await.expect("second");

    let err = ctx
        .leads
        .update(
            second.id.as_str(),
            UpdateLeadRequest { email: Some("first@example.com".to_string()), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));

    // Re-submitting its own email is not a conflict.
    ctx.leads
        .update(
            second.id.as_str(),
            UpdateLeadRequest {
                email: Some("Second@Example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("self email");
}

#[tokio::test]
async fn deleted_lead_is_returned_then_gone() {
    let ctx = setup().await;
    let lead = ctx.leads.create(lead_request("morgan@example.com")).await.expect("create");

    let removed = ctx.leads.delete(lead.id.as_str()).await.expect("delete");
    assert_eq!(removed.email, "morgan@example.com");

    let err = ctx.leads.get(lead.id.as_str()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn company_name_is_unique() {
    let ctx = setup().await;

    let request = CreateCompanyRequest {
        name: "Acme Corp".to_string(),
        industry: None,
        website: None,
        address: None,
    };
    ctx.companies.create(request.clone()).await.expect("first");

    let err = ctx.companies.create(request).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

#[tokio::test]
async fn company_rename_checks_conflicts() {
    let ctx = setup().await;

    ctx.companies
        .create(CreateCompanyRequest {
            name: "Acme Corp".to_string(),
            industry: None,
            website: None,
            address: None,
        })
        .await
        .expect("acme");
    let globex = ctx
        .companies
        .create(CreateCompanyRequest {
            name: "Globex".to_string(),
            industry: None,
            website: None,
            address: None,
        })
        .await
        .expect("globex");

    let err = ctx
        .companies
        .update(
            globex.id.as_str(),
            UpdateCompanyRequest { name: Some("Acme Corp".to_string()), ..Default::default() },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

fn client_request(email: &str, csm: Option<&str>, sa: Option<&str>) -> CreateClientRequest {
    CreateClientRequest {
        full_name: "Robin Wexler".to_string(),
        email: email.to_string(),
        phone: None,
        company_id: None,
        csm_id: csm.map(String::from),
        sa_id: sa.map(String::from),
        notes: None,
    }
}

#[tokio::test]
async fn client_assignment_requires_matching_roles() {
    let ctx = setup().await;
    plant_user(&ctx, "u-csm", &["USER", "CSM"]).await;
    plant_user(&ctx, "u-sa", &["USER", "SA"]).await;
    plant_user(&ctx, "u-plain", &["USER"]).await;

    // Valid pairing works.
    let client = ctx
        .clients
        .create(client_request("robin@example.com", Some("u-csm"), Some("u-sa")))
        .await
        .expect("create");
    assert_eq!(client.csm_id.as_ref().map(|id| id.as_str()), Some("u-csm"));

    // Plain user cannot be CSM.
    let err = ctx
        .clients
        .create(client_request("other@example.com", Some("u-plain"), None))
        .await
        .unwrap_err();
    match err {
        Error::RoleRequirementNotMet { role, actual_roles, .. } => {
            assert_eq!(role, "CSM");
            assert_eq!(actual_roles, vec!["USER".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // SA slot requires the SA role even if the user is a CSM.
    let err = ctx
        .clients
        .create(client_request("other@example.com", None, Some("u-csm")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RoleRequirementNotMet { .. }));

    // Unknown account is a plain not-found.
    let err = ctx
        .clients
        .create(client_request("other@example.com", Some("u-ghost"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn same_user_cannot_fill_both_slots() {
    let ctx = setup().await;
    plant_user(&ctx, "u-both", &["USER", "CSM", "SA"]).await;

    let err = ctx
        .clients
        .create(client_request("robin@example.com", Some("u-both"), Some("u-both")))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RoleConflict { .. }));
}

#[tokio::test]
async fn update_validates_against_post_merge_assignment() {
    let ctx = setup().await;
    plant_user(&ctx, "u-csm", &["USER", "CSM", "SA"]).await;
    plant_user(&ctx, "u-sa", &["USER", "SA"]).await;

    let client = ctx
        .clients
        .create(client_request("robin@example.com", Some("u-csm"), Some("u-sa")))
        .await
        .expect("create");

    // Moving the SA slot onto the existing CSM must fail even though the
    // update itself only names one slot.
    let err = ctx
        .clients
        .update(
            client.id.as_str(),
            UpdateClientRequest { sa_id: Some("u-csm".to_string()), ..Default::default() },
        )
        .await
        .unwrap_err();
    match err {
        Error::RoleConflict { role, user_id } => {
            // The slot being assigned is the one reported.
            assert_eq!(role, "SA");
            assert_eq!(user_id, "u-csm");
        }
        other => panic!("expected RoleConflict, got {other:?}"),
    }

    // The stored assignment is unchanged.
    let stored = ctx.clients.get(client.id.as_str()).await.expect("get");
    assert_eq!(stored.sa_id.as_ref().map(|id| id.as_str()), Some("u-sa"));
}

#[tokio::test]
async fn conflict_on_csm_assignment_names_the_csm_slot() {
    let ctx = setup().await;
    plant_user(&ctx, "u-sa2", &["USER", "CSM", "SA"]).await;

    let client = ctx
        .clients
        .create(client_request("mira@example.com", None, Some("u-sa2")))
        .await
        .expect("create");

    let err = ctx
        .clients
        .update(
            client.id.as_str(),
            UpdateClientRequest { csm_id: Some("u-sa2".to_string()), ..Default::default() },
        )
        .await
        .unwrap_err();
    match err {
        Error::RoleConflict { role, user_id } => {
            assert_eq!(role, "CSM");
            assert_eq!(user_id, "u-sa2");
        }
        other => panic!("expected RoleConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn interaction_requires_existing_lead() {
    let ctx = setup().await;

    let err = ctx
        .interactions
        .create(CreateInteractionRequest {
            lead_id: "no-such-lead".to_string(),
            kind: InteractionKind::Call,
            summary: "Intro call".to_string(),
            occurred_at: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn interactions_list_per_lead_newest_first() {
    let ctx = setup().await;
    let lead = ctx.leads.create(lead_request("morgan@example.com")).await.expect("lead");
    let other = ctx.leads.create(lead_request("other@example.com")).await.expect("other");

    let now = Utc::now();
    for (summary, minutes_ago) in [("first call", 120), ("follow-up email", 30)] {
        ctx.interactions
            .create(CreateInteractionRequest {
                lead_id: lead.id.as_str().to_string(),
                kind: InteractionKind::Call,
                summary: summary.to_string(),
                occurred_at: Some(now - chrono::Duration::minutes(minutes_ago)),
            })
            .await
            .expect("record");
    }
    ctx.interactions
        .create(CreateInteractionRequest {
            lead_id: other.id.as_str().to_string(),
            kind: InteractionKind::Note,
            summary: "unrelated".to_string(),
            occurred_at: None,
        })
        .await
        .expect("record other");

    let history = ctx.interactions.list_for_lead(&lead.id).await.expect("list");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].summary, "follow-up email");
    assert_eq!(history[1].summary, "first call");
}
