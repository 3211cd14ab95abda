//! Credential verification and session issuing.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::hashing::{hash_password, verify_password};
use crate::auth::jwt::JwtService;
use crate::auth::principal::{LoginRequest, LoginResponse, Principal};
use crate::auth::validation::normalize_email;
use crate::errors::{Error, Result};
use crate::storage::repositories::UserAccountRepository;

/// Hash of a throwaway password, verified against when the email does not
/// match any account so a lookup miss costs the same as a wrong password.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hash_password("pipedesk-timing-equalizer").unwrap_or_default()
});

pub struct AuthenticationService {
    repository: Arc<dyn UserAccountRepository>,
    jwt: JwtService,
}

impl AuthenticationService {
    pub fn new<R>(repository: Arc<R>, jwt: JwtService) -> Self
    where
        R: UserAccountRepository + 'static,
    {
        Self { repository, jwt }
    }

    /// Verify credentials and return the caller's identity.
    ///
    /// A disabled account is reported as such even when the password is
    /// wrong; the caller already proved knowledge of a valid email, and the
    /// actionable problem is the account state. Unknown emails and bad
    /// passwords are indistinguishable to the caller.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<Principal> {
        let email = normalize_email(&request.email);

        let account = match self.repository.find_by_email(&email).await? {
            Some(account) => account,
            None => {
                // Burn a verification anyway so the miss is not observable
                // through response timing.
                let _ = verify_password(&request.password, &DUMMY_HASH);
                warn!(email = %email, "login attempt for unknown email");
                return Err(Error::invalid_credentials(email));
            }
        };

        if !account.active {
            warn!(user_id = %account.id, "login attempt for disabled account");
            return Err(Error::account_disabled(email));
        }

        if !verify_password(&request.password, &account.password_hash) {
            warn!(user_id = %account.id, "login attempt with wrong password");
            return Err(Error::invalid_credentials(email));
        }

        info!(user_id = %account.id, "login succeeded");
        Ok(Principal::from(&account))
    }

    /// Authenticate and mint a session token in one step.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let principal = self.authenticate(request).await?;
        let token = self.jwt.issue(&principal)?;

        Ok(LoginResponse {
            token,
            user_id: principal.user_id.into_string(),
            email: principal.email,
            roles: principal.authorities,
        })
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
