//! Session controller: login/logout lifecycle and the current user profile

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::{watch, Mutex};

use crate::{
    api::{endpoints, ApiGateway},
    credentials::{Credential, CredentialStore},
    error::{ApiError, AppResult},
    models::{LoginIdentity, LoginRequest, LoginResponse, RegistrationOutcome, RegistrationRequest, UserProfile},
};

/// Authentication state of the running process
///
/// `user` is only ever set while `token` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<Credential>,
    pub user: Option<UserProfile>,
    pub identity: Option<LoginIdentity>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn user_id(&self) -> Option<i32> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Owner of the single [`Session`]; every mutation goes through here
#[derive(Clone)]
pub struct SessionController {
    gateway: ApiGateway,
    credentials: Arc<dyn CredentialStore>,
    state: Arc<watch::Sender<Session>>,
    // Serializes the state mutations of login and logout; never held across a request
    lifecycle: Arc<Mutex<()>>,
    // Bumped by every login and logout; a profile fetched for an older value is dropped
    generation: Arc<AtomicU64>,
}

impl SessionController {
    pub fn new(gateway: ApiGateway, credentials: Arc<dyn CredentialStore>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            gateway,
            credentials,
            state: Arc::new(state),
            lifecycle: Arc::new(Mutex::new(())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Adopt any persisted credential.
    ///
    /// The token is not validated; `user` stays empty until a profile load
    /// succeeds. Returns whether a credential was found.
    pub fn bootstrap(&self) -> bool {
        let token = self.credentials.get();
        let found = token.is_some();
        self.state.send_modify(|session| {
            session.token = token;
            session.user = None;
            session.identity = None;
        });
        if found {
            tracing::info!("Restored persisted credential");
        }
        found
    }

    /// Exchange account and password for a token, then load the profile.
    ///
    /// A failed profile fetch does not fail the login: the token stays
    /// active and `user` stays empty until [`Self::refresh_profile`] succeeds.
    /// A logout while the profile is in flight wins over the late profile.
    pub async fn login(&self, account: &str, password: &str) -> AppResult<()> {
        let request = endpoints::login(&LoginRequest {
            account: account.to_string(),
            password: password.to_string(),
        })?;
        let response: LoginResponse = self.gateway.perform(request).await.map_err(|e| {
            tracing::warn!("Login failed for account {}: {}", account, e);
            e
        })?;

        let token = Credential::from(response.jwt.clone());
        let identity = LoginIdentity::from(&response);
        let generation = {
            let _guard = self.lifecycle.lock().await;
            self.credentials.save(&token);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.state.send_modify(|session| {
                session.token = Some(token);
                session.user = None;
                session.identity = Some(identity.clone());
            });
            generation
        };
        tracing::info!("Logged in user {} with role {}", identity.user_id, identity.role);

        if let Err(e) = self.load_profile(identity.user_id, generation).await {
            tracing::warn!("Profile fetch after login failed for user {}: {}", identity.user_id, e);
        }
        Ok(())
    }

    /// Retry loading the profile of the logged-in identity
    pub async fn refresh_profile(&self) -> AppResult<UserProfile> {
        let (user_id, generation) = {
            let _guard = self.lifecycle.lock().await;
            let user_id = self
                .state
                .borrow()
                .identity
                .as_ref()
                .map(|identity| identity.user_id)
                .ok_or(ApiError::AuthRequired)?;
            (user_id, self.generation.load(Ordering::SeqCst))
        };
        self.load_profile(user_id, generation).await
    }

    /// Forget the credential and the user. Safe to call repeatedly.
    ///
    /// Never waits on the network, even while a login is fetching the profile.
    pub async fn logout(&self) {
        let _guard = self.lifecycle.lock().await;

        self.credentials.delete();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(Session::default());
        tracing::info!("Logged out");
    }

    /// Create an account; the session is not touched
    pub async fn register(&self, request: &RegistrationRequest) -> AppResult<RegistrationOutcome> {
        let outcome: RegistrationOutcome = self.gateway.perform(endpoints::register(request)?).await?;
        if outcome.success {
            tracing::info!("Registered account {}", request.account);
        } else {
            tracing::info!(
                "Registration of account {} refused: {}",
                request.account,
                outcome.message.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(outcome)
    }

    /// Fetch the profile and apply it only if no login or logout happened since `generation`
    async fn load_profile(&self, user_id: i32, generation: u64) -> AppResult<UserProfile> {
        let profile: UserProfile = self.gateway.perform(endpoints::user_profile(user_id)).await?;

        let mut applied = false;
        self.state.send_if_modified(|session| {
            if session.token.is_none() || self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            session.user = Some(profile.clone());
            applied = true;
            true
        });
        if !applied {
            tracing::debug!("Dropping profile of user {} fetched for an ended session", user_id);
            return Err(ApiError::AuthRequired);
        }
        Ok(profile)
    }

    /// Consistent copy of the current session
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Watch the session for changes
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn current_user_id(&self) -> Option<i32> {
        self.state.borrow().user_id()
    }
}
