//! services/storefront/src/stores/session.rs
//!
//! The session store: login against the demo API with a fallback to the local
//! user table, logout, signup and profile edits. The session record and token
//! live only in client storage.

use markethub_core::credentials;
use markethub_core::domain::{
    next_local_id, placeholder_avatar, AuthGrant, Destination, LocalUserRecord, NewUser,
    Notification, Role, SignupForm, UserSession,
};
use markethub_core::ports::{KeyValueStore, KeyValueStoreExt, MarketApi, Notifier, PortError};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::keys;
use crate::password::{hash_password, verify_password};

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"))
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    api: Arc<dyn MarketApi>,
    notifier: Arc<dyn Notifier>,
    /// Serializes read-modify-write cycles on the local user table.
    registry: Mutex<()>,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        api: Arc<dyn MarketApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            storage,
            api,
            notifier,
            registry: Mutex::new(()),
        }
    }

    /// Reports a failure to the user and hands it back to the caller.
    fn fail<T>(&self, err: ClientError) -> ClientResult<T> {
        self.notifier.notify(Notification::error(err.to_string()));
        Err(err)
    }

    //=====================================================================================
    // Login / Logout
    //=====================================================================================

    /// Authenticates `identifier` (username or email) and persists the session.
    ///
    /// The remote API is asked first; any remote failure falls back to the local
    /// user table. Identifiers match case-insensitively on both paths. Unknown
    /// users and wrong passwords fail identically.
    pub async fn login(&self, identifier: &str, password: &str) -> ClientResult<Destination> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return self.fail(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        // Demo API usernames are all lowercase and matched exactly.
        let remote_identifier = identifier.to_lowercase();
        let session = match self.api.login(&remote_identifier, password).await {
            Ok(grant) => {
                info!(username = %grant.username, "Remote login accepted");
                let role = self.remote_role(&grant).await;
                grant.into_session(role)
            }
            Err(remote) => {
                debug!("Remote login failed ({}), checking local users", remote);
                match self.match_local(identifier, password) {
                    Ok(Some(session)) => {
                        info!(username = %session.username, "Local login accepted");
                        session
                    }
                    Ok(None) => return self.fail(ClientError::AuthenticationFailed),
                    Err(e) => return self.fail(e),
                }
            }
        };

        if let Err(e) = self.persist(&session) {
            return self.fail(e);
        }
        self.notifier.notify(Notification::success(format!(
            "Welcome back, {}!",
            session.first_name
        )));
        Ok(session.role.destination())
    }

    /// The role of a remotely authenticated user, read from the user directory.
    async fn remote_role(&self, grant: &AuthGrant) -> Role {
        match self.api.fetch_user(grant.id).await {
            Ok(user) => user.role,
            Err(e) => {
                let fallback = grant.role.unwrap_or_default();
                warn!(id = grant.id, "Could not look up user role, using {:?}: {}", fallback, e);
                fallback
            }
        }
    }

    fn match_local(&self, identifier: &str, password: &str) -> ClientResult<Option<UserSession>> {
        let records = self.local_users()?;
        let session = credentials::find_by_identifier(&records, identifier)
            .filter(|record| verify_password(password, &record.password_hash))
            .map(|record| record.to_session(format!("local-{}", Uuid::new_v4())));
        Ok(session)
    }

    /// Writes the token, then the session record. A session is never left
    /// behind without its token.
    fn persist(&self, session: &UserSession) -> ClientResult<()> {
        self.storage.set(keys::TOKEN, &session.token)?;
        if let Err(e) = self.storage.save_json(keys::SESSION, session) {
            if let Err(cleanup) = self.storage.remove(keys::TOKEN) {
                warn!("Could not roll back the stored token: {}", cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Clears the session record and token, whatever state they were in.
    pub fn logout(&self) -> ClientResult<()> {
        self.storage.remove(keys::SESSION)?;
        self.storage.remove(keys::TOKEN)?;
        self.notifier.notify(Notification::success("Logged out"));
        Ok(())
    }

    /// The persisted session, if any. An unreadable record counts as logged out.
    pub fn current_user(&self) -> Option<UserSession> {
        match self.storage.load_json::<UserSession>(keys::SESSION) {
            Ok(session) => session,
            Err(e) => {
                warn!("Ignoring unreadable session record: {}", e);
                None
            }
        }
    }

    /// Rewrites the name and email of the current session.
    pub fn update_profile(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> ClientResult<UserSession> {
        let Some(mut session) = self.current_user() else {
            return self.fail(ClientError::Port(PortError::Unauthorized));
        };
        let email = email.trim();
        if first_name.trim().is_empty() || !email_pattern().is_match(email) {
            return self.fail(ClientError::Validation(
                "A first name and a valid email are required".to_string(),
            ));
        }

        session.first_name = first_name.trim().to_string();
        session.last_name = last_name.trim().to_string();
        session.email = email.to_string();
        self.storage.save_json(keys::SESSION, &session)?;
        self.notifier.notify(Notification::success("Profile saved successfully!"));
        Ok(session)
    }

    //=====================================================================================
    // Signup
    //=====================================================================================

    /// Registers a user in the local table. Does not log the user in.
    ///
    /// The demo API is told about the user as well, but it never persists
    /// signups, so the local record is always written.
    pub async fn signup(&self, form: SignupForm) -> ClientResult<LocalUserRecord> {
        if let Err(err) = validate(&form) {
            return self.fail(err);
        }
        let email = form.email.trim().to_string();
        let username = form
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| credentials::default_username(&email));

        let _guard = self.registry.lock().await;
        let mut records = self.local_users()?;
        if credentials::email_taken(&records, &email) {
            return self.fail(ClientError::DuplicateEmail(email));
        }

        let remote = NewUser {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: email.clone(),
            username: username.clone(),
            password: form.password.clone(),
        };
        match self.api.add_user(&remote).await {
            Ok(user) => debug!(remote_id = user.id, "Demo API acknowledged signup"),
            Err(e) => warn!("Demo API signup failed, keeping the local record only: {}", e),
        }

        let record = LocalUserRecord {
            id: next_local_id(),
            first_name: remote.first_name,
            last_name: remote.last_name,
            email,
            image_url: placeholder_avatar(&username),
            username,
            password_hash: hash_password(&form.password)?,
            role: Role::User,
        };
        records.push(record.clone());
        self.storage.save_json(keys::LOCAL_USERS, &records)?;

        info!(id = record.id, "Registered local user");
        self.notifier.notify(Notification::success("Account created! Please sign in."));
        Ok(record)
    }

    /// The locally registered users.
    pub fn local_users(&self) -> ClientResult<Vec<LocalUserRecord>> {
        Ok(self
            .storage
            .load_json::<Vec<LocalUserRecord>>(keys::LOCAL_USERS)?
            .unwrap_or_default())
    }
}

fn validate(form: &SignupForm) -> Result<(), ClientError> {
    if form.first_name.trim().is_empty() {
        return Err(ClientError::Validation("First name is required".to_string()));
    }
    if !email_pattern().is_match(form.email.trim()) {
        return Err(ClientError::Validation("A valid email is required".to_string()));
    }
    if form.password.is_empty() {
        return Err(ClientError::Validation("Password is required".to_string()));
    }
    if form.password != form.confirm_password {
        return Err(ClientError::Validation("Passwords don't match!".to_string()));
    }
    Ok(())
}
