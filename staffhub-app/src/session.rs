//! Explicit session context
//!
//! Replaces ambient global auth state with one object that owns the
//! current session: it restores a persisted session on launch, signs in
//! and out against the hosted auth surface, and notifies subscribers of
//! every change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use shared::error::{AppError, AppResult};
use staffhub_client::{AuthBackend, ClientError, Session, UserInfo};

/// Auth state change event delivered to subscribers
#[derive(Debug, Clone)]
pub enum AuthState {
    SignedIn(UserInfo),
    SignedOut,
}

/// Callback invoked whenever the access token changes
///
/// Used to feed the session token into the REST client's authorization
/// header; `None` means signed out.
type TokenSink = Box<dyn Fn(Option<&str>) + Send + Sync>;

/// Owns the current session with the hosted service
pub struct SessionContext {
    auth: Arc<dyn AuthBackend>,
    session_file: Option<PathBuf>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthState>,
    token_sinks: std::sync::Mutex<Vec<TokenSink>>,
}

impl SessionContext {
    pub fn new(auth: Arc<dyn AuthBackend>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            auth,
            session_file: None,
            session: RwLock::new(None),
            events,
            token_sinks: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Persist the current session at `path` so a later launch can restore it
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Register a token sink (e.g., `RestClient::set_token`)
    pub fn on_token_change(&self, sink: impl Fn(Option<&str>) + Send + Sync + 'static) {
        self.token_sinks
            .lock()
            .expect("token sink lock poisoned")
            .push(Box::new(sink));
    }

    /// Subscribe to auth state changes
    pub fn subscribe(&self) -> broadcast::Receiver<AuthState> {
        self.events.subscribe()
    }

    /// Attempt to restore a persisted session
    ///
    /// A missing, unreadable, or expired session leaves the context signed
    /// out; launch never fails because of it.
    pub async fn init(&self) -> AppResult<()> {
        let Some(path) = &self.session_file else {
            return Ok(());
        };

        match Self::load_session_file(path) {
            Some(session) if session.is_expired() => {
                tracing::info!(email = %session.user.email, "Persisted session expired, cleared");
                let _ = std::fs::remove_file(path);
            }
            Some(session) => {
                tracing::info!(email = %session.user.email, "Restored persisted session");
                let user = session.user.clone();
                self.install(Some(session)).await;
                let _ = self.events.send(AuthState::SignedIn(user));
            }
            None => {}
        }

        Ok(())
    }

    /// Sign in with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<UserInfo> {
        if email.trim().is_empty() {
            return Err(AppError::required_field("email"));
        }
        if password.is_empty() {
            return Err(AppError::required_field("password"));
        }

        // Replace any previous session; its token is best-effort revoked
        if let Some(previous) = self.session.read().await.clone() {
            if let Err(e) = self.auth.sign_out(&previous.access_token).await {
                tracing::warn!(error = %e, "Failed to revoke previous session");
            }
        }

        let session = match self.auth.sign_in_with_password(email.trim(), password).await {
            Ok(session) => session,
            Err(ClientError::Unauthorized) => return Err(AppError::invalid_credentials()),
            Err(e) => return Err(e.into()),
        };

        let user = session.user.clone();
        self.persist(&session);
        self.install(Some(session)).await;
        let _ = self.events.send(AuthState::SignedIn(user.clone()));

        tracing::debug!(email = %user.email, "Signed in");
        Ok(user)
    }

    /// Sign out: best-effort backend revocation, then clear local state
    /// and notify subscribers
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Some(session) = self.session.read().await.clone() {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Backend sign-out failed, clearing locally");
            }
        }

        if let Some(path) = &self.session_file {
            let _ = std::fs::remove_file(path);
        }
        self.install(None).await;
        let _ = self.events.send(AuthState::SignedOut);

        tracing::debug!("Signed out");
        Ok(())
    }

    /// The signed-in identity, if any
    pub async fn current_user(&self) -> Option<UserInfo> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The current access token, if signed in
    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Swap the stored session and fan the token out to sinks
    async fn install(&self, session: Option<Session>) {
        let token = session.as_ref().map(|s| s.access_token.clone());
        *self.session.write().await = session;

        let sinks = self.token_sinks.lock().expect("token sink lock poisoned");
        for sink in sinks.iter() {
            sink(token.as_deref());
        }
    }

    fn persist(&self, session: &Session) {
        let Some(path) = &self.session_file else {
            return;
        };
        if let Err(e) = Self::save_session_file(path, session) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to persist session");
        }
    }

    fn save_session_file(path: &Path, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(path, content)
    }

    fn load_session_file(path: &Path) -> Option<Session> {
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Malformed session file, ignored");
                None
            }
        }
    }
}
