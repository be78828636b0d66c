use async_trait::async_trait;
use courtside_application::SessionProvider;
use courtside_core::AppResult;
use courtside_domain::UserId;
use tokio::sync::RwLock;

/// Session provider holding the signed-in user for this process.
#[derive(Default)]
pub struct InMemorySessionProvider {
    current: RwLock<Option<UserId>>,
}

impl InMemorySessionProvider {
    /// Creates a provider with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session for `user_id`, replacing any previous one.
    pub async fn sign_in(&self, user_id: UserId) {
        *self.current.write().await = Some(user_id);
    }

    /// Ends the current session and returns the user that was signed in.
    ///
    /// Callers should also clear rate limit state so it does not carry over
    /// to the next account.
    pub async fn sign_out(&self) -> Option<UserId> {
        self.current.write().await.take()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn current_user_id(&self) -> AppResult<Option<UserId>> {
        Ok(*self.current.read().await)
    }
}
