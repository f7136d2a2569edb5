//! Auth session: signup, login, identity lookup, logout.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use td_core::auth::{AuthResponse, LoginRequest, SignupRequest, User};
use td_core::cache::{CachePolicy, QueryCache, QuerySnapshot};
use td_core::ports::{AuthRemotePort, TokenStorePort};

use crate::binder::QueryBinder;
use crate::error::ClientError;
use crate::fetchers::UserFetcher;

/// Single-entry cache for the authenticated identity.
pub type UserCache = QueryCache<(), Option<User>>;

pub struct AuthService<A> {
    remote: Arc<A>,
    tokens: Arc<dyn TokenStorePort>,
    user_cache: Arc<UserCache>,
    identity: QueryBinder<(), Option<User>, UserFetcher<A>>,
}

impl<A: AuthRemotePort + 'static> AuthService<A> {
    pub fn new(
        remote: Arc<A>,
        tokens: Arc<dyn TokenStorePort>,
        user_stale_time: Duration,
    ) -> Self {
        let user_cache = Arc::new(UserCache::new(CachePolicy::with_stale_time(
            user_stale_time,
        )));
        let fetcher = Arc::new(UserFetcher::new(Arc::clone(&remote), Arc::clone(&tokens)));
        let identity = QueryBinder::new(Arc::clone(&user_cache), fetcher);
        Self {
            remote,
            tokens,
            user_cache,
            identity,
        }
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<User, ClientError> {
        request.validate()?;
        let user = self.remote.signup(request).await?;
        info!(user = user.id, "signup succeeded");
        Ok(user)
    }

    /// Log in and take possession of the bearer token. The cached
    /// identity is invalidated so the next read reflects the new session.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        request.validate()?;
        let response = self.remote.login(request).await?;
        self.tokens.set(response.access_token.clone());
        self.user_cache.invalidate_all().await;
        info!("login succeeded");
        Ok(response)
    }

    /// Current identity, `None` when no token is held. Served from cache
    /// within its stale window.
    pub async fn current_user(&self) -> QuerySnapshot<Option<User>> {
        self.identity.read(&()).await
    }

    /// Drop the token and the cached identity. Collection caches are
    /// cleared by the owning [`crate::TodoClient`].
    pub async fn logout(&self) {
        self.tokens.clear();
        self.user_cache.clear().await;
        info!("logged out");
    }
}
