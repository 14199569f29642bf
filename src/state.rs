use std::sync::Arc;

use crate::auth::{TokenIssuer, TokenKeys, TokenVerifier};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, LoginThrottle, PostService, SeaOrmAuthService, SeaOrmPostService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub verifier: TokenVerifier,

    pub throttle: Arc<LoginThrottle>,

    pub auth_service: Arc<dyn AuthService>,

    pub post_service: Arc<dyn PostService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !config.auth.secret.is_empty(),
            "auth.secret must be set before constructing state"
        );

        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let keys = TokenKeys::from_secret(&config.auth.secret);
        let issuer = TokenIssuer::new(keys.clone(), config.auth.session_ttl_seconds);
        let verifier = TokenVerifier::new(keys);

        let throttle = Arc::new(LoginThrottle::new(config.security.auth_throttle.clone()));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            issuer,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let post_service = Arc::new(SeaOrmPostService::new(store.clone())) as Arc<dyn PostService>;

        Ok(Self {
            config,
            store,
            verifier,
            throttle,
            auth_service,
            post_service,
        })
    }
}
