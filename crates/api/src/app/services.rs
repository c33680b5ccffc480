//! Service wiring: store, engine, auth gateway, token codec.

use std::sync::Arc;

use chrono::Duration;

use ledgerbank_auth::{
    AuthGateway, CredentialRecord, Hs256TokenCodec, InMemoryCredentialStore,
};
use ledgerbank_infra::{InMemoryLedgerStore, PostgresLedgerStore};
use ledgerbank_ledger::{LedgerEngine, LedgerStore};

use crate::config::Config;

pub struct AppServices {
    pub engine: LedgerEngine<Arc<dyn LedgerStore>>,
    pub gateway: AuthGateway<Arc<InMemoryCredentialStore>>,
    pub codec: Hs256TokenCodec,
}

pub async fn build_services(config: &Config) -> anyhow::Result<AppServices> {
    let store: Arc<dyn LedgerStore> = match &config.database_url {
        Some(url) => Arc::new(PostgresLedgerStore::connect(url).await?),
        None => Arc::new(InMemoryLedgerStore::new()),
    };
    let engine = LedgerEngine::new(store);

    let credentials = Arc::new(InMemoryCredentialStore::new());
    credentials.upsert(CredentialRecord::new(
        config.seed_username.clone(),
        Some("Operator".to_string()),
        format!("{}-seed", config.seed_username),
        &config.seed_password,
        true,
    ));
    let gateway = AuthGateway::with_token_ttl(
        credentials,
        Duration::minutes(config.token_ttl_minutes),
    );

    let codec = Hs256TokenCodec::new(config.token_secret.as_bytes());

    Ok(AppServices {
        engine,
        gateway,
        codec,
    })
}
