use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use config::AppConfig;
use services::errors::ReputationError;
use services::reputation_fetcher::ReputationProvider;
use services::result_cache::{MaxEntries, ResultCache};
use services::virustotal::VirusTotalClient;
use services::whois_lookup::{TcpWhoisClient, WhoisProvider};

/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub reputation: Arc<dyn ReputationProvider>,
    pub whois: Arc<dyn WhoisProvider>,
    pub cache: Arc<ResultCache>,
}

impl AppState {
    pub fn new(
        reputation: Arc<dyn ReputationProvider>,
        whois: Arc<dyn WhoisProvider>,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            reputation,
            whois,
            cache,
        }
    }

    /// Wires the real VirusTotal and WHOIS clients from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ReputationError> {
        let virus_total = VirusTotalClient::new(
            config.virus_total_base_url.clone(),
            config.virus_total_api_key.clone(),
            config.virus_total_timeout,
        )?;

        let mut whois = TcpWhoisClient::new(config.whois_timeout);
        if let Some(server) = &config.whois_server {
            whois = whois.with_server(server.clone());
        }

        let cache = match config.cache_max_entries {
            Some(max) => ResultCache::with_policy(MaxEntries(max)),
            None => ResultCache::new(),
        };

        Ok(Self::new(
            Arc::new(virus_total),
            Arc::new(whois),
            Arc::new(cache),
        ))
    }
}
