use crate::config::ServerConfig;
use crate::error::ServerResult;
use classify::Lexicon;
use crawler::{CrawlerConfig, PageClient};
use matcher::{BannerMatcher, MatcherConfig};
use signatures::SignatureStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Signature snapshot loaded at startup (read-only on the request path)
    pub store: Arc<SignatureStore>,

    /// Banner matcher over the signature snapshot
    pub matcher: Arc<BannerMatcher>,

    /// Crawler client for feeds, posts, and on-demand page extraction
    pub page_client: PageClient,

    /// Keyword lexicon shared by every scoring request
    pub lexicon: Arc<Lexicon>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = Arc::new(SignatureStore::load(&config.signatures_path)?);
        let matcher = Arc::new(BannerMatcher::new(store.clone(), MatcherConfig::default())?);
        let page_client = PageClient::new(CrawlerConfig::default())?;

        Ok(Self {
            config: Arc::new(config),
            store,
            matcher,
            page_client,
            lexicon: Arc::new(Lexicon::korean_defaults()),
        })
    }
}
