// src/main.rs
// DUKAAN CORE - API SERVER
// Hindi/English shopping search, provider comparison and shopping lists over REST (Actix-Web)

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Modules
mod analyst;
mod api;
mod assistant;
mod brain;
mod comparison;
mod config;
mod error;
mod extractor;
mod lexicon;
mod links;
mod memory;
mod models;
mod normalizer;
mod ranker;
mod reporter;
mod scout;
mod systems;

use assistant::ShoppingAssistant;
use brain::{GeminiBrain, LanguageModel};
use comparison::ComparisonAggregator;
use config::AppConfig;
use memory::SessionStore;
use normalizer::QueryNormalizer;
use scout::{MarketScout, SearchBackend, SerperClient};
use systems::sensory::{HttpPageFetcher, PageFetcher};

// Shared State for the Server
pub struct AppState {
    pub config: AppConfig,
    pub assistant: Arc<ShoppingAssistant>,
    pub aggregator: Arc<ComparisonAggregator>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub sessions: SessionStore, // In-memory shopping lists, one per session
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let backend: Arc<dyn SearchBackend> = Arc::new(SerperClient::from_config(&config));
        let brain: Arc<dyn LanguageModel> = Arc::new(GeminiBrain::from_config(&config));

        let assistant = ShoppingAssistant::new(
            QueryNormalizer::default(),
            MarketScout::new(backend.clone()),
            brain.clone(),
        );
        let aggregator = ComparisonAggregator::new(backend, brain, config.demo_fallback);
        let fetcher = HttpPageFetcher::new(config.http_timeout());

        Self {
            assistant: Arc::new(assistant),
            aggregator: Arc::new(aggregator),
            fetcher: Arc::new(fetcher),
            sessions: SessionStore::new(),
            config,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    info!("🚀 Dukaan API Server Starting...");

    // 1. Configuration (read once)
    let config = AppConfig::from_env();
    if !config.has_search_key() {
        info!("🧪 No search API key, serving demo results");
    }
    let bind = (config.bind_addr.clone(), config.port);

    // 2. Shared State
    let app_state = web::Data::new(AppState::from_config(config));

    info!("🌍 Server running at http://{}:{}", bind.0, bind.1);

    // 3. Start HTTP Server
    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api::routes)
    })
    .bind(bind)?
    .run()
    .await
}
