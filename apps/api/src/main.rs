mod analysis;
mod config;
mod errors;
mod models;
mod parsing;
mod recommend;
mod routes;
mod scoring;
mod similarity;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::ResumeEngine;
use crate::config::Config;
use crate::parsing::extractor::DocumentExtractor;
use crate::parsing::ner::{NerBackend, RegexNerBackend};
use crate::recommend::artifacts::ModelArtifacts;
use crate::recommend::recommender::RoleRecommender;
use crate::routes::build_router;
use crate::scoring::taxonomy::SkillTaxonomy;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-matcher v{}", env!("CARGO_PKG_VERSION"));

    // Skill taxonomy: file override or the built-in role table
    let taxonomy = match &config.skill_taxonomy_path {
        Some(path) => SkillTaxonomy::from_json_file(path)
            .with_context(|| format!("loading SKILL_TAXONOMY_PATH {}", path.display()))?,
        None => SkillTaxonomy::default(),
    };
    info!("Skill taxonomy loaded ({} roles)", taxonomy.role_names().count());

    // Role classifier artifacts are optional; without them recommendations are unavailable
    let recommender = load_recommender(&config);

    let ner: Arc<dyn NerBackend> = Arc::new(RegexNerBackend::new());
    info!("Name recognition backend: {}", ner.backend_id());

    let engine = ResumeEngine {
        extractor: DocumentExtractor::default(),
        ner,
        taxonomy: Arc::new(taxonomy),
        recommender,
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_recommender(config: &Config) -> Option<RoleRecommender> {
    match ModelArtifacts::load(
        &config.vectorizer_path,
        &config.classifier_path,
        &config.label_encoder_path,
    ) {
        Ok(artifacts) => {
            info!(
                "Role classifier loaded ({} classes) from {}",
                artifacts.num_classes(),
                config.classifier_path.display()
            );
            Some(RoleRecommender::new(Arc::new(artifacts)))
        }
        Err(e) => {
            warn!("Role recommendation disabled: {e}");
            None
        }
    }
}
