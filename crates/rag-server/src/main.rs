//! Process entry point (spec §4.7): loads configuration, opens the store
//! pool, builds the embedding/LLM clients and cache, wires the retrieval
//! pipeline and agent orchestrator, then serves the HTTP surface with a
//! graceful-shutdown window.
//!
//! Startup order mirrors the dependency graph: config, store pool,
//! embedding client, cache, tool registry, then the HTTP listener. Each
//! step fails fast rather than starting a half-wired server.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rag_agent::{
    AgentOrchestrator, GetDocumentTool, HttpLlmClient, HybridSearchTool, ListDocumentsTool, LlmConfig,
    SearchTool, ToolRegistry, UnavailableGraphTool, VectorSearchTool,
};
use rag_cache::Cache;
use rag_core::document::EmbeddingProvider;
use rag_core::tool::ToolName;
use rag_embed::{EmbedConfig, Embedder, HttpEmbeddingClient};
use rag_http::AppState;
use rag_retrieve::RetrievalPipeline;
use tokio::signal;
use tracing::{error, info};

/// The system prompt handed to the model every turn (spec §4.5 `Init`).
/// Fixed for this deployment; prompt management is out of scope (spec §1).
const SYSTEM_PROMPT: &str = "You are a retrieval-augmented assistant. Use the \
available tools to ground every factual claim in the knowledge base before \
answering. Cite the documents you used.";

/// Bound on how long in-flight requests get to finish once a shutdown
/// signal arrives (spec §4.7).
const SHUTDOWN_GRACE: Duration = Duration::from_secs(20);

#[derive(Parser, Debug)]
#[command(name = "rag-server", about = "Retrieval-augmented question-answering backend")]
struct Cli {
    /// Override the listen port (otherwise `PORT`, default 8080).
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build the Tokio runtime")?;

    match runtime.block_on(run(cli)) {
        // `run` only returns `Ok` once `shutdown_signal` has fired, so a
        // clean return here always means the process was interrupted
        // (spec §4.7 exit code 130), not that it ran to unprompted
        // completion.
        Ok(()) => std::process::exit(130),
        Err(StartupError::Config(err)) => {
            error!(error = %err, "configuration error");
            std::process::exit(1);
        }
        Err(StartupError::Other(err)) => {
            error!(error = %err, "startup failed");
            std::process::exit(2);
        }
    }
}

enum StartupError {
    Config(rag_config::ConfigError),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for StartupError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = rag_config::load().map_err(StartupError::Config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!(port = config.port, "configuration loaded");

    let pool = rag_store::pool::connect(&config.store_url)
        .await
        .context("failed to open the store connection pool")?;

    let provider = infer_embedding_provider(&config.embed_base_url, &config.embed_model);
    let mut dimensions = HashMap::new();
    dimensions.insert(provider, config.embed_dim);
    let store = rag_store::VectorStoreGateway::new(pool, dimensions);

    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbeddingClient::new(EmbedConfig {
        base_url: config.embed_base_url.clone(),
        api_key: config.embed_api_key.clone(),
        model: config.embed_model.clone(),
        dimension: config.embed_dim,
        rate_per_min: config.embed_rate_per_min,
        concurrency: config.embed_concurrency,
        base_batch: config.embed_base_batch,
        min_batch: 10,
        max_batch: 200,
    }));

    let cache = Arc::new(Cache::new(config.cache_bytes));

    let pipeline = Arc::new(RetrievalPipeline::new(
        Arc::clone(&embedder),
        Arc::clone(&cache),
        store.clone(),
        provider,
        config.embed_model.clone(),
        Duration::from_secs(config.cache_ttl_secs),
    ));

    // Readiness: a reachable pool and a cheap round-trip embedding call
    // both have to succeed before this process reports itself ready
    // (spec §4.7). The probe's vector is discarded; only reachability
    // matters here.
    store.ping().await.context("store is not reachable at startup")?;
    embedder
        .embed_one("readiness probe".to_string())
        .await
        .context("embedding provider is not reachable at startup")?;

    let llm: Arc<dyn rag_agent::LlmClient> = Arc::new(
        HttpLlmClient::new(LlmConfig {
            base_url: config.llm_base_url.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        })
        .context("failed to build the LLM client")?,
    );

    let tools = ToolRegistry::new(build_tools(&pipeline, &store));
    let orchestrator = Arc::new(AgentOrchestrator::new(
        llm,
        tools,
        store.clone(),
        config.llm_model.clone(),
        SYSTEM_PROMPT.to_string(),
    ));

    let state = AppState::new(
        Arc::clone(&pipeline),
        Arc::clone(&orchestrator),
        store.clone(),
        Arc::clone(&cache),
        config.graph_url.is_some(),
    );

    let router = rag_http::build_router(state, &config.cors_origins, config.max_request_bytes as usize);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    info!(port = config.port, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with an error")?;

    // Shutdown is the reverse of startup: stop accepting connections
    // first (above), then release owned resources in reverse acquisition
    // order. The embedding client is the only one with anything to flush.
    embedder.close().await;
    info!(
        cache_hits = cache.stats().hits,
        cache_misses = cache.stats().misses,
        "cache stats at shutdown"
    );

    Ok(())
}

fn build_tools(
    pipeline: &Arc<RetrievalPipeline>,
    store: &rag_store::VectorStoreGateway,
) -> Vec<Arc<dyn SearchTool>> {
    vec![
        Arc::new(VectorSearchTool::new(Arc::clone(pipeline))),
        Arc::new(HybridSearchTool::new(Arc::clone(pipeline))),
        Arc::new(GetDocumentTool::new(store.clone())),
        Arc::new(ListDocumentsTool::new(store.clone())),
        // Knowledge-graph construction is out of scope (spec §1); these
        // three report unavailable rather than being omitted, so a model
        // that tries them gets a typed error instead of an unknown-tool one.
        Arc::new(UnavailableGraphTool::new(ToolName::GraphSearch)),
        Arc::new(UnavailableGraphTool::new(ToolName::GetEntityRelationships)),
        Arc::new(UnavailableGraphTool::new(ToolName::GetEntityTimeline)),
    ]
}

/// No `EMBED_PROVIDER` key exists in configuration (spec §6 lists only
/// `EMBED_BASE_URL`/`EMBED_MODEL`); the provider tag the store keys its
/// dimension registry on is derived from those instead of added as a
/// fourth required variable operators would have to keep in sync.
fn infer_embedding_provider(base_url: &str, model: &str) -> EmbeddingProvider {
    let haystack = format!("{base_url} {model}").to_lowercase();
    if haystack.contains("cohere") {
        EmbeddingProvider::Cohere
    } else if haystack.contains("voyage") {
        EmbeddingProvider::VoyageAi
    } else if haystack.contains("openai") {
        EmbeddingProvider::OpenAi
    } else {
        EmbeddingProvider::Local
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RAG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Waits for SIGINT or SIGTERM, whichever arrives first, and logs which
/// one triggered shutdown (spec §4.7). `axum::serve`'s graceful shutdown
/// then stops accepting new connections and waits up to the caller-driven
/// lifetime of in-flight requests; [`SHUTDOWN_GRACE`] bounds how long this
/// process additionally waits before the runtime itself tears down.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }

    // `axum::serve`'s graceful shutdown waits for in-flight requests with
    // no ceiling of its own; this watchdog forces the process down if
    // that drain hasn't finished within the grace window (spec §4.7
    // "bounded waits").
    tokio::spawn(async move {
        tokio::time::sleep(SHUTDOWN_GRACE).await;
        error!("graceful shutdown exceeded its grace window, forcing exit");
        std::process::exit(130);
    });
}
