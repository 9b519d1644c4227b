#![forbid(unsafe_code)]

use civiclens_server::{AppConfig, AppState, build_router};
use civiclens_store::{
    DemoMode, DisabledClassifier, GeminiClassifier, IssueClassifier, IssueStore, MemoryStore,
    RestTableClient, StoreFacade, TableStore,
};
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "on" => Some(true),
            "0" | "false" | "no" | "n" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn allowed_origins() -> Vec<String> {
    let mut origins = vec![
        "http://localhost:3000".to_string(),
        "https://localhost:3000".to_string(),
    ];
    if let Some(frontend) = env_nonempty("FRONTEND_URL") {
        origins.push(frontend);
    }
    if let Some(vercel) = env_nonempty("VERCEL_URL") {
        if vercel.starts_with("http") {
            origins.push(vercel);
        } else {
            origins.push(format!("https://{vercel}"));
        }
    }
    if let Some(extra) = env_nonempty("ALLOWED_ORIGINS") {
        origins.extend(
            extra
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string),
        );
    }
    origins.sort();
    origins.dedup();
    origins
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("CIVICLENS_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let config = AppConfig {
        demo_mode_default: env_bool("DEMO_MODE", true),
        session_salt: env_nonempty("SESSION_SALT")
            .unwrap_or_else(|| civiclens_core::DEFAULT_SESSION_SALT.to_string()),
        cors_allowed_origins: allowed_origins(),
        max_body_bytes: env_usize("CIVICLENS_MAX_BODY_BYTES", 10 * 1024 * 1024),
    };

    let table: Option<Arc<dyn IssueStore>> =
        match (env_nonempty("SUPABASE_URL"), env_nonempty("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(key)) => {
                info!("persistent backend enabled");
                Some(Arc::new(TableStore::new(Arc::new(RestTableClient::new(
                    url, key,
                )))))
            }
            _ => {
                info!("persistent backend not configured, demo store only");
                None
            }
        };

    let classifier: Arc<dyn IssueClassifier> = match env_nonempty("GEMINI_API_KEY") {
        Some(key) => {
            let mut classifier = GeminiClassifier::new(key);
            if let Some(model) = env_nonempty("GEMINI_MODEL") {
                classifier = classifier.with_model(model);
            }
            info!("photo classifier enabled");
            Arc::new(classifier)
        }
        None => Arc::new(DisabledClassifier),
    };

    let facade = StoreFacade::new(
        DemoMode::new(config.demo_mode_default),
        Arc::new(MemoryStore::seeded()),
        table,
        classifier,
    );
    let state = AppState::new(Arc::new(facade), config);
    let app = build_router(state);

    let bind_addr = env::var("CIVICLENS_BIND").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("civiclens-server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
