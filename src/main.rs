use clap::Parser;
use completion_proxy::config::config_search_paths;
use completion_proxy::logging::{init_tracing, redact_secret};
use completion_proxy::{build_router, AppState, ProxyConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "completion-proxy",
    about = "Chat-completion translation proxy: OpenAI-style requests in, any compatible backend out",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long, env = "COMPLETION_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Backend base URL, e.g. https://api.deepseek.com/v1 (overrides config)
    #[arg(long, env = "BACKEND_BASE_URL")]
    base_url: Option<String>,

    /// Environment variable holding the backend API key (overrides config)
    #[arg(long, env = "BACKEND_API_KEY_ENV")]
    api_key_env: Option<String>,

    /// Print config search paths and exit
    #[arg(long)]
    show_config_paths: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();

    if cli.show_config_paths {
        println!("Config search paths:");
        for (i, path) in config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let mut config = ProxyConfig::find_and_load(cli.config.as_deref())?;

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(base_url) = cli.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(api_key_env) = cli.api_key_env {
        config.backend.api_key_env = api_key_env;
    }

    let state = AppState::from_config(config.clone())?;

    info!("  Backend:   {} ({})", config.backend.name, config.backend.base_url);
    info!("  Port:      {}", config.port);
    info!(
        "  Models:    {} mapped, default '{}'",
        state.mapping.len(),
        state.mapping.default_key()
    );
    match config.resolve_api_key() {
        Some(key) => info!("  API key:   {} (from {})", redact_secret(&key), config.backend.api_key_env),
        None => warn!(
            "  API key:   not set; export {} before sending completions",
            config.backend.api_key_env
        ),
    }

    let app = build_router(Arc::new(state));
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
