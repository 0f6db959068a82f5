//! snippetboxd: the Snippetbox web server.
//!
//! Single binary that assembles the snippet store, the page template
//! cache and the HTTP router, then serves until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! snippetboxd serve --addr 127.0.0.1:4000 --dsn sqlite://snippetbox.db --ui-dir ./ui
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snippetbox_store::SnippetStore;
use snippetbox_web::WebConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,snippetboxd=debug,snippetbox_store=debug,snippetbox_web=debug";

#[derive(Parser)]
#[command(name = "snippetboxd", about = "Snippetbox web server")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "SNIPPETBOX_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI.
    Serve {
        /// HTTP network address.
        #[arg(long, env = "SNIPPETBOX_ADDR", default_value = "127.0.0.1:4000")]
        addr: String,

        /// SQLite data source name.
        #[arg(long, env = "DATABASE_URL", default_value = "sqlite://snippetbox.db")]
        dsn: String,

        /// Directory holding `html/` templates and `static/` assets.
        #[arg(long, env = "SNIPPETBOX_UI_DIR", default_value = "./ui")]
        ui_dir: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve { addr, dsn, ui_dir } => run_server(&addr, &dsn, ui_dir).await,
    }
}

async fn run_server(addr: &str, dsn: &str, ui_dir: PathBuf) -> anyhow::Result<()> {
    info!("Snippetbox starting");

    let store = SnippetStore::connect(dsn).await?;
    info!("snippet store opened");

    let config = WebConfig::from_ui_dir(&ui_dir);
    let router = snippetbox_web::build_app(store.clone(), &config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, ui = ?ui_dir, "HTTP server starting");

    // Graceful shutdown on Ctrl-C.
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    })
    .await?;

    store.close().await;
    info!("Snippetbox stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["snippetboxd", "serve"]).unwrap();
        let Command::Serve { addr, ui_dir, .. } = cli.command;
        assert_eq!(addr, "127.0.0.1:4000");
        assert_eq!(ui_dir, PathBuf::from("./ui"));
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::try_parse_from([
            "snippetboxd",
            "serve",
            "--addr",
            "0.0.0.0:8080",
            "--dsn",
            "sqlite::memory:",
            "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);
        let Command::Serve { addr, dsn, .. } = cli.command;
        assert_eq!(addr, "0.0.0.0:8080");
        assert_eq!(dsn, "sqlite::memory:");
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["snippetboxd"]).is_err());
    }
}
