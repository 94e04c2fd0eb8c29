use chatd::config::Config;
use chatd::error::ServerError;
use chatd::{Db, TokenStore};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

async fn run(config: Config) -> Result<(), ServerError> {
    let token_path = config.token_path();
    let db_path = config.db_path();
    for path in [&token_path, &db_path] {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(chatd::error::DbError::Io)?;
        }
    }

    let token = TokenStore::initialize(&token_path)?;
    info!(path = %token_path.display(), "admission token written");

    let db = Db::open(&db_path)?;
    db.integrity_check()?;

    let listener =
        TcpListener::bind(("0.0.0.0", config.port))
            .await
            .map_err(|source| ServerError::Bind {
                port: config.port,
                source,
            })?;
    info!(port = config.port, "listening");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let serializer = chatd::serializer::Serializer::new(db, token);

    let serializer_task = tokio::spawn(serializer.run(events_rx));
    let acceptor_task = tokio::spawn(chatd::acceptor::run(listener, events_tx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
        }
        _ = serializer_task => {
            error!("serializer task exited unexpectedly");
        }
        _ = acceptor_task => {
            error!("acceptor task exited unexpectedly");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "chatd starting");

    let config = Config::parse();
    if let Err(e) = run(config).await {
        error!(error = %e, "FATAL");
        std::process::exit(1);
    }
}
