//! Realtime one-to-one chat and presence server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tomoshibi-server
//! cargo run --bin tomoshibi-server -- --host 0.0.0.0 --port 3000 --users-file users.json
//! ```

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use tomoshibi_server::{
    infrastructure::repository::{InMemoryConversationRepository, InMemoryUserDirectory},
    ui::{AppState, Server},
};
use tomoshibi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tomoshibi-server")]
#[command(about = "Realtime one-to-one chat and presence server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TOMOSHIBI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TOMOSHIBI_PORT", default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "TOMOSHIBI_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// JSON file mapping user ids to display names
    #[arg(long, env = "TOMOSHIBI_USERS_FILE")]
    users_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Repository / UserDirectory
    let repository = Arc::new(InMemoryConversationRepository::new(Arc::new(SystemClock)));
    let user_directory = match &args.users_file {
        Some(path) => {
            let directory = InMemoryUserDirectory::load(path).await?;
            tracing::info!(
                "Loaded {} user(s) from {}",
                directory.len().await,
                path.display()
            );
            directory
        }
        None => InMemoryUserDirectory::new(),
    };

    // 2. AppState (MessagePusher and UseCases)
    let app_state = AppState::new(repository, Arc::new(user_directory));

    // 3. Server
    Server::new(app_state).run(args.host, args.port).await
}
