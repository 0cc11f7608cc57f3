use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};

use game_client::commands::Command;
use game_client::{Config, GameSession, HttpGameApi};
use game_types::ViewModel;

fn print_view(view: &ViewModel) {
    match serde_json::to_string_pretty(view) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize view: {:?}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting BattleWord client...");

    let config = Config::new();
    info!("Using game server at {}", config.server_url);

    let api = Arc::new(HttpGameApi::new(&config)?);
    let session = GameSession::new(api, &config);

    // Print every new view
    let mut views = session.subscribe();
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            print_view(&view);
        }
    });

    print_view(&session.current_view());
    info!("Commands: create NAME | join NAME CODE | pick WORD | guess WORD | resume | new | view | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::View) => print_view(&session.current_view()),
                    Ok(command) => {
                        if let Err(e) = command.execute(&session).await {
                            warn!("{}", e);
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    session.shutdown().await;
    info!("Client shutdown complete.");
    Ok(())
}
