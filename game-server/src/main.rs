use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

use game_core::{GameRng, load_question_pack};
use game_persistence::connection::connect_and_migrate;
use game_server::{config::Config, create_routes, game_service::GameService};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Millionaire server...");

    let config = Config::new();
    let rules = match config.game_rules() {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!("Invalid game configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize database connection and run migrations
    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let rng = match config.rng_seed {
        Some(seed) => {
            info!("Using fixed RNG seed {}", seed);
            GameRng::new(seed)
        }
        None => GameRng::from_entropy(),
    };

    let game_service = Arc::new(GameService::new(
        db,
        rules,
        config.timeout_policy(),
        rng,
    ));

    if let Some(path) = &config.questions_file {
        let levels = match u8::try_from(game_service.rules().prize_table.levels()) {
            Ok(levels) => levels,
            Err(e) => {
                tracing::error!("Prize ladder too long for question levels: {}", e);
                std::process::exit(1);
            }
        };
        let questions = match load_question_pack(path, levels) {
            Ok(questions) => questions,
            Err(e) => {
                tracing::error!("Failed to load question pack '{}': {:#}", path, e);
                std::process::exit(1);
            }
        };
        match game_service.questions().count().await {
            Ok(0) => match game_service.questions().insert_questions(&questions).await {
                Ok(inserted) => info!("Seeded {} questions from {}", inserted, path),
                Err(e) => {
                    tracing::error!("Failed to seed questions: {}", e);
                    std::process::exit(1);
                }
            },
            Ok(existing) => info!(
                "Question bank already holds {} questions, skipping {}",
                existing, path
            ),
            Err(e) => {
                tracing::error!("Failed to inspect question bank: {}", e);
                std::process::exit(1);
            }
        }
    }

    let routes = create_routes(game_service.clone());

    // Start timeout sweep
    let sweep_service = game_service.clone();
    let sweep_every = Duration::from_secs(config.timeout_sweep_seconds.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            if let Err(e) = sweep_service.expire_overdue_games().await {
                warn!("Timeout sweep failed: {}", e);
            }
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let ip = match config.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("Invalid HOST '{}': {}", config.host, e);
            std::process::exit(1);
        }
    };

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown((ip, config.port), async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to listen for SIGINT");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to listen for SIGTERM");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
