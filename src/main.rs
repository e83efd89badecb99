use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use tracing::{error, info};

use fleur::api;
use fleur::catalog::{seed::seed_catalog, Catalog};
use fleur::chat::ChatService;
use fleur::cli::{
    commands::{Cli, Commands},
    run_cli,
};
use fleur::config::AppConfig;
use fleur::db;
use fleur::llm::{CompletionGateway, ProviderFactory};
use fleur::scent::ScentFinder;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting Fleur AI fragrance service...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_pool = match db::get_connection(&config.database) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    {
        let conn = db_pool.lock().unwrap();
        match seed_catalog(&conn) {
            Ok(0) => {}
            Ok(n) => info!("Seeded {} products into the catalog", n),
            Err(e) => {
                error!("Failed to seed catalog: {}", e);
                std::process::exit(1);
            }
        }
    }

    let provider = match ProviderFactory::create_default(&config) {
        Some(p) => p,
        None => {
            error!("Failed to initialize LLM provider from config mapping");
            std::process::exit(1);
        }
    };
    let gateway = Arc::new(CompletionGateway::new(
        provider,
        Duration::from_secs(config.llm.request_timeout_secs),
    ));
    info!("Completions served by '{}'", gateway.provider_name());

    let chat = web::Data::new(ChatService::new(
        db_pool.clone(),
        gateway.clone(),
        Catalog::new(db_pool.clone()),
        config.chat.clone(),
    ));
    let finder = web::Data::new(ScentFinder::new(
        Catalog::new(db_pool.clone()),
        gateway,
        &config.scent,
    ));

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(chat.clone())
            .app_data(finder.clone())
            .route("/health", web::get().to(health))
            .configure(api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
