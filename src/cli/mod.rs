pub mod commands;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::catalog::{seed::seed_catalog, Catalog};
use crate::chat::ChatService;
use crate::cli::commands::{Commands, SessionAction};
use crate::config::AppConfig;
use crate::db::{get_connection, service::DbService};
use crate::llm::{CompletionGateway, ProviderFactory};

pub async fn run_cli(command: Commands, config_path: String) {
    let config = AppConfig::load(&config_path).expect("Failed to load config");

    match command {
        Commands::Serve => {
            panic!("Serve command should be intercepted by main.rs to boot actix-web");
        }
        Commands::Session { action } => {
            let pool = get_connection(&config.database).expect("DB error");
            let conn = pool.lock().unwrap();

            match action {
                SessionAction::List => match DbService::list_sessions(&conn, 50, 0) {
                    Ok(sessions) => {
                        if sessions.is_empty() {
                            println!("No sessions found.");
                        } else {
                            println!("{:<38} | {:<20} | {}", "ID", "Created At", "Name");
                            println!("{:-<38}-+-{:-<20}-+-{:-<20}", "", "", "");
                            for s in sessions {
                                println!("{:<38} | {:<20} | {}", s.id.to_string(), s.created_at, s.name);
                            }
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                },
                SessionAction::Delete { id } => match DbService::delete_session(&conn, id) {
                    Ok(_) => println!("Deleted session {}", id),
                    Err(e) => eprintln!("Error: {}", e),
                },
            }
        }
        Commands::Chat { session } => {
            run_repl(session, config).await;
        }
    }
}

async fn run_repl(session_id: Option<Uuid>, config: AppConfig) {
    let pool = get_connection(&config.database).expect("DB error");
    {
        let conn = pool.lock().unwrap();
        seed_catalog(&conn).expect("Failed to seed catalog");
    }

    let provider = ProviderFactory::create_default(&config).expect("Failed to init LLM provider");
    let gateway = Arc::new(CompletionGateway::new(
        provider,
        Duration::from_secs(config.llm.request_timeout_secs),
    ));
    let catalog = Catalog::new(pool.clone());
    let chat = ChatService::new(pool, gateway, catalog, config.chat.clone());

    let mut current = session_id;

    println!("--- Fleur Fragrance Consultant ---");
    println!("Type /exit to quit.");
    println!("----------------------------------");

    loop {
        print!("\nYou> ");
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let text = input.trim();

        if text.is_empty() {
            continue;
        }
        if text == "/exit" || text == "/quit" {
            break;
        }

        match chat.send_message(current, text).await {
            Ok(reply) => {
                current = Some(reply.session_id);
                println!("Fleur> {}", reply.response);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}
