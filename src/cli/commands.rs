use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "fleur", version, about = "Fleur AI Fragrance Service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve,

    /// Talk to the fragrance consultant from the terminal
    Chat {
        /// Continue an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<Uuid>,
    },

    /// Manage stored chat sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// List all sessions
    List,

    /// Delete a session and its transcript
    Delete { id: Uuid },
}
