use std::sync::Arc;

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::ChatConfig;
use crate::db::{models::Session, service::DbService, DbPool};
use crate::llm::models::Message as LlmMessage;
use crate::llm::CompletionGateway;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("session store error: {0}")]
    Store(#[from] duckdb::Error),
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub response: String,
}

/// The fragrance assistant. Holds no per-request state; transcripts live in
/// the session store and are re-read on every message.
///
/// Two concurrent messages on one session race on the transcript
/// read-modify-write. Sessions are human-paced, so last-write-wins is the
/// accepted policy here rather than a per-session lock.
pub struct ChatService {
    pool: DbPool,
    gateway: Arc<CompletionGateway>,
    catalog: Catalog,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(pool: DbPool, gateway: Arc<CompletionGateway>, catalog: Catalog, config: ChatConfig) -> Self {
        Self {
            pool,
            gateway,
            catalog,
            config,
        }
    }

    /// One chat round-trip: append the user turn, ask the model for a reply
    /// in the context of the whole transcript, append the assistant turn.
    ///
    /// A completion failure never reaches the caller as an error: the reply
    /// degrades to the configured fallback text and the assistant turn is
    /// not written, leaving the user turn in place for the next attempt.
    pub async fn send_message(&self, session_id: Option<Uuid>, text: &str) -> Result<ChatReply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let session = self.resolve_session(session_id, text)?;
        let preamble = self.build_preamble()?;

        // Append the user turn and snapshot the transcript, releasing the
        // connection before the slow network call.
        let history = {
            let conn = self.pool.lock().unwrap();
            DbService::insert_message(&conn, session.id, "user", text, None, None)?;
            DbService::get_messages(&conn, session.id, self.config.max_history_messages as usize, 0)?
        };

        let turns: Vec<LlmMessage> = history
            .into_iter()
            .map(|m| LlmMessage {
                role: m.role,
                content: m.content,
            })
            .collect();

        match self.gateway.complete(&preamble, &turns).await {
            Ok(reply) => {
                let conn = self.pool.lock().unwrap();
                let tokens = reply
                    .usage
                    .map(|u| (u.input_tokens + u.output_tokens) as i32);
                DbService::insert_message(
                    &conn,
                    session.id,
                    "assistant",
                    &reply.content,
                    Some(&reply.model),
                    tokens,
                )?;
                Ok(ChatReply {
                    session_id: session.id,
                    response: reply.content,
                })
            }
            Err(e) => {
                warn!(session = %session.id, error = %e, "completion failed, serving fallback reply");
                Ok(ChatReply {
                    session_id: session.id,
                    response: self.config.fallback_reply.clone(),
                })
            }
        }
    }

    /// Reuse the referenced session when it exists; otherwise start a fresh
    /// one named after the opening message.
    fn resolve_session(&self, session_id: Option<Uuid>, first_text: &str) -> Result<Session, ChatError> {
        let conn = self.pool.lock().unwrap();

        if let Some(id) = session_id {
            if let Some(session) = DbService::get_session(&conn, id)? {
                return Ok(session);
            }
        }

        Ok(DbService::insert_session(&conn, &session_name(first_text))?)
    }

    /// Persona plus a live rendering of the collection, so the assistant
    /// grounds its advice in products that actually exist right now.
    fn build_preamble(&self) -> Result<String, ChatError> {
        let products = self.catalog.list_all()?;

        let mut table = String::new();
        for p in &products {
            table.push_str(&format!(
                "- {} | {} | ₹{:.0} | {}\n",
                p.name, p.scent_family, p.price, p.short_description
            ));
        }

        Ok(format!(
            "{}\n\nThe current collection (name | scent family | price | character):\n{}",
            self.config.system_prompt.trim(),
            table
        ))
    }
}

fn session_name(text: &str) -> String {
    let name: String = text.chars().take(40).collect();
    if name.len() < text.len() {
        format!("{}…", name.trim_end())
    } else {
        name
    }
}
