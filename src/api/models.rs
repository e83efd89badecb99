use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scent::{QuizAnswer, Recommendation};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub session_id: Uuid,
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ScentFinderRequest {
    pub answers: Vec<QuizAnswer>,
}

#[derive(Debug, Serialize)]
pub struct ScentFinderResponse {
    pub recommendations: Vec<Recommendation>,
}
