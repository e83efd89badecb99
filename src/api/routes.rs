use actix_web::{post, web, HttpResponse, Result as WebResult};

use crate::api::models::{ChatRequest, ChatResponseBody, ScentFinderRequest, ScentFinderResponse};
use crate::chat::{ChatError, ChatService};
use crate::scent::{ScentError, ScentFinder};

// Upstream model failures never surface here: both services degrade to
// their fallback output and these handlers return 200. The only client
// errors are an empty message and an incomplete quiz.

#[post("/chat")]
pub async fn ai_chat(chat: web::Data<ChatService>, req: web::Json<ChatRequest>) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    match chat.send_message(req.session_id, &req.message).await {
        Ok(reply) => Ok(HttpResponse::Ok().json(ChatResponseBody {
            session_id: reply.session_id,
            response: reply.response,
        })),
        Err(e @ ChatError::EmptyMessage) => Ok(HttpResponse::BadRequest().body(e.to_string())),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

#[post("/scent-finder")]
pub async fn scent_finder(
    finder: web::Data<ScentFinder>,
    req: web::Json<ScentFinderRequest>,
) -> WebResult<HttpResponse> {
    match finder.recommend(&req.answers).await {
        Ok(recommendations) => Ok(HttpResponse::Ok().json(ScentFinderResponse { recommendations })),
        Err(e @ ScentError::IncompleteQuiz(_)) => Ok(HttpResponse::BadRequest().body(e.to_string())),
        Err(e) => Ok(HttpResponse::InternalServerError().body(e.to_string())),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/ai").service(ai_chat).service(scent_finder));
}
