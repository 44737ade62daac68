//! Question endpoints.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use sia_protocol::{AnswerResponse, Classification};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Longest accepted question, in characters.
const MAX_QUESTION_CHARS: usize = 2000;

/// Request body for both question endpoints.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

fn validated(body: Result<Json<AskRequest>, JsonRejection>) -> ApiResult<String> {
    let Json(req) = body?;
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }
    if req.question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "question longer than {MAX_QUESTION_CHARS} characters"
        )));
    }
    Ok(req.question)
}

/// POST /api/v1/ask: answer a free-text question.
pub async fn ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AnswerResponse>> {
    let question = validated(body)?;
    Ok(Json(state.assistant.answer(&question).await))
}

/// POST /api/v1/classify: intent and parameters only, no inventory access.
pub async fn classify(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<Classification>> {
    let question = validated(body)?;
    Ok(Json(state.assistant.classify(&question)))
}
