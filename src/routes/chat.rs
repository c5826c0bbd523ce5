use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{
    CHAT_APP_TITLE, CHAT_FALLBACK_MAX_TOKENS, CHAT_FALLBACK_MODELS, CHAT_MAX_TOKENS,
    CHAT_TEMPERATURE,
};
use crate::error::{AppError, Result};
use crate::AppState;

/// System prompt framing the assistant as a book recommender
const SYSTEM_PROMPT: &str = "You are an expert assistant for books and literature. \
Your job is to help users find books they will love.

INSTRUCTIONS:
- Keep a friendly, conversational tone
- When the user mentions a genre, give specific book recommendations
- Include the title, the author and a short description for every recommendation
- Answer questions about literature in an informative way
- Be natural and adapt your answers to what the user tells you

FORMAT FOR RECOMMENDATIONS:
\u{2022} **Book title** - Author
Short description of the book and why it is recommended.

Be helpful, friendly and give complete answers.";

/// Canned reply used when the fallback model also returns nothing
const FALLBACK_GREETING: &str = "Hi! I'm your book assistant. How can I help you? \
Are you looking for recommendations in a particular genre?";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Accepted for forward compatibility with the UI; currently unused
    #[serde(rename = "userPreferences", default)]
    pub user_preferences: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Pull the assistant text out of a completion, treating blank output
/// as missing
fn extract_message(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
}

/// The model used when OPENROUTER_MODEL does not override it
fn selected_model(state: &AppState) -> String {
    state
        .config
        .openrouter_model
        .clone()
        .unwrap_or_else(|| CHAT_FALLBACK_MODELS[0].to_string())
}

/// Issue one completion request against the gateway
async fn send_completion(
    state: &AppState,
    api_key: &str,
    model: &str,
    messages: &[serde_json::Value],
    max_tokens: u32,
) -> Result<Option<String>> {
    let url = format!("{}/chat/completions", state.config.openrouter_base_url);
    let payload = json!({
        "model": model,
        "messages": messages,
        "max_tokens": max_tokens,
        "temperature": CHAT_TEMPERATURE,
    });

    let response = state
        .http
        .post(&url)
        .bearer_auth(api_key)
        .header("HTTP-Referer", &state.config.public_origin)
        .header("X-Title", CHAT_APP_TITLE)
        .json(&payload)
        .send()
        .await?;

    let completion: CompletionResponse = response.json().await?;
    Ok(extract_message(completion))
}

/// Chat with the book recommendation assistant
///
/// Proxies the conversation to the OpenAI-compatible gateway with the
/// book-assistant system prompt prepended. An empty completion is
/// retried once on the next free model at a reduced token budget; if
/// that also comes back empty the canned greeting is returned instead
/// of an error. Without a configured API key the endpoint answers 503.
pub async fn chat_completion(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    // 1. The gateway key is optional configuration; without it the
    //    endpoint is down, not broken
    let api_key = state
        .config
        .openrouter_api_key
        .clone()
        .ok_or(AppError::ChatUnavailable)?;

    // 2. Prepend the system prompt to the client's history
    let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
    for message in &payload.messages {
        messages.push(json!({ "role": message.role, "content": message.content }));
    }

    let model = selected_model(&state);
    tracing::info!(
        "Chat completion request: model={}, messages={}",
        model,
        messages.len()
    );

    // 3. Primary attempt; transport failures surface as a generic 500
    if let Some(message) = send_completion(&state, &api_key, &model, &messages, CHAT_MAX_TOKENS)
        .await?
    {
        return Ok(Json(ChatResponse { message }));
    }

    // 4. Empty completion: retry once on the next free model
    let fallback_model = CHAT_FALLBACK_MODELS[1];
    tracing::warn!(
        "Empty completion from {}, retrying with {}",
        model,
        fallback_model
    );

    match send_completion(
        &state,
        &api_key,
        fallback_model,
        &messages,
        CHAT_FALLBACK_MAX_TOKENS,
    )
    .await
    {
        Ok(Some(message)) => {
            tracing::info!("Fallback completion succeeded with {}", fallback_model);
            Ok(Json(ChatResponse { message }))
        }
        Ok(None) | Err(_) => {
            // 5. Both models came up empty; answer with the greeting
            tracing::warn!("Fallback completion failed, returning canned greeting");
            Ok(Json(ChatResponse {
                message: FALLBACK_GREETING.to_string(),
            }))
        }
    }
}
