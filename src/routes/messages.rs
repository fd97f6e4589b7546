use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::messages::{ConversationList, MarkReadResponse, MessageList, SendMessageRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Message,
    response::ApiResponse,
    routes::params::Pagination,
    services::message_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_conversations).post(send_message))
        .route("/with/{user_id}", get(get_thread))
        .route("/with/{user_id}/read", post(mark_thread_read))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    responses(
        (status = 200, description = "One entry per counterpart, newest first", body = ApiResponse<ConversationList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
pub async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ConversationList>>> {
    Ok(Json(message_service::list_conversations(&state, &user).await?))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = ApiResponse<Message>),
        (status = 400, description = "Recipient not allowed or body invalid")
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Message>>)> {
    let resp = message_service::send_message(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/messages/with/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Counterpart user ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Thread with one counterpart", body = ApiResponse<MessageList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
pub async fn get_thread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(counterpart): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<MessageList>>> {
    Ok(Json(
        message_service::get_thread(&state, &user, counterpart, pagination).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/messages/with/{user_id}/read",
    params(("user_id" = Uuid, Path, description = "Counterpart user ID")),
    responses(
        (status = 200, description = "Unread messages from the counterpart marked read", body = ApiResponse<MarkReadResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
pub async fn mark_thread_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(counterpart): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MarkReadResponse>>> {
    Ok(Json(
        message_service::mark_thread_read(&state, &user, counterpart).await?,
    ))
}
