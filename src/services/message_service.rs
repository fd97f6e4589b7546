use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        Role,
        messaging::{MAX_BODY_CHARS, can_message, group_conversations},
    },
    dto::messages::{
        ConversationList, ConversationSummary, MarkReadResponse, MessageList, SendMessageRequest,
    },
    entity::{
        messages::{ActiveModel as MessageActive, Column as MessageCol, Entity as Messages},
        orders::Entity as Orders,
        products::Entity as Products,
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Message,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::user_service::find_user,
    state::AppState,
};

/// How many recent messages are scanned to build the inbox.
const INBOX_SCAN_LIMIT: u64 = 1000;

fn between(a: Uuid, b: Uuid) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(MessageCol::SenderId.eq(a))
                .add(MessageCol::RecipientId.eq(b)),
        )
        .add(
            Condition::all()
                .add(MessageCol::SenderId.eq(b))
                .add(MessageCol::RecipientId.eq(a)),
        )
}

pub async fn send_message(
    state: &AppState,
    user: &AuthUser,
    payload: SendMessageRequest,
) -> AppResult<ApiResponse<Message>> {
    payload.validate()?;
    let body = payload.body.trim().to_string();
    if body.is_empty() {
        return Err(AppError::BadRequest("message body must not be blank".into()));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::BadRequest(format!(
            "message body is limited to {MAX_BODY_CHARS} characters"
        )));
    }
    if payload.recipient_id == user.user_id {
        return Err(AppError::BadRequest("cannot message yourself".into()));
    }

    let recipient = find_user(state, payload.recipient_id).await?;
    if !recipient.is_active {
        return Err(AppError::NotFound);
    }
    if !can_message(user.role, recipient.role) {
        return Err(AppError::Forbidden);
    }
    if let Some(product_id) = payload.product_id {
        if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
            return Err(AppError::BadRequest(format!("product {product_id} does not exist")));
        }
    }
    if let Some(order_id) = payload.order_id {
        let order = Orders::find_by_id(order_id).one(&state.orm).await?;
        let involved = order.is_some_and(|o| {
            o.buyer_id == user.user_id || o.buyer_id == recipient.id || user.role == Role::Admin
        });
        if !involved {
            return Err(AppError::BadRequest(format!("order {order_id} is not yours")));
        }
    }

    let message = MessageActive {
        id: Set(Uuid::new_v4()),
        sender_id: Set(user.user_id),
        recipient_id: Set(recipient.id),
        product_id: Set(payload.product_id),
        order_id: Set(payload.order_id),
        body: Set(body),
        read_at: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(message_id = %message.id, to = %message.recipient_id, "message sent");
    if matches!(user.role, Role::Vendor | Role::Admin) {
        audit::record(
            &state.pool,
            user.user_id,
            "message_send",
            "messages",
            serde_json::json!({ "message_id": message.id, "recipient_id": message.recipient_id }),
        )
        .await;
    }
    Ok(ApiResponse::success(
        "Message sent",
        Message::from(message),
        Some(Meta::empty()),
    ))
}

pub async fn list_conversations(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ConversationList>> {
    let recent: Vec<Message> = Messages::find()
        .filter(
            Condition::any()
                .add(MessageCol::SenderId.eq(user.user_id))
                .add(MessageCol::RecipientId.eq(user.user_id)),
        )
        .order_by_desc(MessageCol::CreatedAt)
        .limit(INBOX_SCAN_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Message::from)
        .collect();

    let digests = group_conversations(user.user_id, &recent);
    let ids: Vec<Uuid> = digests.iter().map(|d| d.counterpart_id).collect();
    let names: HashMap<Uuid, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        Users::find()
            .filter(UserCol::Id.is_in(ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|u| {
                let display = match u.role {
                    Role::Vendor => u.business_name.unwrap_or(u.name),
                    _ => u.name,
                };
                (u.id, display)
            })
            .collect()
    };

    let items = digests
        .into_iter()
        .map(|d| ConversationSummary {
            counterpart_name: names.get(&d.counterpart_id).cloned(),
            counterpart_id: d.counterpart_id,
            last_message: d.last_message,
            unread: d.unread,
        })
        .collect();

    Ok(ApiResponse::success(
        "Conversations",
        ConversationList { items },
        None,
    ))
}

pub async fn get_thread(
    state: &AppState,
    user: &AuthUser,
    counterpart: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<MessageList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Messages::find()
        .filter(between(user.user_id, counterpart))
        .order_by_desc(MessageCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Message::from)
        .collect();

    Ok(ApiResponse::success(
        "Messages",
        MessageList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn mark_thread_read(
    state: &AppState,
    user: &AuthUser,
    counterpart: Uuid,
) -> AppResult<ApiResponse<MarkReadResponse>> {
    let result = Messages::update_many()
        .col_expr(MessageCol::ReadAt, Expr::value(Utc::now()))
        .filter(MessageCol::SenderId.eq(counterpart))
        .filter(MessageCol::RecipientId.eq(user.user_id))
        .filter(MessageCol::ReadAt.is_null())
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Marked as read",
        MarkReadResponse {
            marked: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}
