use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Message;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "message must be 1 to 2000 characters"))]
    pub body: String,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub counterpart_name: Option<String>,
    pub last_message: Message,
    pub unread: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationList {
    pub items: Vec<ConversationSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageList {
    pub items: Vec<Message>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    pub marked: u64,
}
