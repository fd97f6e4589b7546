use std::collections::HashMap;

use uuid::Uuid;

use crate::{domain::Role, models::Message};

pub const MAX_BODY_CHARS: usize = 2000;

/// Messaging connects vendors with their customers. Admins may reach anyone;
/// two buyers never talk directly.
pub fn can_message(sender: Role, recipient: Role) -> bool {
    !(sender == Role::Buyer && recipient == Role::Buyer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationDigest {
    pub counterpart_id: Uuid,
    pub last_message: Message,
    pub unread: i64,
}

/// Groups messages involving `viewer` by the other participant.
///
/// `messages` must be sorted newest first; the result keeps that order, so the
/// most recently active conversation comes first.
pub fn group_conversations(viewer: Uuid, messages: &[Message]) -> Vec<ConversationDigest> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut out: Vec<ConversationDigest> = Vec::new();

    for message in messages {
        let counterpart = if message.sender_id == viewer {
            message.recipient_id
        } else if message.recipient_id == viewer {
            message.sender_id
        } else {
            continue;
        };
        let unread = i64::from(message.recipient_id == viewer && message.read_at.is_none());

        match index.get(&counterpart) {
            Some(&pos) => {
                if let Some(digest) = out.get_mut(pos) {
                    digest.unread += unread;
                }
            }
            None => {
                index.insert(counterpart, out.len());
                out.push(ConversationDigest {
                    counterpart_id: counterpart,
                    last_message: message.clone(),
                    unread,
                });
            }
        }
    }
    out
}
