use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{OrderStatus, ProductStatus, Role, catalog},
    entity::{audit_logs, categories, messages, order_items, orders, products, users},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VendorProfile {
    pub business_name: Option<String>,
    pub business_description: Option<String>,
    pub approved: bool,
    pub specialties: Vec<String>,
    pub rating: Option<f64>,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub vendor: Option<VendorProfile>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub images: Vec<String>,
    pub stock: i32,
    pub unlimited_stock: bool,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub is_official: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_number: String,
    pub subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    pub total: i64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub vendor_id: Uuid,
    pub title: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub product_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub body: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Reads a JSON array column of strings; anything else reads as empty.
pub fn string_list(value: Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

pub fn string_list_json(items: &[String]) -> Value {
    Value::from(items.to_vec())
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        let vendor = (model.role == Role::Vendor).then(|| VendorProfile {
            business_name: model.business_name,
            business_description: model.business_description,
            approved: model.vendor_approved,
            specialties: string_list(model.vendor_specialties),
            rating: model.vendor_rating,
            approved_at: model.approved_at.map(|dt| dt.with_timezone(&Utc)),
        });
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            is_active: model.is_active,
            vendor,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        let tags = string_list(model.tags);
        Self {
            id: model.id,
            vendor_id: model.vendor_id,
            category_id: model.category_id,
            title: model.title,
            description: model.description,
            price: model.price,
            images: string_list(model.images),
            stock: model.stock,
            unlimited_stock: model.unlimited_stock,
            status: model.status,
            is_official: catalog::is_official(&tags),
            tags,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            buyer_id: model.buyer_id,
            order_number: model.order_number,
            subtotal: model.subtotal,
            shipping: model.shipping,
            tax: model.tax,
            total: model.total,
            status: model.status,
            shipping_address: model.shipping_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            vendor_id: model.vendor_id,
            title: model.title,
            quantity: model.quantity,
            unit_price: model.unit_price,
            line_total: model.line_total,
        }
    }
}

impl From<messages::Model> for Message {
    fn from(model: messages::Model) -> Self {
        Self {
            id: model.id,
            sender_id: model.sender_id,
            recipient_id: model.recipient_id,
            product_id: model.product_id,
            order_id: model.order_id,
            body: model.body,
            read_at: model.read_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<audit_logs::Model> for AuditLog {
    fn from(model: audit_logs::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            resource: model.resource,
            metadata: model.metadata,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_list_tolerates_bad_shapes() {
        assert_eq!(string_list(json!(["a", "b"])), vec!["a", "b"]);
        assert!(string_list(json!({"a": 1})).is_empty());
        assert!(string_list(Value::Null).is_empty());
    }
}
