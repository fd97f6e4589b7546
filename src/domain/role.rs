use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "vendor")]
    Vendor,
    #[sea_orm(string_value = "buyer")]
    Buyer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Vendor => "vendor",
            Role::Buyer => "buyer",
        }
    }

    /// Roles a visitor may pick when registering. Admins are provisioned out of band.
    pub fn is_self_service(&self) -> bool {
        matches!(self, Role::Vendor | Role::Buyer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_cannot_self_register() {
        assert!(!Role::Admin.is_self_service());
        assert!(Role::Vendor.is_self_service());
        assert!(Role::Buyer.is_self_service());
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Role::Vendor).unwrap();
        assert_eq!(json, "\"vendor\"");
        let parsed: Role = serde_json::from_str("\"buyer\"").unwrap();
        assert_eq!(parsed, Role::Buyer);
    }
}
