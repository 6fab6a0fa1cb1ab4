use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::suppliers::{CreateSupplierRequest, UpdateSupplierRequest};
use crate::models::{SupplierRow, User};

/// Operator create: the public body plus an explicit opening debt.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminCreateSupplierRequest {
    #[serde(flatten)]
    pub supplier: CreateSupplierRequest,
    #[schema(value_type = Option<String>, example = "0.00")]
    pub debt: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AdminUpdateSupplierRequest {
    #[serde(flatten)]
    pub supplier: UpdateSupplierRequest,
    #[schema(value_type = Option<String>, example = "0.00")]
    pub debt: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AdminSupplierQuery {
    /// Exact match on city.
    pub city: Option<String>,
    /// Case-insensitive match on name or city.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClearDebtRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearDebtResult {
    pub updated: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SupplierRowList {
    #[schema(value_type = Vec<SupplierRow>)]
    pub items: Vec<SupplierRow>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
    /// Case-insensitive match on username or email.
    pub search: Option<String>,
}

/// New operator or employee account. The password is stored hashed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_update_reads_debt_next_to_supplier_fields() {
        let body = serde_json::json!({ "debt": "12.50", "supplier": null, "city": "Kazan" });
        let request: AdminUpdateSupplierRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.debt, Some(Decimal::new(1250, 2)));
        assert_eq!(request.supplier.supplier, Some(None));
        assert_eq!(request.supplier.city.as_deref(), Some("Kazan"));
    }

    #[test]
    fn new_users_default_to_active_non_staff() {
        let body = serde_json::json!({ "username": "clerk", "password": "s3cret-pass" });
        let request: CreateUserRequest = serde_json::from_value(body).unwrap();
        assert!(request.is_active);
        assert!(!request.is_staff);
        assert_eq!(request.email, "");
    }
}
