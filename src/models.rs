use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::SupplierType;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// Credentials row used by the token endpoints.
#[derive(Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub model: String,
    pub release_date: NaiveDate,
    pub supplier: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub products: Vec<Product>,
    pub supplier: Option<Uuid>,
    pub supplier_type: SupplierType,
    #[schema(value_type = String, example = "0.00")]
    pub debt: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Operator view of a supplier, with its computed depth.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierRow {
    pub id: Uuid,
    pub name: String,
    pub supplier_type: SupplierType,
    pub city: String,
    pub country: String,
    #[schema(value_type = String, example = "0.00")]
    pub debt: Decimal,
    pub created_at: DateTime<Utc>,
    pub supplier: Option<Uuid>,
    pub level: usize,
}
