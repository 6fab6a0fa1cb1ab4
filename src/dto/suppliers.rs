use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{entity::SupplierType, models::Supplier};

/// Body for creating or fully replacing a supplier. `debt` and `created_at`
/// are server-assigned, so any values a client sends for them are dropped.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    #[serde(default)]
    pub supplier_type: Option<SupplierType>,
    #[serde(default)]
    pub supplier: Option<Uuid>,
}

/// Partial update. An absent `supplier` keeps the current link, an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub supplier_type: Option<SupplierType>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub supplier: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SupplierQuery {
    /// Exact match on country.
    pub country: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SupplierList {
    #[schema(value_type = Vec<Supplier>)]
    pub items: Vec<Supplier>,
}
