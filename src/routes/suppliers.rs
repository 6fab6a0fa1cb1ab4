use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{CreateSupplierRequest, SupplierList, SupplierQuery, UpdateSupplierRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Supplier,
    response::ApiResponse,
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            get(get_supplier)
                .patch(update_supplier)
                .put(replace_supplier)
                .delete(delete_supplier),
        )
}

#[utoipa::path(
    get,
    path = "/api/suppliers/",
    params(SupplierQuery),
    responses(
        (status = 200, description = "List suppliers with their products", body = ApiResponse<SupplierList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SupplierQuery>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let resp = supplier_service::list_suppliers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers/",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Create supplier", body = ApiResponse<Supplier>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Supplier>>)> {
    let resp = supplier_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}/",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 200, description = "Get supplier", body = ApiResponse<Supplier>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::get_supplier(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/suppliers/{id}/",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Partially update supplier", body = ApiResponse<Supplier>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}/",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = CreateSupplierRequest,
    responses(
        (status = 200, description = "Replace supplier", body = ApiResponse<Supplier>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn replace_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::replace_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}/",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 204, description = "Deleted supplier; clients become top-level with their debt settled"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    supplier_service::delete_supplier(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
