use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{
            AdminCreateSupplierRequest, AdminSupplierQuery, AdminUpdateSupplierRequest,
            ClearDebtRequest, ClearDebtResult, CreateUserRequest, SupplierRowList,
            UpdateUserRequest, UserList, UserQuery,
        },
        products::{CreateProductRequest, ProductList, ProductQuery, UpdateProductRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, SupplierRow, User},
    response::ApiResponse,
    services::{admin_service, supplier_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            patch(update_supplier).delete(delete_supplier),
        )
        .route("/suppliers/clear-debt", post(clear_debt))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            patch(update_product).delete(delete_product),
        )
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", patch(update_user))
}

#[utoipa::path(
    get,
    path = "/api/admin/suppliers",
    params(AdminSupplierQuery),
    responses(
        (status = 200, description = "Suppliers with their hierarchy level", body = ApiResponse<SupplierRowList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AdminSupplierQuery>,
) -> AppResult<Json<ApiResponse<SupplierRowList>>> {
    let resp = admin_service::list_suppliers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/suppliers",
    request_body = AdminCreateSupplierRequest,
    responses(
        (status = 201, description = "Create supplier with an opening debt", body = ApiResponse<SupplierRow>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AdminCreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SupplierRow>>)> {
    let resp = admin_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    request_body = AdminUpdateSupplierRequest,
    responses(
        (status = 200, description = "Update supplier, including debt", body = ApiResponse<SupplierRow>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<SupplierRow>>> {
    let resp = admin_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/suppliers/{id}",
    params(
        ("id" = Uuid, Path, description = "Supplier ID")
    ),
    responses(
        (status = 204, description = "Deleted supplier; clients become top-level with their debt settled"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    admin_service::delete_supplier(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/suppliers/clear-debt",
    request_body = ClearDebtRequest,
    responses(
        (status = 200, description = "Debt set to zero on the selected suppliers", body = ApiResponse<ClearDebtResult>),
        (status = 400, description = "No suppliers selected"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn clear_debt(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ClearDebtRequest>,
) -> AppResult<Json<ApiResponse<ClearDebtResult>>> {
    let resp = supplier_service::clear_debt(&state, &user, payload.ids).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = admin_service::list_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = admin_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Deleted product"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    admin_service::delete_product(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserQuery),
    responses(
        (status = 200, description = "List user accounts", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Create user account", body = ApiResponse<User>),
        (status = 400, description = "Invalid fields or username already taken"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = admin_service::create_user(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Toggle active or staff flags", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
