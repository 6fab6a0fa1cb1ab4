use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{SupplierTree, validation::required_text},
    dto::{
        admin::{
            AdminCreateSupplierRequest, AdminSupplierQuery, AdminUpdateSupplierRequest,
            CreateUserRequest, SupplierRowList, UpdateUserRequest, UserList, UserQuery,
        },
        products::{CreateProductRequest, ProductList, ProductQuery, UpdateProductRequest},
    },
    entity::{
        suppliers::{Column as SupCol, Entity as Suppliers, Model as SupplierModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Product, SupplierRow, User},
    response::{ApiResponse, Meta},
    services::{auth_service::hash_password, product_service, supplier_service},
    state::AppState,
};

pub async fn list_suppliers(
    state: &AppState,
    user: &AuthUser,
    query: AdminSupplierQuery,
) -> AppResult<ApiResponse<SupplierRowList>> {
    ensure_staff(user)?;

    let mut condition = Condition::all();
    if let Some(city) = query.city.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(SupCol::City.eq(city.clone()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(SupCol::Name).ilike(pattern.clone()))
                .add(Expr::col(SupCol::City).ilike(pattern)),
        );
    }

    let suppliers = Suppliers::find()
        .filter(condition)
        .order_by_asc(SupCol::Name)
        .all(&state.orm)
        .await?;
    let tree = supplier_service::load_tree(&state.orm).await?;

    let items = suppliers
        .into_iter()
        .map(|model| supplier_row(model, &tree))
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Suppliers", SupplierRowList { items }, Some(meta)))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: AdminCreateSupplierRequest,
) -> AppResult<ApiResponse<SupplierRow>> {
    ensure_staff(user)?;
    let debt = payload.debt.unwrap_or(Decimal::ZERO);
    let model = supplier_service::insert_supplier(state, user, payload.supplier, debt).await?;
    let row = load_row(state, model).await?;
    Ok(ApiResponse::success("Supplier created", row, Some(Meta::empty())))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AdminUpdateSupplierRequest,
) -> AppResult<ApiResponse<SupplierRow>> {
    ensure_staff(user)?;
    let model =
        supplier_service::patch_supplier(state, user, id, payload.supplier, payload.debt).await?;
    let row = load_row(state, model).await?;
    Ok(ApiResponse::success("Updated", row, Some(Meta::empty())))
}

pub async fn delete_supplier(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_staff(user)?;
    supplier_service::delete_supplier(state, user, id).await
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_staff(user)?;
    product_service::list_products(state, query).await
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    product_service::create_product(state, user, payload).await
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    product_service::update_product(state, user, id, payload).await
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    ensure_staff(user)?;
    product_service::delete_product(state, user, id).await
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_staff(user)?;

    let mut condition = Condition::all();
    if let Some(is_staff) = query.is_staff {
        condition = condition.add(UserCol::IsStaff.eq(is_staff));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(UserCol::IsActive.eq(is_active));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Username).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let items: Vec<User> = Users::find()
        .filter(condition)
        .order_by_asc(UserCol::Username)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

const MAX_USERNAME_LEN: usize = 150;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;
const DUPLICATE_USERNAME: &str = "a user with that username already exists.";

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_staff(user)?;

    let username = payload.username.trim().to_string();
    required_text("username", &username, MAX_USERNAME_LEN)?;
    if !payload.email.is_empty() {
        required_text("email", &payload.email, MAX_EMAIL_LEN)?;
    }
    required_text("password", &payload.password, MAX_PASSWORD_LEN)?;
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password: ensure this field has at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let taken = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?
        .is_some();
    if taken {
        return Err(AppError::BadRequest(DUPLICATE_USERNAME.into()));
    }

    let active = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(payload.email),
        password_hash: Set(hash_password(&payload.password)?),
        is_active: Set(payload.is_active),
        is_staff: Set(payload.is_staff),
        created_at: NotSet,
    };
    // a concurrent insert of the same username trips the unique index instead
    let created = active.insert(&state.orm).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest(DUPLICATE_USERNAME.into())
        }
        _ => AppError::from(err),
    })?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_create",
        "users",
        serde_json::json!({
            "user_id": created.id,
            "is_active": created.is_active,
            "is_staff": created.is_staff,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_staff(user)?;

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: UserActive = existing.into();
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_staff) = payload.is_staff {
        active.is_staff = Set(is_staff);
    }
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "user_update",
        "users",
        serde_json::json!({
            "user_id": updated.id,
            "is_active": updated.is_active,
            "is_staff": updated.is_staff,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

async fn load_row(state: &AppState, model: SupplierModel) -> AppResult<SupplierRow> {
    let tree = supplier_service::load_tree(&state.orm).await?;
    supplier_row(model, &tree)
}

fn supplier_row(model: SupplierModel, tree: &SupplierTree) -> AppResult<SupplierRow> {
    let level = tree.level(model.id).map_err(|err| {
        AppError::Internal(anyhow::anyhow!(
            "supplier {} has an inconsistent hierarchy: {err}",
            model.id
        ))
    })?;
    Ok(SupplierRow {
        id: model.id,
        name: model.name,
        supplier_type: model.supplier_type,
        city: model.city,
        country: model.country,
        debt: model.debt,
        created_at: model.created_at.with_timezone(&Utc),
        supplier: model.supplier_id,
        level,
    })
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        is_active: model.is_active,
        is_staff: model.is_staff,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
