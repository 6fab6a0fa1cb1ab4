use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::validation::required_text,
    dto::products::{CreateProductRequest, ProductList, ProductQuery, UpdateProductRequest},
    entity::{
        Suppliers,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MAX_TEXT_LEN: usize = 255;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let mut condition = Condition::all();
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Model).ilike(pattern)),
        );
    }

    let items: Vec<Product> = Products::find()
        .filter(condition)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    required_text("name", &payload.name, MAX_TEXT_LEN)?;
    required_text("model", &payload.model, MAX_TEXT_LEN)?;
    ensure_supplier_exists(&state.orm, payload.supplier).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        model: Set(payload.model),
        release_date: Set(payload.release_date),
        supplier_id: Set(payload.supplier),
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "supplier_id": product.supplier_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        required_text("name", &name, MAX_TEXT_LEN)?;
        active.name = Set(name);
    }
    if let Some(model) = payload.model {
        required_text("model", &model, MAX_TEXT_LEN)?;
        active.model = Set(model);
    }
    if let Some(release_date) = payload.release_date {
        active.release_date = Set(release_date);
    }
    if let Some(supplier) = payload.supplier {
        ensure_supplier_exists(&state.orm, supplier).await?;
        active.supplier_id = Set(supplier);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(())
}

async fn ensure_supplier_exists<C: ConnectionTrait>(db: &C, supplier_id: Uuid) -> AppResult<()> {
    if Suppliers::find_by_id(supplier_id).one(db).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "supplier {supplier_id} does not exist"
        )));
    }
    Ok(())
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        model: model.model,
        release_date: model.release_date,
        supplier: model.supplier_id,
    }
}
