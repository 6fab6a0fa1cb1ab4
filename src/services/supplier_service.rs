use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    domain::{SupplierCandidate, SupplierTree, validate},
    dto::{
        admin::ClearDebtResult,
        suppliers::{CreateSupplierRequest, SupplierList, SupplierQuery, UpdateSupplierRequest},
    },
    entity::{
        products::{Column as ProdCol, Entity as Products},
        suppliers::{ActiveModel, Column, Entity as Suppliers, Model as SupplierModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Product, Supplier},
    response::{ApiResponse, Meta},
    services::product_service::product_from_entity,
    state::AppState,
};

pub async fn list_suppliers(
    state: &AppState,
    query: SupplierQuery,
) -> AppResult<ApiResponse<SupplierList>> {
    let mut condition = Condition::all();
    if let Some(country) = query.country.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Country.eq(country.clone()));
    }

    let suppliers = Suppliers::find()
        .filter(condition)
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = suppliers.iter().map(|s| s.id).collect();
    let mut products = products_by_supplier(&state.orm, ids).await?;

    let items: Vec<Supplier> = suppliers
        .into_iter()
        .map(|model| {
            let owned = products.remove(&model.id).unwrap_or_default();
            supplier_from_entity(model, owned)
        })
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Suppliers", SupplierList { items }, Some(meta)))
}

pub async fn get_supplier(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Supplier>> {
    let model = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let supplier = render(&state.orm, model).await?;
    Ok(ApiResponse::success("Supplier", supplier, None))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    let model = insert_supplier(state, user, payload, Decimal::ZERO).await?;
    let supplier = render(&state.orm, model).await?;
    Ok(ApiResponse::success(
        "Supplier created",
        supplier,
        Some(Meta::empty()),
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    let model = patch_supplier(state, user, id, payload, None).await?;
    let supplier = render(&state.orm, model).await?;
    Ok(ApiResponse::success("Updated", supplier, Some(Meta::empty())))
}

/// Full update. The stored debt is kept since clients never assign it.
pub async fn replace_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    let patch = UpdateSupplierRequest {
        name: Some(payload.name),
        email: Some(payload.email),
        country: Some(payload.country),
        city: Some(payload.city),
        street: Some(payload.street),
        house_number: Some(payload.house_number),
        supplier_type: Some(payload.supplier_type.unwrap_or_default()),
        supplier: Some(payload.supplier),
    };
    let model = patch_supplier(state, user, id, patch, None).await?;
    let supplier = render(&state.orm, model).await?;
    Ok(ApiResponse::success("Updated", supplier, Some(Meta::empty())))
}

/// Remove a supplier. Its clients keep their rows and lose the link (store
/// `SET NULL`), so they become top-level; any debt they carried is settled to
/// zero in the same transaction, since a top-level supplier holds no debt.
pub async fn delete_supplier(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    Suppliers::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let clients = Suppliers::find()
        .filter(Column::SupplierId.eq(id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let settled = indebted(&clients);
    if !settled.is_empty() {
        Suppliers::update_many()
            .col_expr(Column::Debt, Expr::value(Decimal::ZERO))
            .filter(Column::Id.is_in(settled.clone()))
            .exec(&txn)
            .await?;
    }

    Suppliers::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if !settled.is_empty() {
        tracing::info!(supplier_id = %id, settled = settled.len(), "settled debt of orphaned clients");
    }
    audit::record(
        &state.pool,
        user.user_id,
        "supplier_delete",
        "suppliers",
        serde_json::json!({
            "supplier_id": id,
            "orphaned_clients": clients.len(),
            "settled_clients": settled,
        }),
    )
    .await;

    Ok(())
}

/// Clients whose debt must be zeroed once they lose their supplier.
fn indebted(clients: &[SupplierModel]) -> Vec<Uuid> {
    clients
        .iter()
        .filter(|client| !client.debt.is_zero())
        .map(|client| client.id)
        .collect()
}

/// Operator bulk action: zero the debt of the selected suppliers in one statement.
/// Zero debt satisfies every debt rule at any level, so rows are not re-validated.
pub async fn clear_debt(
    state: &AppState,
    user: &AuthUser,
    ids: Vec<Uuid>,
) -> AppResult<ApiResponse<ClearDebtResult>> {
    ensure_staff(user)?;
    if ids.is_empty() {
        return Err(AppError::BadRequest("no suppliers selected".into()));
    }

    let result = Suppliers::update_many()
        .col_expr(Column::Debt, Expr::value(Decimal::ZERO))
        .filter(Column::Id.is_in(ids.clone()))
        .exec(&state.orm)
        .await?;

    tracing::info!(
        requested = ids.len(),
        updated = result.rows_affected,
        "cleared supplier debt"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "supplier_clear_debt",
        "suppliers",
        serde_json::json!({ "supplier_ids": ids, "updated": result.rows_affected }),
    )
    .await;

    Ok(ApiResponse::success(
        "Debt cleared",
        ClearDebtResult {
            updated: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Validate then insert a new supplier inside one transaction.
pub(crate) async fn insert_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
    debt: Decimal,
) -> AppResult<SupplierModel> {
    let candidate = SupplierCandidate {
        id: Uuid::new_v4(),
        name: payload.name,
        email: payload.email,
        country: payload.country,
        city: payload.city,
        street: payload.street,
        house_number: payload.house_number,
        supplier_type: payload.supplier_type.unwrap_or_default(),
        debt,
        supplier: payload.supplier,
    };

    let txn = state.orm.begin().await?;
    let tree = load_tree(&txn).await?;
    check(&candidate, &tree)?;

    let active = ActiveModel {
        id: Set(candidate.id),
        name: Set(candidate.name),
        email: Set(candidate.email),
        country: Set(candidate.country),
        city: Set(candidate.city),
        street: Set(candidate.street),
        house_number: Set(candidate.house_number),
        supplier_id: Set(candidate.supplier),
        supplier_type: Set(candidate.supplier_type),
        debt: Set(candidate.debt),
        created_at: NotSet,
    };
    let model = active.insert(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_create",
        "suppliers",
        serde_json::json!({ "supplier_id": model.id }),
    )
    .await;

    Ok(model)
}

/// Merge `patch` (and an operator-supplied debt) onto the stored row, validate
/// the merged state in full, then write it. The row stays locked until commit.
pub(crate) async fn patch_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    patch: UpdateSupplierRequest,
    debt: Option<Decimal>,
) -> AppResult<SupplierModel> {
    let txn = state.orm.begin().await?;
    let existing = Suppliers::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut candidate = candidate_from_entity(&existing);
    apply_patch(&mut candidate, patch);
    if let Some(debt) = debt {
        candidate.debt = debt;
    }

    let tree = load_tree(&txn).await?;
    check(&candidate, &tree)?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(candidate.name);
    active.email = Set(candidate.email);
    active.country = Set(candidate.country);
    active.city = Set(candidate.city);
    active.street = Set(candidate.street);
    active.house_number = Set(candidate.house_number);
    active.supplier_id = Set(candidate.supplier);
    active.supplier_type = Set(candidate.supplier_type);
    active.debt = Set(candidate.debt);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_update",
        "suppliers",
        serde_json::json!({ "supplier_id": model.id }),
    )
    .await;

    Ok(model)
}

fn check(candidate: &SupplierCandidate, tree: &SupplierTree) -> AppResult<()> {
    validate(candidate, tree).map_err(|err| {
        tracing::debug!(supplier_id = %candidate.id, error = %err, "supplier rejected");
        AppError::from(err)
    })
}

pub fn apply_patch(candidate: &mut SupplierCandidate, patch: UpdateSupplierRequest) {
    let UpdateSupplierRequest {
        name,
        email,
        country,
        city,
        street,
        house_number,
        supplier_type,
        supplier,
    } = patch;

    if let Some(name) = name {
        candidate.name = name;
    }
    if let Some(email) = email {
        candidate.email = email;
    }
    if let Some(country) = country {
        candidate.country = country;
    }
    if let Some(city) = city {
        candidate.city = city;
    }
    if let Some(street) = street {
        candidate.street = street;
    }
    if let Some(house_number) = house_number {
        candidate.house_number = house_number;
    }
    if let Some(supplier_type) = supplier_type {
        candidate.supplier_type = supplier_type;
    }
    if let Some(supplier) = supplier {
        candidate.supplier = supplier;
    }
}

/// Parent links of every stored supplier.
pub async fn load_tree<C: ConnectionTrait>(db: &C) -> Result<SupplierTree, DbErr> {
    let links: Vec<(Uuid, Option<Uuid>)> = Suppliers::find()
        .select_only()
        .column(Column::Id)
        .column(Column::SupplierId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(SupplierTree::new(links))
}

async fn products_by_supplier<C: ConnectionTrait>(
    db: &C,
    supplier_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<Product>>, DbErr> {
    let mut grouped: HashMap<Uuid, Vec<Product>> = HashMap::new();
    if supplier_ids.is_empty() {
        return Ok(grouped);
    }
    let products = Products::find()
        .filter(ProdCol::SupplierId.is_in(supplier_ids))
        .order_by_asc(ProdCol::Name)
        .all(db)
        .await?;
    for product in products {
        grouped
            .entry(product.supplier_id)
            .or_default()
            .push(product_from_entity(product));
    }
    Ok(grouped)
}

async fn render<C: ConnectionTrait>(db: &C, model: SupplierModel) -> Result<Supplier, DbErr> {
    let products = products_by_supplier(db, vec![model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(supplier_from_entity(model, products))
}

pub fn candidate_from_entity(model: &SupplierModel) -> SupplierCandidate {
    SupplierCandidate {
        id: model.id,
        name: model.name.clone(),
        email: model.email.clone(),
        country: model.country.clone(),
        city: model.city.clone(),
        street: model.street.clone(),
        house_number: model.house_number.clone(),
        supplier_type: model.supplier_type,
        debt: model.debt,
        supplier: model.supplier_id,
    }
}

fn supplier_from_entity(model: SupplierModel, products: Vec<Product>) -> Supplier {
    Supplier {
        id: model.id,
        name: model.name,
        email: model.email,
        country: model.country,
        city: model.city,
        street: model.street,
        house_number: model.house_number,
        products,
        supplier: model.supplier_id,
        supplier_type: model.supplier_type,
        debt: model.debt,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
