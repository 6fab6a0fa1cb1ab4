mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use supply_network_api::{
    domain::ValidationError,
    dto::{
        admin::{AdminCreateSupplierRequest, AdminSupplierQuery, AdminUpdateSupplierRequest},
        suppliers::CreateSupplierRequest,
    },
    entity::{
        Products, Suppliers, SupplierType,
        products::ActiveModel as ProductActive,
    },
    error::AppError,
    services::{admin_service, supplier_service},
};
use uuid::Uuid;

use common::{create_user, database_state, id_of, send, supplier_body};

fn debt_of(body: &Value) -> Decimal {
    body["data"]["debt"]
        .as_str()
        .and_then(|d| d.parse().ok())
        .expect("debt in response")
}

fn create_request(name: &str, country: &str, kind: SupplierType, parent: Option<Uuid>) -> CreateSupplierRequest {
    CreateSupplierRequest {
        name: name.into(),
        email: "supplier@example.com".into(),
        country: country.into(),
        city: "City".into(),
        street: "Street".into(),
        house_number: "789".into(),
        supplier_type: Some(kind),
        supplier: parent,
    }
}

// Factory -> retail -> entrepreneur: levels, the factory debt rule and the bulk clear.
#[tokio::test]
async fn hierarchy_levels_debt_rules_and_bulk_clear() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let staff = create_user(&state, true, true).await?;
    let country = format!("Country {}", Uuid::new_v4());

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&staff.token),
        Some(supplier_body("Factory", &country, "factory", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let factory = id_of(&body);
    assert_eq!(debt_of(&body), Decimal::ZERO);

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&staff.token),
        Some(supplier_body("Retail", &country, "retail", Some(factory))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let retail = id_of(&body);

    let entrepreneur = admin_service::create_supplier(
        &state,
        &staff.auth,
        AdminCreateSupplierRequest {
            supplier: create_request("Entrepreneur", &country, SupplierType::Entrepreneur, Some(retail)),
            debt: Some(Decimal::from(50)),
        },
    )
    .await?
    .data
    .expect("row");
    assert_eq!(entrepreneur.level, 2);
    assert_eq!(entrepreneur.debt, Decimal::from(50));

    let rows = admin_service::list_suppliers(
        &state,
        &staff.auth,
        AdminSupplierQuery {
            city: None,
            search: None,
        },
    )
    .await?
    .data
    .expect("rows")
    .items;
    let level_of = |id: Uuid| rows.iter().find(|r| r.id == id).map(|r| r.level);
    assert_eq!(level_of(factory), Some(0));
    assert_eq!(level_of(retail), Some(1));
    assert_eq!(level_of(entrepreneur.id), Some(2));

    let rejected = admin_service::update_supplier(
        &state,
        &staff.auth,
        factory,
        AdminUpdateSupplierRequest {
            debt: Some(Decimal::from(10)),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(
        rejected,
        Err(AppError::Validation(ValidationError::FactoryWithDebt))
    ));

    let cleared = supplier_service::clear_debt(
        &state,
        &staff.auth,
        vec![factory, retail, entrepreneur.id],
    )
    .await?
    .data
    .expect("result");
    assert_eq!(cleared.updated, 3);

    for id in [factory, retail, entrepreneur.id] {
        let stored = Suppliers::find_by_id(id).one(&state.orm).await?.expect("stored");
        assert!(stored.debt.is_zero());
    }

    Ok(())
}

#[tokio::test]
async fn factory_with_supplier_is_rejected_with_message() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, true, false).await?;
    let country = format!("Country {}", Uuid::new_v4());

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&user.token),
        Some(supplier_body("Parent", &country, "retail", None)),
    )
    .await;
    let parent = id_of(&body);

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&user.token),
        Some(supplier_body("Factory", &country, "factory", Some(parent))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "a factory may not have a supplier.");

    let (status, body) = send(
        &state,
        Method::PATCH,
        &format!("/api/suppliers/{parent}/"),
        Some(&user.token),
        Some(serde_json::json!({ "supplier": parent })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "a supplier may not reference itself as its own supplier."
    );

    // nothing was written by the rejected create
    let (_, body) = send(
        &state,
        Method::GET,
        &format!("/api/suppliers/?country={}", urlencode(&country)),
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn list_filters_by_country_and_embeds_products() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, true, false).await?;
    let first = format!("Country {}", Uuid::new_v4());
    let second = format!("Country {}", Uuid::new_v4());

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&user.token),
        Some(supplier_body("Supplier 1", &first, "factory", None)),
    )
    .await;
    let supplier_1 = id_of(&body);
    send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&user.token),
        Some(supplier_body("Supplier 2", &second, "retail", None)),
    )
    .await;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test Product".into()),
        model: Set("Test Model".into()),
        release_date: Set(chrono::Utc::now().date_naive()),
        supplier_id: Set(supplier_1),
    }
    .insert(&state.orm)
    .await?;

    let (status, body) = send(
        &state,
        Method::GET,
        &format!("/api/suppliers/?country={}", urlencode(&first)),
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Supplier 1");
    assert_eq!(items[0]["products"][0]["id"], product.id.to_string());
    assert_eq!(items[0]["products"][0]["supplier"], supplier_1.to_string());

    let mut keys: Vec<&str> = items[0]
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "city",
            "country",
            "created_at",
            "debt",
            "email",
            "house_number",
            "id",
            "name",
            "products",
            "street",
            "supplier",
            "supplier_type",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn partial_update_merges_and_ignores_client_debt() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, true, false).await?;
    let country = format!("Country {}", Uuid::new_v4());

    let (_, body) = send(
        &state,
        Method::POST,
        "/api/suppliers/",
        Some(&user.token),
        Some(supplier_body("Test Supplier", &country, "retail", None)),
    )
    .await;
    let id = id_of(&body);

    let (status, body) = send(
        &state,
        Method::PATCH,
        &format!("/api/suppliers/{id}/"),
        Some(&user.token),
        Some(serde_json::json!({ "name": "Updated Supplier", "debt": "500.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Updated Supplier");
    assert_eq!(body["data"]["city"], "City");
    assert_eq!(debt_of(&body), Decimal::ZERO);

    let (status, body) = send(
        &state,
        Method::GET,
        &format!("/api/suppliers/{id}/"),
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Updated Supplier");

    let (status, _) = send(
        &state,
        Method::GET,
        &format!("/api/suppliers/{}/", Uuid::new_v4()),
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn delete_orphans_clients_and_settles_their_debt() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let staff = create_user(&state, true, true).await?;
    let country = format!("Country {}", Uuid::new_v4());

    let factory = admin_service::create_supplier(
        &state,
        &staff.auth,
        AdminCreateSupplierRequest {
            supplier: create_request("Factory", &country, SupplierType::Factory, None),
            debt: None,
        },
    )
    .await?
    .data
    .expect("row")
    .id;
    let retail = admin_service::create_supplier(
        &state,
        &staff.auth,
        AdminCreateSupplierRequest {
            supplier: create_request("Retail", &country, SupplierType::Retail, Some(factory)),
            debt: Some(Decimal::new(1250, 2)),
        },
    )
    .await?
    .data
    .expect("row")
    .id;
    let entrepreneur = admin_service::create_supplier(
        &state,
        &staff.auth,
        AdminCreateSupplierRequest {
            supplier: create_request("Entrepreneur", &country, SupplierType::Entrepreneur, Some(retail)),
            debt: Some(Decimal::from(5)),
        },
    )
    .await?
    .data
    .expect("row")
    .id;
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set("Gadget".into()),
        model: Set("G-1".into()),
        release_date: Set(chrono::Utc::now().date_naive()),
        supplier_id: Set(factory),
    }
    .insert(&state.orm)
    .await?;

    let (status, body) = send(
        &state,
        Method::DELETE,
        &format!("/api/suppliers/{factory}/"),
        Some(&staff.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT, "{body}");
    assert!(Suppliers::find_by_id(factory).one(&state.orm).await?.is_none());
    assert!(Products::find_by_id(product.id).one(&state.orm).await?.is_none());

    // the direct client is now top-level and debt-free
    let orphan = Suppliers::find_by_id(retail).one(&state.orm).await?.expect("client kept");
    assert_eq!(orphan.supplier_id, None);
    assert!(orphan.debt.is_zero());

    // deeper clients keep their link and debt
    let grandchild = Suppliers::find_by_id(entrepreneur)
        .one(&state.orm)
        .await?
        .expect("grandchild kept");
    assert_eq!(grandchild.supplier_id, Some(retail));
    assert_eq!(grandchild.debt, Decimal::from(5));

    let (status, _) = send(
        &state,
        Method::DELETE,
        &format!("/api/suppliers/{factory}/"),
        Some(&staff.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

fn urlencode(value: &str) -> String {
    value.replace(' ', "%20")
}
