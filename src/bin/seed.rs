use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use supply_network_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    domain::{SupplierCandidate, SupplierTree, validate},
    entity::SupplierType,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&create_orm_conn(pool.clone())).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@example.com", "admin123", true).await?;
    let employee_id =
        ensure_user(&pool, "employee", "employee@example.com", "employee123", false).await?;
    seed_network(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Employee ID: {employee_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    is_staff: bool,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_active, is_staff)
        VALUES ($1, $2, $3, $4, TRUE, $5)
        ON CONFLICT (username) DO UPDATE SET is_staff = EXCLUDED.is_staff
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(is_staff)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (staff={is_staff})");
    Ok(user_id)
}

/// A three-level chain: factory -> retail network -> entrepreneur, one product each.
/// Each row is checked against the supplier rules before it is written.
async fn seed_network(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT count(*) FROM suppliers")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Suppliers already present, skipping network seed");
        return Ok(());
    }

    let factory = Uuid::new_v4();
    let retail = Uuid::new_v4();
    let entrepreneur = Uuid::new_v4();
    let chain = [
        (factory, None, "Volt Factory", SupplierType::Factory, Decimal::ZERO, "Shenzhen", "1"),
        (retail, Some(factory), "Circuit Mart", SupplierType::Retail, Decimal::new(150_000, 2), "Berlin", "12"),
        (entrepreneur, Some(retail), "Ivan Solder", SupplierType::Entrepreneur, Decimal::new(5_000, 2), "Riga", "7a"),
    ];

    let mut links: Vec<(Uuid, Option<Uuid>)> = Vec::new();
    for (id, parent, name, kind, debt, city, house) in chain {
        let candidate = SupplierCandidate {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            country: "Example Country".to_string(),
            city: city.to_string(),
            street: "Main Street".to_string(),
            house_number: house.to_string(),
            supplier_type: kind,
            debt,
            supplier: parent,
        };
        validate(&candidate, &SupplierTree::new(links.clone()))
            .map_err(|e| anyhow::anyhow!("seed supplier {name} is invalid: {e}"))?;
        links.push((id, parent));

        sqlx::query(
            r#"
            INSERT INTO suppliers
                (id, name, email, country, city, street, house_number, supplier_id, supplier_type, debt)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::numeric)
            "#,
        )
        .bind(candidate.id)
        .bind(candidate.name)
        .bind(candidate.email)
        .bind(candidate.country)
        .bind(candidate.city)
        .bind(candidate.street)
        .bind(candidate.house_number)
        .bind(candidate.supplier)
        .bind(candidate.supplier_type.to_value())
        .bind(candidate.debt.to_string())
        .execute(pool)
        .await?;
    }

    let products = [
        (factory, "Phone X", "PX-100", NaiveDate::from_ymd_opt(2024, 3, 1)),
        (retail, "Laptop Pro", "LP-15", NaiveDate::from_ymd_opt(2023, 9, 15)),
        (entrepreneur, "Earbuds", "EB-2", NaiveDate::from_ymd_opt(2025, 1, 20)),
    ];
    for (supplier_id, name, model, release_date) in products {
        let release_date =
            release_date.ok_or_else(|| anyhow::anyhow!("invalid release date for {name}"))?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, model, release_date, supplier_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(model)
        .bind(release_date)
        .bind(supplier_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded supplier network");
    Ok(())
}
