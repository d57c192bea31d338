use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    dto::auth::local_part,
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::hash_password,
};
use uuid::Uuid;

const DEMO_EMAIL: &str = "user@example.com";
const DEMO_PASSWORD: &str = "user123";

/// (id, name, category, price in paise, stock, description)
const CATALOGUE: &[(&str, &str, &str, i64, i32, &str)] = &[
    (
        "spirulina-powder-250g",
        "Spirulina Powder 250g",
        "human-nutrition",
        49_900,
        120,
        "Sun-dried spirulina, rich in protein and iron",
    ),
    (
        "moringa-capsules-60",
        "Moringa Capsules (60)",
        "human-nutrition",
        34_900,
        80,
        "Whole-leaf moringa in vegetarian capsules",
    ),
    (
        "cattle-feed-supplement-5kg",
        "Cattle Feed Supplement 5kg",
        "animal-nutrition",
        129_900,
        40,
        "Mineral mixture for dairy cattle",
    ),
    (
        "poultry-booster-1l",
        "Poultry Growth Booster 1L",
        "animal-nutrition",
        59_900,
        60,
        "Vitamin and amino acid tonic for broilers and layers",
    ),
    (
        "neem-herbal-soap",
        "Neem Herbal Soap",
        "consumer-products",
        9_900,
        300,
        "Cold-processed soap with neem and tulsi",
    ),
    (
        "aloe-vera-gel-200ml",
        "Aloe Vera Gel 200ml",
        "consumer-products",
        19_900,
        150,
        "Soothing gel for skin and hair",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;

    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_id = ensure_user(&pool, &config.admin_email, &admin_password, ROLE_ADMIN).await?;
    let user_id = ensure_user(&pool, DEMO_EMAIL, DEMO_PASSWORD, ROLE_USER).await?;
    seed_products(&pool, &config.admin_email).await?;

    tracing::info!(%admin_id, %user_id, "seed completed");
    Ok(())
}

async fn ensure_user(pool: &DbPool, email: &str, password: &str, role: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    // Existing accounts keep their password; only the role is enforced.
    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(local_part(email))
    .bind(role)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO customers (email, name, phone)
        VALUES ($1, $2, '')
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(email)
    .bind(local_part(email))
    .execute(pool)
    .await?;

    tracing::info!(email, role, "user ensured");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool, added_by: &str) -> anyhow::Result<()> {
    for &(id, name, category, price, stock, description) in CATALOGUE {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price, stock, description, added_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(price)
        .bind(stock)
        .bind(description)
        .bind(added_by)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = CATALOGUE.len(), "catalogue seeded");
    Ok(())
}
