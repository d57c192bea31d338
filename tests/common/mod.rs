#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use storefront_api::{
    config::{AppConfig, RazorpayConfig},
    db::{DbPool, create_pool, orm_from_pool, run_migrations},
    middleware::auth::AuthUser,
    payment::{GatewayOrder, GatewayOrderRequest, PaymentError, PaymentGateway},
    state::AppState,
};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const KEY_ID: &str = "rzp_test_key";
pub const KEY_SECRET: &str = "rzp_test_secret";

/// In-process gateway that hands out unique order ids.
#[derive(Default)]
pub struct MockGateway {
    pub calls: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: Some("created".into()),
        })
    }

    fn key_id(&self) -> &str {
        KEY_ID
    }

    fn key_secret(&self) -> &str {
        KEY_SECRET
    }
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        db_max_connections: 5,
        db_acquire_timeout_secs: 5,
        jwt_secret: JWT_SECRET.into(),
        jwt_ttl_hours: 1,
        razorpay: RazorpayConfig {
            key_id: KEY_ID.into(),
            key_secret: KEY_SECRET.into(),
            api_base: "http://127.0.0.1:1".into(),
            currency: "INR".into(),
        },
        admin_email: "admin@intercorp.in".into(),
    }
}

pub fn state_with(pool: DbPool, config: AppConfig, gateway: Arc<MockGateway>) -> AppState {
    AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: Arc::new(config),
        gateway,
    }
}

/// Database for the DB-backed suites; they skip when neither variable is set.
pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

pub async fn setup(config: AppConfig) -> anyhow::Result<(AppState, Arc<MockGateway>)> {
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    let gateway = Arc::new(MockGateway::default());
    Ok((state_with(pool, config, gateway.clone()), gateway))
}

/// Insert a user with a fresh email and return it as an authenticated caller.
pub async fn create_user(state: &AppState, role: &str) -> anyhow::Result<AuthUser> {
    let user_id = Uuid::new_v4();
    let email = format!("{}@example.com", user_id.simple());
    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, 'x', $3)")
        .bind(user_id)
        .bind(&email)
        .bind(role)
        .execute(&state.pool)
        .await?;
    Ok(AuthUser {
        user_id,
        email,
        role: role.into(),
    })
}
