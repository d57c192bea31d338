//! Accounts, cart, wishlist, reviews, customer import and contact against a
//! real Postgres. Skipped unless `TEST_DATABASE_URL` (or `DATABASE_URL`) is set.

mod common;

use storefront_api::{
    dto::{
        auth::RegisterRequest,
        cart::AddToCartRequest,
        contact::ContactRequest,
        customers::CustomerUpsert,
        products::UpsertProductRequest,
        reviews::CreateReviewRequest,
        wishlist::AddToWishlistRequest,
    },
    error::AppError,
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER},
    services::{
        auth_service, cart_service, contact_service, customer_service, product_service,
        review_service, wishlist_service,
    },
    state::AppState,
};
use uuid::Uuid;

use common::{create_user, database_url, setup, test_config};

const SKIP: &str = "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run account flow tests.";

async fn new_product(state: &AppState, admin: &AuthUser) -> anyhow::Result<String> {
    let product_id = format!("test-neem-{}", Uuid::new_v4().simple());
    product_service::upsert_product(
        state,
        admin,
        UpsertProductRequest {
            id: Some(product_id.clone()),
            name: "Test Neem Capsules".into(),
            category: "human-nutrition".into(),
            price: 2_500,
            stock: Some(10),
            expiry_date: None,
            image: None,
            description: None,
            rating: None,
            status: None,
        },
    )
    .await?;
    Ok(product_id)
}

fn register(email: &str, name: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "correct-horse".into(),
        name: name.map(str::to_string),
    }
}

#[tokio::test]
async fn registration_assigns_roles_and_profiles() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        eprintln!("{SKIP}");
        return Ok(());
    };
    let tag = Uuid::new_v4().simple().to_string();
    let mut config = test_config(&url);
    config.admin_email = format!("admin-{tag}@example.com");
    let (state, _gateway) = setup(config).await?;

    let admin = auth_service::register_user(&state, register(&format!(" Admin-{tag}@Example.com "), None))
        .await?
        .data
        .expect("user");
    assert_eq!(admin.role, ROLE_ADMIN);
    assert_eq!(admin.email, format!("admin-{tag}@example.com"));

    let shopper_email = format!("shopper-{tag}@example.com");
    let shopper = auth_service::register_user(&state, register(&shopper_email, Some("Meera")))
        .await?
        .data
        .expect("user");
    assert_eq!(shopper.role, ROLE_USER);

    let (name, total_orders): (String, i32) =
        sqlx::query_as("SELECT name, total_orders FROM customers WHERE email = $1")
            .bind(&shopper_email)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(name, "Meera");
    assert_eq!(total_orders, 0);

    assert!(matches!(
        auth_service::register_user(&state, register(&shopper_email, None)).await,
        Err(AppError::Conflict(_))
    ));

    // Racing sign-ups for one address: exactly one wins, the other is a conflict.
    let racer = format!("racer-{tag}@example.com");
    let (a, b) = tokio::join!(
        auth_service::register_user(&state, register(&racer, None)),
        auth_service::register_user(&state, register(&racer, None)),
    );
    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(r, Err(AppError::Conflict(_)))));

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&racer)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(users, 1);

    Ok(())
}

#[tokio::test]
async fn cart_sets_quantity_and_wishlist_is_idempotent() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        eprintln!("{SKIP}");
        return Ok(());
    };
    let (state, _gateway) = setup(test_config(&url)).await?;
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let user = create_user(&state, ROLE_USER).await?;
    let product_id = new_product(&state, &admin).await?;

    for quantity in [3, 1] {
        cart_service::add_to_cart(
            &state.pool,
            &user,
            AddToCartRequest {
                product_id: product_id.clone(),
                quantity,
            },
        )
        .await?;
    }
    let cart = cart_service::list_cart(&state.pool, &user)
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.subtotal, 2_500);

    assert!(matches!(
        cart_service::add_to_cart(
            &state.pool,
            &user,
            AddToCartRequest {
                product_id: "no-such-product".into(),
                quantity: 1,
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    ));

    for _ in 0..2 {
        wishlist_service::add_to_wishlist(
            &state.pool,
            &user,
            AddToWishlistRequest {
                product_id: product_id.clone(),
            },
        )
        .await?;
    }
    let wishlist = wishlist_service::list_wishlist(&state.pool, &user)
        .await?
        .data
        .expect("wishlist");
    assert_eq!(wishlist.items.len(), 1);
    assert_eq!(wishlist.items[0].id, product_id);

    wishlist_service::remove_from_wishlist(&state.pool, &user, &product_id).await?;
    assert!(matches!(
        wishlist_service::remove_from_wishlist(&state.pool, &user, &product_id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}

#[tokio::test]
async fn review_names_fall_back_to_email() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        eprintln!("{SKIP}");
        return Ok(());
    };
    let (state, _gateway) = setup(test_config(&url)).await?;
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let product_id = new_product(&state, &admin).await?;

    // No customer profile yet: the email's local part stands in.
    let anonymous = create_user(&state, ROLE_USER).await?;
    let review = review_service::create_review(
        &state,
        &anonymous,
        CreateReviewRequest {
            product_id: product_id.clone(),
            rating: 4,
            comment: "  Works well  ".into(),
        },
    )
    .await?
    .data
    .expect("review");
    assert_eq!(review.user_name, anonymous.user_id.simple().to_string());
    assert_eq!(review.comment, "Works well");

    let email = format!("reviewer-{}@example.com", Uuid::new_v4().simple());
    let registered = auth_service::register_user(&state, register(&email, Some("Meera Iyer")))
        .await?
        .data
        .expect("user");
    let reviewer = AuthUser {
        user_id: registered.id,
        email: registered.email,
        role: registered.role,
    };
    let review = review_service::create_review(
        &state,
        &reviewer,
        CreateReviewRequest {
            product_id: product_id.clone(),
            rating: 5,
            comment: String::new(),
        },
    )
    .await?
    .data
    .expect("review");
    assert_eq!(review.user_name, "Meera Iyer");

    assert!(matches!(
        review_service::create_review(
            &state,
            &reviewer,
            CreateReviewRequest {
                product_id,
                rating: 6,
                comment: String::new(),
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    ));

    Ok(())
}

#[tokio::test]
async fn admin_imports_customers_and_contact_is_stored() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        eprintln!("{SKIP}");
        return Ok(());
    };
    let (state, _gateway) = setup(test_config(&url)).await?;
    let admin = create_user(&state, ROLE_ADMIN).await?;
    let user = create_user(&state, ROLE_USER).await?;

    let tag = Uuid::new_v4().simple().to_string();
    let existing = format!("existing-{tag}@example.com");
    let fresh = format!("fresh-{tag}@example.com");
    sqlx::query("INSERT INTO customers (email, name) VALUES ($1, 'Old Name')")
        .bind(&existing)
        .execute(&state.pool)
        .await?;

    let row = |email: &str, name: &str, total_orders: i32| CustomerUpsert {
        email: email.to_uppercase(),
        name: name.into(),
        phone: "9000000000".into(),
        joined_at: None,
        last_order: None,
        total_orders,
        order_history: Vec::new(),
    };

    assert!(matches!(
        customer_service::upsert_customers(&state, &user, vec![row(&fresh, "Nope", 0)]).await,
        Err(AppError::Forbidden)
    ));

    let saved = customer_service::upsert_customers(
        &state,
        &admin,
        vec![row(&existing, "New Name", 3), row(&fresh, "Ravi", 1)],
    )
    .await?
    .data
    .expect("count");
    assert_eq!(saved.upserted, 2);

    let (name, total_orders): (String, i32) =
        sqlx::query_as("SELECT name, total_orders FROM customers WHERE email = $1")
            .bind(&existing)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(name, "New Name");
    assert_eq!(total_orders, 3);

    let (name,): (String,) = sqlx::query_as("SELECT name FROM customers WHERE email = $1")
        .bind(&fresh)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(name, "Ravi");

    let contact_email = format!("contact-{tag}@example.com");
    contact_service::submit_message(
        &state.pool,
        ContactRequest {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: contact_email.clone(),
            phone: None,
            subject: Some("Bulk order".into()),
            message: "Do you ship to Goa?".into(),
        },
    )
    .await?;
    let (subject, phone): (String, String) =
        sqlx::query_as("SELECT subject, phone FROM contact_messages WHERE email = $1")
            .bind(&contact_email)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(subject, "Bulk order");
    assert_eq!(phone, "");

    Ok(())
}
