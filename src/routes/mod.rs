use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod customers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/admin", admin::router())
        .nest("/orders", orders::router())
        .nest("/customer", customers::router())
        .nest("/reviews", reviews::router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/payment", payment::router())
        .nest("/contact", contact::router())
}
