pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod customers;
pub mod orders;
pub mod payment;
pub mod products;
pub mod reviews;
pub mod wishlist;
