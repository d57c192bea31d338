use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::{ActivityList, NotificationList, UserList},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList},
        contact::ContactRequest,
        customers::{CustomerList, CustomerUpsert, UpsertCount},
        orders::{
            CheckoutItem, CheckoutRequest, OrderList, PaymentMethod, ShippingAddress,
            UpdateOrderStatusRequest,
        },
        payment::{PaymentOrderResponse, VerifyPaymentRequest, VerifyPaymentResponse},
        products::{ProductList, UpdateProductRequest, UpsertProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
        wishlist::{AddToWishlistRequest, WishlistProducts},
    },
    models::{
        ActivityEntry, Customer, Notification, Order, OrderLine, OrderSummary, Product, Review,
        User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, auth, cart, contact, customers, health, orders, params, payment, products, reviews,
        users, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        users::list_users,
        products::list_products,
        products::get_product,
        admin::add_product,
        admin::update_product,
        admin::delete_product,
        admin::list_all_orders,
        admin::update_order_status,
        admin::list_activity,
        admin::list_notifications,
        admin::mark_notification_read,
        admin::list_customers,
        admin::upsert_customers,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        customers::my_profile,
        reviews::list_reviews,
        reviews::create_review,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        payment::create_order,
        payment::verify,
        contact::submit,
        contact::database_health
    ),
    components(
        schemas(
            User,
            Product,
            Order,
            OrderLine,
            OrderSummary,
            Customer,
            Review,
            ActivityEntry,
            Notification,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpsertProductRequest,
            UpdateProductRequest,
            ProductList,
            CheckoutRequest,
            CheckoutItem,
            ShippingAddress,
            PaymentMethod,
            OrderList,
            UpdateOrderStatusRequest,
            PaymentOrderResponse,
            VerifyPaymentRequest,
            VerifyPaymentResponse,
            AddToCartRequest,
            CartItemDto,
            CartList,
            AddToWishlistRequest,
            WishlistProducts,
            CreateReviewRequest,
            ReviewList,
            CustomerList,
            CustomerUpsert,
            UpsertCount,
            ActivityList,
            NotificationList,
            UserList,
            ContactRequest,
            health::HealthData,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::ReviewQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<Customer>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Users", description = "User accounts"),
        (name = "Products", description = "Public catalogue"),
        (name = "Admin", description = "Catalogue, order, log and customer administration"),
        (name = "Orders", description = "Cash on delivery checkout and order history"),
        (name = "Customers", description = "Customer profile and loyalty state"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Wishlist", description = "Wishlist"),
        (name = "Payment", description = "Online payment via the gateway"),
        (name = "Contact", description = "Contact form and database health"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
