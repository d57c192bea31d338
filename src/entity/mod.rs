pub mod admin_notifications;
pub mod customers;
pub mod orders;
pub mod products;

pub use admin_notifications::Entity as AdminNotifications;
pub use customers::Entity as Customers;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
