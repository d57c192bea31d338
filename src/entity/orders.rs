use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub pincode: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    pub subtotal: i64,
    pub discount: i64,
    pub total: i64,
    pub payment_method: String,
    pub status: String,
    pub payment_status: String,
    #[sea_orm(unique)]
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
