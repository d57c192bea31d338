use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    pub name: String,
    pub phone: String,
    pub joined_at: DateTimeWithTimeZone,
    pub last_order: Option<DateTimeWithTimeZone>,
    pub total_orders: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub order_history: Json,
    pub loyalty_coupon: Option<String>,
    pub loyalty_milestone: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
