use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sku: String,
    pub description: String,
    /// Stock on hand. Mutated by CRUD edits and by the order deduction
    /// step, which clamps at zero.
    pub quantity: i32,
    /// Threshold at or below which the item counts as low stock.
    pub min_quantity: i32,
    pub unit_price: Decimal,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_part::Entity")]
    OrderParts,
}

impl Related<super::order_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderParts.def()
    }
}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

impl ActiveModelBehavior for ActiveModel {}
