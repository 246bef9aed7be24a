use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status labels a service order moves through. Transitions are
/// deliberately unconstrained: any status may replace any other.
pub const STATUSES: &[&str] = &[
    "open",
    "in_progress",
    "awaiting_approval",
    "awaiting_parts",
    "completed",
    "delivered",
    "cancelled",
];

pub const DEFAULT_STATUS: &str = "open";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Workshop-facing order code, e.g. `OS-2026-0001`.
    pub code: String,
    pub client_id: Uuid,
    pub vehicle: String,
    pub description: String,
    pub status: String,
    pub notes: Option<String>,
    /// Persisted aggregate totals. Recomputed from the line items on every
    /// create/update; never trusted from the client (unless the
    /// trust_client_total flag overrides the grand total).
    pub labor_total: Decimal,
    pub parts_total: Decimal,
    pub discount: Decimal,
    pub additional_fees: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(has_many = "super::order_labor::Entity")]
    LaborLines,
    #[sea_orm(has_many = "super::order_part::Entity")]
    PartLines,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::order_labor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LaborLines.def()
    }
}

impl Related<super::order_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
