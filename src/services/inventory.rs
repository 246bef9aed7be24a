use crate::{
    db::DbPool,
    entities::inventory_item::{self, Entity as InventoryItemEntity, Model as InventoryItemModel},
    errors::ServiceError,
    events::Event,
    pricing::{normalize, round2, PricedPart},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct InventoryItemRequest {
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_quantity: i32,
    #[serde(default)]
    pub unit_price: Option<f64>,
    pub location: Option<String>,
    pub supplier: Option<String>,
}

/// Service for managing inventory stock.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<String>,
    ) -> Result<Vec<InventoryItemModel>, ServiceError> {
        let mut query = InventoryItemEntity::find().order_by_asc(inventory_item::Column::Description);

        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(inventory_item::Column::Description.contains(term))
                    .add(inventory_item::Column::Sku.contains(term))
                    .add(inventory_item::Column::Supplier.contains(term))
                    .add(inventory_item::Column::Location.contains(term)),
            );
        }

        Ok(query.all(self.db.as_ref()).await?)
    }

    /// Items at or below their minimum stock threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<InventoryItemModel>, ServiceError> {
        let items = InventoryItemEntity::find()
            .filter(
                Expr::col(inventory_item::Column::Quantity)
                    .lte(Expr::col(inventory_item::Column::MinQuantity)),
            )
            .order_by_asc(inventory_item::Column::Description)
            .all(self.db.as_ref())
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<InventoryItemModel, ServiceError> {
        InventoryItemEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("inventory item {} not found", id)))
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create(
        &self,
        request: InventoryItemRequest,
    ) -> Result<InventoryItemModel, ServiceError> {
        request.validate()?;

        let model = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(request.sku),
            description: Set(request.description),
            quantity: Set(request.quantity.max(0)),
            min_quantity: Set(request.min_quantity.max(0)),
            unit_price: Set(round2(normalize(request.unit_price))),
            location: Set(request.location),
            supplier: Set(request.supplier),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(self.db.as_ref()).await?;
        info!(item_id = %created.id, "inventory item created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: InventoryItemRequest,
    ) -> Result<InventoryItemModel, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;

        let mut model: inventory_item::ActiveModel = existing.into();
        model.sku = Set(request.sku);
        model.description = Set(request.description);
        model.quantity = Set(request.quantity.max(0));
        model.min_quantity = Set(request.min_quantity.max(0));
        model.unit_price = Set(round2(normalize(request.unit_price)));
        model.location = Set(request.location);
        model.supplier = Set(request.supplier);
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = InventoryItemEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "inventory item {} not found",
                id
            )));
        }
        info!(item_id = %id, "inventory item deleted");
        Ok(())
    }

    /// Decrements stock for every part line referencing a tracked inventory
    /// item, clamping at zero. Lines without a reference, or referencing an
    /// item that no longer exists, are skipped silently.
    ///
    /// Runs on the caller's connection so the order service can execute it
    /// inside the same transaction as the order write; SQLite's writer lock
    /// then serializes concurrent deductions instead of losing updates.
    ///
    /// Returns the stock events to emit after the transaction commits.
    pub async fn deduct_for_parts<C: ConnectionTrait>(
        conn: &C,
        parts: &[PricedPart],
    ) -> Result<Vec<Event>, ServiceError> {
        let mut events = Vec::new();

        for part in parts {
            let Some(item_id) = part.inventory_item_id else {
                continue;
            };
            let Some(item) = InventoryItemEntity::find_by_id(item_id).one(conn).await? else {
                debug!(item_id = %item_id, "part references unknown inventory item, skipping");
                continue;
            };

            let old_quantity = item.quantity;
            let new_quantity = (old_quantity - part.quantity).max(0);

            let mut model: inventory_item::ActiveModel = item.into();
            model.quantity = Set(new_quantity);
            model.updated_at = Set(Some(Utc::now()));
            let updated = model.update(conn).await?;

            events.push(Event::InventoryDeducted {
                item_id,
                old_quantity,
                new_quantity,
            });
            if updated.is_low_stock() {
                events.push(Event::LowStock {
                    item_id,
                    sku: updated.sku,
                    quantity: updated.quantity,
                    min_quantity: updated.min_quantity,
                });
            }
        }

        Ok(events)
    }
}
