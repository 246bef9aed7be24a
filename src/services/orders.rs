use crate::{
    db::DbPool,
    entities::client::{self, Entity as ClientEntity},
    entities::order_labor::{self, Entity as OrderLaborEntity},
    entities::order_part::{self, Entity as OrderPartEntity},
    entities::service_order::{self, Entity as ServiceOrderEntity, DEFAULT_STATUS, STATUSES},
    errors::ServiceError,
    events::{Event, EventSender},
    pricing::{self, LaborInput, PartInput, OrderSummary, PricedOrder},
    services::inventory::InventoryService,
};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Payload for order create and update. Updates replace the labor and
/// parts arrays wholesale; there is no partial line-item merge.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "Vehicle is required"))]
    pub vehicle: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub status: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub additional_fees: Option<f64>,
    /// Client-proposed grand total. Ignored unless the server runs with
    /// `trust_client_total` enabled.
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub labor: Vec<LaborInput>,
    #[serde(default)]
    pub parts: Vec<PartInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusPatchRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListFilter {
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LaborLineResponse {
    pub id: Uuid,
    pub description: String,
    pub hours: Decimal,
    pub rate: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartLineResponse {
    pub id: Uuid,
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub code: String,
    pub client_id: Uuid,
    pub client_name: Option<String>,
    pub vehicle: String,
    pub description: String,
    pub status: String,
    pub notes: Option<String>,
    pub labor: Vec<LaborLineResponse>,
    pub parts: Vec<PartLineResponse>,
    pub summary: OrderSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OrderResponse {
    fn assemble(
        order: service_order::Model,
        client_name: Option<String>,
        labor: Vec<order_labor::Model>,
        parts: Vec<order_part::Model>,
    ) -> Self {
        Self {
            id: order.id,
            code: order.code,
            client_id: order.client_id,
            client_name,
            vehicle: order.vehicle,
            description: order.description,
            status: order.status,
            notes: order.notes,
            labor: labor
                .into_iter()
                .map(|l| LaborLineResponse {
                    id: l.id,
                    description: l.description,
                    hours: l.hours,
                    rate: l.rate,
                    line_total: l.line_total,
                })
                .collect(),
            parts: parts
                .into_iter()
                .map(|p| PartLineResponse {
                    id: p.id,
                    inventory_item_id: p.inventory_item_id,
                    description: p.description,
                    quantity: p.quantity,
                    unit_price: p.unit_price,
                    line_total: p.line_total,
                })
                .collect(),
            summary: OrderSummary {
                labor: order.labor_total,
                parts: order.parts_total,
                discount: order.discount,
                additional_fees: order.additional_fees,
                total: order.total,
            },
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Service for managing service orders. Pricing goes through the shared
/// summary engine; line items are always replaced as a whole and the
/// inventory deduction runs inside the same transaction as the order write.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: EventSender,
    trust_client_total: bool,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender, trust_client_total: bool) -> Self {
        Self {
            db,
            event_sender,
            trust_client_total,
        }
    }

    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn create_order(&self, request: OrderRequest) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        self.ensure_client_exists(request.client_id).await?;

        let mut priced =
            pricing::compute_summary(&request.labor, &request.parts, request.discount, request.additional_fees);
        self.apply_total_override(&mut priced, request.total);

        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = self.db.begin().await?;

        let code = next_order_code(&txn, now.year()).await?;

        let order = service_order::ActiveModel {
            id: Set(order_id),
            code: Set(code),
            client_id: Set(request.client_id),
            vehicle: Set(request.vehicle),
            description: Set(request.description),
            status: Set(request
                .status
                .unwrap_or_else(|| DEFAULT_STATUS.to_string())),
            notes: Set(request.notes),
            labor_total: Set(priced.summary.labor),
            parts_total: Set(priced.summary.parts),
            discount: Set(priced.summary.discount),
            additional_fees: Set(priced.summary.additional_fees),
            total: Set(priced.summary.total),
            created_at: Set(now),
            updated_at: Set(None),
        };
        order.insert(&txn).await?;

        insert_lines(&txn, order_id, &priced).await?;
        let stock_events = InventoryService::deduct_for_parts(&txn, &priced.parts).await?;

        txn.commit().await?;

        info!(order_id = %order_id, "service order created");
        self.event_sender.send(Event::OrderCreated(order_id)).await;
        for event in stock_events {
            self.event_sender.send(event).await;
        }

        self.get_order(order_id).await
    }

    /// Full update: order fields are overwritten and the labor/parts arrays
    /// replace whatever was stored, including replacement with nothing.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: OrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let existing = ServiceOrderEntity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))?;

        self.ensure_client_exists(request.client_id).await?;

        let mut priced =
            pricing::compute_summary(&request.labor, &request.parts, request.discount, request.additional_fees);
        self.apply_total_override(&mut priced, request.total);

        let now = Utc::now();
        let txn = self.db.begin().await?;

        let mut order: service_order::ActiveModel = existing.into();
        order.client_id = Set(request.client_id);
        order.vehicle = Set(request.vehicle);
        order.description = Set(request.description);
        if let Some(status) = request.status {
            order.status = Set(status);
        }
        order.notes = Set(request.notes);
        order.labor_total = Set(priced.summary.labor);
        order.parts_total = Set(priced.summary.parts);
        order.discount = Set(priced.summary.discount);
        order.additional_fees = Set(priced.summary.additional_fees);
        order.total = Set(priced.summary.total);
        order.updated_at = Set(Some(now));
        order.update(&txn).await?;

        // Replace-all semantics: delete stored lines, reinsert the payload.
        OrderLaborEntity::delete_many()
            .filter(order_labor::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        OrderPartEntity::delete_many()
            .filter(order_part::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        insert_lines(&txn, order_id, &priced).await?;

        let stock_events = InventoryService::deduct_for_parts(&txn, &priced.parts).await?;

        txn.commit().await?;

        info!(order_id = %order_id, "service order updated");
        self.event_sender.send(Event::OrderUpdated(order_id)).await;
        for event in stock_events {
            self.event_sender.send(event).await;
        }

        self.get_order(order_id).await
    }

    /// Patches the status only. Any status may replace any other; the
    /// stored summary is untouched.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: String,
    ) -> Result<OrderResponse, ServiceError> {
        let existing = ServiceOrderEntity::find_by_id(order_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))?;

        let old_status = existing.status.clone();
        let mut order: service_order::ActiveModel = existing.into();
        order.status = Set(status.clone());
        order.updated_at = Set(Some(Utc::now()));
        order.update(self.db.as_ref()).await?;

        self.event_sender
            .send(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status: status,
            })
            .await;

        self.get_order(order_id).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let (order, client) = ServiceOrderEntity::find_by_id(order_id)
            .find_also_related(ClientEntity)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))?;

        let labor = OrderLaborEntity::find()
            .filter(order_labor::Column::OrderId.eq(order_id))
            .order_by_asc(order_labor::Column::Position)
            .all(self.db.as_ref())
            .await?;
        let parts = OrderPartEntity::find()
            .filter(order_part::Column::OrderId.eq(order_id))
            .order_by_asc(order_part::Column::Position)
            .all(self.db.as_ref())
            .await?;

        Ok(OrderResponse::assemble(
            order,
            client.map(|c| c.name),
            labor,
            parts,
        ))
    }

    /// Lists orders newest-first, optionally filtered by status and a
    /// free-text search over code, vehicle, description, and client name.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
    ) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut query = ServiceOrderEntity::find()
            .find_also_related(ClientEntity)
            .order_by_desc(service_order::Column::CreatedAt);

        if let Some(status) = filter.status.filter(|s| !s.is_empty() && s != "all") {
            query = query.filter(service_order::Column::Status.eq(status));
        }
        if let Some(term) = filter.search.filter(|s| !s.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(service_order::Column::Code.contains(term))
                    .add(service_order::Column::Vehicle.contains(term))
                    .add(service_order::Column::Description.contains(term))
                    .add(client::Column::Name.contains(term)),
            );
        }

        let rows = query.all(self.db.as_ref()).await?;
        let order_ids: Vec<Uuid> = rows.iter().map(|(order, _)| order.id).collect();

        let mut labor_by_order: BTreeMap<Uuid, Vec<order_labor::Model>> = BTreeMap::new();
        let mut parts_by_order: BTreeMap<Uuid, Vec<order_part::Model>> = BTreeMap::new();

        if !order_ids.is_empty() {
            let labor = OrderLaborEntity::find()
                .filter(order_labor::Column::OrderId.is_in(order_ids.clone()))
                .order_by_asc(order_labor::Column::Position)
                .all(self.db.as_ref())
                .await?;
            for line in labor {
                labor_by_order.entry(line.order_id).or_default().push(line);
            }

            let parts = OrderPartEntity::find()
                .filter(order_part::Column::OrderId.is_in(order_ids))
                .order_by_asc(order_part::Column::Position)
                .all(self.db.as_ref())
                .await?;
            for line in parts {
                parts_by_order.entry(line.order_id).or_default().push(line);
            }
        }

        Ok(rows
            .into_iter()
            .map(|(order, client)| {
                let labor = labor_by_order.remove(&order.id).unwrap_or_default();
                let parts = parts_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse::assemble(order, client.map(|c| c.name), labor, parts)
            })
            .collect())
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        // Line items cascade with the order row.
        let result = ServiceOrderEntity::delete_by_id(order_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "order {} not found",
                order_id
            )));
        }

        info!(order_id = %order_id, "service order deleted");
        self.event_sender.send(Event::OrderDeleted(order_id)).await;
        Ok(())
    }

    /// Order counts per status, for the dashboard.
    #[instrument(skip(self))]
    pub async fn status_counts(&self) -> Result<BTreeMap<String, u64>, ServiceError> {
        let statuses: Vec<String> = ServiceOrderEntity::find()
            .select_only()
            .column(service_order::Column::Status)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        // Every known label appears even when its count is zero; ad-hoc
        // labels stored on orders are counted as well.
        let mut counts: BTreeMap<String, u64> =
            STATUSES.iter().map(|s| (s.to_string(), 0)).collect();
        for status in statuses {
            *counts.entry(status).or_insert(0u64) += 1;
        }
        Ok(counts)
    }

    async fn ensure_client_exists(&self, client_id: Uuid) -> Result<(), ServiceError> {
        ClientEntity::find_by_id(client_id)
            .one(self.db.as_ref())
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::ValidationError(format!("client {} does not exist", client_id))
            })
    }

    /// Honors a client-supplied grand total only when configured to. The
    /// computed subtotals always stand.
    fn apply_total_override(&self, priced: &mut PricedOrder, requested_total: Option<f64>) {
        if self.trust_client_total {
            if let Some(total) = requested_total.filter(|t| t.is_finite()) {
                priced.summary.total = pricing::round2(pricing::normalize(Some(total)));
            }
        }
    }
}

/// Next customer-facing code for the given year, `OS-{year}-{seq:04}`.
///
/// The sequential continues from the highest code already issued for the
/// year, not from the row count, so codes stay unique after deletions. The
/// zero-padded suffix makes the lexicographic maximum the numeric maximum.
async fn next_order_code(
    txn: &DatabaseTransaction,
    year: i32,
) -> Result<String, ServiceError> {
    let prefix = format!("OS-{}-", year);
    let highest: Option<String> = ServiceOrderEntity::find()
        .select_only()
        .column(service_order::Column::Code)
        .filter(service_order::Column::Code.starts_with(&prefix))
        .order_by_desc(service_order::Column::Code)
        .limit(1)
        .into_tuple()
        .one(txn)
        .await?;

    let sequential = highest
        .as_deref()
        .and_then(|code| code.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u32>().ok())
        .map_or(1, |n| n + 1);

    Ok(format!("OS-{}-{:04}", year, sequential))
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    priced: &PricedOrder,
) -> Result<(), ServiceError> {
    for (position, line) in priced.labor.iter().enumerate() {
        let model = order_labor::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            description: Set(line.description.clone()),
            hours: Set(line.hours),
            rate: Set(line.rate),
            line_total: Set(line.line_total),
            position: Set(position as i32),
        };
        model.insert(txn).await?;
    }

    for (position, line) in priced.parts.iter().enumerate() {
        let model = order_part::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            inventory_item_id: Set(line.inventory_item_id),
            description: Set(line.description.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            line_total: Set(line.line_total),
            position: Set(position as i32),
        };
        model.insert(txn).await?;
    }

    Ok(())
}
