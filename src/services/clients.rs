use crate::{
    db::DbPool,
    entities::client::{self, Entity as ClientEntity, Model as ClientModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ClientRequest {
    #[validate(length(min = 1, message = "Client name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
    pub vehicles: Option<String>,
    pub notes: Option<String>,
}

/// Service for managing workshop clients.
#[derive(Clone)]
pub struct ClientService {
    db: Arc<DbPool>,
}

impl ClientService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, search: Option<String>) -> Result<Vec<ClientModel>, ServiceError> {
        let mut query = ClientEntity::find().order_by_asc(client::Column::Name);

        if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
            let term = term.trim();
            query = query.filter(
                Condition::any()
                    .add(client::Column::Name.contains(term))
                    .add(client::Column::Email.contains(term))
                    .add(client::Column::Phone.contains(term))
                    .add(client::Column::Document.contains(term))
                    .add(client::Column::Vehicles.contains(term)),
            );
        }

        Ok(query.all(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ClientModel, ServiceError> {
        ClientEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("client {} not found", id)))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: ClientRequest) -> Result<ClientModel, ServiceError> {
        request.validate()?;

        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            phone: Set(request.phone),
            email: Set(request.email),
            document: Set(request.document),
            vehicles: Set(request.vehicles),
            notes: Set(request.notes),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(self.db.as_ref()).await?;
        info!(client_id = %created.id, "client created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: ClientRequest,
    ) -> Result<ClientModel, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;

        let mut model: client::ActiveModel = existing.into();
        model.name = Set(request.name);
        model.phone = Set(request.phone);
        model.email = Set(request.email);
        model.document = Set(request.document);
        model.vehicles = Set(request.vehicles);
        model.notes = Set(request.notes);
        model.updated_at = Set(Some(Utc::now()));

        Ok(model.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = ClientEntity::delete_by_id(id).exec(self.db.as_ref()).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("client {} not found", id)));
        }
        info!(client_id = %id, "client deleted");
        Ok(())
    }
}
