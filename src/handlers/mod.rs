pub mod clients;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod orders;

use serde::Deserialize;
use utoipa::IntoParams;

/// Free-text search filter shared by the list endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub search: Option<String>,
}
