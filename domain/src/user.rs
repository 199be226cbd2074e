use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub type UserId = Uuid;

/// A customer account. Provisioned by an external data-loading process and
/// read-only as far as this system is concerned.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Permanent Account Number, the Indian tax identifier
    pub pan_number: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
