use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Annual Leave",
        "annual_quota": 20.0,
        "requires_documentation": false,
        "is_paid": true,
        "is_active": true
    })
)]
pub struct LeaveType {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Annual Leave")]
    pub name: String,

    #[schema(example = 20.0)]
    pub annual_quota: f64,

    pub requires_documentation: bool,

    pub is_paid: bool,

    /// Deactivation is soft; historical balances keep referencing the row.
    pub is_active: bool,
}
