use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Temporary approval authority handed from delegator to delegate for an
/// inclusive date range. Effective delegation is resolved at decision time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Delegation {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 2)]
    pub delegator_id: i64,

    #[schema(example = 3)]
    pub delegate_id: i64,

    #[schema(example = "2026-09-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-09-14", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    pub is_active: bool,
}
