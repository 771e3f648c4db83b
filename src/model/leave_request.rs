use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub user_id: i64,

    #[schema(example = 1)]
    pub leave_type_id: i64,

    #[schema(example = "2026-09-07", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-09-11", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    /// Chargeable working days in [start_date, end_date].
    #[schema(example = 5.0)]
    pub total_days: f64,

    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = "pending")]
    pub status: RequestStatus,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}
