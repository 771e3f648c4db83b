use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::status::ApprovalStatus;

/// One level of a request's approval chain. Levels are 1-based and must be
/// decided in ascending order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ApprovalStep {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub leave_request_id: i64,

    #[schema(example = 2)]
    pub approver_id: i64,

    #[schema(example = 1)]
    pub level: i64,

    #[schema(example = "pending")]
    pub status: ApprovalStatus,

    #[schema(example = "Looks fine", nullable = true)]
    pub comments: Option<String>,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub decided_at: Option<NaiveDateTime>,
}
