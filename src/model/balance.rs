use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One (user, leave type, year) quota record. `available_days` is always
/// derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub user_id: i64,

    #[schema(example = 1)]
    pub leave_type_id: i64,

    #[schema(example = 2026)]
    pub year: i64,

    #[schema(example = 20.0)]
    pub total_days: f64,

    #[schema(example = 3.0)]
    pub used_days: f64,

    /// Days provisionally held against still-pending requests.
    #[schema(example = 2.0)]
    pub reserved_days: f64,
}

impl LeaveBalance {
    pub fn available_days(&self) -> f64 {
        self.total_days - self.used_days - self.reserved_days
    }
}
