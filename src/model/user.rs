use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "jane.doe@company.com")]
    pub email: String,

    #[schema(example = "Jane Doe")]
    pub full_name: String,

    #[serde(skip)]
    pub password_hash: String,

    #[schema(example = "employee")]
    pub role: Role,

    /// Direct manager, if any. Parent pointer only; reports are found by query.
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<i64>,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    pub is_active: bool,
}
