use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub password: String,
    #[schema(example = "employee")]
    pub role: Role,
    #[schema(example = 2, nullable = true)]
    pub manager_id: Option<i64>,
    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "jane.doe@company.com")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    /// User email.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
