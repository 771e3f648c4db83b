use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Business-rule failures surfaced by the leave engine. Every variant except
/// `Database` is a deterministic, caller-fixable condition; `Database` is the
/// one opaque infrastructure failure and never leaks detail to the client.
#[derive(Debug, Display)]
pub enum LeaveError {
    #[display(fmt = "start_date cannot be after end_date")]
    InvalidDateRange,

    #[display(fmt = "cannot request leave for past dates")]
    PastDateNotAllowed,

    #[display(fmt = "leave request must include at least one working day")]
    ZeroWorkingDays,

    #[display(fmt = "overlapping leave request exists")]
    OverlappingRequest,

    #[display(fmt = "insufficient leave balance: available {}, requested {}", available, requested)]
    InsufficientBalance { available: f64, requested: f64 },

    #[display(fmt = "leave balance not found for this year")]
    BalanceNotFound,

    #[display(fmt = "leave request not found")]
    RequestNotFound,

    #[display(fmt = "user not found")]
    UserNotFound,

    #[display(fmt = "only pending requests can be updated")]
    NotPending,

    #[display(fmt = "request cannot be cancelled in its current state")]
    NotCancellable,

    #[display(fmt = "cannot cancel leave that has already started")]
    PastLeaveCancellation,

    #[display(fmt = "no pending approval found for this user")]
    NoPendingApproval,

    #[display(fmt = "previous approval levels must be completed first")]
    OutOfOrderApproval,

    #[display(fmt = "access denied")]
    Forbidden,

    #[display(fmt = "illegal state transition for this request")]
    InvalidStateTransition,

    #[display(fmt = "internal server error")]
    Database(sqlx::Error),
}

impl std::error::Error for LeaveError {}

impl From<sqlx::Error> for LeaveError {
    fn from(e: sqlx::Error) -> Self {
        LeaveError::Database(e)
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::RequestNotFound
            | LeaveError::UserNotFound
            | LeaveError::BalanceNotFound
            | LeaveError::NoPendingApproval => StatusCode::NOT_FOUND,
            LeaveError::Forbidden => StatusCode::FORBIDDEN,
            LeaveError::OverlappingRequest => StatusCode::CONFLICT,
            LeaveError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let LeaveError::Database(e) = self {
            error!(error = %e, "database failure");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
