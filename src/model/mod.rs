pub mod balance;
pub mod delegation;
pub mod holiday;
pub mod leave_request;
pub mod leave_type;
pub mod role;
pub mod status;
pub mod user;
pub mod workflow;
