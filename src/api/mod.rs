pub mod approval;
pub mod balance;
pub mod delegation;
pub mod holiday;
pub mod leave_request;
pub mod leave_type;
pub mod report;
pub mod user;
