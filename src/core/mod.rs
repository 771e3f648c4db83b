pub mod calendar;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod overlap;
pub mod workflow;
