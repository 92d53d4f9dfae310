//! Billing rate resolution and revenue aggregation for time-tracking data.
//!
//! The persistence layer exports an organization [`Dataset`]; everything here
//! is a pure function over that snapshot.

pub mod cli;
pub mod dates;
pub mod errors;
pub mod grouping;
pub mod models;
pub mod rates;
pub mod render;
pub mod reports;
pub mod revenue;
pub mod rollups;
pub mod rounding;
pub mod storage;
pub mod validation;

pub use errors::{StorageError, ValidationError};
pub use models::{CostType, Dataset, Project, ProjectCost, ProjectEmployee, TimeEntry, User};
pub use rates::{LegacyRates, RateSource, resolve_rate, resolve_rate_with_source};
pub use revenue::{ProjectRevenueSummary, UserRevenue, aggregate};
