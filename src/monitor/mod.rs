//! Orchestration of monitoring cycles and alarm reconciliation.
//!
//! # Key Components
//!
//! - [`Monitor`]: Runs `discover → compute → publish` once per cycle and
//!   `discover → reconcile → apply` on demand.
//! - [`UtilizationStore`]: Latest sample per discovered subnet, served by the
//!   status API.
mod driver;
mod store;

pub use driver::{CycleReport, Monitor, SubnetError};
pub use store::UtilizationStore;
