//! Column-generation domain models.
//!
//! Provides the data types the master problem consumes: agents with their
//! candidate columns, and the master configuration.
//!
//! # Domain Mappings
//!
//! | u-colgen | Energy | Compute | Spectrum |
//! |----------|--------|---------|----------|
//! | Agent | Household | Tenant | Operator |
//! | Column | Load profile | Job plan | Channel plan |
//! | Capacity | Feeder limit | Cluster slots | Band width |

mod agent;
mod column;
mod config;

pub use agent::{Agent, ColumnSource};
pub use column::Column;
pub use config::{FairnessScope, FairnessType, MasterConfig};
