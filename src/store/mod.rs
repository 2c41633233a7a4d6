//! Persistence collaborators
//!
//! Traits describing the job, parameter, report and organization stores,
//! the entities they exchange, and an in-memory implementation.

pub mod error;
pub mod fixture;
pub mod memory;
pub mod models;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use models::{
    DataModel, Job, JobId, Membership, ObservableKind, OrgConfig, Organization, Parameter,
    Report, ReportField, ReportId, ReportStatus, User,
};
pub use traits::{JobStore, OrgConfigStore, ParameterStore, ReportStore, RuntimeConfiguration};
