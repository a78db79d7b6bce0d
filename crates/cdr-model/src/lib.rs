pub mod columns;
pub mod config;
pub mod error;
pub mod record;
pub mod schema;
pub mod status;

pub use config::{
    AppConfig, BatchFailurePolicy, BmoConfig, OrchestrationConfig, PathsConfig, RulesConfig,
    SalesRnoConfig, Stage, StoreConfig, WmsConfig,
};
pub use error::{ModelError, Result};
pub use record::{DateField, ShipmentRecord};
pub use schema::{ColumnSpec, Projection, Schema};
pub use status::{CurrentStatus, DeliveryStatus, OutboundClass, ReleaseStatus};
