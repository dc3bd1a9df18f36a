pub mod action_query_builder;
pub mod entities;
pub mod job_configuration;
pub mod parameter_verifier;
pub mod repositories;
pub mod services;
pub mod value_objects;

// SQLx 实现（仅在启用 sqlx-support feature 时编译）
#[cfg(feature = "sqlx-support")]
pub mod sqlx_impls;

pub use action_query_builder::*;
pub use coordinator_errors::{CoordError, CoordResult};
pub use entities::*;
pub use job_configuration::JobConfiguration;
pub use parameter_verifier::*;
pub use repositories::*;
pub use services::*;
pub use value_objects::*;
