//! Typed data access for the clip pipeline schema: projects, transcripts,
//! clip candidates, clips, assets, analytics, jobs and the configuration
//! tables, on PostgreSQL through diesel.
//!
//! ```no_run
//! use clipstore::{AppConfig, Store};
//! use clipstore::project::{NewProject, ProjectFindMany};
//!
//! # fn main() -> Result<(), clipstore::StoreError> {
//! let store = Store::connect(&AppConfig::from_env()?)?;
//! let project = store.with_client(|client| {
//!     client.project().create(NewProject::new("Episode 42", "/media/ep42.mp4"))
//! })?;
//! let all = store.with_client(|client| client.project().find_many(&ProjectFindMany::new()))?;
//! assert!(all.iter().any(|p| p.id == project.id));
//! # Ok(())
//! # }
//! ```

pub mod clip;
pub mod core;
pub mod jobs;
pub mod preferences;
pub mod project;

pub use crate::core::client::{Client, Store};
pub use crate::core::config::{AppConfig, DatabaseConfig};
pub use crate::core::raw::RawValue;
pub use crate::core::shared::delegate::{GroupCount, NumericAggregate};
pub use crate::core::shared::enums::{AssetKind, ClipStatus, JobStatus, Platform, ProjectStatus};
pub use crate::core::shared::error::{ErrorKind, StoreError, StoreResult};
pub use crate::core::shared::filters::{
    BoolFilter, DateTimeFilter, EnumFilter, FindManyArgs, IntFilter, Nullable,
    NullableDateTimeFilter, NullableIntFilter, NullableStringFilter, OrderBy, QueryMode,
    ScalarFilter, SortOrder, StringFilter,
};
pub use crate::core::transaction::{BatchOperation, IsolationLevel, TransactionOptions};
