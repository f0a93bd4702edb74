pub mod delegate;
pub mod enums;
pub mod error;
pub mod filters;
pub mod schema;
pub mod utils;
pub mod validate;

pub use enums::*;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use utils::{create_conn, new_id, DbConnection, DbPool};
