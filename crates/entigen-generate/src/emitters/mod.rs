//! Whole-schema artifacts: validation schemas, table configuration, the
//! aggregate modules and the generic routes.

mod aggregate;
mod routes;
mod tables;
mod validation;

pub use aggregate::{data_file, db_file};
pub use routes::route_files;
pub use tables::{stores_config, tables_file};
pub use validation::{schema_file, zod_type};
