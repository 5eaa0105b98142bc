pub mod datasource;
pub mod error;
pub mod models;
pub mod prompt;
pub mod reflect;

pub use datasource::{Datasource, DatasourceCatalog};
pub use error::CatalogError;
pub use models::{Column, Join, SchemaGraph, Table};
pub use prompt::DescribeOptions;
pub use reflect::reflect;
