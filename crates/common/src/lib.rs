pub mod config;
pub mod error;
pub mod types;

pub use config::WorkbenchConfig;
pub use error::diagnostics::DiagnosticMessage;
pub use types::connection::{ConnectionSpec, SqlDialect};
pub use types::figure::Figure;
pub use types::frame::DataFrame;
pub use types::params::{Binding, ParamSpec, ParamType, ParamValue, QueryTemplate};
