pub mod error;
pub mod run;
pub mod template;

pub use error::ExecutorError;
pub use run::{frame_from_rows, QueryRunner};
pub use template::{bind_values, encode_literal, render, render_with_defaults};
