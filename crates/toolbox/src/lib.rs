pub mod error;
pub mod session;
pub mod store;

pub use error::RetryPrompt;
pub use session::Session;
pub use store::{MemoryStore, SessionState, StateStore};
