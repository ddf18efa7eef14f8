pub mod handler;
pub mod session;

pub use handler::{initialize, Outcome};
pub use session::Session;
