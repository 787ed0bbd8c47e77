pub mod contracts;
pub mod error;
pub mod orchestrator;
pub mod transport;

pub use contracts::*;
pub use error::*;
pub use orchestrator::*;
pub use transport::*;
