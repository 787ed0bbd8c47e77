pub mod actions;
pub mod config;
pub mod projection;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use config::*;
pub use projection::*;
pub use reducer::*;
pub use state::*;
