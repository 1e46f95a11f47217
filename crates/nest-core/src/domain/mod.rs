pub mod address;
pub mod config;
pub mod errors;
pub mod state;

pub use address::*;
pub use config::*;
pub use errors::*;
pub use state::*;
