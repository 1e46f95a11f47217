pub mod storage;
pub mod store;

pub use storage::*;
pub use store::*;
