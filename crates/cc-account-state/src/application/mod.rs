pub mod queries;
pub mod service;

pub use queries::*;
pub use service::*;
