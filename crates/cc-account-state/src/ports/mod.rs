pub mod cashback;

pub use cashback::*;
