pub mod flows;
pub mod serialization;
