//! Release naming

pub mod stamp;

pub use stamp::ReleaseStamp;
