pub mod datetime;
pub mod format;
