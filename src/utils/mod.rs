//! Utility modules.

pub mod date;
pub mod hash;
pub mod mime;
pub mod path;
