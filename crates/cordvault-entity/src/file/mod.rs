//! File domain entities.

pub mod deletion;
pub mod model;

pub use deletion::DeletionReason;
pub use model::{CreateFile, File, UpdateFile, extension_of, raw_extension};
