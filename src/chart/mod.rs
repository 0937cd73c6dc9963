//! From a resolved chart job to an image on disk.
//!
//! `job` holds the declarative job types, `template` fills in their
//! `{placeholders}`, `plot` groups filtered rows into lines and `render`
//! draws the result.

pub mod job;
pub mod plot;
pub mod render;
pub mod template;
