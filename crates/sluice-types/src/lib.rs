//! Pure data types for sluice: stream shapes, spans, completion updates and
//! the facts the static checker hands to the execution core.
//!
//! This crate is a leaf dependency with no async runtime and no I/O, so a
//! checker can produce annotations without linking the kernel.

pub mod annotation;
pub mod shape;
pub mod span;
pub mod update;

pub use annotation::*;
pub use shape::*;
pub use span::*;
pub use update::*;
