//! An ordered map from byte-string keys to values, backed by an Adaptive Radix Tree.
//!
//! Keys are any `AsRef<[u8]>` (`&str`, `String`, byte slices, byte arrays) and are ordered
//! byte-lexicographically. Inner nodes adapt between four child table shapes (4, 16, 48 and 256
//! slots) as they fill and empty, and common key runs are path compressed.
//!
//! Stored keys never prefix one another: inserting a key removes every stored key that is a
//! strict prefix or strict extension of it. See [`ArtMap`] for details.

pub mod error;
pub mod iter;
pub mod mapping;
mod node;
pub mod partials;
pub mod stats;
pub mod tree;
pub mod utils;

pub use error::ArtError;
pub use stats::TreeStatsTrait;
pub use tree::ArtMap;
