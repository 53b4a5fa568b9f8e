pub mod walk;

pub use walk::{open_source_root, SourceEntry, SourceWalker, WalkFailure};
