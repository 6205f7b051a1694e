//! Note engine for Notecraft.
//!
//! Turns a Q&A transcript into a structured study note, merges it into an
//! existing note without losing content, self-reviews the result, and drives
//! the save workflow against a [`workflow::NoteStore`].

pub mod extract;
pub mod merge;
pub mod review;
pub mod scanner;
pub mod session;
pub mod synthesize;
pub mod topic;
pub mod workflow;

pub use merge::merge;
pub use review::review;
pub use synthesize::synthesize;
