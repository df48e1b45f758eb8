//! Model selection.

pub mod google;

pub use google::GoogleModel;
