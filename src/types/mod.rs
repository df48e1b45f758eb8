//! Core types shared by the conversation loop and the transport.

pub mod generation;
pub mod message;
pub mod results;
pub mod usage;

pub use generation::*;
pub use message::*;
pub use results::*;
pub use usage::*;
