//! genbind: typed tool calling and structured output for generative models.
//!
//! Records are plain structs described once with [`record!`]. The
//! description drives conversion to and from the schema-less [`Value`]
//! tree the model exchanges, and the JSON Schema the model is shown.
//! Typed functions become tools with [`ToolDescriptor::bind`]; the
//! conversation loop dispatches the model's calls to them until it gives a
//! final answer.
//!
//! # Quick Start
//!
//! ```no_run
//! use genbind::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Echo {
//!     msg: String,
//! }
//!
//! genbind::record! { Echo { msg = "Text to echo back." } }
//!
//! # async fn example() -> genbind::Result<()> {
//! let mut tools = ToolRegistry::new();
//! tools.add_function("echo", "Echo a message", |input: Echo| async move {
//!     Ok::<_, BoxError>(input)
//! })?;
//!
//! let client = Client::new(GoogleModel::Gemini3FlashPreview)?;
//! let result = client
//!     .generate_text(vec![ModelMessage::user("Echo 'hi', then say done.")], &tools)
//!     .await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```
//!
//! [`Value`]: convert::Value
//! [`ToolDescriptor::bind`]: tools::ToolDescriptor::bind

pub mod config;
pub mod convert;
pub mod error;
pub mod generation;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
pub mod util;

#[doc(hidden)]
pub use schemars;

pub use error::{GenbindError, Result};
