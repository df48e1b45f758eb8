//! Tool binding: typed functions the model can call.

pub mod registry;
pub mod schema;
pub mod tool;

pub use registry::ToolRegistry;
pub use schema::schema_of;
pub use tool::{ToolDescriptor, ToolExecutionContext};
