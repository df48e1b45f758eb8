//! Typed tool bindings and their dynamic dispatch.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::schema::schema_of;
use crate::convert::{self, Record, Value};
use crate::error::{BoxError, GenbindError, Result, ToolStage};

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    /// Name of the tool being executed.
    pub tool_name: String,
    /// Identifier the model attached to the call, if any.
    pub call_id: Option<String>,
    /// Conversation round that requested the call, starting at 1.
    pub round: usize,
    /// Cancelled when the conversation is cancelled.
    pub cancel: CancellationToken,
}

type ToolHandler = dyn Fn(Value, ToolExecutionContext) -> BoxFuture<'static, Result<Value>> + Send + Sync;

/// A named, schema-described function the model may call.
///
/// The handler takes the model's argument tree and returns the encoded
/// output tree; typed conversion happens inside it.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: serde_json::Value,
    output_schema: serde_json::Value,
    handler: Arc<ToolHandler>,
}

impl ToolDescriptor {
    /// Bind an async function `I -> Result<O, E>` as a tool.
    ///
    /// Both schemas are computed here, so an unusable input or output type
    /// fails immediately with a configuration error.
    pub fn bind<I, O, E, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        function: F,
    ) -> Result<Self>
    where
        I: Record,
        O: Record,
        E: Into<BoxError>,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        Self::bind_with_context(name, description, move |input: I, _ctx| function(input))
    }

    /// Like [`bind`](Self::bind), but the function also receives the
    /// [`ToolExecutionContext`] of the call.
    pub fn bind_with_context<I, O, E, F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        function: F,
    ) -> Result<Self>
    where
        I: Record,
        O: Record,
        E: Into<BoxError>,
        F: Fn(I, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, E>> + Send + 'static,
    {
        let name = name.into();
        let (input_schema, output_schema) = record_schemas::<I, O>(&name)?;

        let tool_name = name.clone();
        let function = Arc::new(function);
        let handler = move |args: Value, ctx: ToolExecutionContext| -> BoxFuture<'static, Result<Value>> {
            let tool_name = tool_name.clone();
            let function = Arc::clone(&function);
            Box::pin(async move {
                let input = decode_input::<I>(&tool_name, &args)?;
                let output = function(input, ctx)
                    .await
                    .map_err(|e| GenbindError::tool(&tool_name, e))?;
                encode_output(&tool_name, &output)
            })
        };

        Ok(Self {
            name,
            description: description.into(),
            input_schema,
            output_schema,
            handler: Arc::new(handler),
        })
    }

    /// Bind a synchronous function that may block, e.g. on file or network
    /// I/O. Each call runs on tokio's blocking thread pool.
    pub fn bind_blocking<I, O, E, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        function: F,
    ) -> Result<Self>
    where
        I: Record,
        O: Record,
        E: Into<BoxError>,
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
    {
        let name = name.into();
        let tool_name = name.clone();
        let function = Arc::new(function);
        Self::bind_with_context(name, description, move |input: I, _ctx| {
            let function = Arc::clone(&function);
            let tool_name = tool_name.clone();
            async move {
                let joined =
                    tokio::task::spawn_blocking(move || function(input).map_err(Into::<BoxError>::into)).await;
                joined.unwrap_or_else(|join| {
                    Err(BoxError::from(format!("tool '{tool_name}' did not complete: {join}")))
                })
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// JSON Schema of the input record.
    pub fn input_schema(&self) -> &serde_json::Value {
        &self.input_schema
    }

    /// JSON Schema of the output record.
    pub fn output_schema(&self) -> &serde_json::Value {
        &self.output_schema
    }

    /// Run the tool against a dynamic argument tree.
    ///
    /// Errors are tagged with the tool name: decoding the arguments and
    /// encoding the result fail with [`GenbindError::ToolConversion`], the
    /// function's own failure with [`GenbindError::ToolExecution`].
    pub async fn dispatch(&self, args: Value, ctx: ToolExecutionContext) -> Result<Value> {
        (self.handler)(args, ctx).await
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

fn record_schemas<I: Record, O: Record>(
    tool_name: &str,
) -> Result<(serde_json::Value, serde_json::Value)> {
    let configuration = |e: GenbindError| match e {
        GenbindError::Configuration(message) => {
            GenbindError::Configuration(format!("tool '{tool_name}': {message}"))
        }
        other => other,
    };
    I::descriptor().validate().map_err(configuration)?;
    O::descriptor().validate().map_err(configuration)?;
    let input = schema_of::<I>().map_err(configuration)?;
    let output = schema_of::<O>().map_err(configuration)?;
    Ok((input, output))
}

fn decode_input<I: Record>(tool_name: &str, args: &Value) -> Result<I> {
    convert::decode(args).map_err(|source| GenbindError::ToolConversion {
        tool_name: tool_name.to_string(),
        stage: ToolStage::Input,
        source,
    })
}

fn encode_output<O: Record>(tool_name: &str, output: &O) -> Result<Value> {
    convert::encode(output).map_err(|source| GenbindError::ToolConversion {
        tool_name: tool_name.to_string(),
        stage: ToolStage::Output,
        source,
    })
}
