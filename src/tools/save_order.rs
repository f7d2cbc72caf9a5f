//! `guardarPedido` tool: forwards a confirmed order to the order sink.

use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{Tool, ToolResult};
use crate::constants::{ORDER_SAVED_TEXT, ORDER_SAVE_FAILED_TEXT, SAVE_ORDER_TOOL};
use crate::orders::OrderSink;

/// Tool the model calls once the user confirms the order summary.
///
/// The arguments are passed to the sink untouched. A failed save is reported
/// to the model as an `{"error": ...}` result rather than an error, so the
/// dialogue can still answer the user.
pub struct SaveOrderTool {
    sink: Arc<dyn OrderSink>,
}

impl SaveOrderTool {
    pub fn new(sink: Arc<dyn OrderSink>) -> Self {
        Self { sink }
    }
}

#[async_trait::async_trait]
impl Tool for SaveOrderTool {
    fn name(&self) -> &str {
        SAVE_ORDER_TOOL
    }

    fn description(&self) -> &str {
        "Guarda los detalles de un pedido en una hoja de cálculo."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "nombre": {
                    "type": "string",
                    "description": "Nombre del cliente o de la empresa."
                },
                "lugar": {
                    "type": "string",
                    "description": "La dirección de entrega completa."
                },
                "cantidad": {
                    "type": "number",
                    "description": "La cantidad del producto solicitado."
                },
                "producto": {
                    "type": "string",
                    "description": "El nombre del producto solicitado, por ejemplo \"agua de coco\"."
                }
            },
            "required": ["nombre", "lugar", "cantidad", "producto"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        match self.sink.submit(&input).await {
            Ok(()) => {
                tracing::info!(order = %input, "order saved");
                Ok(ToolResult::success(ORDER_SAVED_TEXT))
            }
            Err(e) => {
                tracing::warn!(order = %input, error = %format!("{e:#}"), "order save failed");
                Ok(ToolResult::error(ORDER_SAVE_FAILED_TEXT))
            }
        }
    }
}
