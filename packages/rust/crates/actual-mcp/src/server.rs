//! MCP server handler: `tools/list` from the catalog, `tools/call` through the dispatcher.

use std::sync::Arc;

use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::Value;

use crate::tools::{ToolDescriptor, ToolDispatcher};

const INSTRUCTIONS: &str = "Tools for an Actual budget. Amounts are in currency units \
(negative for outflows), dates are YYYY-MM-DD and months YYYY-MM. Every result is a JSON \
object with a `success` flag; failures carry an `error` message.";

/// One per transport session; clones share the dispatcher and its session gate.
#[derive(Clone)]
pub struct ActualMcpServer {
    dispatcher: ToolDispatcher,
    tools: Arc<Vec<Tool>>,
}

impl ActualMcpServer {
    #[must_use]
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        let tools = dispatcher.tools().iter().map(to_mcp_tool).collect();
        Self {
            dispatcher,
            tools: Arc::new(tools),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }
}

fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool {
        name: descriptor.name.into(),
        title: None,
        description: Some(descriptor.description.into()),
        input_schema: Arc::new(descriptor.input_schema.clone()),
        output_schema: None,
        annotations: None,
        execution: None,
        icons: None,
        meta: None,
    }
}

impl ServerHandler for ActualMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(INSTRUCTIONS.into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(
            self.tools.as_ref().clone(),
        )))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let arguments = request.arguments.map_or(Value::Null, Value::Object);
            let outcome = self.dispatcher.call(&request.name, arguments).await;
            let content = vec![Content::text(outcome.envelope().to_string())];
            Ok(if outcome.is_success() {
                CallToolResult::success(content)
            } else {
                CallToolResult::error(content)
            })
        }
    }
}
