//! MCP Server implementation
//!
//! This module adapts the [`InvocationHandler`] to the MCP `ServerHandler`
//! trait and exposes it as the `execute_shell` tool.

use std::future::Future;
use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpService,
};
use rmcp::{
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::hosts::HostDirectory;
use crate::invocation::{ExecutionRequest, InvocationHandler};
use crate::ssh::{CommandRunner, SshExecutor};
use crate::tools::{ExecuteShellParams, EXECUTE_SHELL};

/// Linux MCP Server
///
/// Stateless between calls: every tool call re-reads the host directory and
/// opens its own SSH session, so clones can serve requests concurrently.
#[derive(Clone, Debug)]
pub struct LinuxMcpServer {
    handler: InvocationHandler,
}

impl LinuxMcpServer {
    /// Create a server that executes over SSH with the configured options
    pub fn new(config: &Config) -> Self {
        let executor = SshExecutor::new(config.session_options());
        Self::with_runner(HostDirectory::new(&config.hosts_file), Arc::new(executor))
    }

    /// Create a server with a custom command runner
    pub fn with_runner(directory: HostDirectory, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            handler: InvocationHandler::new(directory, runner),
        }
    }

    /// Run one execute_shell call, abandoning it once `cancelled` resolves.
    ///
    /// Dropping the in-flight invocation drops its SSH session with it.
    async fn execute_shell(
        &self,
        request: ExecutionRequest,
        cancelled: impl Future<Output = ()>,
    ) -> CallToolResult {
        tokio::select! {
            outcome = self.handler.handle(&request) => {
                let text = outcome.render();
                if outcome.is_success() {
                    CallToolResult::success(vec![Content::text(text)])
                } else {
                    CallToolResult::error(vec![Content::text(text)])
                }
            }
            _ = cancelled => {
                warn!("execute_shell on {} cancelled by client", request.target);
                CallToolResult::error(vec![Content::text("Execution cancelled")])
            }
        }
    }

    /// Build execute_shell tool definition
    fn execute_shell_tool() -> Tool {
        Tool::new(
            EXECUTE_SHELL,
            "execute shell command on remote machine via SSH",
            Arc::new(ExecuteShellParams::input_schema()),
        )
    }
}

/// Serve `server` over streamable HTTP on every request path
pub fn http_router(server: LinuxMcpServer) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    axum::Router::new().fallback_service(service)
}

/// Validate a tool call and extract its execute_shell arguments
fn parse_call(name: &str, args: Option<JsonObject>) -> Result<ExecuteShellParams, McpError> {
    if name != EXECUTE_SHELL {
        return Err(McpError::invalid_params(
            format!("Unknown tool: {}", name),
            None,
        ));
    }

    let args = args.unwrap_or_default();
    Ok(ExecuteShellParams {
        machine_ip: required_str(&args, "machine_ip")?,
        path: required_str(&args, "path")?,
        shell: required_str(&args, "shell")?,
    })
}

/// Extract a required string argument
fn required_str(args: &JsonObject, name: &str) -> Result<String, McpError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            McpError::invalid_params(format!("Missing required parameter: {}", name), None)
        })
}

impl ServerHandler for LinuxMcpServer {
    /// Return server information
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "linux_mcp_server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "Linux MCP Server v{} - Execute shell commands on machines listed in {}",
                env!("CARGO_PKG_VERSION"),
                self.handler.directory().path().display(),
            )),
        }
    }

    /// List available tools
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        debug!("list_tools called");

        Ok(ListToolsResult {
            tools: vec![Self::execute_shell_tool()],
            next_cursor: None,
            meta: Default::default(),
        })
    }

    /// Call a tool
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        debug!("call_tool called: {:?}", request.name);

        let params = parse_call(request.name.as_ref(), request.arguments)?;
        Ok(self.execute_shell(params.into(), context.ct.cancelled()).await)
    }
}
