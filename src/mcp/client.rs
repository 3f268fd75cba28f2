//! Stdio JSON-RPC client for MCP servers
//!
//! Spawns the MCP server as a child process and exchanges newline-delimited
//! JSON-RPC messages over its stdin/stdout. Requests are correlated to
//! responses by numeric ID; server notifications and responses with unknown
//! IDs are logged and skipped.

use crate::error::McpError;
use crate::mcp::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, Tool,
};
use log::{debug, info, warn};
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// How long to wait for a single JSON-RPC response
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Launch parameters for an MCP server subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerParams {
    /// Executable name or path
    pub command: String,
    /// Command-line arguments
    pub args: Vec<String>,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
}

/// A live stdio session with an MCP server
///
/// One session corresponds to one child process. Dropping the session kills
/// the child; call `shutdown` for an orderly stop.
pub struct McpClient {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    client_name: String,
}

impl McpClient {
    /// Spawn the MCP server subprocess and wire up its pipes
    ///
    /// # Errors
    ///
    /// Returns `McpError::Spawn` if the executable cannot be started, with
    /// the command name in the message so a missing `mcp-atlassian` install
    /// is diagnosable.
    pub async fn spawn(params: &McpServerParams, client_name: &str) -> Result<Self, McpError> {
        info!(
            "Starting MCP server: {} {}",
            params.command,
            params.args.join(" ")
        );

        let mut command = Command::new(&params.command);
        command
            .args(&params.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        for (key, value) in &params.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| McpError::Spawn {
            command: params.command.clone(),
            source,
        })?;

        let stdin = child.stdin.take().ok_or(McpError::ConnectionClosed)?;
        let stdout = child.stdout.take().ok_or(McpError::ConnectionClosed)?;

        Ok(Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            next_id: 0,
            client_name: client_name.to_string(),
        })
    }

    /// Perform the MCP initialize handshake
    pub async fn initialize(&mut self) -> Result<InitializeResult, McpError> {
        let params = serde_json::to_value(InitializeParams::for_client(&self.client_name))?;
        let result = self.request("initialize", params).await?;
        let init: InitializeResult = serde_json::from_value(result)?;

        info!(
            "MCP server initialized: {} {} (protocol {})",
            init.server_info.name, init.server_info.version, init.protocol_version
        );

        self.notify("notifications/initialized", serde_json::json!({}))
            .await?;
        Ok(init)
    }

    /// List the tools the server advertises
    pub async fn list_tools(&mut self) -> Result<Vec<Tool>, McpError> {
        let result = self.request("tools/list", serde_json::json!({})).await?;
        let listed: ListToolsResult = serde_json::from_value(result)?;
        debug!("MCP server advertises {} tools", listed.tools.len());
        Ok(listed.tools)
    }

    /// Invoke a tool by name
    ///
    /// # Errors
    ///
    /// Returns `McpError::ToolFailed` when the server returns a result with
    /// the error flag set, in addition to the usual transport errors.
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_string(),
            arguments: Some(arguments),
        })?;

        let result = self.request("tools/call", params).await?;
        let call_result: CallToolResult = serde_json::from_value(result)?;

        if call_result.failed() {
            return Err(McpError::ToolFailed {
                tool: name.to_string(),
                message: call_result.text(),
            });
        }

        Ok(call_result)
    }

    /// Send a request and wait for its response
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        self.next_id += 1;
        let id = self.next_id;
        let request = JsonRpcRequest::new(id, method, params);

        self.send_line(&serde_json::to_string(&request)?).await?;

        tokio::time::timeout(REQUEST_TIMEOUT, self.read_response(id))
            .await
            .map_err(|_| McpError::Timeout)?
    }

    /// Send a notification (no response expected)
    async fn notify(&mut self, method: &str, params: Value) -> Result<(), McpError> {
        let note = JsonRpcRequest::notification(method, params);
        self.send_line(&serde_json::to_string(&note)?).await
    }

    async fn send_line(&mut self, line: &str) -> Result<(), McpError> {
        debug!("-> {}", line);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Read lines until the response matching `id` arrives
    async fn read_response(&mut self, id: u64) -> Result<Value, McpError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await?
                .ok_or(McpError::ConnectionClosed)?;

            if line.trim().is_empty() {
                continue;
            }
            debug!("<- {}", line);

            let response: JsonRpcResponse = match serde_json::from_str(&line) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Skipping non-response MCP message: {}", e);
                    continue;
                }
            };

            if response.id != Value::from(id) {
                warn!("Skipping MCP response with unexpected id: {}", response.id);
                continue;
            }

            if let Some(error) = response.error {
                return Err(McpError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }

            return response.result.ok_or_else(|| {
                McpError::MalformedPayload("response carried neither result nor error".to_string())
            });
        }
    }

    /// Stop the server subprocess
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            debug!("MCP server already exited: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_server(response: &str) -> McpServerParams {
        // Reads one request line, then prints the canned response.
        McpServerParams {
            command: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                format!("read line; printf '%s\\n' '{}'", response),
            ],
            env: vec![],
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_names_the_command() {
        let params = McpServerParams {
            command: "definitely-not-installed-mcp".to_string(),
            args: vec![],
            env: vec![],
        };

        let result = McpClient::spawn(&params, "test").await;
        match result {
            Err(McpError::Spawn { command, .. }) => {
                assert_eq!(command, "definitely-not-installed-mcp")
            }
            other => panic!("expected Spawn error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_request_matches_response_by_id() {
        let params =
            echo_server(r#"{"jsonrpc":"2.0","result":{"tools":[]},"id":1}"#);
        let mut client = McpClient::spawn(&params, "test").await.unwrap();

        let result = client
            .request("tools/list", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(result, serde_json::json!({"tools": []}));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_request_skips_notifications_before_response() {
        // printf expands the embedded \n into a real line break, so the
        // notification arrives as its own line ahead of the response.
        let script = concat!(
            "read line; printf '",
            r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{}}"#,
            r"\n",
            r#"{"jsonrpc":"2.0","result":42,"id":1}"#,
            r"\n'",
        );
        let params = McpServerParams {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: vec![],
        };
        let mut client = McpClient::spawn(&params, "test").await.unwrap();

        let result = client.request("ping", serde_json::json!({})).await.unwrap();
        assert_eq!(result, serde_json::json!(42));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_request_surfaces_rpc_errors() {
        let params = echo_server(
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#,
        );
        let mut client = McpClient::spawn(&params, "test").await.unwrap();

        let result = client.request("nope", serde_json::json!({})).await;
        match result {
            Err(McpError::Rpc { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("expected Rpc error, got {:?}", other),
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_closed_pipe_reports_connection_closed() {
        // Server exits without answering.
        let params = McpServerParams {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "read line".to_string()],
            env: vec![],
        };
        let mut client = McpClient::spawn(&params, "test").await.unwrap();

        let result = client.request("ping", serde_json::json!({})).await;
        assert!(matches!(result, Err(McpError::ConnectionClosed)));

        client.shutdown().await;
    }
}
