/// MCP client and Confluence integration
pub mod client;
pub mod confluence;
pub mod protocol;

pub use client::{McpClient, McpServerParams};
pub use confluence::{ConfluenceClient, DocumentationPage, SearchHit};
pub use protocol::{CallToolResult, Tool, ToolContent};
