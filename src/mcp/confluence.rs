//! Confluence access through the `mcp-atlassian` MCP server
//!
//! Wraps the stdio MCP client with typed operations: resource/space
//! discovery, content search, and page retrieval. Each operation runs in its
//! own short-lived server session, mirroring how the upstream server is
//! meant to be driven for one-shot CLI use.

use crate::config::ConfluenceSettings;
use crate::error::McpError;
use crate::mcp::client::{McpClient, McpServerParams};
use crate::mcp::protocol::Tool;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Confluence tools the assistant uses, out of everything mcp-atlassian advertises
pub const CONFLUENCE_TOOL_NAMES: &[&str] = &[
    "getAccessibleAtlassianResources",
    "getConfluencePage",
    "searchContent",
    "getConfluenceSpace",
    "listConfluencePages",
];

/// A documentation page retrieved from Confluence
///
/// Field names are lenient on purpose: the MCP server's payload shape varies
/// between versions, so unknown fields are ignored and missing ones default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentationPage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "space_key", alias = "spaceKey")]
    pub space: String,
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A single hit from a Confluence content search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "space_key", alias = "spaceKey")]
    pub space: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Envelope some server versions wrap search results in
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    results: Vec<SearchHit>,
}

/// Client for Confluence documentation lookups over MCP
pub struct ConfluenceClient {
    params: McpServerParams,
}

impl ConfluenceClient {
    /// Build a client from Confluence settings
    ///
    /// # Errors
    ///
    /// Returns `McpError::MissingCredentials` unless URL, username and API
    /// token are all configured. This check runs before any subprocess is
    /// spawned so misconfiguration surfaces as a clear message.
    pub fn new(settings: &ConfluenceSettings) -> Result<Self, McpError> {
        if !settings.is_complete() {
            return Err(McpError::MissingCredentials);
        }

        // is_complete guarantees all three are present
        let url = settings.url.clone().unwrap_or_default();
        let username = settings.username.clone().unwrap_or_default();
        let api_token = settings.api_token.clone().unwrap_or_default();

        let params = McpServerParams {
            command: "mcp-atlassian".to_string(),
            args: vec![
                "--transport".to_string(),
                "stdio".to_string(),
                "--confluence-url".to_string(),
                url.clone(),
                "--confluence-username".to_string(),
                username.clone(),
                "--confluence-token".to_string(),
                api_token.clone(),
            ],
            env: vec![
                ("CONFLUENCE_URL".to_string(), url),
                ("CONFLUENCE_USERNAME".to_string(), username),
                ("CONFLUENCE_API_TOKEN".to_string(), api_token),
            ],
        };

        Ok(Self { params })
    }

    /// The launch parameters this client spawns sessions with
    pub fn server_params(&self) -> &McpServerParams {
        &self.params
    }

    /// Open a fresh initialized session with the MCP server
    async fn connect(&self) -> Result<McpClient, McpError> {
        let mut client = McpClient::spawn(&self.params, "ai-alert").await?;
        client.initialize().await?;
        Ok(client)
    }

    /// List the Confluence tools the server actually advertises
    pub async fn confluence_tools(&self) -> Result<Vec<Tool>, McpError> {
        let mut session = self.connect().await?;
        let tools = session.list_tools().await?;
        session.shutdown().await;

        let filtered: Vec<Tool> = tools
            .into_iter()
            .filter(|t| CONFLUENCE_TOOL_NAMES.contains(&t.name.as_str()))
            .collect();
        info!("Found {} Confluence tools", filtered.len());
        Ok(filtered)
    }

    /// Discover accessible Atlassian resources (sites/spaces)
    pub async fn discover_resources(&self) -> Result<Value, McpError> {
        let mut session = self.connect().await?;
        let result = session
            .call_tool("getAccessibleAtlassianResources", serde_json::json!({}))
            .await?;
        session.shutdown().await;

        let text = result.text();
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    /// Search Confluence content for a query, optionally within one space
    pub async fn search(
        &self,
        query: &str,
        space_key: Option<&str>,
    ) -> Result<Vec<SearchHit>, McpError> {
        info!("Searching Confluence for: {}", query);

        let mut arguments = serde_json::json!({ "query": query });
        if let Some(key) = space_key {
            arguments["space_key"] = Value::String(key.to_string());
        }

        let mut session = self.connect().await?;
        let result = session.call_tool("searchContent", arguments).await?;
        session.shutdown().await;

        Ok(parse_search_hits(&result.text()))
    }

    /// Retrieve a specific Confluence page by ID
    pub async fn get_page(&self, page_id: &str) -> Result<DocumentationPage, McpError> {
        info!("Retrieving Confluence page: {}", page_id);

        let mut session = self.connect().await?;
        let result = session
            .call_tool(
                "getConfluencePage",
                serde_json::json!({ "page_id": page_id }),
            )
            .await?;
        session.shutdown().await;

        Ok(parse_page(page_id, &result.text()))
    }
}

/// Parse search-tool output into hits
///
/// Accepts a JSON array, a `{"results": [...]}` envelope, or falls back to
/// treating non-JSON text as a single excerpt-only hit.
fn parse_search_hits(text: &str) -> Vec<SearchHit> {
    if let Ok(hits) = serde_json::from_str::<Vec<SearchHit>>(text) {
        return hits;
    }
    if let Ok(envelope) = serde_json::from_str::<SearchEnvelope>(text) {
        return envelope.results;
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    warn!("Search result was not structured JSON, keeping raw text excerpt");
    vec![SearchHit {
        excerpt: trimmed.to_string(),
        ..Default::default()
    }]
}

/// Parse page-tool output, falling back to raw text as the body
fn parse_page(page_id: &str, text: &str) -> DocumentationPage {
    if let Ok(page) = serde_json::from_str::<DocumentationPage>(text) {
        return DocumentationPage {
            id: if page.id.is_empty() {
                page_id.to_string()
            } else {
                page.id
            },
            ..page
        };
    }

    DocumentationPage {
        id: page_id.to_string(),
        body: text.trim().to_string(),
        ..Default::default()
    }
}
