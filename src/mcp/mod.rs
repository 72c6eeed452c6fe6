//! Model Context Protocol server
//!
//! Transport-independent JSON-RPC handling. [`stdio`] and the HTTP API in
//! [`crate::api`] feed raw messages into [`McpServer`] together with the
//! [`Session`] the message belongs to.

pub mod stdio;
pub mod types;

use serde::Serialize;
use serde_json::{Value, json};

use crate::prompt::{SERVER_INSTRUCTIONS, SPOKEN_KEYPOINTS_PROMPT, SPOKEN_KEYPOINTS_PROMPT_NAME};
use crate::session::{Session, SessionStore};
use crate::tools::{TalkTools, ToolExecutor};
use types::{
    CallToolParams, CallToolResult, GetPromptParams, GetPromptResult, InitializeParams,
    InitializeResult, JSONRPC_VERSION, JsonRpcRequest, JsonRpcResponse, LATEST_PROTOCOL_VERSION,
    ListPromptsResult, ListToolsResult, McpPrompt, McpTool, PromptMessage, PromptsCapability,
    SUPPORTED_PROTOCOL_VERSIONS, ServerCapabilities, ServerInfo, ToolContent, ToolsCapability,
    error_codes,
};

pub const SERVER_NAME: &str = "talk-mcp";

/// JSON-RPC error produced while handling a request
#[derive(Debug)]
struct RpcFailure {
    code: i32,
    message: String,
}

impl RpcFailure {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_PARAMS, message)
    }
}

type RpcResult = std::result::Result<Value, RpcFailure>;

/// Handles MCP requests for the voice tools
pub struct McpServer {
    executor: ToolExecutor,
    sessions: SessionStore,
}

impl McpServer {
    #[must_use]
    pub fn new(tools: TalkTools) -> Self {
        let sessions = SessionStore::new(tools.config().default_voice_id.clone());
        Self {
            executor: ToolExecutor::new(tools),
            sessions,
        }
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one serialized JSON-RPC message
    ///
    /// Returns `None` for notifications and client responses.
    pub async fn handle_message(&self, session: &Session, raw: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => self.handle_value(session, value).await,
            Err(e) => Some(JsonRpcResponse::failure(
                Value::Null,
                error_codes::PARSE_ERROR,
                format!("parse error: {e}"),
            )),
        }
    }

    /// Handle one already-parsed JSON-RPC message
    pub async fn handle_value(&self, session: &Session, value: Value) -> Option<JsonRpcResponse> {
        if value.is_array() {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                error_codes::INVALID_REQUEST,
                "batch requests are not supported",
            ));
        }

        // Responses to server-initiated requests; this server sends none
        if value.get("method").is_none()
            && (value.get("result").is_some() || value.get("error").is_some())
        {
            tracing::debug!("ignoring client response");
            return None;
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_REQUEST,
                    format!("invalid request: {e}"),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                error_codes::INVALID_REQUEST,
                format!("unsupported jsonrpc version {:?}", request.jsonrpc),
            ));
        }

        self.handle_request(session, request).await
    }

    /// Dispatch a decoded request to its method handler
    pub async fn handle_request(
        &self,
        session: &Session,
        request: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            handle_notification(&request.method);
            return None;
        };

        tracing::debug!(method = %request.method, session = %session.id(), "mcp request");

        let result = match request.method.as_str() {
            "initialize" => initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => list_tools(),
            "tools/call" => self.call_tool(session, request.params).await,
            "prompts/list" => list_prompts(),
            "prompts/get" => get_prompt(request.params),
            other => Err(RpcFailure::new(
                error_codes::METHOD_NOT_FOUND,
                format!("method not found: {other}"),
            )),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(failure) => JsonRpcResponse::failure(id, failure.code, failure.message),
        })
    }

    async fn call_tool(&self, session: &Session, params: Option<Value>) -> RpcResult {
        let params: CallToolParams = parse_params(params)?;

        let result = match self
            .executor
            .execute(session, &params.name, params.arguments)
            .await
        {
            Ok(outcome) => CallToolResult::text(outcome.into_text(), false),
            Err(e) if e.is_caller_error() => return Err(RpcFailure::invalid_params(e.to_string())),
            Err(e) => {
                tracing::warn!(tool = %params.name, kind = e.kind(), error = %e, "tool call failed");
                CallToolResult::text(e.to_string(), true)
            }
        };

        to_value(&result)
    }
}

fn handle_notification(method: &str) {
    match method {
        "notifications/initialized" => tracing::info!("client initialized"),
        "notifications/cancelled" => {
            tracing::debug!("client cancelled a request; calls run to completion");
        }
        other => tracing::debug!(method = other, "ignoring notification"),
    }
}

fn initialize(params: Option<Value>) -> RpcResult {
    let params: InitializeParams = parse_params(params)?;

    let protocol_version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str())
    {
        params.protocol_version
    } else {
        LATEST_PROTOCOL_VERSION.to_string()
    };

    if let Some(client) = &params.client_info {
        tracing::info!(
            client = %client.name,
            client_version = %client.version,
            protocol = %protocol_version,
            "initializing session"
        );
    }

    to_value(&InitializeResult {
        protocol_version,
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: false,
            }),
            prompts: Some(PromptsCapability {
                list_changed: false,
            }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        instructions: Some(SERVER_INSTRUCTIONS.to_string()),
    })
}

fn list_tools() -> RpcResult {
    let tools = ToolExecutor::definitions()
        .into_iter()
        .map(|spec| McpTool {
            name: spec.name.to_string(),
            description: Some(spec.description.to_string()),
            input_schema: spec.input_schema,
        })
        .collect();

    to_value(&ListToolsResult { tools })
}

fn list_prompts() -> RpcResult {
    to_value(&ListPromptsResult {
        prompts: vec![McpPrompt {
            name: SPOKEN_KEYPOINTS_PROMPT_NAME.to_string(),
            description: Some(
                "Instructions for converting a reply into spoken keypoints".to_string(),
            ),
            arguments: Vec::new(),
        }],
    })
}

fn get_prompt(params: Option<Value>) -> RpcResult {
    let params: GetPromptParams = parse_params(params)?;
    if params.name != SPOKEN_KEYPOINTS_PROMPT_NAME {
        return Err(RpcFailure::invalid_params(format!(
            "unknown prompt: {}",
            params.name
        )));
    }

    to_value(&GetPromptResult {
        description: Some("Instructions for converting a reply into spoken keypoints".to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolContent::Text {
                text: SPOKEN_KEYPOINTS_PROMPT.to_string(),
            },
        }],
    })
}

fn parse_params<T: serde::de::DeserializeOwned>(
    params: Option<Value>,
) -> std::result::Result<T, RpcFailure> {
    serde_json::from_value(params.unwrap_or_else(|| json!({})))
        .map_err(|e| RpcFailure::invalid_params(format!("invalid params: {e}")))
}

fn to_value<T: Serialize>(value: &T) -> RpcResult {
    serde_json::to_value(value)
        .map_err(|e| RpcFailure::new(error_codes::INTERNAL_ERROR, e.to_string()))
}
