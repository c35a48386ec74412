//! Newline-delimited JSON-RPC framing for byte streams.
//!
//! [`LineTransport`] is the rmcp `Transport` behind the STDIO and TCP
//! transports. rmcp's stock stream transport ends the session on the first
//! line it cannot decode; this one answers such lines with a JSON-RPC error
//! and keeps reading. Lines are capped at [`MAX_LINE_BYTES`].

use std::sync::Arc;

use rmcp::RoleServer;
use rmcp::model::{ClientJsonRpcMessage, ErrorCode, ErrorData, ServerJsonRpcMessage};
use rmcp::transport::Transport;
use serde_json::{Value, json};
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Longest accepted message, newline excluded.
pub const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Client request methods rmcp knows how to route.
const KNOWN_METHODS: &[&str] = &[
    "initialize",
    "ping",
    "completion/complete",
    "logging/setLevel",
    "prompts/get",
    "prompts/list",
    "resources/list",
    "resources/templates/list",
    "resources/read",
    "resources/subscribe",
    "resources/unsubscribe",
    "tools/call",
    "tools/list",
];

enum Frame {
    Line(Vec<u8>),
    Oversized,
}

/// Server-side rmcp transport over any reader/writer pair.
pub struct LineTransport<R, W> {
    reader: BufReader<R>,
    writer: Arc<Mutex<W>>,
    max_line: usize,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: Arc::new(Mutex::new(writer)),
            max_line: MAX_LINE_BYTES,
        }
    }

    /// Override the line cap.
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    async fn next_frame(&mut self) -> std::io::Result<Option<Frame>> {
        let limit = self.max_line as u64 + 1;
        let mut line = Vec::new();
        if (&mut self.reader).take(limit).read_until(b'\n', &mut line).await? == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        if line.len() <= self.max_line {
            return Ok(Some(Frame::Line(line)));
        }

        // Skip the rest of the oversized line.
        let mut rest = Vec::new();
        loop {
            rest.clear();
            let read = (&mut self.reader).take(limit).read_until(b'\n', &mut rest).await?;
            if read == 0 || rest.last() == Some(&b'\n') {
                return Ok(Some(Frame::Oversized));
            }
        }
    }
}

async fn write_line<W>(writer: &Mutex<W>, message: &impl serde::Serialize) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = serde_json::to_vec(message)?;
    encoded.push(b'\n');
    let mut writer = writer.lock().await;
    writer.write_all(&encoded).await?;
    writer.flush().await
}

fn rejection(id: Value, error: ErrorData) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": error })
}

/// Decode one line, or build the error reply for it.
///
/// `Ok(None)` means the line is dropped silently: blank lines and
/// notifications rmcp does not understand.
fn decode(line: &[u8]) -> Result<Option<ClientJsonRpcMessage>, Value> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(line).map_err(|e| {
        rejection(
            Value::Null,
            ErrorData::parse_error(format!("Parse error: {}", e), None),
        )
    })?;

    let Some(object) = value.as_object() else {
        return Err(rejection(
            Value::Null,
            ErrorData::invalid_request("Invalid Request: expected a JSON object", None),
        ));
    };
    let id = object.get("id").cloned();
    let invalid = |message: String| {
        rejection(
            id.clone().unwrap_or(Value::Null),
            ErrorData::invalid_request(message, None),
        )
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(invalid("Invalid Request: jsonrpc must be \"2.0\"".into()));
    }
    let method = object.get("method").and_then(Value::as_str);
    let is_response = object.contains_key("result") || object.contains_key("error");
    if method.is_none() && !is_response {
        return Err(invalid("Invalid Request: missing method".into()));
    }

    match serde_json::from_value::<ClientJsonRpcMessage>(value.clone()) {
        Ok(message) => Ok(Some(message)),
        Err(e) => match (method, id) {
            (Some(method), None) => {
                debug!("Ignoring notification {}: {}", method, e);
                Ok(None)
            }
            (Some(method), Some(id)) if !KNOWN_METHODS.contains(&method) => Err(rejection(
                id,
                ErrorData::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                    None,
                ),
            )),
            (Some(_), Some(id)) => Err(rejection(
                id,
                ErrorData::invalid_params(format!("Invalid params: {}", e), None),
            )),
            (None, id) => Err(rejection(
                id.unwrap_or(Value::Null),
                ErrorData::invalid_request(format!("Invalid Request: {}", e), None),
            )),
        },
    }
}

impl<R, W> Transport<RoleServer> for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send + 'static,
{
    type Error = std::io::Error;

    fn send(
        &mut self,
        item: ServerJsonRpcMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let writer = self.writer.clone();
        async move { write_line(&writer, &item).await }
    }

    async fn receive(&mut self) -> Option<ClientJsonRpcMessage> {
        loop {
            let frame = match self.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    debug!("Input closed");
                    return None;
                }
                Err(e) => {
                    warn!("Failed to read message: {}", e);
                    return None;
                }
            };

            let reply = match frame {
                Frame::Line(line) => match decode(&line) {
                    Ok(Some(message)) => return Some(message),
                    Ok(None) => continue,
                    Err(reply) => reply,
                },
                Frame::Oversized => {
                    warn!("Discarding message longer than {} bytes", self.max_line);
                    rejection(
                        Value::Null,
                        ErrorData::invalid_request(
                            format!("Invalid Request: message exceeds {} bytes", self.max_line),
                            None,
                        ),
                    )
                }
            };

            warn!("Rejected message: {}", reply["error"]["message"]);
            if let Err(e) = write_line(&self.writer, &reply).await {
                warn!("Failed to write error response: {}", e);
                return None;
            }
        }
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.writer.lock().await.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, McpServer};
    use crate::domains::gateway::memory::MemoryStore;
    use crate::domains::gateway::{Gateway, GatewaySettings};
    use rmcp::ServiceExt;
    use std::time::Duration;
    use tokio::io::{DuplexStream, Lines, ReadHalf, WriteHalf, duplex};

    type ClientWriter = WriteHalf<DuplexStream>;
    type ClientLines = Lines<BufReader<ReadHalf<DuplexStream>>>;

    fn server() -> McpServer {
        let gateway = Gateway::new(
            Arc::new(MemoryStore::new().with_collection("users", vec![])),
            GatewaySettings {
                timeout: Duration::from_secs(1),
                read_only: false,
            },
        );
        McpServer::with_gateway(Config::default(), Arc::new(gateway)).unwrap()
    }

    /// Start a session and return the client end plus its response lines.
    fn start(max_line: usize) -> (ClientWriter, ClientLines) {
        let (client, server_side) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server_side);
        let transport = LineTransport::new(reader, writer).with_max_line(max_line);
        tokio::spawn(async move {
            let service = server().serve(transport).await?;
            service.waiting().await?;
            anyhow::Ok(())
        });
        let (client_reader, client_writer) = tokio::io::split(client);
        (client_writer, BufReader::new(client_reader).lines())
    }

    async fn send(writer: &mut ClientWriter, line: &str) {
        writer.write_all(line.as_bytes()).await.unwrap();
        writer.write_all(b"\n").await.unwrap();
    }

    async fn next(lines: &mut ClientLines) -> Value {
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"1999-01-01","capabilities":{},"clientInfo":{"name":"test-client","version":"1"}}}"#;
    const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

    #[tokio::test]
    async fn test_session_survives_bad_lines() {
        let (mut writer, mut lines) = start(MAX_LINE_BYTES);

        send(&mut writer, INITIALIZE).await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
        send(&mut writer, INITIALIZED).await;

        send(&mut writer, "").await;
        send(&mut writer, "this is not json").await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], json!(-32700));

        send(&mut writer, r#"{"jsonrpc":"1.0","id":2,"method":"ping"}"#).await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(2));
        assert_eq!(response["error"]["code"], json!(-32600));

        send(&mut writer, r#"{"jsonrpc":"2.0","id":3,"method":"no/such/method"}"#).await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(3));
        assert_eq!(response["error"]["code"], json!(-32601));

        send(&mut writer, r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{}}"#).await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(4));
        assert_eq!(response["error"]["code"], json!(-32602));

        send(
            &mut writer,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"getObjects","arguments":{"collection":"users"}}}"#,
        )
        .await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(5));
        assert_eq!(
            response["result"]["content"][0]["text"],
            json!("No documents found in users")
        );
    }

    #[tokio::test]
    async fn test_oversized_line_is_rejected_and_skipped() {
        let (mut writer, mut lines) = start(1024);

        send(&mut writer, INITIALIZE).await;
        next(&mut lines).await;
        send(&mut writer, INITIALIZED).await;

        let huge = format!(
            r#"{{"jsonrpc":"2.0","id":2,"method":"ping","params":{{"pad":"{}"}}}}"#,
            "x".repeat(4096)
        );
        send(&mut writer, &huge).await;
        let response = next(&mut lines).await;
        assert_eq!(response["error"]["code"], json!(-32600));
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("exceeds 1024 bytes")
        );

        send(&mut writer, r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#).await;
        let response = next(&mut lines).await;
        assert_eq!(response["id"], json!(3));
        assert_eq!(response["result"], json!({}));
    }

    #[tokio::test]
    async fn test_tool_call_before_initialize_is_not_served() {
        let (mut writer, mut lines) = start(MAX_LINE_BYTES);

        send(
            &mut writer,
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"getObjects","arguments":{"collection":"users"}}}"#,
        )
        .await;
        writer.shutdown().await.unwrap();

        while let Some(line) = lines.next_line().await.unwrap() {
            let response: Value = serde_json::from_str(&line).unwrap();
            assert!(response.get("result").is_none());
        }
    }

    #[test]
    fn test_decode_classifies_failures() {
        assert!(decode(b"   ").unwrap().is_none());
        assert!(
            decode(br#"{"jsonrpc":"2.0","method":"notifications/unheard_of"}"#)
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            decode(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#),
            Ok(Some(ClientJsonRpcMessage::Request(_)))
        ));

        let reply = decode(b"[1, 2]").unwrap_err();
        assert_eq!(reply["error"]["code"], json!(-32600));
        let reply = decode(br#"{"jsonrpc":"2.0","id":"a"}"#).unwrap_err();
        assert_eq!(reply["id"], json!("a"));
        assert_eq!(reply["error"]["code"], json!(-32600));
    }
}
