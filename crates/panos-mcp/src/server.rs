// ── Stdio server ──
//
// Line-delimited JSON-RPC 2.0. Every input line is one message; every
// response is one output line. `tools/call` runs on its own task so one
// slow device round-trip never holds up other requests. All output goes
// through a single writer task.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;

pub const JSONRPC_VERSION: &str = "2.0";
/// Protocol revision answered when the client does not name one.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Request {
    /// Absent on notifications.
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

// ── Server ──────────────────────────────────────────────────────────

pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serve until `reader` reaches EOF, then finish in-flight calls.
    ///
    /// A line that is not UTF-8 is answered with a parse error. A read
    /// error stops intake but still flushes the calls already running.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> io::Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Response>();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut in_flight = JoinSet::new();

        let read_result = loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break Ok(()),
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "failed to read request");
                    break Err(e);
                }
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim_end_matches(['\r', '\n']),
                Err(e) => {
                    let message = format!("Parse error: {e}");
                    send(&tx, Response::error(Value::Null, PARSE_ERROR, message));
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let request = match parse(line) {
                Ok(request) => request,
                Err(response) => {
                    send(&tx, response);
                    continue;
                }
            };
            debug!(method = %request.method, "request");

            let Some(id) = request.id else {
                debug!(method = %request.method, "notification");
                continue;
            };

            if request.method == "tools/call" {
                let dispatcher = self.dispatcher.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    send(&tx, call_tool(&dispatcher, id, request.params).await);
                });
            } else {
                send(&tx, self.answer(id, &request.method, &request.params));
            }
        };

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "call task failed");
            }
        }
        drop(tx);
        let written = writer_task.await.map_err(io::Error::other)?;
        read_result.and(written)
    }

    fn answer(&self, id: Value, method: &str, params: &Value) -> Response {
        match method {
            "initialize" => {
                let version = params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(PROTOCOL_VERSION);
                info!(protocol = version, "client initialized");
                Response::result(
                    id,
                    json!({
                        "protocolVersion": version,
                        "capabilities": { "tools": { "listChanged": false } },
                        "serverInfo": {
                            "name": env!("CARGO_PKG_NAME"),
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                    }),
                )
            }
            "ping" => Response::result(id, json!({})),
            "tools/list" => {
                let tools: Vec<Value> = self
                    .dispatcher
                    .registry()
                    .commands()
                    .map(|c| c.definition())
                    .collect();
                Response::result(id, json!({ "tools": tools }))
            }
            other => {
                warn!(method = other, "unknown method");
                Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}"))
            }
        }
    }
}

/// Queue `response` for the writer; a closed channel means the writer
/// has already failed and the response is dropped.
fn send(tx: &mpsc::UnboundedSender<Response>, response: Response) {
    if tx.send(response).is_err() {
        warn!("response writer is gone; dropping response");
    }
}

fn parse(line: &str) -> Result<Request, Response> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {e}")))?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| Response::error(id, INVALID_REQUEST, format!("Invalid request: {e}")))
}

async fn call_tool(dispatcher: &Dispatcher, id: Value, params: Value) -> Response {
    let params: CallParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(e) => return Response::error(id, INVALID_PARAMS, format!("Invalid params: {e}")),
    };
    let outcome = dispatcher
        .call(&params.name, params.arguments.unwrap_or_default())
        .await;
    Response::result(
        id,
        json!({
            "content": [{ "type": "text", "text": outcome.text }],
            "isError": outcome.is_error,
        }),
    )
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Response>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response).map_err(io::Error::other)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
