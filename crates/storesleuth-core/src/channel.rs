/// JSON-lines message channel.
///
/// Each input line is a method call `{"id": .., "method": ".."}`; each call
/// gets exactly one reply line carrying either `result` or `error`. The
/// `id` is echoed back untouched so the host can match replies to calls.
use crate::dispatch::{dispatch, Response};
use crate::error::DispatchError;
use crate::inventory::StorageInventory;
use crate::platform::StorageBackend;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

/// Error code for lines that are not a valid method call.
pub const BAD_REQUEST: &str = "badRequest";

#[derive(Debug, Deserialize)]
struct MethodCall {
    method: String,
}

#[derive(Debug, Serialize)]
struct Reply {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ReplyError>,
}

#[derive(Debug, Serialize)]
struct ReplyError {
    code: &'static str,
    message: String,
}

impl Reply {
    fn success(id: Value, response: Response) -> Self {
        Self {
            id,
            result: Some(response),
            error: None,
        }
    }

    fn failure(id: Value, code: &'static str, message: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(ReplyError { code, message }),
        }
    }
}

/// Counters for one `serve` session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub calls: u64,
    pub errors: u64,
}

/// Answer one input line. Returns `None` for blank lines.
pub fn reply_to_line<B: StorageBackend>(
    inventory: &StorageInventory<B>,
    line: &str,
) -> Option<(String, bool)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let reply = answer(inventory, line);
    let ok = reply.error.is_none();
    let text = serde_json::to_string(&reply).unwrap_or_else(|e| {
        json!({
            "id": reply.id,
            "error": { "code": BAD_REQUEST, "message": e.to_string() },
        })
        .to_string()
    });
    Some((text, ok))
}

fn answer<B: StorageBackend>(inventory: &StorageInventory<B>, line: &str) -> Reply {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Rejecting malformed call: {e}");
            return Reply::failure(Value::Null, BAD_REQUEST, e.to_string());
        }
    };
    // Echo the id even when the rest of the call is unusable.
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    let call = match serde_json::from_value::<MethodCall>(value) {
        Ok(call) => call,
        Err(e) => {
            warn!("Rejecting call {id}: {e}");
            return Reply::failure(id, BAD_REQUEST, e.to_string());
        }
    };

    match dispatch(inventory, &call.method) {
        Ok(response) => Reply::success(id, response),
        Err(e) => {
            if matches!(e, DispatchError::NotImplemented { .. }) {
                debug!("{e}");
            } else {
                warn!("{} failed: {e}", call.method);
            }
            Reply::failure(id, e.code(), e.to_string())
        }
    }
}

/// Serve calls from `reader` until EOF, writing one reply line per call.
///
/// Malformed lines get a `badRequest` reply and the loop carries on; only
/// I/O errors on the streams end it early.
pub fn serve<B, R, W>(
    inventory: &StorageInventory<B>,
    reader: R,
    mut writer: W,
) -> io::Result<ServeSummary>
where
    B: StorageBackend,
    R: BufRead,
    W: Write,
{
    info!("Message channel open");
    let mut summary = ServeSummary::default();

    for line in reader.lines() {
        let line = line?;
        let Some((reply, ok)) = reply_to_line(inventory, &line) else {
            continue;
        };
        summary.calls += 1;
        if !ok {
            summary.errors += 1;
        }
        writeln!(writer, "{reply}")?;
        writer.flush()?;
    }

    info!(
        "Message channel closed after {} calls ({} errors)",
        summary.calls, summary.errors
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{blocks, MockBackend};
    use std::io::Cursor;

    fn run(input: &str) -> (Vec<Value>, ServeSummary) {
        let inventory = StorageInventory::new(
            MockBackend::new().with_root("/storage/emulated/0", Some(blocks(1000, 4096))),
        );
        let mut out = Vec::new();
        let summary = serve(&inventory, Cursor::new(input), &mut out).unwrap();
        let replies = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (replies, summary)
    }

    #[test]
    fn test_replies_echo_ids() {
        let (replies, summary) = run(concat!(
            r#"{"id": 1, "method": "getPlatformVersion"}"#,
            "\n",
            r#"{"id": "two", "method": "getExtStorageData"}"#,
            "\n",
        ));

        assert_eq!(summary, ServeSummary { calls: 2, errors: 0 });
        assert_eq!(replies[0], json!({"id": 1, "result": "Android 13"}));
        assert_eq!(
            replies[1],
            json!({"id": "two", "result": [{
                "rootPath": "",
                "path": "/storage/emulated/0",
                "availableBytes": 4_096_000u64,
            }]})
        );
    }

    #[test]
    fn test_unknown_method_reply() {
        let (replies, summary) = run(r#"{"id": 7, "method": "openPicker"}"#);
        assert_eq!(summary.errors, 1);
        assert_eq!(replies[0]["id"], 7);
        assert_eq!(replies[0]["error"]["code"], "notImplemented");
        assert!(replies[0].get("result").is_none());
    }

    #[test]
    fn test_malformed_line_does_not_stop_loop() {
        let (replies, summary) = run("not json\n\n{\"method\":\"isExternalStorageManager\"}\n");
        assert_eq!(summary, ServeSummary { calls: 2, errors: 1 });
        assert_eq!(replies[0]["error"]["code"], BAD_REQUEST);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[1], json!({"id": null, "result": true}));
    }

    #[test]
    fn test_call_without_method_keeps_its_id() {
        let (replies, summary) = run(concat!(
            r#"{"id": 42, "params": {}}"#,
            "\n",
            r#"{"id": "x", "method": 5}"#,
            "\n",
            "[1, 2]\n",
        ));
        assert_eq!(summary, ServeSummary { calls: 3, errors: 3 });
        assert_eq!(replies[0]["id"], 42);
        assert_eq!(replies[0]["error"]["code"], BAD_REQUEST);
        assert_eq!(replies[1]["id"], "x");
        assert_eq!(replies[1]["error"]["code"], BAD_REQUEST);
        assert_eq!(replies[2]["id"], Value::Null);
    }

    #[test]
    fn test_empty_input() {
        let (replies, summary) = run("");
        assert!(replies.is_empty());
        assert_eq!(summary, ServeSummary::default());
    }
}
