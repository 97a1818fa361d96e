use crate::config::IndexOptions;
use crate::model::ArtifactKind;
use crate::query::LaravelIndex;
use crate::worker::RefreshWorker;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct RpcRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Serialize)]
struct RpcResponse {
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Serialize)]
struct RpcError {
    message: String,
}

#[derive(Deserialize)]
struct KindParams {
    kind: String,
}

#[derive(Deserialize)]
struct KeyParams {
    kind: String,
    #[serde(alias = "name")]
    key: String,
}

#[derive(Deserialize)]
struct RouteParams {
    #[serde(alias = "name", alias = "path")]
    key: String,
}

#[derive(Deserialize)]
struct PositionParams {
    #[serde(alias = "path")]
    file: String,
    #[serde(alias = "byte_offset")]
    offset: usize,
}

#[derive(Deserialize, Default)]
struct ReindexParams {
    /// Return immediately instead of waiting for the refresh to finish.
    #[serde(default)]
    background: bool,
}

const METHOD_LIST: &[&str] = &[
    "help",
    "reindex",
    "stats",
    "list",
    "declaration",
    "usages",
    "lookup",
    "route_definition",
    "classify",
    "complete",
];

struct MethodDoc {
    name: &'static str,
    summary: &'static str,
    key_params: &'static [&'static str],
}

const METHOD_DOCS: &[MethodDoc] = &[
    MethodDoc {
        name: "help",
        summary: "Show RPC help and the method table.",
        key_params: &[],
    },
    MethodDoc {
        name: "reindex",
        summary: "Rescan routes, translations, views, assets and usages.",
        key_params: &["background (bool)"],
    },
    MethodDoc {
        name: "stats",
        summary: "Counts from the last completed refresh.",
        key_params: &[],
    },
    MethodDoc {
        name: "list",
        summary: "Every key of one artifact kind, sorted.",
        key_params: &["kind (route|translation|view|asset)"],
    },
    MethodDoc {
        name: "declaration",
        summary: "Declaration sites of a key.",
        key_params: &["kind", "key"],
    },
    MethodDoc {
        name: "usages",
        summary: "Usage sites of a key.",
        key_params: &["kind", "key"],
    },
    MethodDoc {
        name: "lookup",
        summary: "The indexed record for a key, or null.",
        key_params: &["kind", "key"],
    },
    MethodDoc {
        name: "route_definition",
        summary: "Full route definition: action parts, middleware sources, constraints.",
        key_params: &["key (route name or path)"],
    },
    MethodDoc {
        name: "classify",
        summary: "Artifact kind, key, declarations and usage count of the literal at a position.",
        key_params: &["file", "offset"],
    },
    MethodDoc {
        name: "complete",
        summary: "Completion candidates for the literal at a position.",
        key_params: &["file", "offset"],
    },
];

fn method_help() -> Value {
    let methods: Vec<Value> = METHOD_DOCS
        .iter()
        .map(|doc| {
            json!({
                "name": doc.name,
                "summary": doc.summary,
                "key_params": doc.key_params,
            })
        })
        .collect();
    json!({
        "summary": "laridx indexes Laravel routes, translations, views and assets and serves JSONL RPC over stdin/stdout.",
        "kinds": ArtifactKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
        "methods": methods,
        "names": METHOD_LIST,
        "examples": [
            {"method": "list", "params": {"kind": "route"}},
            {"method": "usages", "params": {"kind": "route", "key": "users.index"}},
            {"method": "classify", "params": {"file": "resources/views/welcome.blade.php", "offset": 120}},
        ],
    })
}

pub fn serve(repo_root: &Path, options: IndexOptions) -> Result<()> {
    let index = Arc::new(LaravelIndex::open(repo_root, options)?);
    let worker = RefreshWorker::start(Arc::clone(&index));
    worker.request();
    let app = App {
        index,
        worker: Some(worker),
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(value) => value,
            Err(err) => {
                warn!("stdin error: {err}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => app.handle_request(request),
            Err(err) => error_response(Value::Null, &format!("invalid request: {err}")),
        };

        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }

    if let Some(worker) = app.worker {
        worker.stop();
    }
    Ok(())
}

pub fn call(
    repo_root: &Path,
    options: IndexOptions,
    method: String,
    params_raw: &str,
    id_raw: &str,
) -> Result<String> {
    let params: Value = serde_json::from_str(params_raw).with_context(|| "parse params JSON")?;
    let id = parse_value(id_raw);
    let app = App {
        index: Arc::new(LaravelIndex::open(repo_root, options)?),
        worker: None,
    };
    let request = RpcRequest { id, method, params };
    let response = app.handle_request(request);
    Ok(serde_json::to_string(&response)?)
}

struct App {
    index: Arc<LaravelIndex>,
    /// Present in server mode; one-shot calls refresh inline.
    worker: Option<RefreshWorker>,
}

impl App {
    fn handle_request(&self, req: RpcRequest) -> RpcResponse {
        let id = req.id.clone();
        let result = handle_method(&self.index, self.worker.as_ref(), &req.method, req.params);

        match result {
            Ok(value) => RpcResponse {
                id,
                result: Some(value),
                error: None,
            },
            Err(err) => error_response(id, &format!("{err:#}")),
        }
    }
}

fn parse_kind(raw: &str) -> Result<ArtifactKind> {
    ArtifactKind::parse(raw).ok_or_else(|| {
        anyhow!(
            "unknown kind {raw:?} (expected one of: {})",
            ArtifactKind::ALL
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn params<T: for<'de> Deserialize<'de>>(method: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).with_context(|| format!("invalid params for {method}"))
}

pub fn handle_method(
    index: &LaravelIndex,
    worker: Option<&RefreshWorker>,
    method: &str,
    raw: Value,
) -> Result<Value> {
    let start = Instant::now();
    let value = match method {
        "help" => method_help(),
        "reindex" => {
            let options: ReindexParams = if raw.is_null() {
                ReindexParams::default()
            } else {
                params(method, raw)?
            };
            match worker {
                Some(worker) if options.background => {
                    worker.request();
                    json!({ "queued": true })
                }
                Some(worker) => json!(worker.refresh()?),
                None => json!(index.refresh()?),
            }
        }
        "stats" => {
            index.ensure_indexed();
            json!(index.stats())
        }
        "list" => {
            let p: KindParams = params(method, raw)?;
            json!(index.query(parse_kind(&p.kind)?).all())
        }
        "declaration" => {
            let p: KeyParams = params(method, raw)?;
            json!(index.query(parse_kind(&p.kind)?).declarations(&p.key))
        }
        "usages" => {
            let p: KeyParams = params(method, raw)?;
            json!(index.query(parse_kind(&p.kind)?).usages(&p.key))
        }
        "lookup" => {
            let p: KeyParams = params(method, raw)?;
            match parse_kind(&p.kind)? {
                ArtifactKind::Route => json!(index.route(&p.key).as_deref()),
                ArtifactKind::Translation => match index.translation(&p.key) {
                    Some(record) => json!({
                        "record": record,
                        "locales": index.translations().declarations_of(&p.key),
                    }),
                    None => Value::Null,
                },
                ArtifactKind::View => json!(index.view(&p.key)),
                ArtifactKind::Asset => json!(index.asset(&p.key)),
            }
        }
        "route_definition" => {
            let p: RouteParams = params(method, raw)?;
            json!(index.route_definition(&p.key))
        }
        "classify" => {
            let p: PositionParams = params(method, raw)?;
            json!(index.classify(&p.file, p.offset)?)
        }
        "complete" => {
            let p: PositionParams = params(method, raw)?;
            json!(index.complete(&p.file, p.offset)?)
        }
        other => {
            return Err(anyhow!(
                "unknown method {other:?} (try \"help\"; methods: {})",
                METHOD_LIST.join(", ")
            ));
        }
    };
    debug!("{method} answered in {}ms", start.elapsed().as_millis());
    Ok(value)
}

fn error_response(id: Value, message: &str) -> RpcResponse {
    RpcResponse {
        id,
        result: None,
        error: Some(RpcError {
            message: message.to_string(),
        }),
    }
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySourceTree;

    fn app() -> App {
        let tree = MemorySourceTree::new()
            .with_file(
                "routes/web.php",
                "<?php\nRoute::get('/users', 'UserController@index')->name('users.index');\n",
            )
            .with_file("resources/views/users.blade.php", "<a href=\"{{ route('users.index') }}\">u</a>");
        App {
            index: Arc::new(LaravelIndex::new(Arc::new(tree), IndexOptions::default()).unwrap()),
            worker: None,
        }
    }

    fn request(app: &App, line: &str) -> Value {
        let request: RpcRequest = serde_json::from_str(line).unwrap();
        serde_json::to_value(app.handle_request(request)).unwrap()
    }

    #[test]
    fn list_and_usages() {
        let app = app();
        let listed = request(&app, r#"{"id":1,"method":"list","params":{"kind":"route"}}"#);
        assert_eq!(listed["id"], json!(1));
        assert_eq!(listed["result"], json!(["users.index", "/users"]));

        let usages = request(
            &app,
            r#"{"id":2,"method":"usages","params":{"kind":"route","key":"users.index"}}"#,
        );
        let usages = usages["result"].as_array().unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0]["usage_kind"], json!("NAME_REFERENCE"));
    }

    #[test]
    fn route_definition_splits_the_action() {
        let app = app();
        let response = request(&app, r#"{"id":"a","method":"route_definition","params":{"key":"/users"}}"#);
        assert_eq!(response["result"]["action"]["controller"], json!("UserController"));
        assert_eq!(response["result"]["action"]["method"], json!("index"));
    }

    #[test]
    fn errors_carry_the_request_id() {
        let app = app();
        let response = request(&app, r#"{"id":7,"method":"list","params":{"kind":"widget"}}"#);
        assert_eq!(response["id"], json!(7));
        assert!(response.get("result").is_none());
        assert!(response["error"]["message"].as_str().unwrap().contains("unknown kind"));

        let response = request(&app, r#"{"id":8,"method":"frobnicate"}"#);
        assert!(response["error"]["message"].as_str().unwrap().contains("unknown method"));
    }

    #[test]
    fn id_parsing_falls_back_to_strings() {
        assert_eq!(parse_value("3"), json!(3));
        assert_eq!(parse_value("abc"), json!("abc"));
    }
}
