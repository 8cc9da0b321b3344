//! JSON message host
//!
//! Requests are JSON objects with an `action` field plus the action's
//! payload; each gets a `{"success": bool, "data" | "error"}` response.
//! `serve` reads one request per line and writes one response per line.

use crate::context::{AppContext, Connect};
use anyhow::{bail, Context, Result};
use gl_board_config::{KeyValueStore, SettingsForm};
use gl_board_filters::codec;
use gl_client::{CacheMode, GitLabClient, IssueQuery, IssueUpdate};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use url::Url;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Request {
    GetSettings,
    SaveSettings {
        settings: SettingsForm,
    },
    GetProjects,
    GetBoards {
        #[serde(deserialize_with = "project_id")]
        project_id: String,
    },
    GetBoardLists {
        #[serde(deserialize_with = "project_id")]
        project_id: String,
        board_id: u64,
    },
    GetIssues {
        #[serde(deserialize_with = "project_id")]
        project_id: String,
        /// Explicit query; ignored when `url` is given
        #[serde(default)]
        params: Option<IssueQuery>,
        /// Board URL whose filter parameters select the issues
        #[serde(default)]
        url: Option<String>,
    },
    UpdateIssue {
        #[serde(deserialize_with = "project_id")]
        project_id: String,
        issue_iid: u64,
        data: IssueUpdate,
    },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::GetSettings => "getSettings",
            Request::SaveSettings { .. } => "saveSettings",
            Request::GetProjects => "getProjects",
            Request::GetBoards { .. } => "getBoards",
            Request::GetBoardLists { .. } => "getBoardLists",
            Request::GetIssues { .. } => "getIssues",
            Request::UpdateIssue { .. } => "updateIssue",
        }
    }
}

/// Project ids arrive either as numbers or as `group/project` paths
fn project_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ProjectId {
        Id(u64),
        Path(String),
    }

    Ok(match ProjectId::deserialize(deserializer)? {
        ProjectId::Id(id) => id.to_string(),
        ProjectId::Path(path) => path,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handle one raw request
///
/// Malformed JSON and unknown actions produce an error response.
pub async fn handle_message<S, N>(ctx: &mut AppContext<S, N>, message: &str) -> Response
where
    S: KeyValueStore,
    N: Connect,
{
    let request = serde_json::from_str::<Value>(message)
        .context("request is not valid JSON")
        .and_then(parse_request);

    match request {
        Ok(request) => handle(ctx, request).await,
        Err(e) => {
            warn!("Rejected message: {:#}", e);
            Response::error(format!("{:#}", e))
        }
    }
}

fn parse_request(value: Value) -> Result<Request> {
    let Some(action) = value.get("action").and_then(Value::as_str) else {
        bail!("request has no action");
    };
    let action = action.to_string();
    serde_json::from_value(value).with_context(|| format!("unknown or malformed action '{}'", action))
}

/// Handle a parsed request
pub async fn handle<S, N>(ctx: &mut AppContext<S, N>, request: Request) -> Response
where
    S: KeyValueStore,
    N: Connect,
{
    let action = request.action();
    debug!("Handling {}", action);

    match dispatch(ctx, request).await {
        Ok(data) => Response::ok(data),
        Err(e) => {
            warn!("{} failed: {:#}", action, e);
            Response::error(format!("{:#}", e))
        }
    }
}

async fn dispatch<S, N>(ctx: &mut AppContext<S, N>, request: Request) -> Result<Option<Value>>
where
    S: KeyValueStore,
    N: Connect,
{
    let data = match request {
        Request::GetSettings => serde_json::to_value(ctx.settings()?)?,
        Request::SaveSettings { settings } => {
            ctx.save_settings(&settings)?;
            return Ok(None);
        }
        Request::GetProjects => {
            let client = ctx.client(CacheMode::ReadWrite)?;
            serde_json::to_value(client.fetch_projects().await?)?
        }
        Request::GetBoards { project_id } => {
            let client = ctx.client(CacheMode::ReadWrite)?;
            serde_json::to_value(client.fetch_boards(&project_id).await?)?
        }
        Request::GetBoardLists {
            project_id,
            board_id,
        } => {
            let client = ctx.client(CacheMode::ReadWrite)?;
            serde_json::to_value(client.fetch_board_lists(&project_id, board_id).await?)?
        }
        Request::GetIssues {
            project_id,
            params,
            url,
        } => {
            let query = match url {
                Some(url) => {
                    let url = Url::parse(&url).with_context(|| format!("invalid board URL '{}'", url))?;
                    codec::decode(&url).to_issue_query()
                }
                None => params.unwrap_or_else(IssueQuery::opened),
            };
            let client = ctx.client(CacheMode::ReadWrite)?;
            serde_json::to_value(client.fetch_issues(&project_id, &query).await?)?
        }
        Request::UpdateIssue {
            project_id,
            issue_iid,
            data,
        } => {
            let client = ctx.client(CacheMode::ReadWrite)?;
            let issue = client.update_issue(&project_id, issue_iid, &data).await?;
            ctx.persist_cache();
            serde_json::to_value(issue)?
        }
    };

    Ok(Some(data))
}

/// Answer requests line by line until the input ends
///
/// Blank lines are skipped. The cache is saved when the input is exhausted.
pub async fn serve<S, N, R, W>(ctx: &mut AppContext<S, N>, input: R, mut output: W) -> Result<()>
where
    S: KeyValueStore,
    N: Connect,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Message host started");
    let mut lines = input.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_message(ctx, &line).await;
        let mut encoded = serde_json::to_string(&response)?;
        encoded.push('\n');
        output
            .write_all(encoded.as_bytes())
            .await
            .context("Failed to write response")?;
        output.flush().await?;
        handled += 1;
    }

    ctx.persist_cache();
    info!("Message host stopped after {} requests", handled);
    Ok(())
}
