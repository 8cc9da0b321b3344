//! Command execution
//!
//! Every command produces a JSON value that `main` prints on stdout.

use crate::cli::{
    CacheSubcommand, Command, FilterSubcommand, IssuesArgs, SettingsSubcommand, UiSubcommand,
};
use crate::context::{AppContext, Connect};
use crate::host;
use anyhow::{Context, Result};
use gl_board_config::{KeyValueStore, Settings, SettingsForm, UiState};
use gl_board_filters::{
    build_groups, codec, reset_filters, toggle_filter, BoardPage, FilterGroup, FilterKind,
    FilterSelection, FilterState, MemoryPage,
};
use gl_client::{CacheMode, GitLabClient, IssueQuery, IssueStatistics, IssueUpdate};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::BufReader;
use url::Url;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsView {
    gitlab_url: String,
    /// Only the first characters are shown
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    origin_pattern: String,
}

impl From<&Settings> for SettingsView {
    fn from(settings: &Settings) -> Self {
        Self {
            gitlab_url: settings.gitlab_url().to_string(),
            access_token: settings.access_token().map(mask_token),
            origin_pattern: settings.origin_pattern(),
        }
    }
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    format!("{}****", visible)
}

#[derive(Debug, Serialize)]
struct GroupView<'a> {
    id: &'static str,
    collapsed: bool,
    active: Vec<&'a str>,
    #[serde(flatten)]
    group: &'a FilterGroup,
}

#[derive(Debug, Serialize)]
struct StatsView<'a> {
    current_user: Option<String>,
    filters: &'a FilterState,
    statistics: IssueStatistics,
    groups: Vec<GroupView<'a>>,
}

/// Run a command; `None` means the command wrote its own output
pub async fn run<S, N>(
    ctx: &mut AppContext<S, N>,
    ui: &mut UiState,
    command: Command,
    mode: CacheMode,
) -> Result<Option<Value>>
where
    S: KeyValueStore,
    N: Connect,
{
    let value = match command {
        Command::Settings(settings) => match settings.command {
            SettingsSubcommand::Show => match ctx.settings()? {
                Some(settings) => serde_json::to_value(SettingsView::from(&settings))?,
                None => Value::Null,
            },
            SettingsSubcommand::Set { url, token } => {
                let settings = ctx.save_settings(&SettingsForm::new(url, token))?;
                serde_json::to_value(SettingsView::from(&settings))?
            }
        },
        Command::Projects => {
            let client = ctx.client(mode)?;
            serde_json::to_value(client.fetch_projects().await?)?
        }
        Command::Boards { project } => {
            let client = ctx.client(mode)?;
            serde_json::to_value(client.fetch_boards(&project).await?)?
        }
        Command::Lists { project, board } => {
            let client = ctx.client(mode)?;
            serde_json::to_value(client.fetch_board_lists(&project, board).await?)?
        }
        Command::Issues(args) => {
            let (_, query) = issue_query(&args);
            let client = ctx.client(mode)?;
            serde_json::to_value(client.fetch_issues(&args.project, &query).await?)?
        }
        Command::UpdateIssue { project, iid, data } => {
            let update: IssueUpdate =
                serde_json::from_str(&data).context("Issue update is not valid JSON")?;
            let client = ctx.client(mode)?;
            serde_json::to_value(client.update_issue(&project, iid, &update).await?)?
        }
        Command::Stats(args) => stats(ctx, ui, &args, mode).await?,
        Command::Filter(filter) => run_filter(filter.command),
        Command::Ui(command) => run_ui(ui, command.command),
        Command::Serve => {
            let stdin = BufReader::new(tokio::io::stdin());
            host::serve(ctx, stdin, tokio::io::stdout()).await?;
            return Ok(None);
        }
        Command::Cache(cache) => match cache.command {
            CacheSubcommand::Clear => json!({ "removed": ctx.clear_cache() }),
            CacheSubcommand::Stats => serde_json::to_value(ctx.cache_stats())?,
        },
    };

    Ok(Some(value))
}

/// Filters from the board URL, overridden by explicit flags
fn issue_query(args: &IssuesArgs) -> (FilterState, IssueQuery) {
    let mut state = args.url.as_ref().map(codec::decode).unwrap_or_default();
    for selection in args.filters.selections() {
        state.select(selection);
    }

    let mut query = state.to_issue_query();
    query.search = args.search.clone();
    (state, query)
}

async fn stats<S, N>(
    ctx: &AppContext<S, N>,
    ui: &UiState,
    args: &IssuesArgs,
    mode: CacheMode,
) -> Result<Value>
where
    S: KeyValueStore,
    N: Connect,
{
    let (state, query) = issue_query(args);
    let client = ctx.client(mode)?;

    // Shortcut counts cover every open issue, not just the filtered ones
    let issues = client.fetch_issues(&args.project, &IssueQuery::opened()).await?;
    let current_user = match client.fetch_current_user().await {
        Ok(user) => Some(user.username),
        Err(e) => {
            warn!("Could not determine current user: {}", e);
            None
        }
    };

    let filtered = if query == IssueQuery::opened() {
        issues.clone()
    } else {
        client.fetch_issues(&args.project, &query).await?
    };

    let groups = build_groups(&issues, current_user.as_deref());
    let view = StatsView {
        current_user,
        filters: &state,
        statistics: IssueStatistics::from_issues(&filtered),
        groups: groups
            .iter()
            .map(|group| GroupView {
                id: group.id(),
                collapsed: ui.is_collapsed(group.id()),
                active: group
                    .active_items(&state)
                    .map(|item| item.value.as_str())
                    .collect(),
                group,
            })
            .collect(),
    };

    Ok(serde_json::to_value(view)?)
}

fn run_filter(command: FilterSubcommand) -> Value {
    match command {
        FilterSubcommand::Encode { url, filters } => {
            let state = FilterState::from_selections(filters.selections());
            url_view(&codec::encode(&url, &state))
        }
        FilterSubcommand::Decode { url } => {
            let filters = codec::decode(&url);
            json!({
                "url": url.as_str(),
                "selections": filters.selections(),
                "filters": filters,
            })
        }
        FilterSubcommand::Reset { url } => {
            let mut page = MemoryPage::new(url);
            reset_filters(&mut page);
            url_view(&page.current_url())
        }
        FilterSubcommand::Toggle { url, kind, value } => {
            let mut page = MemoryPage::new(url);
            toggle_filter(&mut page, FilterSelection::new(kind, &value));
            url_view(&page.current_url())
        }
    }
}

fn url_view(url: &Url) -> Value {
    json!({
        "url": url.as_str(),
        "filters": codec::decode(url),
    })
}

fn run_ui(ui: &mut UiState, command: UiSubcommand) -> Value {
    match command {
        UiSubcommand::Show => {}
        UiSubcommand::Toggle { group } => {
            ui.toggle(group.as_str());
        }
        UiSubcommand::Collapse { group } => ui.set_collapsed(group.as_str(), true),
        UiSubcommand::Expand { group } => ui.set_collapsed(group.as_str(), false),
    }

    let groups: serde_json::Map<String, Value> = FilterKind::ALL
        .iter()
        .map(|kind| {
            (
                kind.as_str().to_string(),
                json!({ "collapsed": ui.is_collapsed(kind.as_str()) }),
            )
        })
        .collect();
    Value::Object(groups)
}
