//! Command line definition

use clap::{Args, Parser, Subcommand};
use gl_board_filters::{FilterKind, FilterSelection};
use gl_client::CacheMode;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "gl-board", version, about = "GitLab issue boards from the command line")]
pub struct Cli {
    /// Skip cached responses; fresh responses are still cached
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Neither read nor write the response cache
    #[arg(long, global = true, conflicts_with = "refresh")]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn cache_mode(&self) -> CacheMode {
        if self.no_cache {
            CacheMode::None
        } else if self.refresh {
            CacheMode::WriteOnly
        } else {
            CacheMode::ReadWrite
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or change the GitLab connection
    Settings(SettingsCommand),

    /// Projects you are a member of
    Projects,

    /// Issue boards of a project
    Boards { project: String },

    /// Columns of a board
    Lists { project: String, board: u64 },

    /// Open issues of a project
    Issues(IssuesArgs),

    /// Update an issue from a JSON body, e.g. '{"add_labels": "doing"}'
    UpdateIssue {
        project: String,
        iid: u64,
        data: String,
    },

    /// Issue counts and filter shortcuts of a project
    Stats(IssuesArgs),

    /// Work with filter parameters of a board URL
    Filter(FilterCommand),

    /// Show or change the side panel state
    Ui(UiCommand),

    /// Answer JSON requests on stdin, one per line
    Serve,

    /// Manage the response cache
    Cache(CacheCommand),
}

impl Command {
    pub fn changes_ui_state(&self) -> bool {
        matches!(
            self,
            Command::Ui(UiCommand {
                command: UiSubcommand::Toggle { .. }
                    | UiSubcommand::Collapse { .. }
                    | UiSubcommand::Expand { .. }
            })
        )
    }
}

#[derive(Args, Debug)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsSubcommand {
    Show,
    Set {
        /// Base URL of the GitLab instance
        url: String,

        /// Personal access token
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct IssuesArgs {
    pub project: String,

    /// Board URL whose filter parameters select the issues
    #[arg(long)]
    pub url: Option<Url>,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[arg(long)]
    pub search: Option<String>,
}

/// Filter selections given as flags
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Username, `@username` or `None`
    #[arg(long)]
    pub assignee: Option<String>,

    /// Username, `@username` or `None`
    #[arg(long)]
    pub author: Option<String>,

    /// Milestone title or `None`
    #[arg(long)]
    pub milestone: Option<String>,

    /// Label name; repeat for several labels
    #[arg(long = "label")]
    pub labels: Vec<String>,
}

impl FilterArgs {
    pub fn selections(&self) -> Vec<FilterSelection> {
        let singles = [
            (FilterKind::Assignee, &self.assignee),
            (FilterKind::Author, &self.author),
            (FilterKind::Milestone, &self.milestone),
        ];

        let mut selections: Vec<FilterSelection> = singles
            .into_iter()
            .filter_map(|(kind, raw)| raw.as_deref().map(|raw| FilterSelection::new(kind, raw)))
            .collect();
        selections.extend(
            self.labels
                .iter()
                .map(|label| FilterSelection::new(FilterKind::Label, label)),
        );
        selections
    }
}

#[derive(Args, Debug)]
pub struct FilterCommand {
    #[command(subcommand)]
    pub command: FilterSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FilterSubcommand {
    /// Replace the filters of a URL
    Encode {
        url: Url,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Print the filters of a URL
    Decode { url: Url },

    /// Remove all filters from a URL
    Reset { url: Url },

    /// Click a filter shortcut on a URL
    Toggle {
        url: Url,
        kind: FilterKind,
        value: String,
    },
}

#[derive(Args, Debug)]
pub struct UiCommand {
    #[command(subcommand)]
    pub command: UiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UiSubcommand {
    Show,
    Toggle { group: FilterKind },
    Collapse { group: FilterKind },
    Expand { group: FilterKind },
}

#[derive(Args, Debug)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    Clear,
    Stats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cache_mode_flags() {
        let cli = Cli::try_parse_from(["gl-board", "projects"]).unwrap();
        assert_eq!(cli.cache_mode(), CacheMode::ReadWrite);

        let cli = Cli::try_parse_from(["gl-board", "projects", "--refresh"]).unwrap();
        assert_eq!(cli.cache_mode(), CacheMode::WriteOnly);

        let cli = Cli::try_parse_from(["gl-board", "--no-cache", "projects"]).unwrap();
        assert_eq!(cli.cache_mode(), CacheMode::None);

        assert!(Cli::try_parse_from(["gl-board", "--no-cache", "--refresh", "projects"]).is_err());
    }

    #[test]
    fn test_filter_flags_to_selections() {
        let cli = Cli::try_parse_from([
            "gl-board",
            "issues",
            "team/board",
            "--assignee",
            "@alice",
            "--milestone",
            "None",
            "--label",
            "bug",
            "--label",
            "ui",
        ])
        .unwrap();

        let Command::Issues(args) = cli.command else {
            panic!("expected issues command");
        };
        assert_eq!(args.project, "team/board");
        assert_eq!(
            args.filters.selections(),
            vec![
                FilterSelection::new(FilterKind::Assignee, "alice"),
                FilterSelection::new(FilterKind::Milestone, "None"),
                FilterSelection::new(FilterKind::Label, "bug"),
                FilterSelection::new(FilterKind::Label, "ui"),
            ]
        );
    }

    #[test]
    fn test_filter_toggle_parses_kind() {
        let cli = Cli::try_parse_from([
            "gl-board",
            "filter",
            "toggle",
            "https://gitlab.example.com/g/p/-/boards/1",
            "milestone",
            "v1",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Filter(FilterCommand {
                command: FilterSubcommand::Toggle {
                    kind: FilterKind::Milestone,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_changes_ui_state() {
        let cli = Cli::try_parse_from(["gl-board", "ui", "toggle", "author"]).unwrap();
        assert!(cli.command.changes_ui_state());

        let cli = Cli::try_parse_from(["gl-board", "ui", "show"]).unwrap();
        assert!(!cli.command.changes_ui_state());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(Cli::try_parse_from(["gl-board", "filter", "decode", "not a url"]).is_err());
    }
}
