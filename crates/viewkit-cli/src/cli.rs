//! CLI argument definitions for `viewkit`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use viewkit_model::{Query, QueryKind};

#[derive(Parser)]
#[command(
    name = "viewkit",
    version,
    about = "Reconcile inconsistent API payloads into paged, searchable list views",
    long_about = "Reconcile inconsistent API payloads into paged, searchable list views.\n\n\
                  Reads saved JSON responses and shows the rows, trees and joins the\n\
                  engine derives from them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// View configuration file (TOML). Built-in defaults when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show one page of a saved list response.
    Page(PageArgs),

    /// Show a saved menu or comment list as a tree.
    Tree(TreeArgs),

    /// Attach attributes from a secondary collection to a primary one.
    Join(JoinArgs),

    /// Print the query parameters sent upstream for a search.
    Params(ParamsArgs),

    /// Print the effective view configuration as TOML.
    Config,
}

/// Search flags shared by `page` and `params`.
#[derive(Args, Clone)]
pub struct QueryArgs {
    /// Which fields the keyword is compared against.
    #[arg(long = "kind", value_enum, default_value = "all")]
    pub kind: QueryKindArg,

    /// Keyword for author/content/all searches.
    #[arg(long = "keyword", short = 'q', value_name = "TEXT")]
    pub keyword: Option<String>,

    /// First day of a time search (inclusive).
    #[arg(long = "from", value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last day of a time search (inclusive through end of day).
    #[arg(long = "to", value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,
}

impl QueryArgs {
    pub fn to_query(&self) -> Query {
        let kind = QueryKind::from(self.kind);
        if kind == QueryKind::Time || self.from.is_some() || self.to.is_some() {
            Query::time_range(self.from, self.to)
        } else {
            Query::keyword(kind, self.keyword.clone().unwrap_or_default())
        }
    }
}

#[derive(Parser)]
pub struct PageArgs {
    /// Saved API response (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Resource profile used for keys and search fields.
    #[arg(long = "resource", short = 'r', default_value = "posts")]
    pub resource: String,

    /// Page to show (1-based).
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    /// Rows per page (overrides the configuration).
    #[arg(long = "size", value_name = "N")]
    pub size: Option<usize>,

    /// Filter and page in memory instead of trusting server metadata.
    #[arg(long = "client")]
    pub client: bool,

    /// Fields to show as columns (comma separated).
    #[arg(long = "columns", value_delimiter = ',', value_name = "FIELDS")]
    pub columns: Vec<String>,

    /// Signed-in username, for the edit column.
    #[arg(long = "user", value_name = "NAME")]
    pub user: Option<String>,

    /// Treat `--user` as an administrator.
    #[arg(long = "admin", requires = "user")]
    pub admin: bool,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Parser)]
pub struct TreeArgs {
    /// Saved menu or comment list (JSON).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field shown for each node (overrides the configuration).
    #[arg(long = "label", value_name = "FIELD")]
    pub label: Option<String>,

    /// Click these node ids in order and show which menus end up open.
    #[arg(long = "click", value_name = "ID")]
    pub clicks: Vec<String>,
}

#[derive(Parser)]
pub struct JoinArgs {
    /// Primary collection (JSON).
    #[arg(value_name = "PRIMARY")]
    pub primary: PathBuf,

    /// Secondary collection (JSON).
    #[arg(value_name = "SECONDARY")]
    pub secondary: PathBuf,

    /// Collapse secondary rows sharing this field before joining.
    #[arg(long = "group-by", value_name = "FIELD", requires = "value")]
    pub group_by: Option<String>,

    /// Field collected into an array when grouping.
    #[arg(long = "value", value_name = "FIELD", requires = "group_by")]
    pub value: Option<String>,

    /// Field the grouped values are written to (default: `<value>s`).
    #[arg(long = "into", value_name = "FIELD")]
    pub into: Option<String>,
}

#[derive(Parser)]
pub struct ParamsArgs {
    /// Page to request (1-based).
    #[arg(long = "page", default_value_t = 1)]
    pub page: usize,

    /// Rows per page (overrides the configuration).
    #[arg(long = "size", value_name = "N")]
    pub size: Option<usize>,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// CLI query kind choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum QueryKindArg {
    Author,
    Content,
    All,
    Time,
}

impl From<QueryKindArg> for QueryKind {
    fn from(arg: QueryKindArg) -> Self {
        match arg {
            QueryKindArg::Author => Self::Author,
            QueryKindArg::Content => Self::Content,
            QueryKindArg::All => Self::All,
            QueryKindArg::Time => Self::Time,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
