//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use idwr_core::{ParseOptions, SentinelLayout};
use idwr_model::{DatasetKind, SourceFilter};
use idwr_report::DataQuery;

#[derive(Parser)]
#[command(
    name = "idwr",
    version,
    about = "Parse and merge Japan IDWR infectious-disease surveillance bulletins",
    long_about = "Parse IDWR bulletins into stage tables and merge them into one unified table.\n\n\
                  Historical confirmed cases come from yearly Excel workbooks; modern all-case\n\
                  and sentinel reports come from weekly CSV bulletins."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
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

    /// Directory holding the stage tables (overrides config and IDWR_DATA_DIR).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse raw bulletins into a stage table.
    Parse(ParseArgs),

    /// Merge the stage tables into the unified table.
    Build(BuildArgs),

    /// Show the reporting span of every disease.
    Coverage(DatasetArgs),

    /// Print filtered rows of a dataset.
    Query(QueryArgs),

    /// List distinct disease names.
    Diseases(DiseasesArgs),

    /// List distinct prefectures.
    Prefectures(DatasetArgs),

    /// Run the unified-table checks against a dataset.
    Validate(DatasetArgs),

    /// Print the resolved configuration.
    Config,
}

#[derive(Parser)]
pub struct ParseArgs {
    /// Dataset to parse.
    #[arg(value_enum)]
    pub kind: StageArg,

    /// Workbook directory, CSV file or CSV directory.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Year to use instead of the one inferred from file names or titles.
    #[arg(long)]
    pub year: Option<i32>,

    /// Only parse these weeks (CSV inputs, repeatable).
    #[arg(long = "week", value_name = "WEEK")]
    pub weeks: Vec<i32>,

    /// Force the sentinel layout instead of detecting it per file.
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Output parquet path (default: the catalog path for the dataset).
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ParseArgs {
    pub fn options(&self) -> ParseOptions {
        let mut options = ParseOptions::new();
        if let Some(year) = self.year {
            options = options.with_year(year);
        }
        if !self.weeks.is_empty() {
            options = options.with_weeks(self.weeks.iter().copied());
        }
        if let Some(layout) = self.layout {
            options = options.with_sentinel_layout(layout.into());
        }
        options
    }
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Build and validate without writing unified.parquet.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct DatasetArgs {
    /// Catalog name or alias of the dataset to read.
    #[arg(long, default_value = "unified")]
    pub dataset: String,
}

#[derive(Parser)]
pub struct DiseasesArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    #[arg(long, value_enum, default_value = "all")]
    pub source: SourceArg,
}

#[derive(Parser)]
pub struct QueryArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Case-insensitive disease substring (repeatable).
    #[arg(long = "disease", value_name = "NAME")]
    pub diseases: Vec<String>,

    /// Exact prefecture name (repeatable).
    #[arg(long = "prefecture", value_name = "NAME")]
    pub prefectures: Vec<String>,

    #[arg(long = "year-from")]
    pub year_from: Option<i32>,

    #[arg(long = "year-to")]
    pub year_to: Option<i32>,

    #[arg(long = "week-from")]
    pub week_from: Option<i32>,

    #[arg(long = "week-to")]
    pub week_to: Option<i32>,

    #[arg(long, value_enum, default_value = "all")]
    pub source: SourceArg,

    /// Maximum number of rows to print.
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

impl QueryArgs {
    pub fn query(&self) -> DataQuery {
        let bounds = |from: Option<i32>, to: Option<i32>| match (from, to) {
            (None, None) => None,
            (from, to) => Some((from.unwrap_or(i32::MIN), to.unwrap_or(i32::MAX))),
        };
        DataQuery {
            diseases: self.diseases.clone(),
            prefectures: self.prefectures.clone(),
            years: bounds(self.year_from, self.year_to),
            weeks: bounds(self.week_from, self.week_to),
            source: self.source.into(),
            limit: Some(self.limit),
        }
    }
}

/// Stage tables produced by a parser.
#[derive(Clone, Copy, ValueEnum)]
pub enum StageArg {
    Sex,
    Place,
    Bullet,
    Sentinel,
}

impl From<StageArg> for DatasetKind {
    fn from(value: StageArg) -> Self {
        match value {
            StageArg::Sex => DatasetKind::Sex,
            StageArg::Place => DatasetKind::Place,
            StageArg::Bullet => DatasetKind::Bullet,
            StageArg::Sentinel => DatasetKind::Sentinel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LayoutArg {
    #[value(name = "ja")]
    Japanese,
    #[value(name = "en")]
    English,
}

impl From<LayoutArg> for SentinelLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Japanese => SentinelLayout::Japanese,
            LayoutArg::English => SentinelLayout::English,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Confirmed,
    Sentinel,
    All,
}

impl From<SourceArg> for SourceFilter {
    fn from(value: SourceArg) -> Self {
        match value {
            SourceArg::Confirmed => SourceFilter::Confirmed,
            SourceArg::Sentinel => SourceFilter::Sentinel,
            SourceArg::All => SourceFilter::All,
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
