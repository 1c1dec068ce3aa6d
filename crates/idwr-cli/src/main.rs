//! IDWR surveillance pipeline CLI.

use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use idwr_cli::commands::{
    ParseRequest, run_build, run_coverage, run_diseases, run_parse, run_prefectures, run_query,
    run_validate,
};
use idwr_cli::config::resolve_config;
use idwr_cli::logging::{LogConfig, LogFormat, init_logging};
use idwr_report::DatasetCatalog;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::{
    print_build_report, print_config, print_coverage, print_frame, print_list, print_parse_report,
    print_validation,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli.data_dir.as_deref());
    let catalog = DatasetCatalog::new(&config.data_dir);
    match &cli.command {
        Command::Parse(args) => {
            let request = ParseRequest {
                kind: args.kind.into(),
                input: args.path.clone(),
                options: args.options(),
                output: args.output.clone(),
            };
            print_parse_report(&run_parse(&catalog, &request)?);
        }
        Command::Build(args) => print_build_report(&run_build(&catalog, args.dry_run)?),
        Command::Coverage(args) => print_coverage(&run_coverage(&catalog, &args.dataset)?),
        Command::Query(args) => {
            print_frame(&run_query(&catalog, &args.dataset.dataset, &args.query())?);
        }
        Command::Diseases(args) => {
            print_list(&run_diseases(&catalog, &args.dataset.dataset, args.source.into())?);
        }
        Command::Prefectures(args) => print_list(&run_prefectures(&catalog, &args.dataset)?),
        Command::Validate(args) => {
            let summary = run_validate(&catalog, &args.dataset)?;
            print_validation(&summary);
            if !summary.passed() {
                bail!("{} failed validation", args.dataset);
            }
        }
        Command::Config => print_config(&config)?,
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
