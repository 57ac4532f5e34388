use std::env;
use std::path::PathBuf;

use crate::cli::ReportFormat;
use crate::dump::{DumpConfig, FailurePolicy};
use crate::filter::{DEFAULT_PREFIXES, PathFilter};

pub const LOG_ENV: &str = "CLASS_DUMPER_LOG";
pub const DEFAULT_OUTPUT: &str = "class-dump.txt";
const DEFAULT_LOG_FILTER: &str = "info";

/// Raw `dump` arguments as they come off the command line.
#[derive(Debug, Clone, Default)]
pub struct DumpArgs {
    pub root: PathBuf,
    pub output: Option<PathBuf>,
    pub prefixes: Vec<String>,
    pub all: bool,
    pub format: ReportFormat,
    pub keep_going: bool,
    pub parallel: bool,
}

pub fn resolve_dump_config(args: DumpArgs) -> DumpConfig {
    DumpConfig {
        output: resolve_output_path(args.output),
        filter: resolve_filter(&args.prefixes, args.all),
        format: args.format,
        policy: if args.keep_going {
            FailurePolicy::SkipAndContinue
        } else {
            FailurePolicy::FailFast
        },
        parallel: args.parallel,
        root: args.root,
    }
}

pub fn resolve_output_path(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
}

pub fn resolve_filter(prefixes: &[String], all: bool) -> PathFilter {
    if all {
        return PathFilter::default();
    }
    if prefixes.is_empty() {
        return PathFilter::new(DEFAULT_PREFIXES.iter().copied());
    }
    PathFilter::new(prefixes)
}

/// `--log` wins over the environment; both fall back to `info`.
pub fn resolve_log_filter(cli_value: Option<&str>) -> String {
    if let Some(v) = cli_value.filter(|v| !v.trim().is_empty()) {
        return v.to_string();
    }
    match env::var(LOG_ENV) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_LOG_FILTER.to_string(),
    }
}
