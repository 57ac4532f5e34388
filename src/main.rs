use anyhow::{Context, Result};
use clap::Parser;
use class_dumper::cli::{Cli, Commands};
use class_dumper::config::{DumpArgs, resolve_dump_config, resolve_log_filter};
use class_dumper::dump::{dump_tree, inspect_file};
use class_dumper::symbol::write_lines;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.log.as_deref());

    match cli.command {
        Commands::Dump {
            root,
            output,
            prefixes,
            all,
            format,
            keep_going,
            parallel,
        } => {
            let config = resolve_dump_config(DumpArgs {
                root,
                output,
                prefixes,
                all,
                format,
                keep_going,
                parallel,
            });
            let summary = dump_tree(&config)
                .with_context(|| format!("dump of {} failed", config.root.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Inspect { file, format } => {
            let lines = inspect_file(&file)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_lines(&mut out, &lines, format)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_dump(args))
}

fn init_logging(cli_filter: Option<&str>) {
    let filter = EnvFilter::try_new(resolve_log_filter(cli_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `class-dumper ROOT ...` is shorthand for `class-dumper dump ROOT ...`.
fn rewrite_args_for_implicit_dump(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["dump", "inspect", "help"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if a == "--log" {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "dump".to_string());
        }
    }

    args
}
