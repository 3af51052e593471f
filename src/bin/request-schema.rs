//! Request Schema CLI
//!
//! Command-line interface for checking endpoint specs and validating requests against them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use request_schema::{
    lint, load_spec, Endpoint, FileStatus, Response, ServiceEvent, ServiceRequest, Severity,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "request-schema")]
#[command(about = "Check endpoint specs and validate requests against them")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint spec files for errors (syntax, unsupported types, malformed constraints)
    Check {
        /// File or directory to check
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },

    /// Validate a request against an endpoint spec
    Validate {
        /// Endpoint spec file
        spec: PathBuf,

        /// Request body file (JSON); an absent body has every attribute missing
        #[arg(long)]
        body: Option<PathBuf>,

        /// Query parameter as name=value (repeatable)
        #[arg(long = "query", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// Path parameter as name=value (repeatable)
        #[arg(long = "path", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        path: Vec<(String, String)>,

        /// Output the response as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            path,
            format,
            strict,
            quiet,
        } => run_check(&path, &format, strict, quiet),

        Commands::Validate {
            spec,
            body,
            query,
            path,
            json,
        } => run_validate(&spec, body.as_deref(), query, path, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{}\"", s))?;
    if name.is_empty() {
        return Err(format!("empty parameter name in \"{}\"", s));
    }
    Ok((name.to_string(), value.to_string()))
}

fn run_validate(
    spec_path: &Path,
    body_path: Option<&Path>,
    query: Vec<(String, String)>,
    path: Vec<(String, String)>,
    json_output: bool,
) -> Result<(), u8> {
    let spec = load_spec(spec_path).map_err(|e| {
        report_error(json_output, &format!("loading spec: {}", e));
        e.exit_code() as u8
    })?;

    let body = match body_path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| {
            report_error(json_output, &format!("reading {}: {}", p.display(), e));
            3u8
        })?,
        None => String::new(),
    };

    let mut request = ServiceRequest::from_json_body(&body);
    request.query = query.into_iter().collect::<BTreeMap<_, _>>();
    request.path = path.into_iter().collect::<BTreeMap<_, _>>();

    // Echo the validated event back as the response body.
    let endpoint = Endpoint::new(spec, |event: &ServiceEvent| {
        let echo = serde_json::json!({
            "body": event.body,
            "query": event.query,
            "path": event.path,
        });
        Ok(serde_json::to_string(&echo)?)
    });

    let response = endpoint.call(&request);
    print_response(&response, json_output);

    match response.status_code {
        200 => Ok(()),
        400 | 409 => Err(1),
        _ => Err(2),
    }
}

fn print_response(response: &Response, json_output: bool) {
    if json_output {
        match serde_json::to_string(response) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Error serializing response: {}", e),
        }
    } else if response.is_success() {
        println!("Valid");
    } else {
        eprintln!("Invalid ({}): {}", response.status_code, response.body);
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_check(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return Err(2);
            }
        }
    } else {
        if !quiet {
            println!("Checking {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
