mod config;
mod error;

use std::path::PathBuf;

use clap::Parser;
use policy::{ExitStatus, GateRequest, Policy, Verdict, lint};
use tracing_subscriber::EnvFilter;

use config::{ConfigSource, DEFAULT_CONFIG_DIR};
use error::{Error, Result};

/// Runtime identity assumed when `--runtime` is not given.
const DEFAULT_RUNTIME: &str = "local_cli";

#[derive(Parser)]
#[command(name = "preflight")]
#[command(about = "Check whether a gated operation may run", long_about = None)]
#[command(version)]
struct Cli {
    /// Operation to evaluate
    #[arg(long, required_unless_present_any = ["check_config", "list"])]
    operation: Option<String>,

    /// Explicit mode (WEB_SAFE, LOCAL_STANDARD, LOCAL_PRIVILEGED); defaults to the runtime's
    /// default mode
    #[arg(long)]
    mode: Option<String>,

    /// Runtime identity
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    runtime: String,

    /// Print the success message with detail and log each decision step
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Print nothing on success
    #[arg(long)]
    quiet: bool,

    /// Print the verdict as a single JSON object on stdout instead of a message
    #[arg(long, conflicts_with_all = ["verbose", "quiet"])]
    json: bool,

    /// Directory holding capabilities.toml, runtimes.toml and operations.toml
    #[arg(long, env = "PREFLIGHT_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Capability matrix file (overrides --config-dir)
    #[arg(long)]
    capabilities: Option<PathBuf>,

    /// Runtime profiles file (overrides --config-dir)
    #[arg(long)]
    runtimes: Option<PathBuf>,

    /// Operation policy file (overrides --config-dir)
    #[arg(long)]
    operations: Option<PathBuf>,

    /// Check the tables for authoring mistakes instead of evaluating an operation
    #[arg(long, conflicts_with = "list")]
    check_config: bool,

    /// List the operations the loaded policy knows about
    #[arg(long)]
    list: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("preflight: {e}");
            std::process::exit(e.exit_status().code());
        }
    }
}

fn run(cli: Cli) -> Result<ExitStatus> {
    init_logging(cli.verbose)?;

    let paths = ConfigSource {
        dir: cli.config_dir,
        capabilities: cli.capabilities,
        runtimes: cli.runtimes,
        operations: cli.operations,
    }
    .resolve();
    tracing::debug!(?paths, "loading policy tables");
    let policy = Policy::load(&paths)?;

    if cli.check_config {
        return cmd_check_config(&policy);
    }
    if cli.list {
        return cmd_list(&policy);
    }

    // clap requires --operation outside --check-config and --list.
    let operation = cli.operation.unwrap_or_default();
    let mut request = GateRequest::new(operation, cli.runtime);
    if let Some(mode) = cli.mode {
        request = request.with_mode(mode);
    }

    let output = if cli.json {
        Output::Json
    } else if cli.verbose {
        Output::Verbose
    } else if cli.quiet {
        Output::Quiet
    } else {
        Output::Normal
    };
    cmd_check(&policy, &request, output)
}

/// How a verdict is reported.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Output {
    Normal,
    Verbose,
    Quiet,
    Json,
}

fn cmd_check(policy: &Policy, request: &GateRequest, output: Output) -> Result<ExitStatus> {
    let verdict = policy.check(request);

    if output == Output::Json {
        println!("{}", serde_json::to_string(&verdict)?);
        return Ok(verdict.exit_status());
    }

    match &verdict {
        Verdict::Allow(grant) => {
            if output == Output::Verbose {
                println!("preflight: {grant}");
            } else if output == Output::Normal {
                println!(
                    "preflight: allowed: operation '{}' in mode {}",
                    grant.operation, grant.mode
                );
            }
        }
        Verdict::Deny(denial) => eprintln!("preflight: {denial}"),
    }

    Ok(verdict.exit_status())
}

fn cmd_check_config(policy: &Policy) -> Result<ExitStatus> {
    let findings = lint::lint(policy);

    if findings.is_empty() {
        println!(
            "preflight: config ok ({} runtimes, {} operations)",
            policy.runtimes.len(),
            policy.operations.len()
        );
        return Ok(ExitStatus::Allowed);
    }

    for finding in &findings {
        eprintln!("preflight: lint: {finding}");
    }
    Err(Error::Lint {
        count: findings.len(),
    })
}

fn cmd_list(policy: &Policy) -> Result<ExitStatus> {
    if policy.operations.is_empty() {
        println!("No operations defined.");
        return Ok(ExitStatus::Allowed);
    }

    println!("{:<28}  {:<18}  CAPABILITIES", "OPERATION", "REQUIRED MODE");
    println!("{}", "-".repeat(80));

    for op in policy.operations.iter() {
        println!(
            "{:<28}  {:<18}  {}",
            op.operation,
            op.required_mode.as_str(),
            op.required_capabilities.join(", ")
        );
    }

    Ok(ExitStatus::Allowed)
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "warn,policy=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr so stdout carries only the verdict line.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
