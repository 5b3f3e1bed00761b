//! TA Check CLI Application
//!
//! Lists the students of a department cohort who have not yet submitted
//! their final project, using ta-check-lib for all of the actual work.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use ta_check_lib::{
    cohort_prefix, load_env_config, parse_timeout_string, CheckConfig, ConfigManager, EnvConfig,
    FailurePolicy, FileConfig, SubmissionChecker,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

const DEFAULT_DEPARTMENT: &str = "135";
const DEFAULT_COHORT: &str = "20";

/// Exit status when the report was printed but some probes failed (--keep-going).
const EXIT_PARTIAL: i32 = 2;

/// CLI arguments for ta-check
#[derive(Parser, Debug)]
#[command(name = "ta-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List students who have not submitted their final project")]
#[command(
    long_about = "List the students of a department cohort who have no final-project submission on the library portal.\n\nThe roster is downloaded once and cached locally; delete the cache file to refresh it."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Department code, e.g. 135 [default: 135]
    #[arg(value_name = "DEPARTMENT")]
    pub department: Option<String>,

    /// Cohort code, zero-padded to two digits, e.g. 20 [default: 20]
    #[arg(value_name = "COHORT")]
    pub cohort: Option<String>,

    /// Report failed probes separately instead of aborting the run
    #[arg(long = "keep-going", help_heading = "Configuration")]
    pub keep_going: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help_heading = "Configuration"
    )]
    pub config: Option<String>,

    /// Debug logging and a listing of unresolved identifiers
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs after CLI, environment and files are merged.
#[derive(Debug)]
struct RunSettings {
    department: String,
    cohort: String,
    config: CheckConfig,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Install the tracing subscriber. Logs go to stderr; stdout is the report.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        "warn,ta_check_lib=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .with_target(false)
        .without_time()
        .init();
}

async fn run(args: Args) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;
    let prefix = cohort_prefix(&settings.department, &settings.cohort)?;

    ui::print_header(&prefix, chrono::Local::now());

    let checker = SubmissionChecker::from_config(settings.config)?;
    let progress = ui::Progress::start();

    let result = checker
        .find_pending(&settings.department, &settings.cohort, |done, total| {
            progress.update(done, total)
        })
        .await;
    progress.finish();
    let pending = result?;

    ui::print_report(&pending.report);
    ui::print_unresolved(&pending.unresolved, args.verbose);

    if pending.has_failures() {
        ui::print_failures(&pending.failures);
        return Ok(EXIT_PARTIAL);
    }

    Ok(0)
}

/// Build the run settings from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables (TA_*)
/// 3. Local config file (./ta-check.toml)
/// 4. Global config file (~/.ta-check.toml)
/// 5. XDG config file (~/.config/ta-check/config.toml)
/// 6. Built-in defaults
fn build_settings(args: &Args) -> Result<RunSettings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new(args.verbose);

    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            debug!(%path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let config = merge_file_config_into_check_config(CheckConfig::default(), &file_config);
    let mut config = apply_environment_config(config, &env_config);
    if args.keep_going {
        config = config.with_failure_policy(FailurePolicy::CollectFailures);
    }
    config.validate()?;

    let defaults = file_config.defaults.unwrap_or_default();
    let department = args
        .department
        .clone()
        .or(defaults.department)
        .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string());
    let cohort = args
        .cohort
        .clone()
        .or(defaults.cohort)
        .unwrap_or_else(|| DEFAULT_COHORT.to_string());

    debug!(
        %department,
        %cohort,
        concurrency = config.concurrency,
        timeout = ?config.probe_timeout,
        policy = %config.failure_policy,
        cache = %config.cache_path.display(),
        "resolved settings"
    );

    Ok(RunSettings {
        department,
        cohort,
        config,
    })
}

/// Merge file configuration into CheckConfig.
fn merge_file_config_into_check_config(
    mut config: CheckConfig,
    file_config: &FileConfig,
) -> CheckConfig {
    if let Some(defaults) = &file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(secs) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(fail_fast) = defaults.fail_fast {
            config = config.with_failure_policy(if fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::CollectFailures
            });
        }
    }

    if let Some(sources) = &file_config.sources {
        if let Some(url) = &sources.roster_url {
            config = config.with_roster_url(url.clone());
        }
        if let Some(path) = &sources.cache_path {
            config = config.with_cache_path(PathBuf::from(path));
        }
        if let Some(template) = &sources.status_url {
            config = config.with_status_url(template.clone());
        }
        if let Some(marker) = &sources.submitted_marker {
            config = config.with_submitted_marker(marker.clone());
        }
    }

    config
}

/// Apply TA_* environment variables on top of the file configuration.
fn apply_environment_config(mut config: CheckConfig, env_config: &EnvConfig) -> CheckConfig {
    if let Some(concurrency) = env_config.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(secs) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(url) = &env_config.roster_url {
        config = config.with_roster_url(url.clone());
    }
    if let Some(path) = &env_config.cache_path {
        config = config.with_cache_path(PathBuf::from(path));
    }
    if let Some(template) = &env_config.status_url {
        config = config.with_status_url(template.clone());
    }
    if let Some(marker) = &env_config.submitted_marker {
        config = config.with_submitted_marker(marker.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use ta_check_lib::{DefaultsConfig, SourcesConfig};

    #[test]
    fn test_args_defaults_are_optional() {
        let args = Args::try_parse_from(["ta-check"]).unwrap();
        assert!(args.department.is_none());
        assert!(args.cohort.is_none());
        assert!(!args.keep_going);
    }

    #[test]
    fn test_args_positional() {
        let args = Args::try_parse_from(["ta-check", "182", "21", "--keep-going"]).unwrap();
        assert_eq!(args.department.as_deref(), Some("182"));
        assert_eq!(args.cohort.as_deref(), Some("21"));
        assert!(args.keep_going);
    }

    #[test]
    fn test_args_reject_extra_positional() {
        assert!(Args::try_parse_from(["ta-check", "135", "20", "extra"]).is_err());
    }

    #[test]
    fn test_file_config_merged() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(4),
                timeout: Some("5s".to_string()),
                fail_fast: Some(false),
                ..Default::default()
            }),
            sources: Some(SourcesConfig {
                cache_path: Some("roster.json".to_string()),
                ..Default::default()
            }),
        };

        let config = merge_file_config_into_check_config(CheckConfig::default(), &file_config);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.failure_policy, FailurePolicy::CollectFailures);
        assert_eq!(config.cache_path, PathBuf::from("roster.json"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(4),
                ..Default::default()
            }),
            sources: None,
        };
        let env_config = EnvConfig {
            concurrency: Some(16),
            status_url: Some("https://mirror.test/go/{id}".to_string()),
            ..Default::default()
        };

        let config = merge_file_config_into_check_config(CheckConfig::default(), &file_config);
        let config = apply_environment_config(config, &env_config);
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.status_url, "https://mirror.test/go/{id}");
    }
}
