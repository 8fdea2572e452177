//! BugScan - client for the BugScan security-scanning backend
//!
//! This is the main entry point for the command-line client.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bugscan_client::{ApiClient, ApiConfig, Route};
use bugscan_common::logging::{init_logging, LogFormat};
use bugscan_common::Config;
use bugscan_core::ScanResult;
use bugscan_session::{validate_new_password, SessionManager, SessionStore};
use bugscan_workflow::SubmissionWorkflow;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

/// BugScan command-line client
#[derive(Parser, Debug)]
#[command(name = "bugscan")]
#[command(version)]
#[command(about = "Submit and inspect security scans", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "~/.bugscan/config.toml")]
    config: String,

    /// Backend API URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        username: String,
        password: String,
    },
    /// Create an account and log in
    Register {
        email: String,
        username: String,
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the current user
    Whoami,
    /// Update the account profile
    UpdateProfile {
        email: String,
        username: String,
        /// New password (repeat it via --confirm)
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Submit a scan for a target URL
    Scan { url: String },
    /// Run a localhost-testing scan and print the normalized result
    LocalScan {
        url: String,
        /// Host path to the source tree for the memory-safety stage
        #[arg(long)]
        source_path: Option<String>,
    },
    /// List the account's targets
    Targets,
    /// List the account's scan jobs
    Scans,
    /// List report summaries
    Reports,
    /// Fetch one full report
    Report { job_id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, LogFormat::parse(&args.log_format));

    // Load configuration
    let config_path = expand_tilde(&args.config);
    let config = if std::path::Path::new(&config_path).exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };
    let mut config = config.merge_env();
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }

    info!("BugScan client {}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", config.api.base_url);

    let client = Arc::new(ApiClient::new(ApiConfig {
        base_url: config.api.base_url.clone(),
        request_timeout: Duration::from_secs(config.api.request_timeout_seconds),
        scan_timeout: Duration::from_secs(config.api.scan_timeout_seconds),
        ..ApiConfig::default()
    })?);
    // The gateway suppresses the unauthorized hook on public routes so a
    // failed login renders its own error instead of looping.
    client.set_route(match args.command {
        Command::Login { .. } => Route::Login,
        Command::Register { .. } => Route::Register,
        Command::LocalScan { .. } => Route::LocalTesting,
        Command::Scan { .. } | Command::Scans => Route::Scans,
        Command::Reports | Command::Report { .. } => Route::Reports,
        Command::UpdateProfile { .. } | Command::Whoami => Route::Profile,
        Command::Logout | Command::Targets => Route::Dashboard,
    });

    let store = SessionStore::new(expand_tilde(&config.session.store_path));
    let session = Arc::new(SessionManager::new(Arc::clone(&client), store));

    // A mid-run 401 destroys the session: the rejected token must not
    // survive in memory or on disk.
    let hook_session = Arc::clone(&session);
    client.on_unauthorized(move || {
        warn!("session rejected by the backend, please login again");
        hook_session.logout();
    });

    session.bootstrap().await;

    match args.command {
        Command::Login { username, password } => {
            let profile = session.login(&username, &password).await?;
            println!("Logged in as {} <{}>", profile.username, profile.email);
        }
        Command::Register {
            email,
            username,
            password,
            full_name,
        } => {
            let profile = session
                .register(&email, &username, &password, full_name)
                .await?;
            println!("Registered and logged in as {}", profile.username);
        }
        Command::Logout => {
            session.logout();
            println!("Logged out");
        }
        Command::Whoami => match session.user() {
            Some(profile) => {
                println!("{} <{}> ({})", profile.username, profile.email, profile.role);
            }
            None => println!("Not logged in"),
        },
        Command::UpdateProfile {
            email,
            username,
            password,
            confirm,
        } => {
            if let Some(ref password) = password {
                validate_new_password(password, confirm.as_deref().unwrap_or(""))?;
            }
            let profile = session
                .update_profile(&email, &username, password.as_deref())
                .await?;
            println!("Profile updated: {} <{}>", profile.username, profile.email);
        }
        Command::Scan { url } => {
            let workflow = SubmissionWorkflow::new(
                Arc::clone(&client),
                Arc::clone(&session),
                config.api.app_origin.clone(),
            );
            let job = workflow.submit_scan(&url).await?;
            println!("Scan job {} created ({})", job.job_id, job.status.as_str());
        }
        Command::LocalScan { url, source_path } => {
            let workflow = SubmissionWorkflow::new(
                Arc::clone(&client),
                Arc::clone(&session),
                config.api.app_origin.clone(),
            );
            let result = workflow.submit_local_scan(&url, source_path).await?;
            print_scan_result(&result);
            if result.is_failed() {
                std::process::exit(1);
            }
        }
        Command::Targets => {
            for target in client.list_targets().await? {
                println!("{:>6}  {}", target.id, target.url);
            }
        }
        Command::Scans => {
            for job in client.list_scans().await? {
                println!(
                    "{}  {:<10}  {}",
                    job.job_id,
                    job.status.as_str(),
                    job.target_url.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Reports => {
            for report in client.list_reports().await? {
                println!(
                    "{}  {:<10}  {:>4} findings  {}",
                    report.job_id, report.status, report.findings_count, report.target_url
                );
            }
        }
        Command::Report { job_id } => {
            let report = client.get_report(job_id).await?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "job_id": report.job_id,
                "target_url": report.target_url,
                "status": report.status,
                "created_at": report.created_at,
                "completed_at": report.completed_at,
                "findings": report.findings,
                "error_message": report.error_message,
            }))?);
        }
    }

    Ok(())
}

/// Print a normalized scan result the way the dashboard would show it.
fn print_scan_result(result: &ScanResult) {
    println!("Target:      {}", result.target_url);
    println!("Status:      {}", result.status);
    println!("Environment: {}", result.environment);
    if let Some(job_id) = result.job_id {
        println!("Job:         {}", job_id);
    }
    if let Some(ref error) = result.error {
        println!("Error:       {}", error);
    }
    if !result.per_tool.is_empty() {
        println!("Tools:");
        for (tool, summary) in &result.per_tool {
            match summary.detail {
                Some(ref detail) => {
                    println!("  {:<20} {} ({})", tool, summary.status.as_str(), detail)
                }
                None => println!("  {:<20} {}", tool, summary.status.as_str()),
            }
        }
    }
    println!("Alerts:      {}", result.alert_count);
    for alert in &result.alerts {
        println!("  [{}] {} ({})", alert.risk, alert.name, alert.tool);
        if let Some(ref location) = alert.location {
            println!("      at {}", location);
        }
    }
}

fn expand_tilde(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var("HOME") {
            Ok(home) => format!("{}/{}", home, rest),
            Err(_) => path.to_string(),
        },
        None => path.to_string(),
    }
}
