//! E2E suite entry point
//!
//! This file is the test binary that runs browser scenarios from YAML specs
//! against the live Conduit demo app.
//! Run with: cargo test --package conduit-e2e --test e2e

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use conduit_client::Credentials;
use conduit_e2e::runner::RunnerConfig;
use conduit_e2e::{Browser, E2eResult, ScenarioRunner, SuiteResult};

#[derive(Parser, Debug)]
#[command(name = "conduit-e2e")]
#[command(about = "Browser E2E suite for the Conduit demo application")]
struct Args {
    /// Path to scenario specs directory
    #[arg(short, long, default_value = "crates/e2e/tests/specs")]
    specs: PathBuf,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Base URL of the Conduit frontend
    #[arg(long, env = "CONDUIT_APP_URL", default_value = conduit_client::DEFAULT_APP_URL)]
    app_url: String,

    /// Base URL of the Conduit API
    #[arg(long, env = "CONDUIT_API_URL", default_value = conduit_client::DEFAULT_API_URL)]
    api_url: String,

    /// Test user email
    #[arg(long, env = "CONDUIT_EMAIL", default_value = "hansi@horsti.de")]
    email: String,

    /// Test user password
    #[arg(long, env = "CONDUIT_PASSWORD", default_value = "Hansi123")]
    password: String,

    /// Where to persist the storage-state snapshot
    #[arg(long, env = "CONDUIT_AUTH_STATE", default_value = ".auth/state.json")]
    auth_state: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run in headless mode
    #[arg(long, default_value = "true")]
    headless: bool,

    /// App availability timeout in seconds
    #[arg(long, default_value = "30")]
    startup_timeout: u64,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(success) => {
            if success {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = RunnerConfig {
        app_url: args.app_url,
        api_url: args.api_url,
        credentials: Credentials::new(args.email, args.password),
        auth_state_path: args.auth_state,
        specs_dir: args.specs,
        output_dir: args.output,
        browser: Browser::from_name(&args.browser),
        headless: args.headless,
        startup_timeout: Duration::from_secs(args.startup_timeout),
    };

    let mut runner = ScenarioRunner::new(config)?;

    runner.bootstrap().await?;

    let results = if let Some(name) = args.name {
        let result = runner.run_named(&name).await?;
        SuiteResult {
            total: 1,
            passed: if result.success { 1 } else { 0 },
            failed: if result.success { 0 } else { 1 },
            duration_ms: result.duration_ms,
            results: vec![result],
        }
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.failed == 0)
}
