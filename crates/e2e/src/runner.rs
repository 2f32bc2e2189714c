//! Scenario runner orchestrating session bootstrap, interception and browser

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, error, info};

use conduit_client::{Credentials, ConduitClient, Session};

use crate::browser::{Browser, BrowserConfig, BrowserHandle};
use crate::error::{E2eError, E2eResult};
use crate::intercept::RouteRule;
use crate::spec::{ScenarioSpec, ScenarioStep, Viewport};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,

    /// Values captured from intercepted responses during the run
    #[serde(default)]
    pub captures: HashMap<String, Value>,

    /// Marker of the step that failed, if any
    #[serde(default)]
    pub failed_step: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl ScenarioResult {
    /// A captured string value by name (e.g. the created article's slug)
    pub fn capture_str(&self, name: &str) -> Option<&str> {
        self.captures.get(name).and_then(|v| v.as_str())
    }
}

/// Result of running the whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL of the Conduit frontend
    pub app_url: String,

    /// Base URL of the Conduit API
    pub api_url: String,

    /// Test user credentials
    pub credentials: Credentials,

    /// Where the storage-state snapshot is persisted
    pub auth_state_path: PathBuf,

    /// Directory containing scenario YAML files
    pub specs_dir: PathBuf,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// Browser type
    pub browser: Browser,

    /// Headless mode
    pub headless: bool,

    /// How long to wait for the app to become reachable
    pub startup_timeout: Duration,
}

impl RunnerConfig {
    /// Build a config from the environment, with the demo account as the
    /// credential fallback (the suite's fixture user)
    pub fn from_env() -> Self {
        let app_url = std::env::var("CONDUIT_APP_URL")
            .unwrap_or_else(|_| conduit_client::DEFAULT_APP_URL.to_string());
        let api_url = std::env::var("CONDUIT_API_URL")
            .unwrap_or_else(|_| conduit_client::DEFAULT_API_URL.to_string());
        let credentials = Credentials::from_env()
            .unwrap_or_else(|_| Credentials::new("hansi@horsti.de", "Hansi123"));
        let auth_state_path = std::env::var("CONDUIT_AUTH_STATE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".auth/state.json"));

        Self {
            app_url,
            api_url,
            credentials,
            auth_state_path,
            specs_dir: PathBuf::from("crates/e2e/tests/specs"),
            output_dir: PathBuf::from("test-results"),
            browser: Browser::Chromium,
            headless: true,
            startup_timeout: Duration::from_secs(30),
        }
    }
}

/// Main scenario runner
pub struct ScenarioRunner {
    config: RunnerConfig,
    client: ConduitClient,
    session: Option<Session>,
}

impl ScenarioRunner {
    pub fn new(config: RunnerConfig) -> E2eResult<Self> {
        let client = ConduitClient::new(&config.api_url)?;
        Ok(Self {
            config,
            client,
            session: None,
        })
    }

    /// The API client, for direct fixture setup/teardown
    pub fn client(&self) -> &ConduitClient {
        &self.client
    }

    /// The session token, once bootstrapped
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token())
    }

    /// Establish the shared session: probe the app, log in, persist the
    /// storage-state snapshot, export `ACCESS_TOKEN`. Runs once; later calls
    /// are no-ops.
    pub async fn bootstrap(&mut self) -> E2eResult<()> {
        if self.session.is_some() {
            return Ok(());
        }

        self.probe_app().await?;

        let session = conduit_client::bootstrap(&self.client, &self.config.credentials).await?;
        let state = session.storage_state(&self.config.app_url);
        state.write(&self.config.auth_state_path)?;
        session.export_env();

        info!(
            "session bootstrapped, snapshot at {}",
            self.config.auth_state_path.display()
        );
        self.session = Some(session);
        Ok(())
    }

    /// Wait for the app to respond at its base URL
    async fn probe_app(&self) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < self.config.startup_timeout {
            attempts += 1;

            match client.get(&self.config.app_url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => {
                    debug!("app probe returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("waiting for {} ...", self.config.app_url);
                    }
                    if !e.is_connect() && !e.is_timeout() {
                        debug!("app probe error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::AppUnreachable(attempts))
    }

    /// Run all scenarios in the specs directory
    pub async fn run_all(&mut self) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        self.run_scenarios(&specs).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<ScenarioSpec> = specs
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_named(&mut self, name: &str) -> E2eResult<ScenarioResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))?;

        self.run_scenario(&spec).await
    }

    /// Run a list of scenarios, logging per-scenario outcomes
    pub async fn run_scenarios(&mut self, specs: &[ScenarioSpec]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        self.bootstrap().await?;

        info!("running {} scenario(s)...", specs.len());

        for spec in specs {
            match self.run_scenario(spec).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", spec.name, e);
                    results.push(ScenarioResult {
                        name: spec.name.clone(),
                        success: false,
                        duration_ms: 0,
                        captures: HashMap::new(),
                        failed_step: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            total: specs.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run a single scenario spec
    pub async fn run_scenario(&mut self, spec: &ScenarioSpec) -> E2eResult<ScenarioResult> {
        let routes = spec.resolve_routes()?;
        self.run_steps(&spec.name, routes, &spec.steps, Some(spec.viewport))
            .await
    }

    /// Run a programmatic scenario: routes plus an ordered list of steps.
    ///
    /// This is the entry point integration tests use to drive UI flows that
    /// need data from direct API calls (and vice versa).
    pub async fn run_steps(
        &mut self,
        name: &str,
        routes: Vec<RouteRule>,
        steps: &[ScenarioStep],
        viewport: Option<Viewport>,
    ) -> E2eResult<ScenarioResult> {
        self.bootstrap().await?;

        let start = Instant::now();
        debug!("running scenario: {}", name);

        let mut browser_config = BrowserConfig {
            base_url: self.config.app_url.clone(),
            storage_state: Some(self.config.auth_state_path.clone()),
            browser: self.config.browser,
            headless: self.config.headless,
            ..BrowserConfig::default()
        };
        if let Some(viewport) = viewport {
            browser_config.viewport_width = viewport.width;
            browser_config.viewport_height = viewport.height;
        }

        let browser = BrowserHandle::new(browser_config)?;
        let outcome = browser.run_scenario(&routes, steps).await?;

        let duration_ms = start.elapsed().as_millis() as u64;

        Ok(ScenarioResult {
            name: name.to_string(),
            success: outcome.success,
            duration_ms,
            captures: outcome.captures,
            failed_step: outcome.step,
            error: outcome.error,
        })
    }

    /// Write suite results to a JSON file
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("results written to: {}", path.display());
        Ok(path)
    }
}
