//! Conduit E2E Suite
//!
//! This crate drives the Conduit demo application through a real browser
//! while mocking and rewriting the API responses the page observes:
//! - Bootstraps one authenticated session per run (API login, storage-state
//!   snapshot, `ACCESS_TOKEN` export)
//! - Installs per-scenario route interception rules (static fulfill or
//!   fetch-then-patch)
//! - Executes declarative YAML scenarios through Playwright
//! - Performs direct API calls for fixture setup and teardown
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── bootstrap() -> Session + storage-state snapshot      │
//! │    ├── run_scenario(spec) -> ScenarioResult                 │
//! │    └── write_results(suite) -> test-results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioSpec (YAML)                                        │
//! │    ├── name, description, tags, viewport                    │
//! │    ├── routes: [pattern + fulfill | fulfill_file | patches] │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url }                               │
//! │          ├── click_text / click_role / fill_role            │
//! │          ├── wait_response { pattern, capture? }            │
//! │          └── assert_title / assert_text / assert_count      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserHandle: scenario -> Playwright JS -> node           │
//! │  conduit-client: login, create/delete article, tags         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod error;
pub mod intercept;
pub mod runner;
pub mod spec;

pub use browser::{Browser, BrowserConfig, BrowserHandle};
pub use error::{E2eError, E2eResult};
pub use intercept::{apply_patches, FieldPatch, RouteAction, RouteRule};
pub use runner::{RunnerConfig, ScenarioResult, ScenarioRunner, SuiteResult};
pub use spec::{ScenarioSpec, ScenarioStep};
