//! Playwright browser automation
//!
//! A scenario executes as one generated Playwright script: storage state,
//! route rules and steps are compiled into a self-contained JS program which
//! runs under `node` and reports back through a single JSON result line on
//! stdout. Route rules must be installed before the first navigation and
//! stay live across every step, which is why the unit of execution is the
//! scenario, not the step.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::intercept::{RouteAction, RouteRule};
use crate::spec::ScenarioStep;

/// Playwright browser handle
pub struct BrowserHandle {
    /// Base URL of the app under test
    base_url: String,

    /// Storage state snapshot injected into the browser context
    storage_state: Option<PathBuf>,

    /// Viewport dimensions
    viewport_width: u32,
    viewport_height: u32,

    /// Browser type
    browser: Browser,

    /// Headless mode
    headless: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Parse a browser name, defaulting to chromium
    pub fn from_name(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Result line printed by a generated script
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptOutcome {
    pub success: bool,

    /// Values captured from intercepted responses, keyed by capture name
    #[serde(default)]
    pub captures: HashMap<String, Value>,

    /// The step that was executing when the script failed
    #[serde(default)]
    pub step: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

impl BrowserHandle {
    /// Create a new browser handle
    pub fn new(config: BrowserConfig) -> E2eResult<Self> {
        // Verify playwright is installed
        Self::check_playwright_installed()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage_state: config.storage_state,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            browser: config.browser,
            headless: config.headless,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Execute a full scenario: install routes, run steps, collect captures
    pub async fn run_scenario(
        &self,
        routes: &[RouteRule],
        steps: &[ScenarioStep],
    ) -> E2eResult<ScriptOutcome> {
        let script = self.build_script(routes, steps);
        self.run_script(&script).await
    }

    /// Build the Playwright script for a scenario
    pub fn build_script(&self, routes: &[RouteRule], steps: &[ScenarioStep]) -> String {
        let mut script = String::new();

        script.push_str(SCRIPT_HELPERS);

        let storage_state = match &self.storage_state {
            Some(path) => format!(
                ",\n    storageState: {}",
                js_string(&path.to_string_lossy())
            ),
            None => String::new(),
        };

        script.push_str(&format!(
            r#"
(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}{storage_state}
  }});
  const page = await context.newPage();
  const baseUrl = {base_url};
  const captures = {{}};
  let currentStep = 'setup';

  try {{
"#,
            browser = self.browser.as_str(),
            headless = self.headless,
            width = self.viewport_width,
            height = self.viewport_height,
            storage_state = storage_state,
            base_url = js_string(&self.base_url),
        ));

        // Playwright consults the most recently registered route first;
        // registering in reverse keeps first-declared-wins semantics.
        for rule in routes.iter().rev() {
            script.push_str(&route_to_js(rule));
        }

        for (i, step) in steps.iter().enumerate() {
            let name = step_name(step);
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, name));
            script.push_str(&format!("    currentStep = {};\n", js_string(&name)));
            script.push_str(&self.step_to_js(step));
        }

        script.push_str(
            r#"
    console.log(JSON.stringify({ success: true, captures }));
  } catch (error) {
    console.log(JSON.stringify({ success: false, step: currentStep, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &ScenarioStep) -> String {
        match step {
            ScenarioStep::Navigate { url } => {
                format!("    await page.goto(baseUrl + {});\n", js_string(url))
            }
            ScenarioStep::ClickText {
                text,
                first,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(5000);
                format!(
                    "    await page.getByText({}){}.click({{ timeout: {} }});\n",
                    js_string(text),
                    first_suffix(*first),
                    timeout
                )
            }
            ScenarioStep::ClickRole {
                role,
                name,
                first,
                timeout_ms,
            } => {
                let timeout = timeout_ms.unwrap_or(5000);
                format!(
                    "    await page.getByRole({}, {{ name: {} }}){}.click({{ timeout: {} }});\n",
                    js_string(role),
                    js_string(name),
                    first_suffix(*first),
                    timeout
                )
            }
            ScenarioStep::FillRole { role, name, value } => {
                format!(
                    "    await page.getByRole({}, {{ name: {} }}).fill({});\n",
                    js_string(role),
                    js_string(name),
                    js_string(value)
                )
            }
            ScenarioStep::WaitResponse {
                pattern,
                timeout_ms,
                capture,
            } => {
                let mut js = format!(
                    "    {{\n      const response = await page.waitForResponse({}, {{ timeout: {} }});\n",
                    js_string(pattern),
                    timeout_ms
                );
                if let Some(capture) = capture {
                    js.push_str(&format!(
                        "      const body = await response.json();\n      captures[{}] = resolvePointer(body, {});\n",
                        js_string(&capture.name),
                        js_string(&capture.pointer)
                    ));
                }
                js.push_str("    }\n");
                js
            }
            ScenarioStep::AssertTitle { contains } => {
                format!(
                    r#"    {{
      const title = await page.title();
      if (!title.includes({expected})) {{
        throw new Error('expected title to contain ' + {expected} + ', got "' + title + '"');
      }}
    }}
"#,
                    expected = js_string(contains)
                )
            }
            ScenarioStep::AssertText {
                selector,
                first,
                contains,
                not_contains,
                timeout_ms,
            } => {
                let mut js = format!(
                    "    {{\n      const locator = page.locator({}){};\n      await locator.waitFor({{ state: 'attached', timeout: {} }});\n      const text = (await locator.textContent()) || '';\n",
                    js_string(selector),
                    first_suffix(*first),
                    timeout_ms
                );
                if let Some(expected) = contains {
                    js.push_str(&format!(
                        "      if (!text.includes({expected})) {{\n        throw new Error('expected text to contain ' + {expected} + ', got \"' + text + '\"');\n      }}\n",
                        expected = js_string(expected)
                    ));
                }
                if let Some(rejected) = not_contains {
                    js.push_str(&format!(
                        "      if (text.includes({rejected})) {{\n        throw new Error('expected text not to contain ' + {rejected} + ', got \"' + text + '\"');\n      }}\n",
                        rejected = js_string(rejected)
                    ));
                }
                js.push_str("    }\n");
                js
            }
            ScenarioStep::AssertCount {
                selector,
                count,
                timeout_ms,
            } => {
                format!(
                    r#"    {{
      const locator = page.locator({selector});
      await locator.first().waitFor({{ state: 'attached', timeout: {timeout} }});
      const count = await locator.count();
      if (count !== {expected}) {{
        throw new Error('expected {expected} matches for ' + {selector} + ', got ' + count);
      }}
    }}
"#,
                    selector = js_string(selector),
                    timeout = timeout_ms,
                    expected = count
                )
            }
            ScenarioStep::Sleep { ms } => {
                format!("    await page.waitForTimeout({});\n", ms)
            }
            ScenarioStep::Log { message } => {
                // stderr, so the stdout result line stays parseable
                format!("    console.error('[scenario] ' + {});\n", js_string(message))
            }
        }
    }

    /// Execute the script via node and parse the result line
    async fn run_script(&self, script: &str) -> E2eResult<ScriptOutcome> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!("running Playwright script: {}", script_path.display());

        // Run from the process cwd so `require('playwright')` resolves
        // against the suite's node_modules.
        let output = TokioCommand::new("node").arg(&script_path).output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result_line = stdout.lines().rev().find(|l| !l.trim().is_empty());

        match result_line {
            Some(line) => serde_json::from_str(line).map_err(|_| {
                E2eError::Playwright(format!("unparseable result line: {}", line))
            }),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(E2eError::Playwright(format!(
                    "script produced no result line:\nstdout: {}\nstderr: {}",
                    stdout, stderr
                )))
            }
        }
    }
}

/// Generate a marker name for a step, reported on failure
fn step_name(step: &ScenarioStep) -> String {
    match step {
        ScenarioStep::Navigate { url } => format!("navigate:{}", url),
        ScenarioStep::ClickText { text, .. } => format!("click_text:{}", text),
        ScenarioStep::ClickRole { role, name, .. } => format!("click_role:{}:{}", role, name),
        ScenarioStep::FillRole { role, name, .. } => format!("fill_role:{}:{}", role, name),
        ScenarioStep::WaitResponse { pattern, .. } => format!("wait_response:{}", pattern),
        ScenarioStep::AssertTitle { contains } => format!("assert_title:{}", contains),
        ScenarioStep::AssertText { selector, .. } => format!("assert_text:{}", selector),
        ScenarioStep::AssertCount { selector, .. } => format!("assert_count:{}", selector),
        ScenarioStep::Sleep { ms } => format!("sleep:{}ms", ms),
        ScenarioStep::Log { message } => format!("log:{}", &message[..message.len().min(30)]),
    }
}

/// Convert a route rule into a `page.route` registration
fn route_to_js(rule: &RouteRule) -> String {
    match &rule.action {
        RouteAction::Fulfill { body } => format!(
            r#"    await page.route({pattern}, async (route) => {{
      await route.fulfill({{ body: JSON.stringify({body}) }});
    }});
"#,
            pattern = js_string(&rule.pattern),
            body = serde_json::to_string(body).expect("fixture body serializes"),
        ),
        RouteAction::Rewrite { patches } => format!(
            r#"    await page.route({pattern}, async (route) => {{
      const response = await route.fetch();
      const body = await response.json();
      applyPatches(body, {patches});
      await route.fulfill({{ body: JSON.stringify(body) }});
    }});
"#,
            pattern = js_string(&rule.pattern),
            patches = serde_json::to_string(patches).expect("patches serialize"),
        ),
    }
}

/// Produce a JS string literal from a Rust string, with escaping
fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("strings always serialize")
}

fn first_suffix(first: bool) -> &'static str {
    if first {
        ".first()"
    } else {
        ""
    }
}

/// Shared preamble: require, JSON Pointer helpers mirroring
/// `intercept::apply_patches`
const SCRIPT_HELPERS: &str = r#"const { chromium, firefox, webkit } = require('playwright');

const pointerParts = (pointer) =>
  pointer
    .split('/')
    .slice(1)
    .map((part) => part.replace(/~1/g, '/').replace(/~0/g, '~'));

const resolvePointer = (obj, pointer) =>
  pointerParts(pointer).reduce((acc, part) => (acc == null ? undefined : acc[part]), obj);

const applyPatches = (obj, patches) => {
  for (const patch of patches) {
    const parts = pointerParts(patch.pointer);
    const last = parts.pop();
    const parent = parts.reduce((acc, part) => (acc == null ? undefined : acc[part]), obj);
    if (parent == null || !(last in parent)) {
      throw new Error('patch target not found: ' + patch.pointer);
    }
    parent[last] = patch.value;
  }
};
"#;

/// Configuration for the browser driver
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub base_url: String,
    pub storage_state: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: conduit_client::DEFAULT_APP_URL.to_string(),
            storage_state: None,
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
        }
    }
}
