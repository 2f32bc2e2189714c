//! Declarative YAML scenario specification

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{E2eError, E2eResult};
use crate::intercept::{FieldPatch, RouteRule};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Interception rules installed before navigation, for the whole scenario
    #[serde(default)]
    pub routes: Vec<RouteSpec>,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,

    /// Directory the spec was loaded from; fixture paths resolve against it
    #[serde(skip)]
    source_dir: PathBuf,
}

fn default_viewport() -> Viewport {
    Viewport {
        width: 1280,
        height: 720,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// An interception rule in spec form: exactly one of `fulfill`,
/// `fulfill_file`, or `patches` must be present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSpec {
    pub pattern: String,

    /// Inline static response body
    #[serde(default)]
    pub fulfill: Option<Value>,

    /// Static response body loaded from a fixture file (relative to the spec)
    #[serde(default)]
    pub fulfill_file: Option<PathBuf>,

    /// Field patches applied to the real response
    #[serde(default)]
    pub patches: Vec<PatchSpec>,
}

/// A field patch in spec form; the replacement value is either inline or
/// pulled out of a fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchSpec {
    /// JSON Pointer into the intercepted response body
    pub pointer: String,

    #[serde(default)]
    pub value: Option<Value>,

    /// Fixture file providing the value (relative to the spec)
    #[serde(default)]
    pub value_file: Option<PathBuf>,

    /// JSON Pointer into the fixture document; defaults to the whole document
    #[serde(default)]
    pub value_pointer: Option<String>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Navigate to a path relative to the app base URL
    Navigate { url: String },

    /// Click an element located by its visible text
    ClickText {
        text: String,
        #[serde(default)]
        first: bool,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Click an element located by ARIA role and accessible name
    ClickRole {
        role: String,
        name: String,
        #[serde(default)]
        first: bool,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input located by ARIA role and accessible name
    FillRole {
        role: String,
        name: String,
        value: String,
    },

    /// Wait for a response whose URL matches the glob pattern; optionally
    /// capture a field of its body into the scenario's capture map
    WaitResponse {
        pattern: String,
        #[serde(default = "default_response_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        capture: Option<Capture>,
    },

    /// Assert on the page title
    AssertTitle { contains: String },

    /// Assert text containment (or absence) on a CSS locator
    AssertText {
        selector: String,
        #[serde(default)]
        first: bool,
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        not_contains: Option<String>,
        #[serde(default = "default_step_timeout")]
        timeout_ms: u64,
    },

    /// Assert how many elements a CSS locator matches
    AssertCount {
        selector: String,
        count: usize,
        #[serde(default = "default_step_timeout")]
        timeout_ms: u64,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message (for debugging)
    Log { message: String },
}

/// Where to store a value captured from an intercepted response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Key in the scenario's capture map
    pub name: String,
    /// JSON Pointer into the response body
    pub pointer: String,
}

fn default_step_timeout() -> u64 {
    5000
}

fn default_response_timeout() -> u64 {
    10_000
}

impl ScenarioSpec {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut spec = Self::from_yaml(&content)?;
        spec.source_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(spec)
    }

    /// Load all scenarios from a directory, recursively
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }

        Ok(specs)
    }

    /// Resolve route specs into concrete rules, loading fixture files
    pub fn resolve_routes(&self) -> E2eResult<Vec<RouteRule>> {
        self.routes
            .iter()
            .map(|r| r.resolve(&self.source_dir))
            .collect()
    }
}

impl RouteSpec {
    /// Turn the spec form into a concrete [`RouteRule`]
    pub fn resolve(&self, base: &Path) -> E2eResult<RouteRule> {
        if let Some(body) = &self.fulfill {
            return Ok(RouteRule::fulfill(&self.pattern, body.clone()));
        }

        if let Some(file) = &self.fulfill_file {
            let body = load_fixture(base, file)?;
            return Ok(RouteRule::fulfill(&self.pattern, body));
        }

        if !self.patches.is_empty() {
            let patches = self
                .patches
                .iter()
                .map(|p| p.resolve(base))
                .collect::<E2eResult<Vec<_>>>()?;
            return Ok(RouteRule::rewrite(&self.pattern, patches));
        }

        Err(E2eError::SpecParse(format!(
            "route '{}' needs one of fulfill, fulfill_file or patches",
            self.pattern
        )))
    }
}

impl PatchSpec {
    fn resolve(&self, base: &Path) -> E2eResult<FieldPatch> {
        let value = match (&self.value, &self.value_file) {
            (Some(value), None) => value.clone(),
            (None, Some(file)) => {
                let document = load_fixture(base, file)?;
                match &self.value_pointer {
                    Some(pointer) => document
                        .pointer(pointer)
                        .cloned()
                        .ok_or_else(|| E2eError::PatchTarget(pointer.clone()))?,
                    None => document,
                }
            }
            _ => {
                return Err(E2eError::SpecParse(format!(
                    "patch '{}' needs exactly one of value or value_file",
                    self.pointer
                )))
            }
        };

        Ok(FieldPatch {
            pointer: self.pointer.clone(),
            value,
        })
    }
}

fn load_fixture(base: &Path, file: &Path) -> E2eResult<Value> {
    let path = base.join(file);
    let content = std::fs::read_to_string(&path)
        .map_err(|_| E2eError::FixtureNotFound(path.display().to_string()))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::RouteAction;

    #[test]
    fn parse_mock_scenario() {
        let yaml = r#"
name: tags-mock
description: Rendered tag list matches the fixture
tags:
  - mock
routes:
  - pattern: "*/**/api/tags"
    fulfill:
      tags: ["rust", "testing"]
steps:
  - action: navigate
    url: /
  - action: assert_count
    selector: ".sidebar .tag-pill"
    count: 2
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "tags-mock");
        assert_eq!(spec.routes.len(), 1);
        assert_eq!(spec.steps.len(), 2);

        let rules = spec.resolve_routes().unwrap();
        assert!(matches!(rules[0].action, RouteAction::Fulfill { .. }));
    }

    #[test]
    fn parse_ui_flow_scenario() {
        let yaml = r#"
name: ui-create
steps:
  - action: click_text
    text: New Article
  - action: fill_role
    role: textbox
    name: Article Title
    value: Hello
  - action: click_role
    role: button
    name: Publish Article
  - action: wait_response
    pattern: "**/api/articles/"
    capture:
      name: slug
      pointer: /article/slug
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        match &spec.steps[3] {
            ScenarioStep::WaitResponse { capture, .. } => {
                let capture = capture.as_ref().unwrap();
                assert_eq!(capture.name, "slug");
                assert_eq!(capture.pointer, "/article/slug");
            }
            other => panic!("unexpected step: {:?}", other),
        }
    }

    #[test]
    fn rewrite_route_pulls_values_from_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("updated.json"),
            r#"{"title": "Patched", "description": "New desc"}"#,
        )
        .unwrap();

        let yaml = r#"
name: rewrite
routes:
  - pattern: "*/**/api/articles*"
    patches:
      - pointer: /articles/0/title
        value_file: updated.json
        value_pointer: /title
steps:
  - action: navigate
    url: /
"#;
        let mut spec = ScenarioSpec::from_yaml(yaml).unwrap();
        spec.source_dir = dir.path().to_path_buf();

        let rules = spec.resolve_routes().unwrap();
        match &rules[0].action {
            RouteAction::Rewrite { patches } => {
                assert_eq!(patches[0].pointer, "/articles/0/title");
                assert_eq!(patches[0].value, serde_json::json!("Patched"));
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn route_without_action_is_rejected() {
        let yaml = r#"
name: broken
routes:
  - pattern: "*/**/api/tags"
steps:
  - action: navigate
    url: /
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        assert!(matches!(
            spec.resolve_routes(),
            Err(E2eError::SpecParse(_))
        ));
    }
}
