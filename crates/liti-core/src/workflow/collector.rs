//! Project information questions

use crate::error::ScaffoldError;
use crate::package::normalize_version;
use crate::prompt::{Choice, InputQuestion, Prompter, SelectQuestion};
use crate::templates::TemplateDescriptor;
use anyhow::Result;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Default answer to the version question
pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

/// First character alphabetic; `-` and `_` only as single separators that
/// are each followed by a letter.
static PROJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]+([-][a-zA-Z][a-zA-Z0-9]*|[_][a-zA-Z][a-zA-Z0-9]*|[a-zA-Z0-9])*$")
        .expect("project name pattern is valid")
});

/// What the user is scaffolding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactKind {
    #[default]
    Project,
    Component,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Project => "project",
            ArtifactKind::Component => "component",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKind::Project => "Project",
            ArtifactKind::Component => "Component",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        [ArtifactKind::Project, ArtifactKind::Component]
            .into_iter()
            .find(|k| k.as_str() == value)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated answers for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub artifact_kind: ArtifactKind,
    pub project_name: String,
    pub project_version: String,
    pub template_package: String,
}

/// Accept a project name such as `a`, `a-b` or `a_b1`
pub fn validate_project_name(input: &str) -> Result<String, String> {
    if PROJECT_NAME_RE.is_match(input) {
        Ok(input.to_string())
    } else {
        Err("Please enter a valid project name".to_string())
    }
}

/// Accept a semantic version, returning its canonical form
pub fn validate_project_version(input: &str) -> Result<String, String> {
    normalize_version(input).ok_or_else(|| "Please enter a valid version number".to_string())
}

/// Ask what to scaffold and collect the project's details
///
/// `default_name` pre-fills the name question when it is itself valid.
pub fn collect(
    prompter: &mut dyn Prompter,
    catalog: &[TemplateDescriptor],
    default_name: Option<&str>,
) -> Result<ProjectInfo> {
    let kind = prompter.select(&SelectQuestion {
        message: "Select what to initialize".to_string(),
        choices: [ArtifactKind::Project, ArtifactKind::Component]
            .iter()
            .map(|k| Choice::new(k.as_str(), k.display_name()))
            .collect(),
        default: Some(ArtifactKind::Project.as_str().to_string()),
    })?;
    let artifact_kind = ArtifactKind::parse(&kind)
        .ok_or_else(|| anyhow::anyhow!("Unknown initialization type: {}", kind))?;
    tracing::debug!(kind = %artifact_kind, "artifact kind selected");

    match artifact_kind {
        ArtifactKind::Project => collect_project(prompter, catalog, default_name),
        ArtifactKind::Component => Err(ScaffoldError::ComponentUnsupported.into()),
    }
}

fn collect_project(
    prompter: &mut dyn Prompter,
    catalog: &[TemplateDescriptor],
    default_name: Option<&str>,
) -> Result<ProjectInfo> {
    let project_name = prompter.input(&InputQuestion {
        message: "Project name".to_string(),
        default: default_name
            .filter(|n| validate_project_name(n).is_ok())
            .map(str::to_string),
        validate: validate_project_name,
    })?;

    let project_version = prompter.input(&InputQuestion {
        message: "Project version".to_string(),
        default: Some(DEFAULT_PROJECT_VERSION.to_string()),
        validate: validate_project_version,
    })?;

    let template_package = prompter.select(&template_question(catalog))?;

    Ok(ProjectInfo {
        artifact_kind: ArtifactKind::Project,
        project_name,
        project_version,
        template_package,
    })
}

/// Template choices labeled by display name and valued by package name
fn template_question(catalog: &[TemplateDescriptor]) -> SelectQuestion {
    SelectQuestion {
        message: "Select a project template".to_string(),
        choices: catalog
            .iter()
            .map(|t| Choice::new(&t.package_name, &t.display_name))
            .collect(),
        default: None,
    }
}
