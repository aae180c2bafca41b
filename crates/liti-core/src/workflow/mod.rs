//! The init pipeline: Prepare, Acquire, Materialize
//!
//! [`ScaffoldWorkflow`] runs each stage in order and threads a
//! [`WorkflowContext`] through them. Every stage returns a new context built
//! from the previous one; the first error ends the run in
//! [`WorkflowState::Failed`].

pub mod acquire;
pub mod collector;
pub mod guard;

use crate::config::CacheLayout;
use crate::error::ScaffoldError;
use crate::package::PackageManager;
use crate::prompt::Prompter;
use crate::templates::{fetch_catalog, materialize, TemplateCatalog, TemplateDescriptor};
use anyhow::Result;
use std::path::PathBuf;

pub use acquire::{acquire, CacheHandle};
pub use collector::{ArtifactKind, ProjectInfo};
pub use guard::GuardDecision;

/// Pipeline stage of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    CatalogLoaded,
    Prepared,
    Downloaded,
    Installed,
    Done,
    /// The user declined to scaffold into a non-empty directory
    Aborted,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Done | WorkflowState::Aborted | WorkflowState::Failed
        )
    }
}

/// Options for one `init` invocation
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Directory the template is materialized into
    pub target_dir: PathBuf,
    /// Name given on the command line, offered as the default answer
    pub project_name: Option<String>,
    /// Skip the "continue into non-empty directory?" question
    pub force: bool,
}

/// What the run has established so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowContext {
    pub target_dir: PathBuf,
    /// Catalog snapshot taken at the start of the run
    pub catalog: Vec<TemplateDescriptor>,
    pub project: Option<ProjectInfo>,
    pub cache: Option<CacheHandle>,
}

impl WorkflowContext {
    pub fn new(target_dir: PathBuf) -> Self {
        Self {
            target_dir,
            ..Self::default()
        }
    }

    pub fn with_catalog(self, catalog: Vec<TemplateDescriptor>) -> Self {
        Self { catalog, ..self }
    }

    pub fn with_project(self, project: ProjectInfo) -> Self {
        Self {
            project: Some(project),
            ..self
        }
    }

    pub fn with_cache(self, cache: CacheHandle) -> Self {
        Self {
            cache: Some(cache),
            ..self
        }
    }

    /// The catalog descriptor the user picked
    ///
    /// The package name must match exactly one descriptor in the snapshot.
    pub fn selected_template(&self) -> Result<&TemplateDescriptor> {
        let package = self
            .project
            .as_ref()
            .map(|p| p.template_package.as_str())
            .unwrap_or_default();
        let mut matches = self.catalog.iter().filter(|t| t.package_name == package);
        match (matches.next(), matches.next()) {
            (Some(descriptor), None) => Ok(descriptor),
            (Some(_), Some(_)) => Err(ScaffoldError::DuplicateTemplate {
                package: package.to_string(),
            }
            .into()),
            (None, _) => Err(ScaffoldError::MissingTemplateInfo {
                package: package.to_string(),
            }
            .into()),
        }
    }
}

/// Result of a finished run
#[derive(Debug)]
pub struct Outcome {
    /// `Done`, `Aborted` or `Failed`
    pub state: WorkflowState,
    /// Final context; `None` when the run failed
    pub context: Option<WorkflowContext>,
    pub error: Option<anyhow::Error>,
}

/// Show the error that ended a run as one user-facing message
///
/// Also used for failures while setting up a run, before the workflow exists.
pub fn report_failure(prompter: &mut dyn Prompter, error: &anyhow::Error) {
    let message = format!("{:#}", error);
    tracing::debug!(error = %message, "init failed");
    if let Err(report) = prompter.error(&message) {
        tracing::warn!(error = %report, "failed to report error");
    }
}

/// Orchestrates one init run
pub struct ScaffoldWorkflow<'a> {
    prompter: &'a mut dyn Prompter,
    catalog: &'a dyn TemplateCatalog,
    packages: &'a dyn PackageManager,
    layout: CacheLayout,
    options: InitOptions,
    state: WorkflowState,
}

impl<'a> ScaffoldWorkflow<'a> {
    pub fn new(
        prompter: &'a mut dyn Prompter,
        catalog: &'a dyn TemplateCatalog,
        packages: &'a dyn PackageManager,
        layout: CacheLayout,
        options: InitOptions,
    ) -> Self {
        Self {
            prompter,
            catalog,
            packages,
            layout,
            options,
            state: WorkflowState::Start,
        }
    }

    /// Run the pipeline to a terminal state
    ///
    /// Errors are reported through the prompter and returned in the outcome;
    /// no stage is retried.
    pub async fn run(mut self) -> Outcome {
        match self.execute().await {
            Ok(context) => Outcome {
                state: self.state,
                context: Some(context),
                error: None,
            },
            Err(e) => {
                self.advance(WorkflowState::Failed);
                report_failure(&mut *self.prompter, &e);
                Outcome {
                    state: self.state,
                    context: None,
                    error: Some(e),
                }
            }
        }
    }

    async fn execute(&mut self) -> Result<WorkflowContext> {
        let context = WorkflowContext::new(self.options.target_dir.clone());

        let catalog = fetch_catalog(self.catalog).await?;
        let context = context.with_catalog(catalog);
        self.advance(WorkflowState::CatalogLoaded);

        let decision = guard::ensure_safe(&mut *self.prompter, &context.target_dir, self.options.force)?;
        if decision == GuardDecision::Abort {
            self.advance(WorkflowState::Aborted);
            return Ok(context);
        }

        let project = collector::collect(
            &mut *self.prompter,
            &context.catalog,
            self.options.project_name.as_deref(),
        )?;
        let context = context.with_project(project);
        self.advance(WorkflowState::Prepared);

        let descriptor = context.selected_template()?.clone();
        self.prompter.info(&format!(
            "Template: {} ({}@{})",
            descriptor.display_name, descriptor.package_name, descriptor.version
        ))?;
        let handle = acquire(&mut *self.prompter, self.packages, &self.layout, &descriptor).await?;
        let context = context.with_cache(handle);
        self.advance(WorkflowState::Downloaded);

        let handle = context
            .cache
            .as_ref()
            .ok_or_else(|| ScaffoldError::MissingTemplateInfo {
                package: descriptor.package_name.clone(),
            })?;
        materialize(&mut *self.prompter, handle, &descriptor, &context.target_dir).await?;
        self.advance(WorkflowState::Installed);

        self.advance(WorkflowState::Done);
        Ok(context)
    }

    fn advance(&mut self, next: WorkflowState) {
        tracing::debug!(from = ?self.state, to = ?next, "workflow transition");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::testing::{Call, FakePackageManager};
    use crate::prompt::testing::{Answer, Event, ScriptedPrompter};
    use crate::templates::{CatalogEntry, TemplateKind};
    use async_trait::async_trait;
    use std::fs;

    struct StaticCatalog(Option<Vec<CatalogEntry>>);

    #[async_trait]
    impl TemplateCatalog for StaticCatalog {
        async fn entries(&self) -> Result<Option<Vec<CatalogEntry>>> {
            Ok(self.0.clone())
        }
    }

    fn vue_catalog() -> StaticCatalog {
        StaticCatalog(Some(vec![CatalogEntry {
            name: "Vue Template".to_string(),
            npm_name: "tpl-vue".to_string(),
            version: "1.2.0".to_string(),
            kind: Some("normal".to_string()),
        }]))
    }

    fn project_answers() -> Vec<Answer> {
        vec![
            Answer::Select("project".to_string()),
            Answer::Input("demo-app".to_string()),
            Answer::Input(String::new()),
            Answer::Select("tpl-vue".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_end_to_end_normal_template() {
        let home = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        let layout = CacheLayout::new(&home.path().join(".liti"));
        let catalog = vue_catalog();
        let packages = FakePackageManager::new()
            .with_template_files(&[("package.json", "{}"), ("src/main.js", "app()")]);
        let mut prompter = ScriptedPrompter::with_answers(project_answers());

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            layout.clone(),
            InitOptions {
                target_dir: project_dir.path().to_path_buf(),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Done);
        assert!(outcome.error.is_none());

        let context = outcome.context.unwrap();
        let project = context.project.unwrap();
        assert_eq!(project.project_name, "demo-app");
        assert_eq!(project.project_version, "1.0.0");
        assert_eq!(
            context.cache.unwrap().cache_file_path,
            layout.package_cache_dir.join("_tpl-vue@1.2.0@tpl-vue")
        );

        assert_eq!(
            packages.calls(),
            vec![
                Call::Exists("tpl-vue@1.2.0".to_string()),
                Call::Install("tpl-vue@1.2.0".to_string()),
                Call::Exists("tpl-vue@1.2.0".to_string()),
            ]
        );
        assert_eq!(
            fs::read_to_string(project_dir.path().join("src/main.js")).unwrap(),
            "app()"
        );
        assert!(project_dir.path().join("package.json").is_file());
        assert!(prompter
            .events()
            .contains(&Event::Success("Template installed".to_string())));
        assert!(prompter.events().contains(&Event::Info(
            "Template: Vue Template (tpl-vue@1.2.0)".to_string()
        )));
        assert!(prompter.confirms().is_empty());
    }

    #[tokio::test]
    async fn test_empty_catalog_fails_before_any_prompt() {
        for catalog in [StaticCatalog(Some(vec![])), StaticCatalog(None)] {
            let home = tempfile::tempdir().unwrap();
            let packages = FakePackageManager::new();
            let mut prompter = ScriptedPrompter::with_answers(project_answers());

            let outcome = ScaffoldWorkflow::new(
                &mut prompter,
                &catalog,
                &packages,
                CacheLayout::new(home.path()),
                InitOptions {
                    target_dir: home.path().join("project"),
                    ..InitOptions::default()
                },
            )
            .run()
            .await;

            assert_eq!(outcome.state, WorkflowState::Failed);
            assert_eq!(
                outcome
                    .error
                    .as_ref()
                    .and_then(|e| e.downcast_ref::<ScaffoldError>()),
                Some(&ScaffoldError::CatalogEmpty)
            );
            assert!(!prompter.asked_anything());
            assert_eq!(
                prompter.events(),
                vec![Event::Error("No project templates are available".to_string())]
            );
            assert!(packages.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_declined_directory_aborts_cleanly() {
        let home = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        fs::write(project_dir.path().join("notes.txt"), "keep").unwrap();
        let catalog = vue_catalog();
        let packages = FakePackageManager::new();
        let mut prompter = ScriptedPrompter::with_answers([Answer::Confirm(false)]);

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: project_dir.path().to_path_buf(),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Aborted);
        assert!(outcome.error.is_none());
        assert!(project_dir.path().join("notes.txt").exists());
        assert!(packages.calls().is_empty());
        assert!(!prompter
            .events()
            .iter()
            .any(|e| matches!(e, Event::Error(_))));
    }

    #[tokio::test]
    async fn test_force_declined_clear_still_scaffolds() {
        let home = tempfile::tempdir().unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        fs::write(project_dir.path().join("notes.txt"), "keep").unwrap();
        let catalog = vue_catalog();
        let packages = FakePackageManager::new().with_template_files(&[("index.js", "")]);
        let mut answers = vec![Answer::Confirm(false)];
        answers.extend(project_answers());
        let mut prompter = ScriptedPrompter::with_answers(answers);

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: project_dir.path().to_path_buf(),
                project_name: None,
                force: true,
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Done);
        assert_eq!(
            prompter.confirms(),
            vec![guard::CONFIRM_CLEAR_MESSAGE.to_string()]
        );
        assert!(project_dir.path().join("notes.txt").exists());
        assert!(project_dir.path().join("index.js").exists());
    }

    #[tokio::test]
    async fn test_component_fails_before_acquisition() {
        let home = tempfile::tempdir().unwrap();
        let catalog = vue_catalog();
        let packages = FakePackageManager::new();
        let mut prompter =
            ScriptedPrompter::with_answers([Answer::Select("component".to_string())]);

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: home.path().join("project"),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Failed);
        assert!(packages.calls().is_empty());
        assert!(prompter.events().contains(&Event::Error(
            "Creating components is not supported yet".to_string()
        )));
    }

    #[tokio::test]
    async fn test_download_failure_is_reported_verbatim() {
        let home = tempfile::tempdir().unwrap();
        let catalog = vue_catalog();
        let packages = FakePackageManager::new().failing("connection refused");
        let mut prompter = ScriptedPrompter::with_answers(project_answers());

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: home.path().join("project"),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Failed);
        assert!(prompter
            .events()
            .contains(&Event::Error("connection refused".to_string())));
        assert!(!home.path().join("project").exists());
    }

    #[tokio::test]
    async fn test_custom_template_fails_after_download() {
        let home = tempfile::tempdir().unwrap();
        let catalog = StaticCatalog(Some(vec![CatalogEntry {
            name: "Custom".to_string(),
            npm_name: "tpl-custom".to_string(),
            version: "1.0.0".to_string(),
            kind: Some("custom".to_string()),
        }]));
        let packages = FakePackageManager::new();
        let mut prompter = ScriptedPrompter::with_answers([
            Answer::Select("project".to_string()),
            Answer::Input("demo".to_string()),
            Answer::Input(String::new()),
            Answer::Select("tpl-custom".to_string()),
        ]);

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: home.path().join("project"),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Failed);
        assert!(matches!(
            outcome
                .error
                .as_ref()
                .and_then(|e| e.downcast_ref::<ScaffoldError>()),
            Some(ScaffoldError::CustomTemplateUnsupported { .. })
        ));
        assert!(packages
            .calls()
            .contains(&Call::Install("tpl-custom@1.0.0".to_string())));
    }

    #[test]
    fn test_selected_template_must_be_in_catalog() {
        let context = WorkflowContext::new(PathBuf::from("/tmp/x"))
            .with_catalog(vec![TemplateDescriptor {
                display_name: "Vue Template".to_string(),
                package_name: "tpl-vue".to_string(),
                version: "1.2.0".to_string(),
                kind: TemplateKind::Normal,
            }])
            .with_project(ProjectInfo {
                artifact_kind: ArtifactKind::Project,
                project_name: "demo".to_string(),
                project_version: "1.0.0".to_string(),
                template_package: "tpl-react".to_string(),
            });

        let err = context.selected_template().unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScaffoldError>(),
            Some(&ScaffoldError::MissingTemplateInfo {
                package: "tpl-react".to_string()
            })
        );
    }

    #[test]
    fn test_selected_template_must_be_unique() {
        let vue = |display: &str, version: &str| TemplateDescriptor {
            display_name: display.to_string(),
            package_name: "tpl-vue".to_string(),
            version: version.to_string(),
            kind: TemplateKind::Normal,
        };
        let context = WorkflowContext::new(PathBuf::from("/tmp/x"))
            .with_catalog(vec![vue("Vue 1", "1.0.0"), vue("Vue 2", "2.0.0")])
            .with_project(ProjectInfo {
                artifact_kind: ArtifactKind::Project,
                project_name: "demo".to_string(),
                project_version: "1.0.0".to_string(),
                template_package: "tpl-vue".to_string(),
            });

        let err = context.selected_template().unwrap_err();
        assert_eq!(
            err.downcast_ref::<ScaffoldError>(),
            Some(&ScaffoldError::DuplicateTemplate {
                package: "tpl-vue".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_duplicate_catalog_fails_before_any_prompt() {
        let home = tempfile::tempdir().unwrap();
        let entry = |name: &str, version: &str| CatalogEntry {
            name: name.to_string(),
            npm_name: "tpl-vue".to_string(),
            version: version.to_string(),
            kind: None,
        };
        let catalog = StaticCatalog(Some(vec![entry("Vue 1", "1.0.0"), entry("Vue 2", "2.0.0")]));
        let packages = FakePackageManager::new();
        let mut prompter = ScriptedPrompter::with_answers(project_answers());

        let outcome = ScaffoldWorkflow::new(
            &mut prompter,
            &catalog,
            &packages,
            CacheLayout::new(home.path()),
            InitOptions {
                target_dir: home.path().join("project"),
                ..InitOptions::default()
            },
        )
        .run()
        .await;

        assert_eq!(outcome.state, WorkflowState::Failed);
        assert!(!prompter.asked_anything());
        assert!(packages.calls().is_empty());
    }

    #[test]
    fn test_setup_failure_is_reported_once() {
        let mut prompter = ScriptedPrompter::new();
        let error = anyhow::Error::new(ScaffoldError::HomeDirNotFound)
            .context("Failed to resolve the template cache");

        report_failure(&mut prompter, &error);

        assert_eq!(
            prompter.events(),
            vec![Event::Error(
                "Failed to resolve the template cache: Could not determine the user home directory"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(WorkflowState::Done.is_terminal());
        assert!(WorkflowState::Aborted.is_terminal());
        assert!(WorkflowState::Failed.is_terminal());
        assert!(!WorkflowState::Prepared.is_terminal());
    }
}
