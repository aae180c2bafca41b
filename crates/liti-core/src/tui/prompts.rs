//! Charm-style CLI prompts using cliclack

use crate::config::CacheLayout;
use crate::package::NpmRegistry;
use crate::product::ProductConfig;
use crate::prompt::{InputQuestion, Progress, Prompter, SelectQuestion};
use crate::templates::CatalogClient;
use crate::workflow::{report_failure, InitOptions, ScaffoldWorkflow, WorkflowState};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Project name offered as the default answer
    pub project_name: Option<String>,

    /// Skip the "continue into non-empty directory?" question
    pub force: bool,

    /// Local catalog file to use instead of the catalog service
    pub catalog_file: Option<PathBuf>,
}

/// [`Prompter`] rendering to the terminal with cliclack
#[derive(Debug, Default)]
pub struct CliclackPrompter;

impl CliclackPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for CliclackPrompter {
    fn select(&mut self, question: &SelectQuestion) -> Result<String> {
        let mut select = cliclack::select(&question.message);
        for choice in &question.choices {
            select = select.item(choice.value.clone(), &choice.label, "");
        }
        if let Some(default) = &question.default {
            select = select.initial_value(default.clone());
        }
        Ok(select.interact()?)
    }

    fn input(&mut self, question: &InputQuestion) -> Result<String> {
        let validate = question.validate;
        let mut input = cliclack::input(&question.message)
            .validate(move |value: &String| validate(value).map(|_| ()));
        if let Some(default) = question.default.as_deref().filter(|d| !d.is_empty()) {
            input = input.placeholder(default).default_input(default);
        }

        let raw: String = input.interact()?;
        // cliclack only accepts input the validator passed; this yields the normalized value
        validate(&raw).map_err(|message| anyhow::anyhow!(message))
    }

    fn confirm(&mut self, message: &str, initial: bool) -> Result<bool> {
        Ok(cliclack::confirm(message).initial_value(initial).interact()?)
    }

    fn spinner(&mut self, message: &str) -> Box<dyn Progress> {
        let spinner = cliclack::spinner();
        spinner.start(message);
        Box::new(Spinner(spinner))
    }

    fn info(&mut self, message: &str) -> Result<()> {
        Ok(cliclack::log::info(message)?)
    }

    fn success(&mut self, message: &str) -> Result<()> {
        Ok(cliclack::log::success(message)?)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        Ok(cliclack::log::error(message)?)
    }
}

struct Spinner(cliclack::ProgressBar);

impl Progress for Spinner {
    fn stop(&mut self, message: &str) {
        self.0.stop(message);
    }

    fn fail(&mut self, message: &str) {
        self.0.error(message);
    }
}

/// Collaborators of one run, resolved from the product config
struct Setup {
    catalog: CatalogClient,
    registry: NpmRegistry,
    layout: CacheLayout,
    target_dir: PathBuf,
}

impl Setup {
    fn from_config<C: ProductConfig>(
        config: &C,
        prompter: &mut dyn Prompter,
        args: &InitArgs,
    ) -> Result<Self> {
        let catalog = match &args.catalog_file {
            Some(path) => {
                prompter.info(&format!("Using local catalog {}", path.display()))?;
                CatalogClient::from_local(path.clone(), config.user_agent())
            }
            None => CatalogClient::from_config(config)?,
        };
        Ok(Self {
            catalog,
            registry: NpmRegistry::from_config(config)?,
            layout: CacheLayout::from_config(config)?,
            target_dir: std::env::current_dir()
                .context("Failed to read the current directory")?,
        })
    }
}

/// Run `init` with interactive prompts
///
/// Returns the terminal state of the workflow. Workflow errors have already
/// been shown to the user when this returns `WorkflowState::Failed`.
pub async fn run<C: ProductConfig>(config: &C, args: InitArgs) -> Result<WorkflowState> {
    cliclack::intro(config.display_name())?;

    let mut prompter = CliclackPrompter::new();
    let Setup {
        catalog,
        registry,
        layout,
        target_dir,
    } = match Setup::from_config(config, &mut prompter, &args) {
        Ok(setup) => setup,
        Err(e) => {
            report_failure(&mut prompter, &e);
            cliclack::outro_cancel("Initialization failed")?;
            return Ok(WorkflowState::Failed);
        }
    };

    tracing::debug!(
        project = args.project_name.as_deref().unwrap_or_default(),
        force = args.force,
        "starting init"
    );

    let outcome = ScaffoldWorkflow::new(
        &mut prompter,
        &catalog,
        &registry,
        layout,
        InitOptions {
            target_dir: target_dir.clone(),
            project_name: args.project_name,
            force: args.force,
        },
    )
    .run()
    .await;

    match outcome.state {
        WorkflowState::Done => {
            let name = outcome
                .context
                .as_ref()
                .and_then(|c| c.project.as_ref())
                .map(|p| p.project_name.clone())
                .unwrap_or_default();
            cliclack::outro(format!("Created {} in {}", name, target_dir.display()))?;
        }
        WorkflowState::Aborted => cliclack::outro_cancel("Initialization cancelled")?,
        _ => cliclack::outro_cancel("Initialization failed")?,
    }

    Ok(outcome.state)
}
