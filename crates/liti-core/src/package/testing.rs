//! In-memory package manager backed by a real store directory

use super::npm::cache_dir;
use super::{PackageManager, PackageSpec, TemplatePackage};
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    Install(String),
    Update(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    fail_with: Option<String>,
    skip_writes: bool,
    files: Vec<(String, String)>,
}

/// Writes `template/` files into the store on install
#[derive(Clone, Default)]
pub struct FakePackageManager {
    state: Arc<Mutex<State>>,
}

impl FakePackageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files (relative to the package's `template/` folder) written on install
    pub fn with_template_files(self, files: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    /// Make install and update fail with this message
    pub fn failing(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_with = Some(message.to_string());
        self
    }

    /// Make install and update report success without writing the package
    pub fn without_writes(self) -> Self {
        self.state.lock().unwrap().skip_writes = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl PackageManager for FakePackageManager {
    fn package(&self, spec: PackageSpec) -> Box<dyn TemplatePackage> {
        Box::new(FakePackage {
            spec,
            state: Arc::clone(&self.state),
        })
    }
}

struct FakePackage {
    spec: PackageSpec,
    state: Arc<Mutex<State>>,
}

impl FakePackage {
    fn key(&self) -> String {
        format!("{}@{}", self.spec.package_name, self.spec.package_version)
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.fail_with {
            Some(message) => Err(anyhow::anyhow!("{}", message)),
            None => Ok(()),
        }
    }

    fn write_package(&self) -> Result<()> {
        if self.state.lock().unwrap().skip_writes {
            return Ok(());
        }
        let template = self.cache_file_path().join("template");
        std::fs::create_dir_all(&template)?;
        for (path, content) in &self.state.lock().unwrap().files {
            let target = template.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, content)?;
        }
        Ok(())
    }
}

#[async_trait]
impl TemplatePackage for FakePackage {
    async fn exists(&mut self) -> Result<bool> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::Exists(self.key()));
        Ok(self.cache_file_path().exists())
    }

    async fn install(&mut self) -> Result<()> {
        self.record(Call::Install(self.key()))?;
        self.write_package()
    }

    async fn update(&mut self) -> Result<()> {
        self.record(Call::Update(self.key()))?;
        self.write_package()
    }

    fn cache_file_path(&self) -> PathBuf {
        cache_dir(
            &self.spec.store_dir,
            &self.spec.package_name,
            &self.spec.package_version,
        )
    }

    fn version(&self) -> &str {
        &self.spec.package_version
    }
}
