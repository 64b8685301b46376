use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plan_core::SavedPlan;

use crate::SelectionStore;

/// In-memory store. Counts saves so callers can check persistence happened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub saved: Option<SavedPlan>,
    pub save_count: usize,
}

impl MemoryStore {
    pub fn with_plan(plan: SavedPlan) -> Self {
        Self {
            saved: Some(plan),
            save_count: 0,
        }
    }
}

impl SelectionStore for MemoryStore {
    fn load(&mut self) -> Option<SavedPlan> {
        self.saved.clone()
    }

    fn save(&mut self, plan: &SavedPlan) {
        self.saved = Some(plan.clone());
        self.save_count += 1;
    }
}

/// Plan stored as pretty JSON at a fixed path. A missing file loads as no
/// plan; unreadable files and failed writes are logged and ignored.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_plan(&self) -> Result<Option<SavedPlan>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let plan = serde_json::from_str(&json)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(plan))
    }

    fn write_plan(&self, plan: &SavedPlan) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(plan).context("serializing plan")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

impl SelectionStore for JsonFileStore {
    fn load(&mut self) -> Option<SavedPlan> {
        match self.read_plan() {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!("ignoring saved plan: {err:#}");
                None
            }
        }
    }

    fn save(&mut self, plan: &SavedPlan) {
        if let Err(err) = self.write_plan(plan) {
            tracing::warn!("plan not saved: {err:#}");
        }
    }
}
