//! Activates extensions named by manifest files in a directory.
//!
//! Every `<name>.toml` file in the directory selects the built-in extension `<name>`.  The file
//! may be empty; `enabled = false` skips the extension.  Anything else in the directory is not a
//! manifest and is ignored.  One bad manifest never stops the others from loading.

use crate::plugin::{Registry, Setup};
use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{debug, error, info};

const MANIFEST_EXTENSION: &str = "toml";

#[derive(serde::Deserialize)]
struct Manifest {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Where an extension got to during this boot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleState {
    Discovered,
    Loading,
    Registered,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub modules: Vec<(String, ModuleState)>,
}

impl LoadReport {
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.modules
            .iter()
            .filter(|(_, state)| *state == ModuleState::Registered)
            .map(|(name, _)| name.as_str())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().filter_map(|(name, state)| match state {
            ModuleState::Failed(err) => Some((name.as_str(), err.as_str())),
            _ => None,
        })
    }
}

/// Load the extensions `dir` asks for, or every one in `catalog` when there is no directory.
///
/// Only an unreadable directory is an error; per-extension failures end up in the report.
pub async fn load_extensions(
    dir: Option<&Path>,
    catalog: &[(&'static str, Setup)],
    registry: &mut Registry,
) -> Result<LoadReport> {
    let names = match dir {
        Some(dir) => discover(dir).await?,
        None => catalog.iter().map(|(name, _)| name.to_string()).collect(),
    };

    let mut report = LoadReport::default();
    for name in names {
        let mut module = Module::discovered(name);

        let manifest = match dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", module.name, MANIFEST_EXTENSION));
                match read_manifest(&path).await {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        report.push(module.finish(Err(e)));
                        continue;
                    }
                }
            }
            None => Manifest { enabled: true },
        };

        if !manifest.enabled {
            info!("Skipping disabled extension '{}'", module.name);
            continue;
        }

        module.transition(ModuleState::Loading);
        let outcome = load_one(&module.name, catalog, registry);
        report.push(module.finish(outcome));
    }

    Ok(report)
}

struct Module {
    name: String,
    state: ModuleState,
}

impl Module {
    fn discovered(name: String) -> Self {
        debug!("Discovered extension '{}'", name);
        Self {
            name,
            state: ModuleState::Discovered,
        }
    }

    fn transition(&mut self, to: ModuleState) {
        debug!("Extension '{}': {:?} -> {:?}", self.name, self.state, to);
        self.state = to;
    }

    fn finish(mut self, outcome: Result<()>) -> Self {
        match outcome {
            Ok(()) => {
                info!("Loaded extension '{}'", self.name);
                self.transition(ModuleState::Registered);
            }
            Err(e) => {
                error!("Failed to load extension {}: {}", self.name, e);
                self.transition(ModuleState::Failed(e.to_string()));
            }
        }
        self
    }
}

impl LoadReport {
    fn push(&mut self, module: Module) {
        self.modules.push((module.name, module.state));
    }
}

/// Manifest names in `dir`, sorted so boot order does not depend on the filesystem
async fn discover(dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        anyhow!(
            "Could not read extension directory `{}`: {}",
            dir.to_string_lossy(),
            e
        )
    })?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(MANIFEST_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_owned());
        }
    }

    names.sort();
    Ok(names)
}

async fn read_manifest(path: &Path) -> Result<Manifest> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(toml::from_str(&contents)?)
}

/// Run the extension's setup on a scratch registry so a failure leaves `registry` untouched
fn load_one(name: &str, catalog: &[(&'static str, Setup)], registry: &mut Registry) -> Result<()> {
    let (_, setup) = catalog
        .iter()
        .find(|(known, _)| *known == name)
        .ok_or(anyhow!("No extension named '{}'", name))?;

    let mut scratch = Registry::new();
    setup(&mut scratch)?;
    registry.merge(scratch)
}
