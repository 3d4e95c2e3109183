//! Workbook files - the command line's persistent copy of a register
//!
//! A workbook is a single YAML document holding the global sensitivity, the
//! advisory catalog and the ordered risk records. Derived values are stored
//! as last committed by the store; loading never recalculates them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::catalog::Catalog;
use crate::core::config::Config;
use crate::core::identity::RiskId;
use crate::core::store::{RiskStore, DEFAULT_SENSITIVITY};
use crate::entities::risk::Risk;
use crate::yaml::YamlSyntaxError;

/// File name looked up when no workbook is named explicitly
pub const DEFAULT_WORKBOOK: &str = "risk-register.yaml";

/// On-disk layout of a workbook
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default = "default_sensitivity")]
    sensitivity: f64,

    #[serde(default)]
    catalog: Catalog,

    #[serde(default)]
    risks: Vec<Risk>,
}

fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}

/// A loaded workbook: the store plus where it came from
#[derive(Debug)]
pub struct Workbook {
    path: PathBuf,
    store: RiskStore,
    catalog: Catalog,
}

impl Workbook {
    /// Resolve the workbook path from the flag, config, or by discovery
    pub fn locate(explicit: Option<&Path>, config: &Config) -> Result<PathBuf, WorkbookError> {
        if let Some(path) = explicit.map(Path::to_path_buf).or_else(|| config.workbook.clone()) {
            return Ok(path);
        }
        let current = std::env::current_dir().map_err(WorkbookError::Io)?;
        Self::discover_from(&current)
    }

    /// Find a workbook by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<PathBuf, WorkbookError> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(DEFAULT_WORKBOOK);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(WorkbookError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open the workbook at a resolved path
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        if !path.exists() {
            return Err(WorkbookError::Missing(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(WorkbookError::Io)?;
        Self::from_yaml(path, &contents)
    }

    /// Locate and open in one step
    pub fn load(explicit: Option<&Path>, config: &Config) -> Result<Self, WorkbookError> {
        let path = Self::locate(explicit, config)?;
        Self::open(&path)
    }

    fn from_yaml(path: &Path, contents: &str) -> Result<Self, WorkbookError> {
        let file: WorkbookFile = if contents.trim().is_empty() {
            WorkbookFile {
                sensitivity: DEFAULT_SENSITIVITY,
                catalog: Catalog::default(),
                risks: Vec::new(),
            }
        } else {
            serde_yml::from_str(contents).map_err(|e| {
                WorkbookError::Yaml(YamlSyntaxError::from_serde_error(
                    &e,
                    contents,
                    &path.display().to_string(),
                ))
            })?
        };

        let mut seen = HashSet::with_capacity(file.risks.len());
        if let Some(dup) = file.risks.iter().find(|r| !seen.insert(r.id)) {
            return Err(WorkbookError::DuplicateId(dup.id));
        }

        debug!(path = %path.display(), risks = file.risks.len(), "opened workbook");
        Ok(Self {
            path: path.to_path_buf(),
            store: RiskStore::from_records(file.risks, file.sensitivity),
            catalog: file.catalog,
        })
    }

    /// Create a new, empty workbook file
    pub fn create(path: &Path, sensitivity: f64, force: bool) -> Result<Self, WorkbookError> {
        if path.exists() && !force {
            return Err(WorkbookError::AlreadyExists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(WorkbookError::Io)?;
        }
        let workbook = Self {
            path: path.to_path_buf(),
            store: RiskStore::new(sensitivity),
            catalog: Catalog::default(),
        };
        workbook.save()?;
        Ok(workbook)
    }

    /// Write the current snapshot back to disk
    pub fn save(&self) -> Result<(), WorkbookError> {
        let file = WorkbookFile {
            sensitivity: self.store.sensitivity(),
            catalog: self.catalog.clone(),
            risks: self.store.records().to_vec(),
        };
        let yaml = serde_yml::to_string(&file).map_err(|e| WorkbookError::Serialize(e.to_string()))?;
        std::fs::write(&self.path, yaml).map_err(WorkbookError::Io)?;
        debug!(path = %self.path.display(), risks = self.store.len(), "saved workbook");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &RiskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RiskStore {
        &mut self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }
}

/// Errors from finding, reading or writing a workbook
#[derive(Debug, Error, miette::Diagnostic)]
pub enum WorkbookError {
    #[error("no risk-register.yaml found (searched from {searched_from:?})")]
    #[diagnostic(
        code(riskreg::workbook::not_found),
        help("Run 'riskreg init' to create one, or pass --workbook")
    )]
    NotFound { searched_from: PathBuf },

    #[error("workbook does not exist: {0:?}")]
    #[diagnostic(code(riskreg::workbook::missing))]
    Missing(PathBuf),

    #[error("workbook already exists at {0:?}")]
    #[diagnostic(code(riskreg::workbook::exists), help("Use --force to overwrite it"))]
    AlreadyExists(PathBuf),

    #[error("duplicate risk id in workbook: {0}")]
    #[diagnostic(code(riskreg::workbook::duplicate_id))]
    DuplicateId(RiskId),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(YamlSyntaxError),

    #[error("failed to serialize workbook: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::field::RiskField;
    use crate::entities::risk::{Nature, NewRisk};
    use tempfile::tempdir;

    #[test]
    fn test_create_and_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_WORKBOOK);

        let mut wb = Workbook::create(&path, 85.0, false).unwrap();
        let id = wb
            .store_mut()
            .add_record(NewRisk::new("Late delivery", Some(Nature::Threat)));
        wb.store_mut().update_field(&id, RiskField::Probability, "35%");
        wb.store_mut().update_field(&id, RiskField::FinancialImpact, "50000");
        wb.save().unwrap();

        let reopened = Workbook::open(&path).unwrap();
        assert_eq!(reopened.store().sensitivity(), 85.0);
        assert_eq!(reopened.store().records(), wb.store().records());
        assert_eq!(reopened.catalog(), &Catalog::default());
    }

    #[test]
    fn test_unranked_priorities_survive_reopen() {
        use crate::core::quantity::Rank;
        use crate::core::{Percent, PreventionInput};

        let tmp = tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_WORKBOOK);

        let mut wb = Workbook::create(&path, 100.0, false).unwrap();
        let planned = wb
            .store_mut()
            .add_record(NewRisk::new("Crane breakdown", Some(Nature::Threat)));
        let idle = wb
            .store_mut()
            .add_record(NewRisk::new("Permit delay", Some(Nature::Threat)));
        let unset = wb.store_mut().add_record(NewRisk::new("Rumour", None));
        wb.store_mut()
            .update_field(&unset, RiskField::FinancialImpact, "1000");
        wb.store_mut().apply_prevention_plan(
            &planned,
            PreventionInput {
                new_probability: Some(Percent::new(20.0)),
                new_impact: 1000.0,
                ..Default::default()
            },
        );
        assert_eq!(
            wb.store().get(&idle).unwrap().prevention.new_priority,
            Some(Rank::Unranked)
        );
        assert_eq!(
            wb.store().get(&unset).unwrap().quantitative.priority,
            Some(Rank::Unranked)
        );
        wb.save().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("priority: -"));

        let reopened = Workbook::open(&path).unwrap();
        assert_eq!(reopened.store().records(), wb.store().records());
    }

    #[test]
    fn test_create_refuses_overwrite_without_force() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("book.yaml");
        Workbook::create(&path, 100.0, false).unwrap();
        assert!(matches!(
            Workbook::create(&path, 100.0, false),
            Err(WorkbookError::AlreadyExists(_))
        ));
        assert!(Workbook::create(&path, 50.0, true).is_ok());
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join(DEFAULT_WORKBOOK), "").unwrap();

        let found = Workbook::discover_from(&nested).unwrap();
        assert_eq!(found, tmp.path().join(DEFAULT_WORKBOOK));
    }

    #[test]
    fn test_empty_file_is_empty_register() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("book.yaml");
        std::fs::write(&path, "\n").unwrap();
        let wb = Workbook::open(&path).unwrap();
        assert!(wb.store().is_empty());
        assert_eq!(wb.store().sensitivity(), DEFAULT_SENSITIVITY);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("book.yaml");
        let id = RiskId::new();
        std::fs::write(
            &path,
            format!("risks:\n  - id: {id}\n  - id: {id}\n"),
        )
        .unwrap();
        assert!(matches!(
            Workbook::open(&path),
            Err(WorkbookError::DuplicateId(dup)) if dup == id
        ));
    }

    #[test]
    fn test_bad_yaml_is_diagnostic() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("book.yaml");
        std::fs::write(&path, "sensitivity: [1, 2\n").unwrap();
        assert!(matches!(Workbook::open(&path), Err(WorkbookError::Yaml(_))));
    }
}
