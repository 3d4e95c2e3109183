//! Advisory vocabularies offered when entering risks
//!
//! Values outside the catalog are still accepted by the store; the catalog
//! only feeds prompts and warnings.

use serde::{Deserialize, Serialize};

const DEFAULT_CATEGORIES: &[&str] = &[
    "Land availability and site access",
    "Environmental",
    "Social",
    "Design",
    "Construction",
    "Scope changes",
    "Operational demand",
    "Market",
    "Strategic/partnership",
    "Force majeure",
    "Material adverse government action",
    "Legislation changes",
    "Financial",
    "Systems and technology",
];

const DEFAULT_EXPOSURES: &[&str] = &[
    "Affects one service",
    "Affects one work package",
    "Affects several work packages",
    "Affects the site",
    "Affects final delivery to the client",
    "Affects several sites",
    "Affects the whole company",
    "Affects the company's image",
];

const DEFAULT_AREAS: &[&str] = &[
    "Site",
    "Planning",
    "Logistics",
    "Budgeting",
    "Development",
    "Products",
    "Procurement",
    "Quality",
    "Sales",
];

/// Which vocabulary a catalog operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Category,
    Exposure,
    Area,
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogKind::Category => write!(f, "category"),
            CatalogKind::Exposure => write!(f, "exposure"),
            CatalogKind::Area => write!(f, "area"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub exposures: Vec<String>,

    #[serde(default)]
    pub areas: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|s| s.to_string()).collect()
        }
        Self {
            categories: owned(DEFAULT_CATEGORIES),
            exposures: owned(DEFAULT_EXPOSURES),
            areas: owned(DEFAULT_AREAS),
        }
    }
}

impl Catalog {
    pub fn values(&self, kind: CatalogKind) -> &[String] {
        match kind {
            CatalogKind::Category => &self.categories,
            CatalogKind::Exposure => &self.exposures,
            CatalogKind::Area => &self.areas,
        }
    }

    fn values_mut(&mut self, kind: CatalogKind) -> &mut Vec<String> {
        match kind {
            CatalogKind::Category => &mut self.categories,
            CatalogKind::Exposure => &mut self.exposures,
            CatalogKind::Area => &mut self.areas,
        }
    }

    /// Add a trimmed value; returns false for blanks and duplicates
    pub fn add(&mut self, kind: CatalogKind, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        let values = self.values_mut(kind);
        if values.iter().any(|v| v == value) {
            return false;
        }
        values.push(value.to_string());
        true
    }

    /// Remove an exact value; returns whether anything was removed
    pub fn remove(&mut self, kind: CatalogKind, value: &str) -> bool {
        let values = self.values_mut(kind);
        let before = values.len();
        values.retain(|v| v != value);
        values.len() != before
    }

    /// Whether a value is known; empty values always pass
    pub fn contains(&self, kind: CatalogKind, value: &str) -> bool {
        value.is_empty() || self.values(kind).iter().any(|v| v == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seeded() {
        let catalog = Catalog::default();
        assert_eq!(catalog.categories.len(), 14);
        assert_eq!(catalog.exposures.len(), 8);
        assert_eq!(catalog.areas.len(), 9);
        assert!(catalog.contains(CatalogKind::Area, "Procurement"));
    }

    #[test]
    fn test_add_trims_and_dedups() {
        let mut catalog = Catalog::default();
        assert!(catalog.add(CatalogKind::Exposure, "  Affects one supplier "));
        assert!(catalog.contains(CatalogKind::Exposure, "Affects one supplier"));
        assert!(!catalog.add(CatalogKind::Exposure, "Affects one supplier"));
        assert!(!catalog.add(CatalogKind::Exposure, "   "));
        assert_eq!(catalog.exposures.len(), 9);
    }

    #[test]
    fn test_remove_exact_match() {
        let mut catalog = Catalog::default();
        assert!(!catalog.remove(CatalogKind::Category, "market"));
        assert!(catalog.remove(CatalogKind::Category, "Market"));
        assert!(!catalog.contains(CatalogKind::Category, "Market"));
        assert!(catalog.contains(CatalogKind::Category, ""));
    }
}
