//! Technology classification: identifier → (label, color).
//!
//! Identifiers are fixed-width: a 3-character domain prefix, a 3-character
//! type code and a 3-character country code, optionally followed by more
//! characters that are ignored here (e.g. `PWRCOAIND01`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ClassifySection;
use crate::error::{Error, Result};
use crate::types::{AnnualRecord, ClassifiedRow};

/// Which view a label is built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    /// Labels are bare type codes; countries are merged.
    System,
    /// Only this country's technologies, labeled `CC-TTT`.
    Country(String),
}

impl Scope {
    pub fn country(&self) -> Option<&str> {
        match self {
            Scope::System => None,
            Scope::Country(c) => Some(c.as_str()),
        }
    }
}

/// The typed sub-fields of a technology identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnologyId {
    pub domain: String,
    pub type_code: String,
    pub country: String,
}

impl TechnologyId {
    /// Splits an identifier into its fixed-width fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTechnology`] if the identifier is shorter than
    /// 9 characters or not ASCII.
    pub fn parse(identifier: &str) -> Result<Self> {
        if identifier.len() < 9 || !identifier.is_ascii() {
            return Err(Error::MalformedTechnology(identifier.to_string()));
        }
        Ok(Self {
            domain: identifier[0..3].to_string(),
            type_code: identifier[3..6].to_string(),
            country: identifier[6..9].to_string(),
        })
    }

    /// Display label for the given scope.
    pub fn label(&self, scope: &Scope) -> String {
        match scope {
            Scope::System => self.type_code.clone(),
            Scope::Country(_) => format!("{}-{}", self.country, self.type_code),
        }
    }
}

/// One row of `color_codes.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct ColorCode {
    pub tech_id: String,
    pub colour: String,
}

/// Type code → display color.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: HashMap<String, String>,
}

impl ColorTable {
    /// Builds the table. A type code listed twice keeps its last color.
    pub fn new(codes: impl IntoIterator<Item = ColorCode>) -> Self {
        let mut colors = HashMap::new();
        for code in codes {
            if let Some(prev) = colors.insert(code.tech_id.clone(), code.colour) {
                warn!(
                    tech_id = %code.tech_id,
                    previous = %prev,
                    "duplicate color code, keeping last"
                );
            }
        }
        Self { colors }
    }

    pub fn get(&self, type_code: &str) -> Option<&str> {
        self.colors.get(type_code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Result of classifying one identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub color: Option<String>,
}

/// Filters identifiers to the reported domain and assigns labels and colors.
#[derive(Debug, Clone)]
pub struct TechnologyClassifier {
    domain_prefix: String,
    transmission_marker: String,
    colors: ColorTable,
}

impl TechnologyClassifier {
    pub fn new(conventions: &ClassifySection, colors: ColorTable) -> Self {
        Self {
            domain_prefix: conventions.domain_prefix.clone(),
            transmission_marker: conventions.transmission_marker.clone(),
            colors,
        }
    }

    /// Whether an identifier belongs to the reported domain at all.
    ///
    /// Transmission identifiers are excluded regardless of prefix.
    pub fn in_scope(&self, identifier: &str) -> bool {
        !identifier.contains(&self.transmission_marker)
            && identifier.starts_with(&self.domain_prefix)
    }

    /// Classifies one identifier.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Raw technology identifier, e.g. `"PWRCOAIND"`
    /// * `scope` - System view or a single country
    ///
    /// # Returns
    ///
    /// `Ok(None)` for identifiers outside the domain, carrying the
    /// transmission marker, or belonging to another country than `scope`.
    /// A missing color is `color: None`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTechnology`] for an in-scope identifier too
    /// short to carry type and country codes.
    pub fn classify(&self, identifier: &str, scope: &Scope) -> Result<Option<Classification>> {
        if !self.in_scope(identifier) {
            return Ok(None);
        }
        let id = TechnologyId::parse(identifier)?;
        if let Some(country) = scope.country() {
            if id.country != country {
                return Ok(None);
            }
        }
        Ok(Some(Classification {
            label: id.label(scope),
            color: self.colors.get(&id.type_code).map(str::to_string),
        }))
    }

    /// Classifies annual records, dropping those out of scope.
    pub fn classify_annual(
        &self,
        records: &[AnnualRecord],
        scope: &Scope,
    ) -> Result<Vec<ClassifiedRow>> {
        let mut rows = Vec::with_capacity(records.len());
        for r in records {
            if let Some(c) = self.classify(&r.technology, scope)? {
                rows.push(ClassifiedRow {
                    label: c.label,
                    color: c.color,
                    year: r.year,
                    value: r.value,
                });
            }
        }
        Ok(rows)
    }
}
