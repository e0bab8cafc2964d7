//! Normalization engine: turns the raw row matrix of one sheet into a flat,
//! ordered list of [`CoverageRecord`]s.
//!
//! Two sheet layouts are supported:
//! - state-keyed: `Carrier, IL, IN, ...` with one column per jurisdiction,
//!   interpreted under a [`Category`];
//! - building-type keyed: `Carrier, SFR's (1-4 Units), 4+ units` with the
//!   jurisdiction list supplied by the caller (commercial lines).
//!
//! Structural problems (bad header, unknown jurisdiction or category) fail the
//! whole call before any data row is read. Odd cell text never fails.

pub mod header;
pub mod jurisdiction;
pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::{CoverageRecord, NormalizeError, RawRow};

pub use jurisdiction::is_valid_jurisdiction;
pub use rules::{canonical_key, BuildingType, Category, NoFramePolicy};

/// Caller options selecting the sheet layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Category of a state-keyed sheet. Takes precedence over `jurisdictions`.
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    /// Jurisdictions a building-type keyed sheet applies to.
    #[serde(default, alias = "states")]
    pub jurisdictions: Option<Vec<String>>,
    #[serde(default)]
    pub no_frame: NoFramePolicy,
}

impl NormalizeOptions {
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn for_jurisdictions<I, S>(jurisdictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            jurisdictions: Some(jurisdictions.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_no_frame(mut self, policy: NoFramePolicy) -> Self {
        self.no_frame = policy;
        self
    }

    /// Resolve the options into exactly one layout.
    pub fn layout(&self) -> Result<SheetLayout, NormalizeError> {
        match self.category.as_deref().filter(|c| !c.is_empty()) {
            Some(category) => Ok(SheetLayout::StateKeyed(category.parse()?)),
            None => Ok(SheetLayout::BuildingTypeKeyed(
                self.jurisdictions.clone().unwrap_or_default(),
            )),
        }
    }
}

/// The two row-interpretation strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLayout {
    StateKeyed(Category),
    BuildingTypeKeyed(Vec<String>),
}

/// Normalize a sheet. `rows[0]` is always the header and never produces
/// records.
pub fn normalize(
    rows: &[RawRow],
    options: &NormalizeOptions,
) -> Result<Vec<CoverageRecord>, NormalizeError> {
    match options.layout()? {
        SheetLayout::StateKeyed(category) => normalize_state_keyed(rows, category),
        SheetLayout::BuildingTypeKeyed(jurisdictions) => {
            normalize_building_type_keyed(rows, &jurisdictions, options.no_frame)
        }
    }
}

/// State-keyed layout: each column after the carrier is one jurisdiction.
pub fn normalize_state_keyed(
    rows: &[RawRow],
    category: Category,
) -> Result<Vec<CoverageRecord>, NormalizeError> {
    let jurisdictions = header::jurisdiction_columns(rows.first())?;

    let columns: &[String] = &jurisdictions;
    let records = data_rows(rows)
        .flat_map(move |(carrier, cells)| {
            columns
                .iter()
                .zip(cells)
                .filter(|(_, cell)| !cell.is_empty())
                .flat_map(move |(jurisdiction, cell)| {
                    rules::transform_keyed(category, carrier, jurisdiction, cell)
                })
        })
        .collect::<Vec<_>>();

    debug!(
        category = %category,
        columns = jurisdictions.len(),
        records = records.len(),
        "Normalized state-keyed sheet"
    );
    Ok(records)
}

/// Building-type keyed layout: every non-empty cell fans out across all of
/// the supplied jurisdictions.
pub fn normalize_building_type_keyed(
    rows: &[RawRow],
    jurisdictions: &[String],
    no_frame: NoFramePolicy,
) -> Result<Vec<CoverageRecord>, NormalizeError> {
    if let Some(code) = jurisdictions.iter().find(|c| !is_valid_jurisdiction(c)) {
        return Err(NormalizeError::InvalidJurisdiction { code: code.clone() });
    }
    header::building_type_columns(rows.first())?;

    let records = data_rows(rows)
        .flat_map(move |(carrier, cells)| {
            [BuildingType::Sfr, BuildingType::MultiUnit]
                .into_iter()
                .zip(cells)
                .filter(|(_, cell)| !cell.is_empty())
                .flat_map(move |(building_type, cell)| {
                    rules::transform_commercial(building_type, carrier, jurisdictions, cell, no_frame)
                })
        })
        .collect::<Vec<_>>();

    debug!(
        jurisdictions = jurisdictions.len(),
        records = records.len(),
        "Normalized building-type sheet"
    );
    Ok(records)
}

/// Data rows as `(carrier, cells after the carrier)`. Rows without a carrier
/// name are spacer rows and are skipped.
fn data_rows(rows: &[RawRow]) -> impl Iterator<Item = (&str, &[String])> {
    rows.iter().skip(1).filter_map(|row| match row.split_first() {
        Some((carrier, cells)) if !carrier.trim().is_empty() => Some((carrier.as_str(), cells)),
        _ => None,
    })
}
