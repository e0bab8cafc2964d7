//! Cell transformers: the rule tables that turn one free-text sheet cell into
//! coverage records.
//!
//! Every cell is reduced to a canonical key before lookup so that spacing and
//! apostrophe variants ("Yes -PL's", "YES - PL’S") hit the same rule. Carrier
//! and jurisdiction strings are never rewritten.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::constants::{
    APARTMENT, AUTO, CL_SUFFIX, FIRE, FLOOD, ILLINOIS, MULTI_UNIT, NO_FRAME_SUFFIX, PL_SUFFIX, SFR,
    UNKNOWN,
};
use crate::common::{CoverageRecord, NormalizeError};

static HYPHEN_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").expect("valid regex"));

/// Category of a state-keyed sheet. Commercial-lines sheets are keyed by
/// building type instead and go through [`transform_commercial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Flood,
    #[serde(rename = "PL")]
    PersonalLines,
    Apartment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Flood => "FLOOD",
            Category::PersonalLines => "PL",
            Category::Apartment => "APARTMENT",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FLOOD" => Ok(Category::Flood),
            "PL" => Ok(Category::PersonalLines),
            "APARTMENT" => Ok(Category::Apartment),
            _ => Err(NormalizeError::UnknownCategory {
                category: s.to_string(),
            }),
        }
    }
}

/// Building-type column of a commercial-lines sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildingType {
    Sfr,
    MultiUnit,
}

impl BuildingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingType::Sfr => SFR,
            BuildingType::MultiUnit => MULTI_UNIT,
        }
    }
}

/// How many records an "IL (no frame)" cell produces.
///
/// The production feed has always carried two identical records for it;
/// `Single` drops the duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoFramePolicy {
    #[default]
    Duplicate,
    Single,
}

impl NoFramePolicy {
    fn copies(self) -> usize {
        match self {
            NoFramePolicy::Duplicate => 2,
            NoFramePolicy::Single => 1,
        }
    }
}

/// Output shape of a recognized commercial-lines cell.
#[derive(Debug, Clone, Copy)]
enum CommercialRule {
    /// One record per supplied jurisdiction, `<type><suffix>`
    EachJurisdiction { suffix: &'static str },
    /// Records pinned to Illinois regardless of the supplied jurisdictions
    IllinoisOnly,
    IllinoisNoFrame,
}

const KEYED_RULES: &[(Category, &str, &[&str])] = &[
    (Category::Flood, "YES", &[FLOOD]),
    (Category::Apartment, "YES", &[APARTMENT]),
    (Category::PersonalLines, "BOTH", &[FIRE, AUTO]),
    (Category::PersonalLines, "FIRE/FLOOD", &[FIRE, FLOOD]),
];

const COMMERCIAL_RULES: &[(&str, CommercialRule)] = &[
    ("YES", CommercialRule::EachJurisdiction { suffix: "" }),
    ("IL ONLY", CommercialRule::IllinoisOnly),
    ("IL (NO FRAME)", CommercialRule::IllinoisNoFrame),
    ("YES - PL'S", CommercialRule::EachJurisdiction { suffix: PL_SUFFIX }),
    ("YES - CL'S", CommercialRule::EachJurisdiction { suffix: CL_SUFFIX }),
];

/// Reduce a cell to the key used for rule lookup: uppercase, trimmed, single
/// spaced, `" - "` around hyphens and plain apostrophes.
pub fn canonical_key(raw: &str) -> String {
    let folded = raw.replace(['\u{2018}', '\u{2019}'], "'").to_uppercase();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    HYPHEN_SPACING.replace_all(&collapsed, " - ").into_owned()
}

/// Transform one cell of a state-keyed sheet. Unrecognized text is echoed
/// back uppercased as the coverage label.
pub fn transform_keyed(
    category: Category,
    carrier: &str,
    jurisdiction: &str,
    cell: &str,
) -> Vec<CoverageRecord> {
    let key = canonical_key(cell);

    match KEYED_RULES
        .iter()
        .find(|(rule_category, rule_key, _)| *rule_category == category && *rule_key == key)
    {
        Some((_, _, labels)) => labels
            .iter()
            .map(|label| CoverageRecord::new(carrier, jurisdiction, *label))
            .collect(),
        None => vec![CoverageRecord::new(carrier, jurisdiction, cell.to_uppercase())],
    }
}

/// Transform one building-type cell of a commercial-lines sheet, fanning out
/// across every supplied jurisdiction. Unrecognized text yields `UNKNOWN`
/// for each jurisdiction.
pub fn transform_commercial(
    building_type: BuildingType,
    carrier: &str,
    jurisdictions: &[String],
    cell: &str,
    no_frame: NoFramePolicy,
) -> Vec<CoverageRecord> {
    let key = canonical_key(cell);
    let base = building_type.as_str();
    let rule = COMMERCIAL_RULES
        .iter()
        .find(|(rule_key, _)| *rule_key == key)
        .map(|(_, rule)| *rule);

    let each = |coverage: &str| -> Vec<CoverageRecord> {
        jurisdictions
            .iter()
            .map(|jurisdiction| CoverageRecord::new(carrier, jurisdiction.as_str(), coverage))
            .collect()
    };

    match rule {
        Some(CommercialRule::EachJurisdiction { suffix }) => each(&format!("{base}{suffix}")),
        Some(CommercialRule::IllinoisOnly) => vec![CoverageRecord::new(carrier, ILLINOIS, base)],
        Some(CommercialRule::IllinoisNoFrame) => {
            let record = CoverageRecord::new(carrier, ILLINOIS, format!("{base}{NO_FRAME_SUFFIX}"));
            vec![record; no_frame.copies()]
        }
        None => each(UNKNOWN),
    }
}
