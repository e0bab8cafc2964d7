//! Header-row checks that run before any data row is looked at.

use super::jurisdiction::is_valid_jurisdiction;
use crate::common::constants::{
    BUILDING_TYPE_SHAPE, MULTI_UNIT_COLUMN_LABEL, SFR_COLUMN_LABEL, STATE_KEYED_SHAPE,
};
use crate::common::{NormalizeError, RawRow};

const BUILDING_TYPE_LABELS: [&str; 2] = [SFR_COLUMN_LABEL, MULTI_UNIT_COLUMN_LABEL];

/// Validate a state-keyed header (`Carrier, IL, IN, ...`) and return the
/// jurisdiction code of each column after the label. Codes must match
/// exactly; a padded `" IL"` is rejected.
pub fn jurisdiction_columns(header: Option<&RawRow>) -> Result<Vec<String>, NormalizeError> {
    let header = header.ok_or_else(|| malformed(STATE_KEYED_SHAPE, None))?;
    let codes = &header[header.len().min(1)..];

    if codes.iter().all(|code| is_valid_jurisdiction(code)) {
        Ok(codes.to_vec())
    } else {
        Err(malformed(STATE_KEYED_SHAPE, Some(header)))
    }
}

/// Validate a building-type header (`Carrier, SFR's (1-4 Units), 4+ units`).
/// Labels must appear in that order; a sheet may omit the trailing column.
pub fn building_type_columns(header: Option<&RawRow>) -> Result<(), NormalizeError> {
    let header = header.ok_or_else(|| malformed(BUILDING_TYPE_SHAPE, None))?;
    let labels = &header[header.len().min(1)..];

    let valid = labels.len() <= BUILDING_TYPE_LABELS.len()
        && labels
            .iter()
            .zip(BUILDING_TYPE_LABELS)
            .all(|(cell, expected)| cell == expected);

    if valid {
        Ok(())
    } else {
        Err(malformed(BUILDING_TYPE_SHAPE, Some(header)))
    }
}

fn malformed(expected_shape: &str, found: Option<&RawRow>) -> NormalizeError {
    NormalizeError::MalformedHeader {
        expected_shape: expected_shape.to_string(),
        found: found.map_or_else(|| "no header row".to_string(), |row| row.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_state_header_yields_codes_in_column_order() {
        let header = row(&["Carrier", "IL", "IN", "MI"]);
        assert_eq!(
            jurisdiction_columns(Some(&header)).unwrap(),
            vec!["IL", "IN", "MI"]
        );
    }

    #[test]
    fn test_state_header_rejects_non_codes() {
        let header = row(&["Carrier", "Not a state", "Something else"]);
        let err = jurisdiction_columns(Some(&header)).unwrap_err();
        assert!(err.to_string().to_lowercase().contains("incorrect sheet format"));
        assert!(matches!(
            err,
            NormalizeError::MalformedHeader { ref expected_shape, .. } if expected_shape == STATE_KEYED_SHAPE
        ));
    }

    #[test]
    fn test_header_cells_are_not_trimmed() {
        let padded = row(&["Carrier", " IL", "IN"]);
        assert!(matches!(
            jurisdiction_columns(Some(&padded)),
            Err(NormalizeError::MalformedHeader { .. })
        ));

        let padded_label = row(&["Carrier", "SFR's (1-4 Units) "]);
        assert!(building_type_columns(Some(&padded_label)).is_err());
    }

    #[test]
    fn test_missing_header_is_malformed() {
        assert!(matches!(
            jurisdiction_columns(None),
            Err(NormalizeError::MalformedHeader { .. })
        ));
        assert!(matches!(
            building_type_columns(None),
            Err(NormalizeError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn test_building_type_header_accepts_expected_labels() {
        let header = row(&["Carrier", "SFR's (1-4 Units)", "4+ units"]);
        assert!(building_type_columns(Some(&header)).is_ok());

        let sfr_only = row(&["Carrier", "SFR's (1-4 Units)"]);
        assert!(building_type_columns(Some(&sfr_only)).is_ok());
    }

    #[test]
    fn test_building_type_header_is_order_sensitive() {
        let swapped = row(&["Carrier", "4+ units", "SFR's (1-4 Units)"]);
        assert!(building_type_columns(Some(&swapped)).is_err());

        let extra = row(&["Carrier", "SFR's (1-4 Units)", "4+ units", "4+ units"]);
        assert!(building_type_columns(Some(&extra)).is_err());

        let states = row(&["Carrier", "IL", "IN"]);
        assert!(building_type_columns(Some(&states)).is_err());
    }
}
