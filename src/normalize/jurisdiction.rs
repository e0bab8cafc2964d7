use once_cell::sync::Lazy;
use std::collections::HashSet;

/// US states, DC and the inhabited territories.
const JURISDICTION_CODES: [&str; 56] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP",
];

static JURISDICTIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| JURISDICTION_CODES.iter().copied().collect());

/// Membership check against the closed set of recognized two-letter codes.
/// Matching is exact: `"il"` and `" IL"` are not codes.
pub fn is_valid_jurisdiction(code: &str) -> bool {
    JURISDICTIONS.contains(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_are_valid() {
        for code in ["IL", "IN", "MI", "OH", "FL", "TX", "DC", "PR"] {
            assert!(is_valid_jurisdiction(code), "{code} should be valid");
        }
    }

    #[test]
    fn test_rejects_non_codes() {
        for code in ["", "il", "Illinois", "XX", "Not a state", " IL", "SFR's (1-4 Units)"] {
            assert!(!is_valid_jurisdiction(code), "{code:?} should be invalid");
        }
    }

    #[test]
    fn test_code_list_has_no_duplicates() {
        assert_eq!(JURISDICTIONS.len(), JURISDICTION_CODES.len());
    }
}
