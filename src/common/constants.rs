/// Coverage labels emitted by the normalizer.
pub const FIRE: &str = "FIRE";
pub const AUTO: &str = "AUTO";
pub const FLOOD: &str = "FLOOD";
pub const APARTMENT: &str = "APARTMENT";
pub const SFR: &str = "SFR";
pub const MULTI_UNIT: &str = "MULTI_UNIT";
pub const UNKNOWN: &str = "UNKNOWN";

// Suffixes appended to a building type for qualified commercial-lines cells
pub const NO_FRAME_SUFFIX: &str = " - NO FRAME";
pub const PL_SUFFIX: &str = " - PLs";
pub const CL_SUFFIX: &str = " - CLs";

/// Jurisdiction that "IL ONLY" / "IL (NO FRAME)" cells are pinned to
pub const ILLINOIS: &str = "IL";

// Building-type column labels of commercial-lines sheets, in column order
pub const SFR_COLUMN_LABEL: &str = "SFR's (1-4 Units)";
pub const MULTI_UNIT_COLUMN_LABEL: &str = "4+ units";

pub const STATE_KEYED_SHAPE: &str = "Carrier, State, State, ...";
pub const BUILDING_TYPE_SHAPE: &str = "Carrier, SFR's (1-4 Units), 4+ units";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
