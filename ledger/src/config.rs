// Protocol constants shared by the lending contracts.

// Block height of a freshly reset environment.
// Records created before any explicit `set_block_height` are stamped with it.
pub const GENESIS_BLOCK_HEIGHT: u64 = 1;

// Asset and loan identifiers are allocated sequentially from this value.
pub const FIRST_SEQUENTIAL_ID: u64 = 1;

// Payment and inspection numbers restart at 1 per loan / per asset
pub const FIRST_RECORD_NUMBER: u64 = 1;

// `lastInspectionDate` sentinel for collateral that was never inspected
pub const NEVER_INSPECTED: u64 = 0;

// Condition recorded on collateral until its first inspection
pub const UNKNOWN_CONDITION: &str = "unknown";

