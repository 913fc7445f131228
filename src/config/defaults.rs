//! Default constants for chronolink configuration.
//!
//! All magic values are centralized here with documentation.

// =============================================================================
// Environment
// =============================================================================

/// Prefix of environment variables read by the config loader.
/// Nested keys are separated by a double underscore, e.g.
/// `CHRONOLINK_GRAPH__ADD_INVERTED=true`.
pub const ENV_PREFIX: &str = "CHRONOLINK_";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

/// Default config file looked up by the CLI when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "chronolink.toml";

// =============================================================================
// Propagation Defaults
// =============================================================================

/// Enqueue the converse of every derived constraint at derivation time.
/// Produces the same closure; measured slower, so off.
pub const DEFAULT_ADD_INVERTED: bool = false;

// =============================================================================
// Output Defaults
// =============================================================================

/// Run the minimization pass before emitting results
pub const DEFAULT_REDUCE: bool = true;

/// File name suffixes for the per-stage matrix dumps written during reduction
pub const DUMP_STAGE_SUFFIXES: [&str; 4] = ["01", "02", "03", "04"];
