//! Centralized constants for the profit & loss reporter
//!
//! This module contains values that are fixed for every deployment.
//! Backend-specific configuration is loaded from config.toml.

// =============================================================================
// Backend Endpoints
// =============================================================================

/// Income records for a date range
pub const INCOME_ENDPOINT: &str = "/income";

/// Expense records for a date range
pub const EXPENSES_ENDPOINT: &str = "/expenses";

/// Expense type catalog (unrestricted)
pub const EXPENSE_TYPES_ENDPOINT: &str = "/expense-types";

/// Expense label catalog (unrestricted)
pub const EXPENSE_LABELS_ENDPOINT: &str = "/expense-labels";

// =============================================================================
// Dates
// =============================================================================

/// Calendar date format used in query parameters and filenames.
/// Dates are opaque calendar days; no timezone conversion anywhere.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// HTTP
// =============================================================================

/// Default request timeout when config.toml does not set one (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// User agent sent with every backend request
pub const USER_AGENT: &str = concat!("business-finances/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// File Names
// =============================================================================

/// Prefix of the exported statement filename
/// (full name: profit-loss-<from>-to-<to>.csv)
pub const EXPORT_FILENAME_PREFIX: &str = "profit-loss";
