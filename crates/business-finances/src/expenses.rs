//! Expense records and the category catalog
//!
//! Expense rows arrive with nested type/label objects. Rows missing any of
//! range, type name, or label name are tolerated malformed data: they are
//! dropped at this boundary and appear in no total. The same applies to
//! rows whose range is not one of the three recognized buckets.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Top-level expense bucket
///
/// Only these three are recognized; anything else on the wire is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    Vehicle,
    HomeOffice,
    OperationExpense,
}

impl Range {
    /// Fixed display order: mirrors the statement layout
    pub const ALL: [Range; 3] = [Range::Vehicle, Range::HomeOffice, Range::OperationExpense];

    /// Parse a wire range string; unknown values are None
    pub fn parse(s: &str) -> Option<Range> {
        match s {
            "vehicle" => Some(Range::Vehicle),
            "home_office" => Some(Range::HomeOffice),
            "operation_expense" => Some(Range::OperationExpense),
            _ => None,
        }
    }

    /// Human-readable bucket name for the console summary
    pub fn label(&self) -> &'static str {
        match self {
            Range::Vehicle => "Vehicle",
            Range::HomeOffice => "Home office",
            Range::OperationExpense => "Operation expenses",
        }
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized type-name key: lowercase, spaces to underscores
///
/// "Legal and Professional" and "legal and professional" accumulate into
/// the same bucket; label names keep their original casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn from_name(name: &str) -> TypeKey {
        TypeKey(name.to_lowercase().replace(' ', "_"))
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Wire shapes (as served by the backend)
// =============================================================================

/// Nested `{ "name": ... }` object on expense rows
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Expense row exactly as `GET /expenses` serves it
#[derive(Debug, Clone, Deserialize)]
pub struct RawExpenseRecord {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default, rename = "type")]
    pub expense_type: Option<NamedRef>,
    #[serde(default)]
    pub label: Option<NamedRef>,
    #[serde(default)]
    pub amount: Money,
}

/// Expense type row exactly as `GET /expense-types` serves it
#[derive(Debug, Clone, Deserialize)]
pub struct RawExpenseType {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub range: Option<String>,
}

// =============================================================================
// Validated shapes (what the rest of the pipeline sees)
// =============================================================================

/// Expense row that passed boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub range: Range,
    pub type_name: String,
    pub label_name: String,
    pub amount: Money,
}

/// Catalog entry: a named expense category within a range
#[derive(Debug, Clone)]
pub struct ExpenseType {
    pub id: i64,
    pub name: String,
    pub range: Range,
}

/// Catalog entry: a named sub-item within a type
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseLabel {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
}

/// Drop malformed rows (missing or empty range/type/label, unknown range)
pub fn validate_expenses(raw: Vec<RawExpenseRecord>) -> Vec<ExpenseRecord> {
    raw.into_iter()
        .filter_map(|row| {
            let range = Range::parse(row.range.as_deref()?)?;
            let type_name = row.expense_type.and_then(|t| t.name).filter(|n| !n.is_empty())?;
            let label_name = row.label.and_then(|l| l.name).filter(|n| !n.is_empty())?;
            Some(ExpenseRecord {
                range,
                type_name,
                label_name,
                amount: row.amount,
            })
        })
        .collect()
}

/// Drop catalog types whose range is missing or unrecognized
pub fn validate_expense_types(raw: Vec<RawExpenseType>) -> Vec<ExpenseType> {
    raw.into_iter()
        .filter_map(|row| {
            let range = Range::parse(row.range.as_deref()?)?;
            Some(ExpenseType {
                id: row.id,
                name: row.name,
                range,
            })
        })
        .collect()
}
