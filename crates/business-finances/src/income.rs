//! Income records from the bookkeeping backend
//!
//! One record per booked income entry inside the requested date range.
//! Records are immutable snapshots owned by the backend; the pipeline only
//! reads them.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::money::Money;

/// A single income entry as returned by `GET /income`
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub gross_receipts_sales: Money,
    #[serde(default)]
    pub returns: Money,
    #[serde(default)]
    pub cost_of_goods_sold: Money,
    #[serde(default)]
    pub other_income: Money,
}
