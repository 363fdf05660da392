//! Report service: fan-out fetch, aggregate, shape, hold
//!
//! The service owns its backend dependency and the currently displayed
//! report. Refreshes fan out the four backend reads concurrently and wait
//! for all of them; any failure aborts the whole refresh and clears the
//! held report. A generation counter discards refreshes that lose a race
//! against a newer one, so a stale response can never overwrite a newer
//! report.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use chrono::NaiveDate;

use crate::aggregate::{aggregate_expenses, aggregate_income};
use crate::client::ApiError;
use crate::constants;
use crate::expenses::{ExpenseLabel, ExpenseRecord, ExpenseType};
use crate::income::IncomeRecord;
use crate::reports::{shape_report, ProfitLossReport};

/// Inclusive calendar date range for one report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<DateRange> {
        anyhow::ensure!(from <= to, "Date range starts after it ends: {} > {}", from, to);
        Ok(DateRange { from, to })
    }

    /// Query parameters for the range-restricted endpoints
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("from_date", self.from.format(constants::DATE_FORMAT).to_string()),
            ("to_date", self.to.format(constants::DATE_FORMAT).to_string()),
        ]
    }
}

/// The four backend reads a report is built from
///
/// A trait seam so the service can be driven by the HTTP client in
/// production and by stubs in tests.
pub trait Backend {
    async fn income_records(&self, range: &DateRange) -> Result<Vec<IncomeRecord>, ApiError>;
    async fn expense_records(&self, range: &DateRange) -> Result<Vec<ExpenseRecord>, ApiError>;
    async fn expense_types(&self) -> Result<Vec<ExpenseType>, ApiError>;
    async fn expense_labels(&self) -> Result<Vec<ExpenseLabel>, ApiError>;
}

/// Whole-refresh failure, reduced to one user-facing message
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("could not load the profit & loss report")]
    Backend(#[source] ApiError),
}

/// Holds the current report and rebuilds it on demand
pub struct ReportService<B> {
    backend: B,
    generation: AtomicU64,
    current: Mutex<Option<ProfitLossReport>>,
}

impl<B: Backend> ReportService<B> {
    pub fn new(backend: B) -> ReportService<B> {
        ReportService {
            backend,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// The report from the latest completed refresh, if it succeeded
    #[allow(dead_code)]
    pub fn current(&self) -> Option<ProfitLossReport> {
        self.current.lock().expect("report slot poisoned").clone()
    }

    /// Rebuild the report for `range` from scratch
    ///
    /// On success the report becomes current; on failure the current
    /// report is cleared. Either way, a refresh that was overtaken by a
    /// newer one leaves the newer state untouched.
    pub async fn refresh(&self, range: &DateRange) -> Result<ProfitLossReport, ReportError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.build(range).await {
            Ok(report) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    *self.current.lock().expect("report slot poisoned") = Some(report.clone());
                }
                Ok(report)
            }
            Err(err) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    *self.current.lock().expect("report slot poisoned") = None;
                }
                Err(err)
            }
        }
    }

    async fn build(&self, range: &DateRange) -> Result<ProfitLossReport, ReportError> {
        let (income, expenses, types, labels) = tokio::try_join!(
            self.backend.income_records(range),
            self.backend.expense_records(range),
            self.backend.expense_types(),
            self.backend.expense_labels(),
        )
        .map_err(ReportError::Backend)?;

        let income = aggregate_income(&income);
        let expenses = aggregate_expenses(&expenses);
        Ok(shape_report(income, expenses, &types, &labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use reqwest::StatusCode;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn test_range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn income_record(gross: Money) -> IncomeRecord {
        IncomeRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            gross_receipts_sales: gross,
            returns: Money::ZERO,
            cost_of_goods_sold: Money::ZERO,
            other_income: Money::ZERO,
        }
    }

    fn status_error() -> ApiError {
        ApiError::Status {
            endpoint: constants::INCOME_ENDPOINT,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stub backend: fixed income, optional failure toggle
    struct StubBackend {
        gross: Money,
        fail: AtomicBool,
    }

    impl StubBackend {
        fn new(gross: Money) -> StubBackend {
            StubBackend {
                gross,
                fail: AtomicBool::new(false),
            }
        }
    }

    impl Backend for StubBackend {
        async fn income_records(&self, _range: &DateRange) -> Result<Vec<IncomeRecord>, ApiError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(status_error());
            }
            Ok(vec![income_record(self.gross)])
        }

        async fn expense_records(&self, _range: &DateRange) -> Result<Vec<ExpenseRecord>, ApiError> {
            Ok(Vec::new())
        }

        async fn expense_types(&self) -> Result<Vec<ExpenseType>, ApiError> {
            Ok(Vec::new())
        }

        async fn expense_labels(&self) -> Result<Vec<ExpenseLabel>, ApiError> {
            Ok(Vec::new())
        }
    }

    /// Stub backend whose first income fetch blocks until released,
    /// returning a different figure than later fetches
    struct RacingBackend {
        calls: AtomicU64,
        release_first: Arc<Notify>,
    }

    impl Backend for RacingBackend {
        async fn income_records(&self, _range: &DateRange) -> Result<Vec<IncomeRecord>, ApiError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.release_first.notified().await;
                Ok(vec![income_record(dec!(100))])
            } else {
                Ok(vec![income_record(dec!(200))])
            }
        }

        async fn expense_records(&self, _range: &DateRange) -> Result<Vec<ExpenseRecord>, ApiError> {
            Ok(Vec::new())
        }

        async fn expense_types(&self) -> Result<Vec<ExpenseType>, ApiError> {
            Ok(Vec::new())
        }

        async fn expense_labels(&self) -> Result<Vec<ExpenseLabel>, ApiError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_refresh_builds_and_holds_report() {
        let service = ReportService::new(StubBackend::new(dec!(1000)));
        assert!(service.current().is_none());

        let report = service.refresh(&test_range()).await.unwrap();
        assert_eq!(report.income.gross_income, dec!(1000.00));
        assert_eq!(service.current().unwrap(), report);
    }

    #[tokio::test]
    async fn test_failed_fetch_clears_current_report() {
        let backend = StubBackend::new(dec!(1000));
        let service = ReportService::new(backend);
        service.refresh(&test_range()).await.unwrap();
        assert!(service.current().is_some());

        service.backend.fail.store(true, Ordering::SeqCst);
        let err = service.refresh(&test_range()).await.unwrap_err();
        assert_eq!(err.to_string(), "could not load the profit & loss report");
        assert!(service.current().is_none());
    }

    #[tokio::test]
    async fn test_stale_refresh_does_not_overwrite_newer_report() {
        let release_first = Arc::new(Notify::new());
        let service = ReportService::new(RacingBackend {
            calls: AtomicU64::new(0),
            release_first: release_first.clone(),
        });
        let range = test_range();

        // First refresh blocks on its income fetch; second completes while
        // the first is parked, then releases it.
        let (stale, fresh) = tokio::join!(service.refresh(&range), async {
            let fresh = service.refresh(&range).await;
            release_first.notify_one();
            fresh
        });

        let stale = stale.unwrap();
        let fresh = fresh.unwrap();
        assert_eq!(stale.income.gross_income, dec!(100.00));
        assert_eq!(fresh.income.gross_income, dec!(200.00));
        assert_eq!(service.current().unwrap(), fresh);
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRange::new(from, to).is_err());
    }

    #[test]
    fn test_date_range_query_parameters() {
        let range = test_range();
        let query = range.query();
        assert_eq!(query[0], ("from_date", "2024-01-01".to_string()));
        assert_eq!(query[1], ("to_date", "2024-01-31".to_string()));
    }
}
