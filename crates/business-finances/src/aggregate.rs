//! Pure reduction of fetched records into report totals
//!
//! Income collapses into six scalar figures; expenses into the three-level
//! range -> type -> label mapping plus per-range totals. Both reductions
//! round to cents at every step (see `money`), so the order of operations
//! is part of the contract: partial sums are rounded before they feed the
//! next formula.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expenses::{ExpenseRecord, Range, TypeKey};
use crate::income::IncomeRecord;
use crate::money::{add_cents, round_cents, Money};

/// Summed label amounts within one type
pub type LabelTotals = BTreeMap<String, Money>;

/// Types within one range, keyed by normalized type name
pub type TypeTotals = BTreeMap<TypeKey, LabelTotals>;

/// The full range -> type -> label expense mapping
pub type ExpenseTree = BTreeMap<Range, TypeTotals>;

/// The six income figures of the statement's income section
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub gross_receipts: Money,
    pub returns_and_allowances: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub other_income: Money,
    pub gross_income: Money,
}

/// Aggregated expenses: the tree plus its parallel scalar totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseSummary {
    pub tree: ExpenseTree,
    pub range_totals: BTreeMap<Range, Money>,
    pub total_expenses: Money,
}

/// Reduce income records into the six income figures
///
/// gross_profit = gross_receipts - returns - cost_of_goods_sold and
/// gross_income = gross_profit + other_income, each computed from
/// already-rounded partial sums.
pub fn aggregate_income(records: &[IncomeRecord]) -> IncomeSummary {
    let mut gross_receipts = Money::ZERO;
    let mut returns_and_allowances = Money::ZERO;
    let mut cost_of_goods_sold = Money::ZERO;
    let mut other_income = Money::ZERO;

    for record in records {
        gross_receipts = add_cents(gross_receipts, record.gross_receipts_sales);
        returns_and_allowances = add_cents(returns_and_allowances, record.returns);
        cost_of_goods_sold = add_cents(cost_of_goods_sold, record.cost_of_goods_sold);
        other_income = add_cents(other_income, record.other_income);
    }

    let gross_profit = round_cents(gross_receipts - returns_and_allowances - cost_of_goods_sold);
    let gross_income = round_cents(gross_profit + other_income);

    IncomeSummary {
        gross_receipts,
        returns_and_allowances,
        cost_of_goods_sold,
        gross_profit,
        other_income,
        gross_income,
    }
}

/// Reduce expense records into the tree and the per-range totals
///
/// The leaf and the range total accumulate in parallel from the same rows,
/// so total_expenses always equals the sum of the range totals.
pub fn aggregate_expenses(records: &[ExpenseRecord]) -> ExpenseSummary {
    let mut tree = ExpenseTree::new();
    let mut range_totals: BTreeMap<Range, Money> = BTreeMap::new();

    for record in records {
        let leaf = tree
            .entry(record.range)
            .or_default()
            .entry(TypeKey::from_name(&record.type_name))
            .or_default()
            .entry(record.label_name.clone())
            .or_insert(Money::ZERO);
        *leaf = add_cents(*leaf, record.amount);

        let total = range_totals.entry(record.range).or_insert(Money::ZERO);
        *total = add_cents(*total, record.amount);
    }

    let total_expenses = round_cents(range_totals.values().copied().sum::<Money>());

    ExpenseSummary {
        tree,
        range_totals,
        total_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn income(
        gross_receipts_sales: Money,
        returns: Money,
        cost_of_goods_sold: Money,
        other_income: Money,
    ) -> IncomeRecord {
        IncomeRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            gross_receipts_sales,
            returns,
            cost_of_goods_sold,
            other_income,
        }
    }

    fn expense(range: Range, type_name: &str, label_name: &str, amount: Money) -> ExpenseRecord {
        ExpenseRecord {
            range,
            type_name: type_name.to_string(),
            label_name: label_name.to_string(),
            amount,
        }
    }

    #[test]
    fn test_income_formulas() {
        let summary = aggregate_income(&[income(dec!(1000), dec!(50), dec!(200), dec!(0))]);
        assert_eq!(summary.gross_receipts, dec!(1000.00));
        assert_eq!(summary.returns_and_allowances, dec!(50.00));
        assert_eq!(summary.cost_of_goods_sold, dec!(200.00));
        assert_eq!(summary.gross_profit, dec!(750.00));
        assert_eq!(summary.other_income, dec!(0.00));
        assert_eq!(summary.gross_income, dec!(750.00));
    }

    #[test]
    fn test_income_gross_income_identity() {
        let records = [
            income(dec!(500.10), dec!(20.05), dec!(99.95), dec!(10)),
            income(dec!(250), dec!(0), dec!(50.50), dec!(5.25)),
        ];
        let summary = aggregate_income(&records);
        assert_eq!(
            summary.gross_income,
            round_cents(
                summary.gross_receipts - summary.returns_and_allowances
                    - summary.cost_of_goods_sold
                    + summary.other_income
            )
        );
    }

    #[test]
    fn test_income_partial_sums_round_before_feeding_formulas() {
        // Three 0.333 receipts accumulate as 0.33 + 0.33 + 0.33, not 1.00
        let records = [
            income(dec!(0.333), dec!(0), dec!(0), dec!(0)),
            income(dec!(0.333), dec!(0), dec!(0), dec!(0)),
            income(dec!(0.333), dec!(0), dec!(0), dec!(0)),
        ];
        let summary = aggregate_income(&records);
        assert_eq!(summary.gross_receipts, dec!(0.99));
        assert_eq!(summary.gross_profit, dec!(0.99));
    }

    #[test]
    fn test_empty_income_is_all_zero() {
        assert_eq!(aggregate_income(&[]), IncomeSummary::default());
    }

    #[test]
    fn test_expense_leaf_and_range_total_round_to_cents() {
        let summary = aggregate_expenses(&[expense(Range::Vehicle, "Fuel", "Gas", dec!(120.555))]);
        let leaf = &summary.tree[&Range::Vehicle][&TypeKey::from_name("fuel")]["Gas"];
        assert_eq!(*leaf, dec!(120.56));
        assert_eq!(summary.range_totals[&Range::Vehicle], dec!(120.56));
        assert_eq!(summary.total_expenses, dec!(120.56));
    }

    #[test]
    fn test_type_names_merge_case_insensitively() {
        let summary = aggregate_expenses(&[
            expense(Range::OperationExpense, "Office Expense", "Paper", dec!(10)),
            expense(Range::OperationExpense, "office expense", "Paper", dec!(5)),
        ]);
        let types = &summary.tree[&Range::OperationExpense];
        assert_eq!(types.len(), 1);
        assert_eq!(types[&TypeKey::from_name("Office Expense")]["Paper"], dec!(15.00));
    }

    #[test]
    fn test_total_expenses_equals_sum_of_range_totals() {
        let summary = aggregate_expenses(&[
            expense(Range::Vehicle, "Fuel", "Gas", dec!(120.56)),
            expense(Range::Vehicle, "Fuel", "Diesel", dec!(30)),
            expense(Range::HomeOffice, "Rent", "Office share", dec!(400)),
            expense(Range::OperationExpense, "Supplies", "Paper", dec!(12.34)),
        ]);
        let range_sum: Money = summary.range_totals.values().copied().sum();
        assert_eq!(summary.total_expenses, range_sum);
        assert_eq!(summary.total_expenses, dec!(562.90));
    }

    #[test]
    fn test_range_total_equals_sum_of_its_leaves() {
        let summary = aggregate_expenses(&[
            expense(Range::Vehicle, "Fuel", "Gas", dec!(100.10)),
            expense(Range::Vehicle, "Repairs", "Tires", dec!(55.55)),
        ]);
        let leaf_sum: Money = summary.tree[&Range::Vehicle]
            .values()
            .flat_map(|labels| labels.values())
            .copied()
            .sum();
        assert_eq!(summary.range_totals[&Range::Vehicle], leaf_sum);
    }

    #[test]
    fn test_empty_expenses_produce_empty_tree_and_zero_total() {
        let summary = aggregate_expenses(&[]);
        assert!(summary.tree.is_empty());
        assert!(summary.range_totals.is_empty());
        assert_eq!(summary.total_expenses, Money::ZERO);
    }
}
