//! Report shaping, console summary, and CSV export
//!
//! The aggregated totals and the catalog-derived structure tree combine
//! into one fixed-shape statement mirroring the Schedule C layout. The
//! structure tree orders display output only; totals never come from it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregate::{ExpenseSummary, ExpenseTree, IncomeSummary};
use crate::constants;
use crate::expenses::{ExpenseLabel, ExpenseType, Range, TypeKey};
use crate::money::{add_cents, fmt_cents, round_cents, Money};
use crate::service::DateRange;

/// The statement's closing figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetProfit {
    pub tentative_profit: Money,
    pub business_use_of_home: Money,
    pub net_profit: Money,
}

/// Label entry of the display tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelNode {
    pub id: i64,
    pub name: String,
}

/// Type entry of the display tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeNode {
    pub id: i64,
    pub name: String,
    pub labels: Vec<LabelNode>,
}

/// Range entry of the display tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeNode {
    pub range: Range,
    pub name: String,
    pub types: Vec<TypeNode>,
}

/// Display-ordering tree built from the catalog, not from the totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Structure {
    pub ranges: Vec<RangeNode>,
}

/// The complete profit & loss statement for one date range
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitLossReport {
    pub income: IncomeSummary,
    pub expenses: ExpenseTree,
    pub range_totals: BTreeMap<Range, Money>,
    pub total_expenses: Money,
    pub net_profit: NetProfit,
    pub structure: Structure,
}

/// Build the display tree from the catalog lists
///
/// Types group under their range, labels under their type, both in fetch
/// order. All three ranges appear even when empty. This is a parallel data
/// path to the aggregated totals; the two agree by construction only.
pub fn build_structure(types: &[ExpenseType], labels: &[ExpenseLabel]) -> Structure {
    let ranges = Range::ALL
        .iter()
        .map(|&range| RangeNode {
            range,
            name: range.label().to_string(),
            types: types
                .iter()
                .filter(|t| t.range == range)
                .map(|t| TypeNode {
                    id: t.id,
                    name: t.name.clone(),
                    labels: labels
                        .iter()
                        .filter(|l| l.type_id == t.id)
                        .map(|l| LabelNode {
                            id: l.id,
                            name: l.name.clone(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Structure { ranges }
}

/// Assemble the statement from the aggregates and the catalog
pub fn shape_report(
    income: IncomeSummary,
    expenses: ExpenseSummary,
    types: &[ExpenseType],
    labels: &[ExpenseLabel],
) -> ProfitLossReport {
    let business_use_of_home = expenses
        .range_totals
        .get(&Range::HomeOffice)
        .copied()
        .unwrap_or(Money::ZERO);
    let tentative_profit = round_cents(income.gross_income - expenses.total_expenses);
    let net_profit = round_cents(tentative_profit - business_use_of_home);

    ProfitLossReport {
        income,
        expenses: expenses.tree,
        range_totals: expenses.range_totals,
        total_expenses: expenses.total_expenses,
        net_profit: NetProfit {
            tentative_profit,
            business_use_of_home,
            net_profit,
        },
        structure: build_structure(types, labels),
    }
}

/// Amount shown on a report line for one aggregated tree position
pub fn leaf_amount(tree: &ExpenseTree, range: Range, type_name: &str, label_name: &str) -> Money {
    tree.get(&range)
        .and_then(|types| types.get(&TypeKey::from_name(type_name)))
        .and_then(|labels| labels.get(label_name))
        .copied()
        .unwrap_or(Money::ZERO)
}

// =============================================================================
// CSV Export
// =============================================================================

/// The form's hard-coded expense lines 8-27: (line label, lookup key)
///
/// The keys are the form's category vocabulary, NOT the backend's type
/// catalog. A backend type whose normalized name matches a key funds that
/// line; everything else funds only the total on line 28. This mismatch is
/// inherited from the original statement template and kept as-is.
const EXPENSE_LINES: [(&str, &str); 20] = [
    ("8. Advertising", "advertising"),
    ("9. Car and truck expenses", "car_and_truck"),
    ("10. Commissions and fees", "commissions_and_fees"),
    ("11. Contract labor", "contract_labor"),
    ("12. Depletion", "depletion"),
    ("13. Depreciation", "depreciation"),
    ("14. Employee benefit programs", "employee_benefit_programs"),
    ("15. Insurance", "insurance"),
    ("16. Interest", "interest"),
    ("17. Legal and professional services", "legal_and_professional"),
    ("18. Office expense", "office_expense"),
    ("19. Pension and profit-sharing plans", "pension_and_profit_sharing"),
    ("20. Rent or lease", "rent_or_lease"),
    ("21. Repairs and maintenance", "repairs_and_maintenance"),
    ("22. Supplies", "supplies"),
    ("23. Taxes and licenses", "taxes_and_licenses"),
    ("24. Travel and meals", "travel_and_meals"),
    ("25. Utilities", "utilities"),
    ("26. Wages", "wages"),
    ("27. Other expenses", "other_expenses"),
];

/// Exported statement filename: profit-loss-<from>-to-<to>.csv
pub fn export_filename(range: &DateRange) -> String {
    format!(
        "{}-{}-to-{}.csv",
        constants::EXPORT_FILENAME_PREFIX,
        range.from.format(constants::DATE_FORMAT),
        range.to.format(constants::DATE_FORMAT)
    )
}

/// Sum of every label under a normalized type key, across all ranges
fn type_total(tree: &ExpenseTree, key: &TypeKey) -> Money {
    let mut total = Money::ZERO;
    for types in tree.values() {
        if let Some(labels) = types.get(key) {
            for amount in labels.values() {
                total = add_cents(total, *amount);
            }
        }
    }
    total
}

/// Write the statement as a flat two-column CSV into `output_dir`
///
/// Fixed sequence: income lines 1-7, expense lines 8-27, total expenses on
/// line 28, then the three closing lines (tentative profit, business use
/// of home, net profit). The statement is assembled in memory and written
/// in one shot; a failed export leaves no partial file behind.
pub fn export_csv(report: &ProfitLossReport, range: &DateRange, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(export_filename(range));
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let income = &report.income;
    wtr.write_record(["1. Gross receipts or sales", &fmt_cents(income.gross_receipts)])?;
    wtr.write_record([
        "2. Returns and allowances",
        &fmt_cents(income.returns_and_allowances),
    ])?;
    wtr.write_record([
        "3. Subtract line 2 from line 1",
        &fmt_cents(round_cents(income.gross_receipts - income.returns_and_allowances)),
    ])?;
    wtr.write_record(["4. Cost of goods sold", &fmt_cents(income.cost_of_goods_sold)])?;
    wtr.write_record(["5. Gross profit", &fmt_cents(income.gross_profit)])?;
    wtr.write_record(["6. Other income", &fmt_cents(income.other_income)])?;
    wtr.write_record(["7. Gross income", &fmt_cents(income.gross_income)])?;

    for (label, key) in EXPENSE_LINES {
        let amount = type_total(&report.expenses, &TypeKey::from_name(key));
        wtr.write_record([label, &fmt_cents(amount)])?;
    }

    wtr.write_record(["28. Total expenses", &fmt_cents(report.total_expenses)])?;
    wtr.write_record([
        "29. Tentative profit",
        &fmt_cents(report.net_profit.tentative_profit),
    ])?;
    wtr.write_record([
        "30. Expenses for business use of home",
        &fmt_cents(report.net_profit.business_use_of_home),
    ])?;
    wtr.write_record(["31. Net profit or (loss)", &fmt_cents(report.net_profit.net_profit)])?;

    let data = wtr
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to assemble CSV: {}", err))?;
    std::fs::write(&path, data)
        .with_context(|| format!("Failed to write statement: {}", path.display()))?;
    println!("  Generated: {}", path.display());

    Ok(path)
}

// =============================================================================
// Console Summary
// =============================================================================

fn print_line(indent: usize, label: &str, amount: Money) {
    let label = format!("{}{}:", " ".repeat(indent), label);
    println!("{:<44} ${:>12}", label, fmt_cents(amount));
}

/// Print the statement to the console, ordered by the structure tree
pub fn print_summary(report: &ProfitLossReport, range: &DateRange) {
    println!("\n============================================================");
    println!("       PROFIT & LOSS  {} to {}", range.from, range.to);
    println!("============================================================\n");

    println!("INCOME:");
    print_line(2, "Gross receipts or sales", report.income.gross_receipts);
    print_line(2, "Returns and allowances", report.income.returns_and_allowances);
    print_line(2, "Cost of goods sold", report.income.cost_of_goods_sold);
    print_line(2, "Gross profit", report.income.gross_profit);
    print_line(2, "Other income", report.income.other_income);
    println!("  ─────────────────────────────────────────────");
    print_line(2, "Gross income", report.income.gross_income);

    println!("\nEXPENSES:");
    for range_node in &report.structure.ranges {
        let total = report
            .range_totals
            .get(&range_node.range)
            .copied()
            .unwrap_or(Money::ZERO);
        print_line(2, &range_node.name, total);
        for type_node in &range_node.types {
            for label_node in &type_node.labels {
                let amount = leaf_amount(
                    &report.expenses,
                    range_node.range,
                    &type_node.name,
                    &label_node.name,
                );
                print_line(4, &format!("{} / {}", type_node.name, label_node.name), amount);
            }
        }
    }
    println!("  ─────────────────────────────────────────────");
    print_line(2, "Total expenses", report.total_expenses);

    println!("\nNET PROFIT:");
    print_line(2, "Tentative profit", report.net_profit.tentative_profit);
    print_line(2, "Business use of home", report.net_profit.business_use_of_home);
    print_line(2, "Net profit", report.net_profit.net_profit);

    println!("============================================================");
}
