//! Presentation boundary.
//!
//! Statements are turned into plain view objects (ordered sections, the set
//! of keys to emphasise, and bar-chart series) so that any rendering
//! technology can consume them through the [`Presenter`] trait.
//! [`TextPresenter`] is the built-in implementation used by the CLI.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::line_items::{LineItem, Section};
use crate::statements::balance_sheet::{self, BalanceSheet, Reconciliation};
use crate::statements::cash_flow::{self, CashFlowStatement};
use crate::statements::income_statement::{self, IncomeStatement};
use crate::statements::FinancialStatements;
use crate::types::{AmountScale, Money};
use crate::StatementResult;

// ---------------------------------------------------------------------------
// View objects
// ---------------------------------------------------------------------------

/// One titled block of line items, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionView {
    pub name: String,
    pub items: Vec<(String, Money)>,
}

/// Everything a presenter needs to render one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementView {
    pub title: String,
    pub sections: Vec<SectionView>,
    /// Line items rendered with emphasis (subtotals and totals)
    pub total_keys: BTreeSet<String>,
    /// Statement-level totals shown after the sections
    pub summary: Vec<(String, Money)>,
    /// Present on the balance sheet view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Reconciliation>,
}

/// Data for one bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub categories: Vec<String>,
    pub values: Vec<Money>,
}

impl ChartSeries {
    fn new(title: &str, bars: &[(&str, Money)]) -> Self {
        Self {
            title: title.to_string(),
            categories: bars.iter().map(|(c, _)| c.to_string()).collect(),
            values: bars.iter().map(|(_, v)| *v).collect(),
        }
    }

    pub fn bars(&self) -> impl Iterator<Item = (&str, Money)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

fn section_view(section: &Section) -> SectionView {
    SectionView {
        name: section.kind().title().to_string(),
        items: section
            .iter()
            .map(|item| (item.name.clone(), item.value))
            .collect(),
    }
}

fn derived_keys<'a>(items: impl Iterator<Item = &'a LineItem>) -> BTreeSet<String> {
    items
        .filter(|item| item.is_derived())
        .map(|item| item.name.clone())
        .collect()
}

impl BalanceSheet {
    pub fn view(&self) -> StatementView {
        let sections = self.sections();
        let mut total_keys = derived_keys(sections.iter().flat_map(|s| s.iter()));
        total_keys.insert(balance_sheet::TOTAL_LIABILITIES_AND_EQUITY.to_string());

        StatementView {
            title: "Balance Sheet".to_string(),
            sections: sections.iter().map(|s| section_view(s)).collect(),
            total_keys,
            summary: vec![(
                balance_sheet::TOTAL_LIABILITIES_AND_EQUITY.to_string(),
                self.total_liabilities_and_equity,
            )],
            reconciliation: Some(balance_sheet::verify(self)),
        }
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries::new(
            "Balance Sheet Breakdown",
            &[
                (balance_sheet::CURRENT_ASSETS, self.current_assets()),
                (balance_sheet::NON_CURRENT_ASSETS, self.non_current_assets()),
                (balance_sheet::CURRENT_LIABILITIES, self.current_liabilities()),
                (
                    balance_sheet::NON_CURRENT_LIABILITIES,
                    self.non_current_liabilities(),
                ),
                ("Equity", self.total_equity()),
            ],
        )
    }
}

impl IncomeStatement {
    pub fn view(&self) -> StatementView {
        let lines = self.lines();
        StatementView {
            title: "Income Statement".to_string(),
            total_keys: derived_keys(lines.iter()),
            sections: vec![SectionView {
                name: "Results".to_string(),
                items: lines.into_iter().map(|l| (l.name, l.value)).collect(),
            }],
            summary: vec![(income_statement::NET_INCOME.to_string(), self.net_income())],
            reconciliation: None,
        }
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries::new(
            "Income Statement Breakdown",
            &[
                (income_statement::REVENUE, self.revenue),
                (income_statement::GROSS_PROFIT, self.gross_profit),
                (income_statement::OPERATING_INCOME, self.operating_income),
                (income_statement::NET_INCOME, self.net_income()),
            ],
        )
    }
}

impl CashFlowStatement {
    pub fn view(&self) -> StatementView {
        let sections = self.sections();
        let mut total_keys = derived_keys(sections.iter().flat_map(|s| s.iter()));
        total_keys.insert(cash_flow::NET_CHANGE_IN_CASH.to_string());

        StatementView {
            title: "Cash Flow Statement".to_string(),
            sections: sections.iter().map(|s| section_view(s)).collect(),
            total_keys,
            summary: vec![(
                cash_flow::NET_CHANGE_IN_CASH.to_string(),
                self.net_change_in_cash,
            )],
            reconciliation: None,
        }
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries::new(
            "Cash Flow Breakdown",
            &[
                ("Operating Cash", self.cash_from_operating()),
                ("Investing Cash", self.cash_from_investing()),
                ("Financing Cash", self.cash_from_financing()),
                (cash_flow::NET_CHANGE_IN_CASH, self.net_change_in_cash),
            ],
        )
    }
}

impl FinancialStatements {
    /// Views in tab order: balance sheet, income statement, cash flow.
    pub fn views(&self) -> [StatementView; 3] {
        [
            self.balance_sheet.view(),
            self.income_statement.view(),
            self.cash_flow.view(),
        ]
    }

    pub fn charts(&self) -> [ChartSeries; 3] {
        [
            self.balance_sheet.chart(),
            self.income_statement.chart(),
            self.cash_flow.chart(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Consumes computed statements and renders them.
pub trait Presenter {
    type Output;

    fn present(&mut self, statements: &FinancialStatements) -> StatementResult<Self::Output>;
}

/// Renders statements as text panels with ASCII bar charts.
#[derive(Debug, Clone)]
pub struct TextPresenter {
    /// Width in characters of the longest bar
    pub bar_width: usize,
    pub show_charts: bool,
}

impl Default for TextPresenter {
    fn default() -> Self {
        Self {
            bar_width: 40,
            show_charts: true,
        }
    }
}

impl TextPresenter {
    pub fn render_view(&self, view: &StatementView, scale: AmountScale) -> String {
        let mut out = String::new();
        let heading = view.title.to_uppercase();
        let _ = writeln!(out, "{heading}");
        let _ = writeln!(out, "{}", "=".repeat(heading.len()));

        for section in &view.sections {
            let _ = writeln!(out, "\n{}", section.name.to_uppercase());
            let _ = writeln!(out, "----------------");
            for (name, value) in &section.items {
                let amount = format_amount(*value, scale);
                if view.total_keys.contains(name) {
                    let _ = writeln!(out, "{}: {amount}", name.to_uppercase());
                } else {
                    let _ = writeln!(out, "  {name}: {amount}");
                }
            }
        }

        if !view.summary.is_empty() {
            out.push('\n');
            for (name, value) in &view.summary {
                let _ = writeln!(out, "{}: {}", name.to_uppercase(), format_amount(*value, scale));
            }
        }

        if let Some(reconciliation) = &view.reconciliation {
            let _ = writeln!(out, "{}", reconciliation_message(reconciliation, scale));
        }
        out
    }

    pub fn render_chart(&self, chart: &ChartSeries, scale: AmountScale) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", chart.title);

        let label_width = chart.categories.iter().map(String::len).max().unwrap_or(0);
        let max = chart
            .values
            .iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or(Decimal::ZERO);

        for (category, value) in chart.bars() {
            let len = bar_length(value, max, self.bar_width);
            let glyph = if value < Decimal::ZERO { "-" } else { "#" };
            let _ = writeln!(
                out,
                "  {category:<label_width$} |{} {}",
                glyph.repeat(len),
                format_amount(value, scale)
            );
        }
        out
    }
}

impl Presenter for TextPresenter {
    type Output = String;

    fn present(&mut self, statements: &FinancialStatements) -> StatementResult<String> {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({:?}, {})\n",
            statements.entity_name,
            statements.currency,
            scale_label(statements.scale)
        );

        for (view, chart) in statements.views().iter().zip(statements.charts().iter()) {
            out.push_str(&self.render_view(view, statements.scale));
            if self.show_charts {
                out.push('\n');
                out.push_str(&self.render_chart(chart, statements.scale));
            }
            out.push('\n');
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format an amount as `$21,500.00M` (negative: `-$2,000.00M`).
pub fn format_amount(value: Money, scale: AmountScale) -> String {
    let fixed = format!("{:.2}", value.abs().round_dp(2));
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{frac}{}", scale.suffix())
}

pub fn reconciliation_message(reconciliation: &Reconciliation, scale: AmountScale) -> String {
    match reconciliation {
        Reconciliation::Balanced => "Check: Assets = Liabilities + Equity (balanced)".to_string(),
        Reconciliation::Unbalanced { diff } => format!(
            "Error: totals do not match (difference {})",
            format_amount(*diff, scale)
        ),
    }
}

fn scale_label(scale: AmountScale) -> &'static str {
    match scale {
        AmountScale::Units => "units",
        AmountScale::Thousands => "thousands",
        AmountScale::Millions => "millions",
        AmountScale::Billions => "billions",
    }
}

fn bar_length(value: Money, max: Money, width: usize) -> usize {
    if max.is_zero() {
        return 0;
    }
    (value.abs() / max * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::StatementInputs;
    use crate::statements::build_statements;
    use rust_decimal_macros::dec;

    fn shipped() -> FinancialStatements {
        build_statements(&StatementInputs::shipped()).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(122600), AmountScale::Millions), "$122,600.00M");
        assert_eq!(format_amount(dec!(300), AmountScale::Millions), "$300.00M");
        assert_eq!(format_amount(dec!(-10000), AmountScale::Millions), "-$10,000.00M");
        assert_eq!(format_amount(dec!(1234567.891), AmountScale::Units), "$1,234,567.89");
        assert_eq!(format_amount(dec!(0), AmountScale::Billions), "$0.00B");
    }

    #[test]
    fn test_balance_sheet_view() {
        let view = shipped().balance_sheet.view();
        assert_eq!(view.sections.len(), 3);
        assert_eq!(view.sections[0].name, "Assets");
        assert_eq!(
            view.sections[0].items[0],
            (balance_sheet::CASH.to_string(), dec!(21500))
        );
        assert!(view.total_keys.contains(balance_sheet::CURRENT_ASSETS));
        assert!(view.total_keys.contains(balance_sheet::TOTAL_LIABILITIES_AND_EQUITY));
        assert!(!view.total_keys.contains(balance_sheet::GOODWILL));
        assert_eq!(view.reconciliation, Some(Reconciliation::Balanced));
    }

    #[test]
    fn test_income_view_single_section() {
        let view = shipped().income_statement.view();
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].items.len(), 10);
        assert_eq!(view.summary[0].1, dec!(11000));
        assert!(view.reconciliation.is_none());
    }

    #[test]
    fn test_charts() {
        let charts = shipped().charts();
        assert_eq!(
            charts[0].values,
            vec![dec!(27400), dec!(95200), dec!(12800), dec!(75000), dec!(34800)]
        );
        assert_eq!(charts[1].categories.len(), 4);
        assert_eq!(charts[2].values.last(), Some(&dec!(1000)));
    }

    #[test]
    fn test_bar_length_scales_to_width() {
        assert_eq!(bar_length(dec!(50), dec!(100), 40), 20);
        assert_eq!(bar_length(dec!(-100), dec!(100), 40), 40);
        assert_eq!(bar_length(dec!(5), Decimal::ZERO, 40), 0);
    }

    #[test]
    fn test_text_presenter_renders_all_statements() {
        let mut presenter = TextPresenter::default();
        let text = presenter.present(&shipped()).unwrap();
        assert!(text.starts_with("Oracle-Style Corp (USD, millions)"));
        assert!(text.contains("BALANCE SHEET"));
        assert!(text.contains("INCOME STATEMENT"));
        assert!(text.contains("CASH FLOW STATEMENT"));
        assert!(text.contains("TOTAL ASSETS: $122,600.00M"));
        assert!(text.contains("  Goodwill: $45,000.00M"));
        assert!(text.contains("Check: Assets = Liabilities + Equity (balanced)"));
        assert!(text.contains("Cash Flow Breakdown"));
    }

    #[test]
    fn test_unbalanced_message() {
        let msg = reconciliation_message(
            &Reconciliation::Unbalanced { diff: dec!(1300) },
            AmountScale::Millions,
        );
        assert_eq!(msg, "Error: totals do not match (difference $1,300.00M)");
    }

    #[test]
    fn test_charts_can_be_hidden() {
        let mut presenter = TextPresenter {
            show_charts: false,
            ..TextPresenter::default()
        };
        let text = presenter.present(&shipped()).unwrap();
        assert!(!text.contains("Breakdown"));
    }
}
