use serde::Serialize;
use tracing::debug;

use crate::inputs::IncomeStatementInputs;
use crate::line_items::{LineItem, LineItemKind};
use crate::types::Money;

pub const REVENUE: &str = "Revenue";
pub const COST_OF_GOODS_SOLD: &str = "Cost of Goods Sold";
pub const GROSS_PROFIT: &str = "Gross Profit";
pub const OPERATING_EXPENSES: &str = "Operating Expenses";
pub const OPERATING_INCOME: &str = "Operating Income";
pub const INTEREST_EXPENSE: &str = "Interest Expense";
pub const OTHER_INCOME: &str = "Other Income";
pub const INCOME_BEFORE_TAXES: &str = "Income Before Taxes";
pub const INCOME_TAX: &str = "Income Tax";
pub const NET_INCOME: &str = "Net Income";

/// Revenue-to-net-income waterfall for the reporting period.
///
/// Costs are stored as positive amounts; the derived lines subtract them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeStatement {
    pub revenue: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub operating_expenses: Money,
    pub operating_income: Money,
    pub interest_expense: Money,
    pub other_income: Money,
    pub income_before_taxes: Money,
    pub income_tax: Money,
    net_income: Money,
}

impl IncomeStatement {
    /// Net income, the value the cash flow statement links to.
    pub fn net_income(&self) -> Money {
        self.net_income
    }

    /// The waterfall as display-ordered line items. Net income is the total.
    pub fn lines(&self) -> Vec<LineItem> {
        let line = |name: &str, value: Money, kind: LineItemKind| LineItem {
            name: name.to_string(),
            value,
            kind,
        };
        vec![
            line(REVENUE, self.revenue, LineItemKind::Input),
            line(COST_OF_GOODS_SOLD, self.cost_of_goods_sold, LineItemKind::Input),
            line(GROSS_PROFIT, self.gross_profit, LineItemKind::Subtotal),
            line(OPERATING_EXPENSES, self.operating_expenses, LineItemKind::Input),
            line(OPERATING_INCOME, self.operating_income, LineItemKind::Subtotal),
            line(INTEREST_EXPENSE, self.interest_expense, LineItemKind::Input),
            line(OTHER_INCOME, self.other_income, LineItemKind::Input),
            line(INCOME_BEFORE_TAXES, self.income_before_taxes, LineItemKind::Subtotal),
            line(INCOME_TAX, self.income_tax, LineItemKind::Input),
            line(NET_INCOME, self.net_income, LineItemKind::Total),
        ]
    }

    /// Re-derive each waterfall step and report any step that disagrees.
    pub fn consistency_errors(&self) -> Vec<String> {
        let checks = [
            (GROSS_PROFIT, self.gross_profit, self.revenue - self.cost_of_goods_sold),
            (
                OPERATING_INCOME,
                self.operating_income,
                self.gross_profit - self.operating_expenses,
            ),
            (
                INCOME_BEFORE_TAXES,
                self.income_before_taxes,
                self.operating_income - self.interest_expense + self.other_income,
            ),
            (NET_INCOME, self.net_income, self.income_before_taxes - self.income_tax),
        ];
        checks
            .iter()
            .filter(|(_, stored, derived)| stored != derived)
            .map(|(name, stored, derived)| {
                format!("Income Statement: '{name}' is {stored} but derives to {derived}")
            })
            .collect()
    }
}

/// Build the income statement waterfall.
pub fn build(input: &IncomeStatementInputs) -> IncomeStatement {
    let gross_profit = input.revenue - input.cost_of_goods_sold;
    let operating_income = gross_profit - input.operating_expenses;
    let income_before_taxes = operating_income - input.interest_expense + input.other_income;
    let net_income = income_before_taxes - input.income_tax;

    debug!(%gross_profit, %operating_income, %net_income, "income statement built");

    IncomeStatement {
        revenue: input.revenue,
        cost_of_goods_sold: input.cost_of_goods_sold,
        gross_profit,
        operating_expenses: input.operating_expenses,
        operating_income,
        interest_expense: input.interest_expense,
        other_income: input.other_income,
        income_before_taxes,
        income_tax: input.income_tax,
        net_income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_shipped_waterfall() {
        let is = build(&IncomeStatementInputs::default());
        assert_eq!(is.gross_profit, dec!(36000));
        assert_eq!(is.operating_income, dec!(15000));
        // 15000 - 2500 + 500
        assert_eq!(is.income_before_taxes, dec!(13000));
        assert_eq!(is.net_income(), dec!(11000));
    }

    #[test]
    fn test_operating_loss_carries_through() {
        let input = IncomeStatementInputs {
            revenue: dec!(1000),
            cost_of_goods_sold: dec!(800),
            operating_expenses: dec!(400),
            interest_expense: dec!(50),
            other_income: dec!(-25),
            income_tax: dec!(-30),
        };
        let is = build(&input);
        assert_eq!(is.operating_income, dec!(-200));
        assert_eq!(is.income_before_taxes, dec!(-275));
        // Tax benefit reduces the loss
        assert_eq!(is.net_income(), dec!(-245));
    }

    #[test]
    fn test_lines_order_and_kinds() {
        let is = build(&IncomeStatementInputs::default());
        let lines = is.lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0].name, REVENUE);
        assert_eq!(lines[2].kind, LineItemKind::Subtotal);
        let last = lines.last().unwrap();
        assert_eq!(last.name, NET_INCOME);
        assert_eq!(last.kind, LineItemKind::Total);
        assert_eq!(last.value, dec!(11000));
    }

    #[test]
    fn test_consistency_errors_empty_for_built_statement() {
        let is = build(&IncomeStatementInputs::default());
        assert!(is.consistency_errors().is_empty());
    }

    #[test]
    fn test_consistency_errors_detect_edit() {
        let mut is = build(&IncomeStatementInputs::default());
        is.gross_profit = dec!(1);
        // Gross profit and operating income both disagree
        assert_eq!(is.consistency_errors().len(), 2);
    }
}
