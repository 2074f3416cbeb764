use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inputs::BalanceSheetInputs;
use crate::line_items::{Section, SectionKind};
use crate::types::Money;
use crate::StatementResult;

// ---------------------------------------------------------------------------
// Line item names
// ---------------------------------------------------------------------------

pub const CASH: &str = "Cash and Equivalents";
pub const ACCOUNTS_RECEIVABLE: &str = "Accounts Receivable";
pub const INVENTORY: &str = "Inventory";
pub const CURRENT_ASSETS: &str = "Current Assets";
pub const PROPERTY_PLANT_EQUIPMENT: &str = "Property, Plant, Equipment";
pub const INTANGIBLE_ASSETS: &str = "Intangible Assets";
pub const GOODWILL: &str = "Goodwill";
pub const NON_CURRENT_ASSETS: &str = "Non-Current Assets";
pub const TOTAL_ASSETS: &str = "Total Assets";

pub const ACCOUNTS_PAYABLE: &str = "Accounts Payable";
pub const SHORT_TERM_DEBT: &str = "Short-Term Debt";
pub const DEFERRED_REVENUE: &str = "Deferred Revenue";
pub const CURRENT_LIABILITIES: &str = "Current Liabilities";
pub const LONG_TERM_DEBT: &str = "Long-Term Debt";
pub const NON_CURRENT_LIABILITIES: &str = "Non-Current Liabilities";
pub const TOTAL_LIABILITIES: &str = "Total Liabilities";

pub const COMMON_STOCK: &str = "Common Stock";
pub const RETAINED_EARNINGS: &str = "Retained Earnings";
pub const TOTAL_EQUITY: &str = "Total Equity";

pub const TOTAL_LIABILITIES_AND_EQUITY: &str = "Total Liabilities and Equity";

// ---------------------------------------------------------------------------
// Output structs
// ---------------------------------------------------------------------------

/// Balance sheet for the single reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSheet {
    pub assets: Section,
    pub liabilities: Section,
    pub equity: Section,
    /// Derived from asset primitives only
    pub total_assets: Money,
    /// Derived from liability and equity primitives only
    pub total_liabilities_and_equity: Money,
}

impl BalanceSheet {
    pub fn current_assets(&self) -> Money {
        self.assets.get(CURRENT_ASSETS).unwrap_or(Decimal::ZERO)
    }

    pub fn non_current_assets(&self) -> Money {
        self.assets.get(NON_CURRENT_ASSETS).unwrap_or(Decimal::ZERO)
    }

    pub fn current_liabilities(&self) -> Money {
        self.liabilities
            .get(CURRENT_LIABILITIES)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn non_current_liabilities(&self) -> Money {
        self.liabilities
            .get(NON_CURRENT_LIABILITIES)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_liabilities(&self) -> Money {
        self.liabilities.total()
    }

    pub fn total_equity(&self) -> Money {
        self.equity.total()
    }

    pub fn sections(&self) -> [&Section; 3] {
        [&self.assets, &self.liabilities, &self.equity]
    }
}

/// Outcome of comparing total assets with total liabilities and equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    Balanced,
    /// `diff = total_assets - total_liabilities_and_equity`
    Unbalanced { diff: Money },
}

impl Reconciliation {
    pub fn is_balanced(&self) -> bool {
        matches!(self, Reconciliation::Balanced)
    }

    pub fn diff(&self) -> Money {
        match self {
            Reconciliation::Balanced => Decimal::ZERO,
            Reconciliation::Unbalanced { diff } => *diff,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the balance sheet. The two grand totals are summed from disjoint
/// primitive sets, so [`verify`] is a real check rather than a tautology.
pub fn build(input: &BalanceSheetInputs) -> StatementResult<BalanceSheet> {
    let assets = Section::builder(SectionKind::Assets)
        .input(CASH, input.cash)
        .input(ACCOUNTS_RECEIVABLE, input.accounts_receivable)
        .input(INVENTORY, input.inventory)
        .subtotal(CURRENT_ASSETS)
        .input(PROPERTY_PLANT_EQUIPMENT, input.property_plant_equipment)
        .input(INTANGIBLE_ASSETS, input.intangible_assets)
        .input(GOODWILL, input.goodwill)
        .subtotal(NON_CURRENT_ASSETS)
        .total(TOTAL_ASSETS)
        .finish()?;

    let liabilities = Section::builder(SectionKind::Liabilities)
        .input(ACCOUNTS_PAYABLE, input.accounts_payable)
        .input(SHORT_TERM_DEBT, input.short_term_debt)
        .input(DEFERRED_REVENUE, input.deferred_revenue)
        .subtotal(CURRENT_LIABILITIES)
        .input(LONG_TERM_DEBT, input.long_term_debt)
        .subtotal(NON_CURRENT_LIABILITIES)
        .total(TOTAL_LIABILITIES)
        .finish()?;

    let equity = Section::builder(SectionKind::Equity)
        .input(COMMON_STOCK, input.common_stock)
        .input(RETAINED_EARNINGS, input.retained_earnings)
        .total(TOTAL_EQUITY)
        .finish()?;

    let total_assets = assets.total();
    let total_liabilities_and_equity = liabilities.total() + equity.total();

    debug!(
        %total_assets,
        %total_liabilities_and_equity,
        "balance sheet built"
    );

    Ok(BalanceSheet {
        assets,
        liabilities,
        equity,
        total_assets,
        total_liabilities_and_equity,
    })
}

/// Compare the two grand totals with zero tolerance.
pub fn verify(bs: &BalanceSheet) -> Reconciliation {
    let diff = bs.total_assets - bs.total_liabilities_and_equity;
    if diff.is_zero() {
        Reconciliation::Balanced
    } else {
        Reconciliation::Unbalanced { diff }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn shipped() -> BalanceSheet {
        build(&BalanceSheetInputs::default()).unwrap()
    }

    #[test]
    fn test_current_and_non_current_assets() {
        let bs = shipped();
        // 21500 + 5600 + 300
        assert_eq!(bs.current_assets(), dec!(27400));
        // 7200 + 43000 + 45000
        assert_eq!(bs.non_current_assets(), dec!(95200));
        assert_eq!(bs.total_assets, dec!(122600));
    }

    #[test]
    fn test_liabilities() {
        let bs = shipped();
        // 800 + 3500 + 8500
        assert_eq!(bs.current_liabilities(), dec!(12800));
        assert_eq!(bs.non_current_liabilities(), dec!(75000));
        assert_eq!(bs.total_liabilities(), dec!(87800));
    }

    #[test]
    fn test_equity_and_grand_total() {
        let bs = shipped();
        assert_eq!(bs.total_equity(), dec!(34800));
        assert_eq!(bs.total_liabilities_and_equity, dec!(122600));
    }

    #[test]
    fn test_shipped_sheet_balances() {
        let bs = shipped();
        assert_eq!(verify(&bs), Reconciliation::Balanced);
        assert_eq!(verify(&bs).diff(), Decimal::ZERO);
    }

    #[test]
    fn test_asset_perturbation_reports_positive_diff() {
        let mut input = BalanceSheetInputs::default();
        input.goodwill += dec!(1300);
        let bs = build(&input).unwrap();
        assert_eq!(verify(&bs), Reconciliation::Unbalanced { diff: dec!(1300) });
    }

    #[test]
    fn test_liability_perturbation_reports_negative_diff() {
        let mut input = BalanceSheetInputs::default();
        input.long_term_debt += dec!(0.01);
        let bs = build(&input).unwrap();
        let rec = verify(&bs);
        assert!(!rec.is_balanced());
        assert_eq!(rec.diff(), dec!(-0.01));
    }

    #[test]
    fn test_section_order_matches_display_order() {
        let bs = shipped();
        let names: Vec<&str> = bs.liabilities.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                ACCOUNTS_PAYABLE,
                SHORT_TERM_DEBT,
                DEFERRED_REVENUE,
                CURRENT_LIABILITIES,
                LONG_TERM_DEBT,
                NON_CURRENT_LIABILITIES,
                TOTAL_LIABILITIES,
            ]
        );
    }

    #[test]
    fn test_reconciliation_serializes_tagged() {
        let json = serde_json::to_value(Reconciliation::Unbalanced { diff: dec!(5) }).unwrap();
        assert_eq!(json["status"], "unbalanced");
        assert_eq!(json["diff"], "5");
    }
}
