use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::StatementError;
use crate::inputs::{ImbalancePolicy, StatementInputs};
use crate::statements::balance_sheet::{self, BalanceSheet, Reconciliation};
use crate::statements::cash_flow::{self, CashFlowStatement};
use crate::statements::income_statement::{self, IncomeStatement};
use crate::types::{with_metadata, AmountScale, ComputationOutput, Currency, Money};
use crate::StatementResult;

const METHODOLOGY: &str = "Single-Period Linked Financial Statements with Balance Sheet Reconciliation";

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// The three statements for one entity and one period, plus the outcome of
/// the accounting identity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialStatements {
    pub entity_name: String,
    pub currency: Currency,
    pub scale: AmountScale,
    pub balance_sheet: BalanceSheet,
    pub income_statement: IncomeStatement,
    pub cash_flow: CashFlowStatement,
    pub reconciliation: Reconciliation,
}

impl FinancialStatements {
    /// Cash at the start of the period: balance sheet cash less the net
    /// change reported on the cash flow statement.
    pub fn implied_opening_cash(&self) -> Money {
        self.balance_sheet.assets.get(balance_sheet::CASH).unwrap_or(Decimal::ZERO)
            - self.cash_flow.net_change_in_cash
    }

    /// Re-derive every invariant from the stored statements and describe each
    /// one that does not hold. Empty when the model is internally consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let bs = &self.balance_sheet;
        let is = &self.income_statement;
        let cf = &self.cash_flow;

        let mut violations: Vec<String> = bs
            .sections()
            .iter()
            .chain(cf.sections().iter())
            .flat_map(|section| section.consistency_errors())
            .collect();
        violations.extend(is.consistency_errors());

        if bs.total_assets != bs.assets.total() {
            violations.push(format!(
                "Total assets {} differ from the assets section total {}",
                bs.total_assets,
                bs.assets.total()
            ));
        }
        let liabilities_and_equity = bs.liabilities.total() + bs.equity.total();
        if bs.total_liabilities_and_equity != liabilities_and_equity {
            violations.push(format!(
                "Total liabilities and equity {} differ from section totals {liabilities_and_equity}",
                bs.total_liabilities_and_equity
            ));
        }

        let recomputed = balance_sheet::verify(bs);
        if recomputed != self.reconciliation {
            violations.push(format!(
                "Stored reconciliation {:?} disagrees with recomputed {recomputed:?}",
                self.reconciliation
            ));
        }
        if let Reconciliation::Unbalanced { diff } = recomputed {
            violations.push(format!(
                "Assets ({}) != Liabilities + Equity ({}), difference {diff}",
                bs.total_assets, bs.total_liabilities_and_equity
            ));
        }

        match cf.net_income() {
            Some(linked) if linked == is.net_income() => {}
            Some(linked) => violations.push(format!(
                "Cash flow net income {linked} differs from income statement net income {}",
                is.net_income()
            )),
            None => violations.push("Cash flow statement has no net income line".to_string()),
        }

        let cash_sum =
            cf.cash_from_operating() + cf.cash_from_investing() + cf.cash_from_financing();
        if cf.net_change_in_cash != cash_sum {
            violations.push(format!(
                "Net change in cash {} differs from operating + investing + financing {cash_sum}",
                cf.net_change_in_cash
            ));
        }

        violations
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the three statements and reconcile the balance sheet.
///
/// Net income flows from the income statement into the cash flow builder as
/// a value; it is computed exactly once. The imbalance policy is not applied
/// here, so an unbalanced sheet comes back with `Reconciliation::Unbalanced`.
pub fn build_statements(input: &StatementInputs) -> StatementResult<FinancialStatements> {
    input.validate()?;

    let income_statement = income_statement::build(&input.income_statement);
    let balance_sheet = balance_sheet::build(&input.balance_sheet)?;
    let cash_flow = cash_flow::build(&input.cash_flow, income_statement.net_income())?;
    let reconciliation = balance_sheet::verify(&balance_sheet);

    Ok(FinancialStatements {
        entity_name: input.entity_name.clone(),
        currency: input.currency.clone(),
        scale: input.scale,
        balance_sheet,
        income_statement,
        cash_flow,
        reconciliation,
    })
}

/// Build, reconcile and wrap the statements in the standard computation
/// envelope. Under [`ImbalancePolicy::Strict`] an unbalanced sheet is an
/// error; otherwise it is reported as a warning.
pub fn build_financial_statements(
    input: &StatementInputs,
) -> StatementResult<ComputationOutput<FinancialStatements>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let statements = build_statements(input)?;

    if let Reconciliation::Unbalanced { diff } = statements.reconciliation {
        warn!(%diff, policy = ?input.imbalance_policy, "balance sheet does not balance");
        if input.imbalance_policy == ImbalancePolicy::Strict {
            return Err(StatementError::UnbalancedStatement { diff });
        }
        let direction = if diff > Decimal::ZERO {
            "exceed"
        } else {
            "fall short of"
        };
        warnings.push(format!(
            "Balance sheet does not balance: assets {direction} liabilities plus equity by {}",
            diff.abs()
        ));
    }

    let net_income = statements.income_statement.net_income();
    if net_income < Decimal::ZERO {
        warnings.push(format!("Net loss for the period ({net_income})"));
    }

    let net_change = statements.cash_flow.net_change_in_cash;
    if net_change < Decimal::ZERO {
        warnings.push(format!("Cash decreased over the period ({net_change})"));
    }

    let opening_cash = statements.implied_opening_cash();
    if opening_cash < Decimal::ZERO {
        warnings.push(format!(
            "Implied opening cash is negative ({opening_cash}); check the cash flow inputs"
        ));
    }

    let total_equity = statements.balance_sheet.total_equity();
    if total_equity < Decimal::ZERO {
        warnings.push(format!("Negative shareholders' equity ({total_equity})"));
    }

    debug!(warnings = warnings.len(), "financial statements built");

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        METHODOLOGY,
        input,
        warnings,
        elapsed,
        statements,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
