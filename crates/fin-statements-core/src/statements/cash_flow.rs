use serde::Serialize;
use tracing::debug;

use crate::inputs::CashFlowInputs;
use crate::line_items::{Section, SectionKind};
use crate::types::Money;
use crate::StatementResult;

pub const NET_INCOME: &str = "Net Income";
pub const DEPRECIATION_AMORTIZATION: &str = "Depreciation and Amortization";
pub const CHANGE_IN_WORKING_CAPITAL: &str = "Changes in Working Capital";
pub const CASH_FROM_OPERATING: &str = "Cash from Operating Activities";

pub const CAPITAL_EXPENDITURES: &str = "Capital Expenditures";
pub const ACQUISITIONS: &str = "Acquisitions";
pub const CASH_FROM_INVESTING: &str = "Cash from Investing Activities";

pub const DEBT_ISSUANCE: &str = "Debt Issuance";
pub const DIVIDENDS_PAID: &str = "Dividends Paid";
pub const STOCK_REPURCHASES: &str = "Stock Repurchasing";
pub const CASH_FROM_FINANCING: &str = "Cash from Financing Activities";

pub const NET_CHANGE_IN_CASH: &str = "Net Change in Cash";

/// Cash flow statement for the reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CashFlowStatement {
    pub operating: Section,
    pub investing: Section,
    pub financing: Section,
    pub net_change_in_cash: Money,
}

impl CashFlowStatement {
    /// The net income line carried over from the income statement.
    pub fn net_income(&self) -> Option<Money> {
        self.operating.get(NET_INCOME)
    }

    pub fn cash_from_operating(&self) -> Money {
        self.operating.total()
    }

    pub fn cash_from_investing(&self) -> Money {
        self.investing.total()
    }

    pub fn cash_from_financing(&self) -> Money {
        self.financing.total()
    }

    pub fn sections(&self) -> [&Section; 3] {
        [&self.operating, &self.investing, &self.financing]
    }
}

/// Build the cash flow statement.
///
/// `net_income` must be the income statement's value; it is placed on the
/// operating section unchanged and never recomputed here.
pub fn build(input: &CashFlowInputs, net_income: Money) -> StatementResult<CashFlowStatement> {
    let operating = Section::builder(SectionKind::OperatingActivities)
        .input(NET_INCOME, net_income)
        .input(DEPRECIATION_AMORTIZATION, input.depreciation_amortization)
        .input(CHANGE_IN_WORKING_CAPITAL, input.change_in_working_capital)
        .total(CASH_FROM_OPERATING)
        .finish()?;

    let investing = Section::builder(SectionKind::InvestingActivities)
        .input(CAPITAL_EXPENDITURES, input.capital_expenditures)
        .input(ACQUISITIONS, input.acquisitions)
        .total(CASH_FROM_INVESTING)
        .finish()?;

    let financing = Section::builder(SectionKind::FinancingActivities)
        .input(DEBT_ISSUANCE, input.debt_issuance)
        .input(DIVIDENDS_PAID, input.dividends_paid)
        .input(STOCK_REPURCHASES, input.stock_repurchases)
        .total(CASH_FROM_FINANCING)
        .finish()?;

    let net_change_in_cash = operating.total() + investing.total() + financing.total();

    debug!(%net_income, %net_change_in_cash, "cash flow statement built");

    Ok(CashFlowStatement {
        operating,
        investing,
        financing,
        net_change_in_cash,
    })
}
