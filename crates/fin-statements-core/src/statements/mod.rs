pub mod balance_sheet;
pub mod cash_flow;
pub mod income_statement;
pub mod model;

pub use balance_sheet::{BalanceSheet, Reconciliation};
pub use cash_flow::CashFlowStatement;
pub use income_statement::IncomeStatement;
pub use model::{build_financial_statements, build_statements, FinancialStatements};
