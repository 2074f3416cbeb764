use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::StatementError;
use crate::types::{AmountScale, Currency, Money};
use crate::StatementResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Primitive balance sheet amounts. Asset and liability lines are carried as
/// non-negative balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceSheetInputs {
    /// Cash and equivalents
    pub cash: Money,
    pub accounts_receivable: Money,
    pub inventory: Money,
    /// Property, plant and equipment (net)
    pub property_plant_equipment: Money,
    /// Patents, licences and other identifiable intangibles
    pub intangible_assets: Money,
    pub goodwill: Money,
    pub accounts_payable: Money,
    pub short_term_debt: Money,
    pub deferred_revenue: Money,
    pub long_term_debt: Money,
    pub common_stock: Money,
    /// May be negative (accumulated deficit)
    pub retained_earnings: Money,
}

impl Default for BalanceSheetInputs {
    fn default() -> Self {
        Self {
            cash: dec!(21500),
            accounts_receivable: dec!(5600),
            inventory: dec!(300),
            property_plant_equipment: dec!(7200),
            intangible_assets: dec!(43000),
            goodwill: dec!(45000),
            accounts_payable: dec!(800),
            short_term_debt: dec!(3500),
            deferred_revenue: dec!(8500),
            long_term_debt: dec!(75000),
            common_stock: dec!(31000),
            retained_earnings: dec!(3800),
        }
    }
}

/// Primitive income statement amounts. Costs are positive and subtracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeStatementInputs {
    pub revenue: Money,
    pub cost_of_goods_sold: Money,
    /// R&D, sales and administrative expenses
    pub operating_expenses: Money,
    pub interest_expense: Money,
    /// Non-operating income; negative for a net expense
    pub other_income: Money,
    /// Negative for a tax benefit
    pub income_tax: Money,
}

impl Default for IncomeStatementInputs {
    fn default() -> Self {
        Self {
            revenue: dec!(50000),
            cost_of_goods_sold: dec!(14000),
            operating_expenses: dec!(21000),
            interest_expense: dec!(2500),
            other_income: dec!(500),
            income_tax: dec!(2000),
        }
    }
}

/// Primitive cash flow amounts, signed as cash movements: outflows negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowInputs {
    pub depreciation_amortization: Money,
    pub change_in_working_capital: Money,
    pub capital_expenditures: Money,
    pub acquisitions: Money,
    pub debt_issuance: Money,
    pub dividends_paid: Money,
    pub stock_repurchases: Money,
}

impl Default for CashFlowInputs {
    fn default() -> Self {
        Self {
            depreciation_amortization: dec!(3000),
            change_in_working_capital: dec!(-500),
            capital_expenditures: dec!(-2000),
            acquisitions: dec!(-1500),
            debt_issuance: dec!(5000),
            dividends_paid: dec!(-4000),
            stock_repurchases: dec!(-10000),
        }
    }
}

/// How an unbalanced balance sheet is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalancePolicy {
    /// Return the statements with a warning and an `Unbalanced` reconciliation
    #[default]
    Advisory,
    /// Fail the build with `StatementError::UnbalancedStatement`
    Strict,
}

/// Full input specification for the single-period statements model.
///
/// Every section defaults to the shipped constants, so a partial JSON or
/// YAML document only needs the amounts it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementInputs {
    /// Display name of the reporting entity
    pub entity_name: String,
    pub currency: Currency,
    pub scale: AmountScale,
    pub imbalance_policy: ImbalancePolicy,
    pub balance_sheet: BalanceSheetInputs,
    pub income_statement: IncomeStatementInputs,
    pub cash_flow: CashFlowInputs,
}

impl Default for StatementInputs {
    fn default() -> Self {
        Self {
            entity_name: "Oracle-Style Corp".to_string(),
            currency: Currency::default(),
            scale: AmountScale::default(),
            imbalance_policy: ImbalancePolicy::default(),
            balance_sheet: BalanceSheetInputs::default(),
            income_statement: IncomeStatementInputs::default(),
            cash_flow: CashFlowInputs::default(),
        }
    }
}

/// Largest magnitude accepted for any single primitive. Keeps every derived
/// line well inside `Decimal` range.
pub const MAX_PRIMITIVE_MAGNITUDE: Decimal = dec!(1000000000000000);

/// Override keys accepted by [`StatementInputs::apply_overrides`], in
/// statement order.
pub const PRIMITIVE_KEYS: [&str; 25] = [
    "cash",
    "accounts_receivable",
    "inventory",
    "property_plant_equipment",
    "intangible_assets",
    "goodwill",
    "accounts_payable",
    "short_term_debt",
    "deferred_revenue",
    "long_term_debt",
    "common_stock",
    "retained_earnings",
    "revenue",
    "cost_of_goods_sold",
    "operating_expenses",
    "interest_expense",
    "other_income",
    "income_tax",
    "depreciation_amortization",
    "change_in_working_capital",
    "capital_expenditures",
    "acquisitions",
    "debt_issuance",
    "dividends_paid",
    "stock_repurchases",
];

impl StatementInputs {
    /// The shipped single-period constants (USD millions).
    pub fn shipped() -> Self {
        Self::default()
    }

    /// Mutable handle to the primitive named `key`.
    pub fn primitive_mut(&mut self, key: &str) -> Option<&mut Money> {
        let bs = &mut self.balance_sheet;
        let is = &mut self.income_statement;
        let cf = &mut self.cash_flow;
        let slot = match key {
            "cash" => &mut bs.cash,
            "accounts_receivable" => &mut bs.accounts_receivable,
            "inventory" => &mut bs.inventory,
            "property_plant_equipment" => &mut bs.property_plant_equipment,
            "intangible_assets" => &mut bs.intangible_assets,
            "goodwill" => &mut bs.goodwill,
            "accounts_payable" => &mut bs.accounts_payable,
            "short_term_debt" => &mut bs.short_term_debt,
            "deferred_revenue" => &mut bs.deferred_revenue,
            "long_term_debt" => &mut bs.long_term_debt,
            "common_stock" => &mut bs.common_stock,
            "retained_earnings" => &mut bs.retained_earnings,
            "revenue" => &mut is.revenue,
            "cost_of_goods_sold" => &mut is.cost_of_goods_sold,
            "operating_expenses" => &mut is.operating_expenses,
            "interest_expense" => &mut is.interest_expense,
            "other_income" => &mut is.other_income,
            "income_tax" => &mut is.income_tax,
            "depreciation_amortization" => &mut cf.depreciation_amortization,
            "change_in_working_capital" => &mut cf.change_in_working_capital,
            "capital_expenditures" => &mut cf.capital_expenditures,
            "acquisitions" => &mut cf.acquisitions,
            "debt_issuance" => &mut cf.debt_issuance,
            "dividends_paid" => &mut cf.dividends_paid,
            "stock_repurchases" => &mut cf.stock_repurchases,
            _ => return None,
        };
        Some(slot)
    }

    /// Value of the primitive named `key`.
    pub fn primitive(&self, key: &str) -> Option<Money> {
        self.primitives()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Every primitive as `(key, value)` pairs in statement order.
    pub fn primitives(&self) -> Vec<(&'static str, Money)> {
        let bs = &self.balance_sheet;
        let is = &self.income_statement;
        let cf = &self.cash_flow;
        vec![
            ("cash", bs.cash),
            ("accounts_receivable", bs.accounts_receivable),
            ("inventory", bs.inventory),
            ("property_plant_equipment", bs.property_plant_equipment),
            ("intangible_assets", bs.intangible_assets),
            ("goodwill", bs.goodwill),
            ("accounts_payable", bs.accounts_payable),
            ("short_term_debt", bs.short_term_debt),
            ("deferred_revenue", bs.deferred_revenue),
            ("long_term_debt", bs.long_term_debt),
            ("common_stock", bs.common_stock),
            ("retained_earnings", bs.retained_earnings),
            ("revenue", is.revenue),
            ("cost_of_goods_sold", is.cost_of_goods_sold),
            ("operating_expenses", is.operating_expenses),
            ("interest_expense", is.interest_expense),
            ("other_income", is.other_income),
            ("income_tax", is.income_tax),
            ("depreciation_amortization", cf.depreciation_amortization),
            ("change_in_working_capital", cf.change_in_working_capital),
            ("capital_expenditures", cf.capital_expenditures),
            ("acquisitions", cf.acquisitions),
            ("debt_issuance", cf.debt_issuance),
            ("dividends_paid", cf.dividends_paid),
            ("stock_repurchases", cf.stock_repurchases),
        ]
    }

    /// Replace primitives from a caller-supplied key/value map. Unknown keys
    /// are rejected before anything is changed.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Money>) -> StatementResult<()> {
        if let Some(unknown) = overrides
            .keys()
            .find(|k| !PRIMITIVE_KEYS.contains(&k.as_str()))
        {
            return Err(StatementError::InvalidInput {
                field: unknown.clone(),
                reason: "Unknown primitive; see PRIMITIVE_KEYS for accepted names".into(),
            });
        }

        for (key, value) in overrides {
            if let Some(slot) = self.primitive_mut(key) {
                *slot = *value;
            }
        }
        Ok(())
    }

    /// Reject malformed primitives before any statement is built.
    pub fn validate(&self) -> StatementResult<()> {
        for (key, value) in self.primitives() {
            validate_magnitude(key, value)?;
        }

        let bs = &self.balance_sheet;
        validate_non_negative("cash", bs.cash)?;
        validate_non_negative("accounts_receivable", bs.accounts_receivable)?;
        validate_non_negative("inventory", bs.inventory)?;
        validate_non_negative("property_plant_equipment", bs.property_plant_equipment)?;
        validate_non_negative("intangible_assets", bs.intangible_assets)?;
        validate_non_negative("goodwill", bs.goodwill)?;
        validate_non_negative("accounts_payable", bs.accounts_payable)?;
        validate_non_negative("short_term_debt", bs.short_term_debt)?;
        validate_non_negative("deferred_revenue", bs.deferred_revenue)?;
        validate_non_negative("long_term_debt", bs.long_term_debt)?;
        validate_non_negative("common_stock", bs.common_stock)?;

        let is = &self.income_statement;
        validate_non_negative("revenue", is.revenue)?;
        validate_non_negative("cost_of_goods_sold", is.cost_of_goods_sold)?;
        validate_non_negative("operating_expenses", is.operating_expenses)?;
        validate_non_negative("interest_expense", is.interest_expense)?;

        let cf = &self.cash_flow;
        validate_non_negative("depreciation_amortization", cf.depreciation_amortization)?;
        validate_non_negative("debt_issuance", cf.debt_issuance)?;
        validate_outflow("capital_expenditures", cf.capital_expenditures)?;
        validate_outflow("acquisitions", cf.acquisitions)?;
        validate_outflow("dividends_paid", cf.dividends_paid)?;
        validate_outflow("stock_repurchases", cf.stock_repurchases)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Override parsing
// ---------------------------------------------------------------------------

/// Parse a `key=value` assignment such as `retained_earnings=3800`.
/// Underscores and commas inside the number are ignored.
pub fn parse_assignment(raw: &str) -> StatementResult<(String, Money)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| StatementError::InvalidInput {
        field: raw.to_string(),
        reason: "Expected key=value".into(),
    })?;

    let key = key.trim().to_string();
    if !PRIMITIVE_KEYS.contains(&key.as_str()) {
        return Err(StatementError::InvalidInput {
            field: key,
            reason: "Unknown primitive".into(),
        });
    }

    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != ',')
        .collect();
    let amount = Decimal::from_str(&cleaned).map_err(|e| StatementError::InvalidInput {
        field: key.clone(),
        reason: format!("Not a decimal amount '{}': {e}", value.trim()),
    })?;

    Ok((key, amount))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_magnitude(field: &str, value: Money) -> StatementResult<()> {
    if value.abs() > MAX_PRIMITIVE_MAGNITUDE {
        return Err(StatementError::InvalidInput {
            field: field.into(),
            reason: format!("Magnitude exceeds {MAX_PRIMITIVE_MAGNITUDE}, got {value}"),
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Money) -> StatementResult<()> {
    if value < Decimal::ZERO {
        return Err(StatementError::InvalidInput {
            field: field.into(),
            reason: format!("Value must be non-negative, got {value}"),
        });
    }
    Ok(())
}

fn validate_outflow(field: &str, value: Money) -> StatementResult<()> {
    if value > Decimal::ZERO {
        return Err(StatementError::InvalidInput {
            field: field.into(),
            reason: format!("Cash outflow must be zero or negative, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
