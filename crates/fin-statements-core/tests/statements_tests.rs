use fin_statements_core::inputs::{parse_assignment, ImbalancePolicy, StatementInputs};
use fin_statements_core::line_items::LineItemKind;
use fin_statements_core::presenter::{Presenter, TextPresenter};
use fin_statements_core::statements::balance_sheet::{self, Reconciliation};
use fin_statements_core::statements::{
    build_financial_statements, build_statements, cash_flow, income_statement,
};
use fin_statements_core::StatementError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

// ===========================================================================
// End-to-end scenarios on the shipped constants
// ===========================================================================

#[test]
fn test_shipped_balance_sheet_reconciles() {
    let out = build_statements(&StatementInputs::shipped()).unwrap();
    let bs = &out.balance_sheet;

    assert_eq!(balance_sheet::verify(bs), Reconciliation::Balanced);
    assert_eq!(out.reconciliation.diff(), Decimal::ZERO);

    assert_eq!(bs.current_assets(), dec!(27400));
    assert_eq!(bs.non_current_assets(), dec!(95200));
    assert_eq!(bs.total_assets, dec!(122600));
    assert_eq!(bs.total_liabilities_and_equity, dec!(122600));
}

#[test]
fn test_shipped_income_waterfall() {
    let out = build_statements(&StatementInputs::shipped()).unwrap();
    let is = &out.income_statement;

    assert_eq!(is.revenue, dec!(50000));
    assert_eq!(is.cost_of_goods_sold, dec!(14000));
    assert_eq!(is.gross_profit, dec!(36000));
    assert_eq!(is.operating_income, dec!(15000));
    assert_eq!(is.income_before_taxes, dec!(13000));
    assert_eq!(is.net_income(), dec!(11000));
}

#[test]
fn test_shipped_cash_flow() {
    let out = build_statements(&StatementInputs::shipped()).unwrap();
    let cf = &out.cash_flow;

    assert_eq!(cf.net_income(), Some(dec!(11000)));
    assert_eq!(cf.cash_from_operating(), dec!(13500));
    assert_eq!(cf.cash_from_investing(), dec!(-3500));
    assert_eq!(cf.cash_from_financing(), dec!(-9000));
    assert_eq!(cf.net_change_in_cash, dec!(1000));
}

#[test]
fn test_operating_section_display_order() {
    let out = build_statements(&StatementInputs::shipped()).unwrap();
    let items: Vec<(&str, LineItemKind)> = out
        .cash_flow
        .operating
        .iter()
        .map(|i| (i.name.as_str(), i.kind))
        .collect();

    assert_eq!(
        items,
        vec![
            (cash_flow::NET_INCOME, LineItemKind::Input),
            (cash_flow::DEPRECIATION_AMORTIZATION, LineItemKind::Input),
            (cash_flow::CHANGE_IN_WORKING_CAPITAL, LineItemKind::Input),
            (cash_flow::CASH_FROM_OPERATING, LineItemKind::Total),
        ]
    );
}

#[test]
fn test_build_is_idempotent() {
    let input = StatementInputs::shipped();
    let first = build_statements(&input).unwrap();
    let second = build_statements(&input).unwrap();
    assert_eq!(first, second);

    let first_json = serde_json::to_value(&first).unwrap();
    let second_json = serde_json::to_value(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn test_envelope_echoes_assumptions() {
    let out = build_financial_statements(&StatementInputs::shipped()).unwrap();
    assert_eq!(out.assumptions["balance_sheet"]["goodwill"], "45000");
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.warnings.is_empty());
}

// ===========================================================================
// Caller-supplied inputs
// ===========================================================================

#[test]
fn test_source_constants_surface_imbalance() {
    // Retained earnings of 2500 leaves the sheet 1300 short on the
    // liabilities and equity side.
    let mut overrides = BTreeMap::new();
    overrides.insert("retained_earnings".to_string(), dec!(2500));
    let mut input = StatementInputs::shipped();
    input.apply_overrides(&overrides).unwrap();

    let out = build_financial_statements(&input).unwrap();
    assert_eq!(
        out.result.reconciliation,
        Reconciliation::Unbalanced { diff: dec!(1300) }
    );
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(
        out.warnings[0],
        "Balance sheet does not balance: assets exceed liabilities plus equity by 1300"
    );
}

#[test]
fn test_strict_policy_from_json() {
    let input: StatementInputs = serde_json::from_str(
        r#"{
            "imbalance_policy": "strict",
            "balance_sheet": { "inventory": "400" }
        }"#,
    )
    .unwrap();

    match build_financial_statements(&input).unwrap_err() {
        StatementError::UnbalancedStatement { diff } => assert_eq!(diff, dec!(100)),
        e => panic!("Expected UnbalancedStatement, got {e:?}"),
    }
    assert_eq!(input.imbalance_policy, ImbalancePolicy::Strict);
}

#[test]
fn test_income_change_flows_to_cash_flow_only() {
    let mut input = StatementInputs::shipped();
    input.income_statement.income_tax = dec!(3000);

    let out = build_statements(&input).unwrap();
    assert_eq!(out.income_statement.net_income(), dec!(10000));
    assert_eq!(out.cash_flow.net_income(), Some(dec!(10000)));
    assert_eq!(out.cash_flow.net_change_in_cash, dec!(0));
    // The balance sheet is built from its own primitives
    assert!(out.reconciliation.is_balanced());
}

#[test]
fn test_fractional_amounts_stay_exact() {
    let mut input = StatementInputs::shipped();
    input.balance_sheet.cash = dec!(21500.10);
    input.balance_sheet.inventory = dec!(299.90);

    let out = build_statements(&input).unwrap();
    assert_eq!(out.balance_sheet.current_assets(), dec!(27400));
    assert!(out.reconciliation.is_balanced());
    assert!(out.check_invariants().is_empty());
}

#[test]
fn test_oversized_amount_fails_instead_of_overflowing() {
    let (key, value) = parse_assignment("cash=79228162514264337593543950335").unwrap();
    let mut input = StatementInputs::shipped();
    input
        .apply_overrides(&BTreeMap::from([(key, value)]))
        .unwrap();

    match build_financial_statements(&input).unwrap_err() {
        StatementError::InvalidInput { field, .. } => assert_eq!(field, "cash"),
        e => panic!("Expected InvalidInput, got {e:?}"),
    }
}

#[test]
fn test_invalid_override_value_is_rejected() {
    let mut input = StatementInputs::shipped();
    input.cash_flow.dividends_paid = dec!(4000);

    match build_statements(&input).unwrap_err() {
        StatementError::InvalidInput { field, .. } => assert_eq!(field, "dividends_paid"),
        e => panic!("Expected InvalidInput, got {e:?}"),
    }
}

// ===========================================================================
// Presentation
// ===========================================================================

#[test]
fn test_views_bold_keys() {
    let out = build_statements(&StatementInputs::shipped()).unwrap();
    let [bs, is, cf] = out.views();

    assert!(bs.total_keys.contains(balance_sheet::TOTAL_EQUITY));
    assert!(is.total_keys.contains(income_statement::GROSS_PROFIT));
    assert!(is.total_keys.contains(income_statement::NET_INCOME));
    assert!(!is.total_keys.contains(income_statement::REVENUE));
    assert!(cf.total_keys.contains(cash_flow::NET_CHANGE_IN_CASH));
}

#[test]
fn test_text_report_flags_imbalance() {
    let mut input = StatementInputs::shipped();
    input.balance_sheet.retained_earnings = dec!(2500);
    let out = build_statements(&input).unwrap();

    let text = TextPresenter::default().present(&out).unwrap();
    assert!(text.contains("Error: totals do not match (difference $1,300.00M)"));
    assert!(text.contains("TOTAL LIABILITIES AND EQUITY: $121,300.00M"));
}
