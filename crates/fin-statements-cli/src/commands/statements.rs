use clap::Args;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use fin_statements_core::inputs::{parse_assignment, ImbalancePolicy, StatementInputs};
use fin_statements_core::presenter::{Presenter, StatementView, TextPresenter};
use fin_statements_core::statements::{self, FinancialStatements};
use fin_statements_core::{ComputationOutput, Money};

use crate::input;

/// Where the primitive inputs come from. Shared by every model subcommand.
#[derive(Args, Clone)]
pub struct ModelArgs {
    /// Path to JSON or YAML input file (missing amounts use the shipped constants)
    #[arg(long)]
    pub input: Option<String>,

    /// Override a primitive, e.g. --set retained_earnings=2500 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Treat an unbalanced balance sheet as an error (not accepted by verify)
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the text report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Omit the bar charts
    #[arg(long)]
    pub no_charts: bool,

    /// Width of the longest chart bar
    #[arg(long, default_value_t = 40)]
    pub bar_width: usize,
}

/// Resolve inputs from --input, stdin, or the shipped constants, then apply
/// --set overrides and --strict.
pub fn load_inputs(args: &ModelArgs) -> Result<StatementInputs, Box<dyn std::error::Error>> {
    let inputs: StatementInputs = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        StatementInputs::shipped()
    };
    apply_args(inputs, args)
}

fn apply_args(
    mut inputs: StatementInputs,
    args: &ModelArgs,
) -> Result<StatementInputs, Box<dyn std::error::Error>> {
    let overrides = args
        .overrides
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<BTreeMap<String, Money>, _>>()?;
    inputs.apply_overrides(&overrides)?;

    if args.strict {
        inputs.imbalance_policy = ImbalancePolicy::Strict;
    }
    tracing::debug!(overrides = overrides.len(), strict = args.strict, "inputs resolved");
    Ok(inputs)
}

pub fn run_statements(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let result = statements::build_financial_statements(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_balance_sheet(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let out = build(&args)?;
    let view = out.result.balance_sheet.view();
    Ok(view_envelope(&out, &view))
}

pub fn run_income_statement(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let out = build(&args)?;
    let view = out.result.income_statement.view();
    Ok(view_envelope(&out, &view))
}

pub fn run_cash_flow(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let out = build(&args)?;
    let view = out.result.cash_flow.view();
    Ok(view_envelope(&out, &view))
}

/// Reconcile the balance sheet and re-check every cross-statement invariant.
/// The imbalance policy is not applied; the outcome is reported in-band.
pub fn run_verify(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.strict {
        return Err(
            "--strict does not apply to verify; an unbalanced sheet already exits with status 2"
                .into(),
        );
    }
    let inputs = load_inputs(&args)?;
    let built = statements::build_statements(&inputs)?;
    let bs = &built.balance_sheet;

    Ok(json!({
        "result": {
            "balanced": built.reconciliation.is_balanced(),
            "total_assets": bs.total_assets,
            "total_liabilities": bs.total_liabilities(),
            "total_equity": bs.total_equity(),
            "total_liabilities_and_equity": bs.total_liabilities_and_equity,
            "diff": built.reconciliation.diff(),
            "net_income_linked": built.cash_flow.net_income() == Some(built.income_statement.net_income()),
            "invariant_violations": built.check_invariants(),
        },
        "methodology": "Accounting identity and cross-statement invariant check",
    }))
}

/// The resolved primitive inputs, in statement order.
pub fn run_inputs(args: ModelArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = load_inputs(&args)?;
    let mut map = Map::new();
    for (key, value) in inputs.primitives() {
        map.insert(key.to_string(), serde_json::to_value(value)?);
    }
    Ok(json!({
        "result": Value::Object(map),
        "methodology": format!(
            "Primitive inputs for {} ({:?}, {:?})",
            inputs.entity_name, inputs.currency, inputs.scale
        ),
    }))
}

pub fn run_report(args: ReportArgs) -> Result<String, Box<dyn std::error::Error>> {
    let out = build(&args.model)?;
    let mut presenter = TextPresenter {
        bar_width: args.bar_width,
        show_charts: !args.no_charts,
    };
    let mut text = presenter.present(&out.result)?;
    for warning in &out.warnings {
        text.push_str(&format!("Warning: {warning}\n"));
    }
    Ok(text)
}

fn build(
    args: &ModelArgs,
) -> Result<ComputationOutput<FinancialStatements>, Box<dyn std::error::Error>> {
    let inputs = load_inputs(args)?;
    Ok(statements::build_financial_statements(&inputs)?)
}

/// Lay a statement view out as `section -> line item -> amount`, followed by
/// the summary lines, inside the standard envelope.
fn view_envelope(out: &ComputationOutput<FinancialStatements>, view: &StatementView) -> Value {
    let mut result = Map::new();
    for section in &view.sections {
        let items: Map<String, Value> = section
            .items
            .iter()
            .map(|(name, value)| (name.clone(), json!(value)))
            .collect();
        result.insert(section.name.clone(), Value::Object(items));
    }
    for (name, value) in &view.summary {
        result.insert(name.clone(), json!(value));
    }
    if let Some(reconciliation) = &view.reconciliation {
        result.insert("reconciliation".to_string(), json!(reconciliation));
    }

    json!({
        "result": Value::Object(result),
        "title": view.title,
        "total_keys": view.total_keys,
        "methodology": out.methodology,
        "warnings": out.warnings,
        "metadata": out.metadata,
    })
}
