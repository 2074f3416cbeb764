use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::StatementError;
use crate::types::Money;
use crate::StatementResult;

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Role a line item plays inside its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    /// Primitive amount taken straight from the inputs
    Input,
    /// Sum of the inputs added since the previous subtotal
    Subtotal,
    /// Sum of every input in the section
    Total,
}

/// A single named monetary amount within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub value: Money,
    pub kind: LineItemKind,
}

impl LineItem {
    pub fn is_derived(&self) -> bool {
        self.kind != LineItemKind::Input
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Assets,
    Liabilities,
    Equity,
    OperatingActivities,
    InvestingActivities,
    FinancingActivities,
}

impl SectionKind {
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Assets => "Assets",
            SectionKind::Liabilities => "Liabilities",
            SectionKind::Equity => "Equity",
            SectionKind::OperatingActivities => "Operating Activities",
            SectionKind::InvestingActivities => "Investing Activities",
            SectionKind::FinancingActivities => "Financing Activities",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// An ordered group of line items. Insertion order is display order.
///
/// Sections are only produced by [`SectionBuilder`], which derives every
/// subtotal and the total from the input items, so a built section always
/// satisfies `total == sum(inputs)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    kind: SectionKind,
    items: Vec<LineItem>,
}

impl Section {
    pub fn builder(kind: SectionKind) -> SectionBuilder {
        SectionBuilder::new(kind)
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Value of the line item called `name`, if present.
    pub fn get(&self, name: &str) -> Option<Money> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value)
    }

    /// The section's total line.
    pub fn total_item(&self) -> Option<&LineItem> {
        self.items
            .iter()
            .rev()
            .find(|item| item.kind == LineItemKind::Total)
    }

    pub fn total(&self) -> Money {
        self.total_item()
            .map(|item| item.value)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn inputs(&self) -> impl Iterator<Item = &LineItem> {
        self.items
            .iter()
            .filter(|item| item.kind == LineItemKind::Input)
    }

    /// Sum of the section's input items, recomputed from scratch.
    pub fn input_sum(&self) -> Money {
        sum_amounts(self.inputs().map(|item| item.value))
    }

    /// Names of subtotal and total lines, rendered in bold by presenters.
    pub fn total_keys(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.is_derived())
            .map(|item| item.name.as_str())
            .collect()
    }

    /// Re-derive every subtotal and the total and compare them with the
    /// stored values. Returns a description of each mismatch.
    pub fn consistency_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut group = Decimal::ZERO;
        let mut running = Decimal::ZERO;
        let mut totals = 0usize;

        for item in &self.items {
            match item.kind {
                LineItemKind::Input => {
                    group += item.value;
                    running += item.value;
                }
                LineItemKind::Subtotal => {
                    if item.value != group {
                        errors.push(format!(
                            "{}: subtotal '{}' is {} but its items sum to {group}",
                            self.kind, item.name, item.value
                        ));
                    }
                    group = Decimal::ZERO;
                }
                LineItemKind::Total => {
                    totals += 1;
                    if item.value != running {
                        errors.push(format!(
                            "{}: total '{}' is {} but its items sum to {running}",
                            self.kind, item.name, item.value
                        ));
                    }
                }
            }
        }

        if totals != 1 {
            errors.push(format!(
                "{}: expected exactly one total line, found {totals}",
                self.kind
            ));
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Accumulates input items and derives subtotals and the total by summation.
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    kind: SectionKind,
    items: Vec<LineItem>,
    group_start: usize,
}

impl SectionBuilder {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            group_start: 0,
        }
    }

    pub fn input(mut self, name: impl Into<String>, value: Money) -> Self {
        self.items.push(LineItem {
            name: name.into(),
            value,
            kind: LineItemKind::Input,
        });
        self
    }

    /// Close the current group with a subtotal of the inputs added since the
    /// previous subtotal.
    pub fn subtotal(mut self, name: impl Into<String>) -> Self {
        let value = sum_amounts(
            self.items[self.group_start..]
                .iter()
                .filter(|item| item.kind == LineItemKind::Input)
                .map(|item| item.value),
        );
        self.items.push(LineItem {
            name: name.into(),
            value,
            kind: LineItemKind::Subtotal,
        });
        self.group_start = self.items.len();
        self
    }

    pub fn total(mut self, name: impl Into<String>) -> Self {
        let value = sum_amounts(
            self.items
                .iter()
                .filter(|item| item.kind == LineItemKind::Input)
                .map(|item| item.value),
        );
        self.items.push(LineItem {
            name: name.into(),
            value,
            kind: LineItemKind::Total,
        });
        self
    }

    pub fn finish(self) -> StatementResult<Section> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.name.as_str()) {
                return Err(StatementError::DuplicateLineItem {
                    section: self.kind.title().to_string(),
                    name: item.name.clone(),
                });
            }
        }

        match self.items.last() {
            Some(last) if last.kind == LineItemKind::Total => {}
            _ => {
                return Err(StatementError::MissingTotal {
                    section: self.kind.title().to_string(),
                })
            }
        }

        let totals = self
            .items
            .iter()
            .filter(|item| item.kind == LineItemKind::Total)
            .count();
        if totals > 1 {
            return Err(StatementError::InvalidInput {
                field: self.kind.title().to_string(),
                reason: format!("Section must have exactly one total line, got {totals}"),
            });
        }

        Ok(Section {
            kind: self.kind,
            items: self.items,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Exact decimal sum of a sequence of amounts.
pub fn sum_amounts(values: impl IntoIterator<Item = Money>) -> Money {
    values.into_iter().fold(Decimal::ZERO, |acc, v| acc + v)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
