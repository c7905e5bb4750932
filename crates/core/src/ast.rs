//! Declaration types for fee schedules.
//!
//! A schedule declares typed inputs (the variables a fee may depend on)
//! and fees (conditional yields over those inputs). Conditions and value
//! expressions are kept as raw token sequences; interpreting them is the
//! job of the verifier and the expression evaluator.

use time::Date;

// ──────────────────────────────────────────────
// Inputs
// ──────────────────────────────────────────────

/// A declared input variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDecl {
    pub name: String,
    /// Human-readable label (`AS 'Entity type'`), if any.
    pub display_name: Option<String>,
    pub kind: InputKind,
}

/// The six input kinds and their bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    Boolean,
    /// Exactly one of the listed choices.
    List { choices: Vec<String> },
    /// Any subset of the listed choices.
    MultiList { choices: Vec<String> },
    /// Integer in `[min, max]`.
    Number { min: i64, max: i64 },
    /// Calendar date in `[min, max]`.
    Date { min: Date, max: Date },
    /// Non-negative amount in one currency, no declared upper bound.
    Amount { currency: String },
}

impl InputKind {
    /// Kind keyword as written in schedule documents.
    pub fn keyword(&self) -> &'static str {
        match self {
            InputKind::Boolean => "boolean",
            InputKind::List { .. } => "list",
            InputKind::MultiList { .. } => "multilist",
            InputKind::Number { .. } => "number",
            InputKind::Date { .. } => "date",
            InputKind::Amount { .. } => "amount",
        }
    }
}

impl InputDecl {
    pub fn new(name: impl Into<String>, kind: InputKind) -> Self {
        InputDecl {
            name: name.into(),
            display_name: None,
            kind,
        }
    }
}

// ──────────────────────────────────────────────
// Fees
// ──────────────────────────────────────────────

/// A declared fee: local bindings followed by cases and yields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeDecl {
    pub name: String,
    /// `LET` bindings, evaluated in order before any yield.
    pub lets: Vec<LetBinding>,
    /// Cases and top-level yields in declaration order.
    pub body: Vec<FeeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeItem {
    Case(CaseBlock),
    Yield(YieldStmt),
}

/// `CASE <condition> AS ... ENDCASE`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseBlock {
    pub condition: Vec<String>,
    pub yields: Vec<YieldStmt>,
}

/// `YIELD <value> [IF <condition>]`. An empty condition always holds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct YieldStmt {
    pub condition: Vec<String>,
    pub value: Vec<String>,
}

/// `LET <name> AS <value>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetBinding {
    pub name: String,
    pub value: Vec<String>,
}

impl FeeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        FeeDecl {
            name: name.into(),
            ..FeeDecl::default()
        }
    }

    /// Every yield of the fee in declaration order, paired with the
    /// condition of its enclosing case (`None` for top-level yields).
    pub fn yields(&self) -> Vec<(Option<&CaseBlock>, &YieldStmt)> {
        let mut out = Vec::new();
        for item in &self.body {
            match item {
                FeeItem::Case(case) => {
                    for y in &case.yields {
                        out.push((Some(case), y));
                    }
                }
                FeeItem::Yield(y) => out.push((None, y)),
            }
        }
        out
    }
}

/// A full declaration document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeeSchedule {
    pub inputs: Vec<InputDecl>,
    pub fees: Vec<FeeDecl>,
}

impl FeeSchedule {
    pub fn input(&self, name: &str) -> Option<&InputDecl> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn fee(&self, name: &str) -> Option<&FeeDecl> {
        self.fees.iter().find(|f| f.name == name)
    }
}
