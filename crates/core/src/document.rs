//! Fee schedule loading from interchange JSON.
//!
//! The rule-text parser emits schedules as JSON documents:
//!
//! ```json
//! {
//!   "inputs": [
//!     { "name": "EntityType", "kind": "list", "choices": ["Normal", "Small"] },
//!     { "name": "ClaimCount", "kind": "number", "min": 1, "max": 20 }
//!   ],
//!   "fees": [
//!     {
//!       "name": "ClaimFee",
//!       "lets": [{ "name": "Extra", "value": "ClaimCount - 10" }],
//!       "body": [
//!         { "condition": "EntityType EQ Normal",
//!           "yields": [{ "value": "Extra * 40", "condition": "ClaimCount GT 10" }] },
//!         { "value": "0", "condition": "ClaimCount LTE 10" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Token fields accept either a string (run through [`tokenize`]) or an
//! array of token strings. Body items with a `yields` array are cases;
//! anything else is a top-level yield.

use std::collections::BTreeSet;

use time::macros::format_description;
use time::Date;

use crate::ast::{
    CaseBlock, FeeDecl, FeeItem, FeeSchedule, InputDecl, InputKind, LetBinding, YieldStmt,
};
use crate::error::DeclError;
use crate::lexer::tokenize;

impl FeeSchedule {
    /// Load a schedule from its interchange JSON form.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, DeclError> {
        let inputs_json = doc
            .get("inputs")
            .and_then(|i| i.as_array())
            .ok_or_else(|| {
                DeclError::InvalidDocument("missing or invalid 'inputs' array".to_string())
            })?;
        let fees_json = doc
            .get("fees")
            .and_then(|f| f.as_array())
            .ok_or_else(|| {
                DeclError::InvalidDocument("missing or invalid 'fees' array".to_string())
            })?;

        let mut seen = BTreeSet::new();
        let mut inputs = Vec::with_capacity(inputs_json.len());
        for obj in inputs_json {
            let input = parse_input(obj)?;
            if !seen.insert(input.name.clone()) {
                return Err(DeclError::DuplicateInput(input.name));
            }
            inputs.push(input);
        }

        let fees = fees_json
            .iter()
            .map(parse_fee)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            inputs = inputs.len(),
            fees = fees.len(),
            "loaded fee schedule"
        );

        Ok(FeeSchedule { inputs, fees })
    }

    /// Parse a schedule from JSON text.
    pub fn from_json_str(src: &str) -> Result<Self, DeclError> {
        let doc: serde_json::Value = serde_json::from_str(src)
            .map_err(|e| DeclError::InvalidDocument(format!("invalid JSON: {}", e)))?;
        Self::from_json(&doc)
    }
}

/// Extract a required string field from a JSON object.
fn required_str(
    obj: &serde_json::Value,
    field: &str,
    construct: &str,
) -> Result<String, DeclError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| DeclError::MissingField {
            construct: construct.to_string(),
            field: field.to_string(),
        })
}

fn required_i64(obj: &serde_json::Value, field: &str, construct: &str) -> Result<i64, DeclError> {
    obj.get(field)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| DeclError::MissingField {
            construct: construct.to_string(),
            field: field.to_string(),
        })
}

fn required_strings(
    obj: &serde_json::Value,
    field: &str,
    construct: &str,
) -> Result<Vec<String>, DeclError> {
    let arr = obj
        .get(field)
        .and_then(|v| v.as_array())
        .ok_or_else(|| DeclError::MissingField {
            construct: construct.to_string(),
            field: field.to_string(),
        })?;
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| DeclError::InvalidDocument(format!(
                    "'{}' in {} must contain only strings",
                    field, construct
                )))
        })
        .collect()
}

fn required_date(obj: &serde_json::Value, field: &str, name: &str) -> Result<Date, DeclError> {
    let raw = required_str(obj, field, name)?;
    Date::parse(&raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        DeclError::InvalidDate {
            name: name.to_string(),
            value: raw,
        }
    })
}

/// Read a token field. Absent or null means an empty sequence.
fn tokens_field(
    obj: &serde_json::Value,
    field: &str,
    construct: &str,
) -> Result<Vec<String>, DeclError> {
    match obj.get(field) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => Ok(tokenize(s)),
        Some(serde_json::Value::Array(_)) => required_strings(obj, field, construct),
        Some(other) => Err(DeclError::InvalidDocument(format!(
            "'{}' in {} must be a string or an array of tokens, got {}",
            field, construct, other
        ))),
    }
}

fn parse_input(obj: &serde_json::Value) -> Result<InputDecl, DeclError> {
    let name = required_str(obj, "name", "input")?;
    let kind_name = required_str(obj, "kind", &name)?;

    let kind = match kind_name.to_ascii_lowercase().as_str() {
        "boolean" | "bool" => InputKind::Boolean,
        "list" => InputKind::List {
            choices: required_strings(obj, "choices", &name)?,
        },
        "multilist" => InputKind::MultiList {
            choices: required_strings(obj, "choices", &name)?,
        },
        "number" => InputKind::Number {
            min: required_i64(obj, "min", &name)?,
            max: required_i64(obj, "max", &name)?,
        },
        "date" => InputKind::Date {
            min: required_date(obj, "min", &name)?,
            max: required_date(obj, "max", &name)?,
        },
        "amount" => InputKind::Amount {
            currency: required_str(obj, "currency", &name)?,
        },
        _ => {
            return Err(DeclError::UnsupportedInputType {
                name,
                kind: kind_name,
            })
        }
    };

    let display_name = obj
        .get("display_name")
        .and_then(|d| d.as_str())
        .map(|s| s.to_string());

    Ok(InputDecl {
        name,
        display_name,
        kind,
    })
}

fn parse_fee(obj: &serde_json::Value) -> Result<FeeDecl, DeclError> {
    let name = required_str(obj, "name", "fee")?;

    let lets = match obj.get("lets").and_then(|l| l.as_array()) {
        Some(arr) => arr
            .iter()
            .map(|l| {
                Ok(LetBinding {
                    name: required_str(l, "name", &name)?,
                    value: tokens_field(l, "value", &name)?,
                })
            })
            .collect::<Result<Vec<_>, DeclError>>()?,
        None => Vec::new(),
    };

    let body = match obj.get("body").and_then(|b| b.as_array()) {
        Some(arr) => arr
            .iter()
            .map(|item| parse_item(item, &name))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(FeeDecl { name, lets, body })
}

fn parse_item(obj: &serde_json::Value, fee: &str) -> Result<FeeItem, DeclError> {
    match obj.get("yields").and_then(|y| y.as_array()) {
        Some(yields) => Ok(FeeItem::Case(CaseBlock {
            condition: tokens_field(obj, "condition", fee)?,
            yields: yields
                .iter()
                .map(|y| parse_yield(y, fee))
                .collect::<Result<Vec<_>, _>>()?,
        })),
        None => Ok(FeeItem::Yield(parse_yield(obj, fee)?)),
    }
}

fn parse_yield(obj: &serde_json::Value, fee: &str) -> Result<YieldStmt, DeclError> {
    if obj.get("value").is_none() {
        return Err(DeclError::MissingField {
            construct: fee.to_string(),
            field: "value".to_string(),
        });
    }
    Ok(YieldStmt {
        condition: tokens_field(obj, "condition", fee)?,
        value: tokens_field(obj, "value", fee)?,
    })
}
