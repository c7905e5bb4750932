//! ipfee-core: fee schedule declarations.
//!
//! Holds the declaration model produced by the rule-text parser (typed
//! inputs and fees built from cases, yields and local bindings), the
//! tokenizer for condition and value fragments, and loading of schedule
//! documents from interchange JSON.

pub mod ast;
pub mod document;
pub mod error;
pub mod lexer;

pub use ast::{
    CaseBlock, FeeDecl, FeeItem, FeeSchedule, InputDecl, InputKind, LetBinding, YieldStmt,
};
pub use error::DeclError;
pub use lexer::tokenize;
