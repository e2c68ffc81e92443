#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod algebra;
mod builtins;
mod engine;
mod error;
mod eval;
mod parser;
mod resolver;
mod results;
mod rules;
mod runner;
pub mod vocab;

pub use crate::algebra::Query;
pub use crate::engine::SqwrlQueryEngine;
pub use crate::error::SqwrlError;
pub use crate::parser::{SqwrlParser, SqwrlSyntaxError};
pub use crate::results::{ResultRow, ResultValue, SqwrlResult};
pub use crate::runner::QueryRunner;
