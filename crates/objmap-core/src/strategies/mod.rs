//! Bundled strategies
//!
//! - [`ScalarStrategy`] - coercions between `int`, `float`, `string` and `bool`
//! - [`ListStrategy`] - element-wise recursion over lists and maps
//! - [`PropertyMappingStrategy`] - object to object copying by declared properties
//! - [`DateTimeStrategy`] - RFC 3339 conversion and copying of date-times
//! - [`CopyStrategy`] - identity fallback for `mixed` targets
//!
//! Register them all with
//! [`MainTransformerBuilder::with_builtin_strategies`](crate::MainTransformerBuilder::with_builtin_strategies).
//!
//! Copyright (c) 2025 Objmap Team
//! Licensed under the Apache-2.0 license

pub mod copy;
pub mod datetime;
pub mod list;
pub mod object;
pub mod scalar;

pub use copy::CopyStrategy;
pub use datetime::DateTimeStrategy;
pub use list::ListStrategy;
pub use object::PropertyMappingStrategy;
pub use scalar::ScalarStrategy;

use crate::Error;

pub(crate) fn strategy_error(strategy: &str, message: impl Into<String>) -> Error {
    Error::Strategy {
        strategy: strategy.to_string(),
        message: message.into(),
        source: None,
    }
}
