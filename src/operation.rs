//! Request validation
//!
//! Turns a decoded JSON body into exactly one [`Operation`], checking key
//! count, key membership and the per-operation value contract in that order.

use serde_json::{Map, Value};

use crate::error::{BfhlError, Result};
use crate::kernels::MAX_FIBONACCI_INDEX;

/// Recognized operation keys, in the order they are reported to callers
pub const OPERATION_KEYS: [&str; 5] = ["fibonacci", "prime", "lcm", "hcf", "AI"];

/// A validated request, one variant per operation key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Fibonacci(u32),
    Prime(Vec<i128>),
    Lcm(Vec<u64>),
    Hcf(Vec<u64>),
    /// Question text, already trimmed
    Ai(String),
}

impl Operation {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Fibonacci(_) => "fibonacci",
            Self::Prime(_) => "prime",
            Self::Lcm(_) => "lcm",
            Self::Hcf(_) => "hcf",
            Self::Ai(_) => "AI",
        }
    }

    /// Validate a decoded request body
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let mut entries = body.iter();
        let (key, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err(BfhlError::MultipleOrMissingKeys),
        };

        match key.as_str() {
            "fibonacci" => parse_fibonacci(value),
            "prime" => parse_prime(value),
            "lcm" => parse_positive_list(value, "LCM").map(Self::Lcm),
            "hcf" => parse_positive_list(value, "HCF").map(Self::Hcf),
            "AI" => parse_question(value),
            other => Err(BfhlError::UnknownOperation(other.to_string())),
        }
    }
}

/// Why a JSON value could not be read as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntegerFault {
    NotInteger,
    /// Integral, but beyond `i128::MAX`
    TooLarge,
    /// Integral, but below `i128::MIN`
    TooSmall,
}

/// Integral value of a JSON number; `5.0` counts, `5.5` and non-numbers do not
fn as_integer(value: &Value) -> std::result::Result<i128, IntegerFault> {
    let Value::Number(number) = value else {
        return Err(IntegerFault::NotInteger);
    };
    if let Some(n) = number.as_i64() {
        return Ok(n as i128);
    }
    if let Some(n) = number.as_u64() {
        return Ok(n as i128);
    }

    let f = number.as_f64().ok_or(IntegerFault::NotInteger)?;
    if !f.is_finite() || f.fract() != 0.0 {
        return Err(IntegerFault::NotInteger);
    }
    // i128::MAX as f64 rounds up to 2^127, which is itself out of range
    if f >= i128::MAX as f64 {
        Err(IntegerFault::TooLarge)
    } else if f < i128::MIN as f64 {
        Err(IntegerFault::TooSmall)
    } else {
        Ok(f as i128)
    }
}

fn parse_fibonacci(value: &Value) -> Result<Operation> {
    let negative_or_fractional =
        || BfhlError::invalid_value("Fibonacci input must be a non-negative integer");
    let too_large = || {
        BfhlError::invalid_value(format!(
            "Fibonacci input must not exceed {}",
            MAX_FIBONACCI_INDEX
        ))
    };

    match as_integer(value) {
        Ok(n) if n < 0 => Err(negative_or_fractional()),
        Ok(n) if n > MAX_FIBONACCI_INDEX as i128 => Err(too_large()),
        Ok(n) => Ok(Operation::Fibonacci(n as u32)),
        Err(IntegerFault::TooLarge) => Err(too_large()),
        Err(IntegerFault::NotInteger | IntegerFault::TooSmall) => Err(negative_or_fractional()),
    }
}

fn non_empty_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array().filter(|items| !items.is_empty())
}

fn parse_prime(value: &Value) -> Result<Operation> {
    let items = non_empty_array(value).ok_or_else(|| {
        BfhlError::invalid_value("Prime input must be a non-empty array of integers")
    })?;

    items
        .iter()
        .map(|item| {
            as_integer(item).map_err(|fault| match fault {
                IntegerFault::NotInteger => {
                    BfhlError::invalid_value("All elements in prime array must be integers")
                }
                IntegerFault::TooLarge | IntegerFault::TooSmall => BfhlError::invalid_value(format!(
                    "Elements in prime array must be between {} and {}",
                    i128::MIN,
                    i128::MAX
                )),
            })
        })
        .collect::<Result<Vec<i128>>>()
        .map(Operation::Prime)
}

/// Shared contract for LCM and HCF: non-empty array of integers > 0
fn parse_positive_list(value: &Value, label: &str) -> Result<Vec<u64>> {
    let items = non_empty_array(value).ok_or_else(|| {
        BfhlError::invalid_value(format!(
            "{} input must be a non-empty array of positive integers",
            label
        ))
    })?;

    let not_positive = || {
        BfhlError::invalid_value(format!(
            "All elements in {} array must be positive integers",
            label
        ))
    };
    let too_large = || {
        BfhlError::invalid_value(format!(
            "Elements in {} array must not exceed {}",
            label,
            u64::MAX
        ))
    };

    items
        .iter()
        .map(|item| match as_integer(item) {
            Ok(n) if n <= 0 => Err(not_positive()),
            Ok(n) => u64::try_from(n).map_err(|_| too_large()),
            Err(IntegerFault::TooLarge) => Err(too_large()),
            Err(IntegerFault::NotInteger | IntegerFault::TooSmall) => Err(not_positive()),
        })
        .collect()
}

fn parse_question(value: &Value) -> Result<Operation> {
    value
        .as_str()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| Operation::Ai(q.to_string()))
        .ok_or_else(|| BfhlError::invalid_value("AI input must be a non-empty string"))
}
