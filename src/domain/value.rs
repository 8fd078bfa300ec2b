//! Fractional node values and how they are displayed

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fractional quantity `num / denom` carrying an exponent.
///
/// `None` in `num` or `denom` means "indeterminate". It is a valid value, not an
/// error, and it propagates through aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    pub num: Option<f64>,
    pub denom: Option<f64>,
    pub exp: f64,
}

impl NodeValue {
    pub fn new(num: Option<f64>, denom: Option<f64>, exp: f64) -> Self {
        Self { num, denom, exp }
    }

    /// Fully known value.
    pub fn known(num: f64, denom: f64, exp: f64) -> Self {
        Self::new(Some(num), Some(denom), exp)
    }

    /// Value assigned to nodes created without one: `{num: null, denom: 1, exp: 1}`.
    pub fn empty() -> Self {
        Self::new(None, Some(1.0), 1.0)
    }

    pub fn is_indeterminate(&self) -> bool {
        self.num.is_none() || self.denom.is_none()
    }

    /// Plain numeric value of the fraction.
    ///
    /// Returns `None` for indeterminate values and for a zero denominator;
    /// aggregation itself never divides, so zero only surfaces here.
    pub fn evaluate(&self) -> Option<f64> {
        match (self.num, self.denom) {
            (Some(num), Some(denom)) if denom != 0.0 => Some(num / denom),
            _ => None,
        }
    }

    /// Render according to `display_type` with `precision` decimals for plain output.
    pub fn render(&self, display_type: DisplayType, precision: usize) -> String {
        match display_type {
            DisplayType::Fraction => format!("{}/{}", fmt_part(self.num), fmt_part(self.denom)),
            DisplayType::Exp => format!(
                "({}/{})^{}",
                fmt_part(self.num),
                fmt_part(self.denom),
                fmt_number(self.exp)
            ),
            DisplayType::Plain => match self.evaluate() {
                Some(v) => format!("{:.*}", precision, v),
                None => "?".to_string(),
            },
        }
    }
}

impl Default for NodeValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(DisplayType::Exp, 0))
    }
}

fn fmt_part(part: Option<f64>) -> String {
    part.map(fmt_number).unwrap_or_else(|| "?".to_string())
}

// f64 Display already drops the ".0" on integral values
fn fmt_number(v: f64) -> String {
    format!("{}", v)
}

/// How a node's value is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    Fraction,
    Exp,
    #[default]
    Plain,
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayType::Fraction => "fraction",
            DisplayType::Exp => "exp",
            DisplayType::Plain => "plain",
        };
        write!(f, "{}", s)
    }
}

pub type Unit = String;

/// Numerator and denominator units. Carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units(pub Vec<Unit>, pub Vec<Unit>);
