//! Buy / watch / avoid rule.
//!
//! Four conditions are checked on the most recent bar and counted:
//! MA50 > MA100, MA100 > MA200, RSI < 30, close > MA200.
//! Score >= 3 is BUY, score == 2 is WATCH, anything else is AVOID.
//! A comparison against an undefined indicator value counts as false.

use std::fmt;
use std::str::FromStr;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const MAX_SCORE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    Buy,
    Watch,
    Avoid,
}

impl Recommendation {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 3 => Recommendation::Buy,
            2 => Recommendation::Watch,
            _ => Recommendation::Avoid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WATCH",
            Recommendation::Avoid => "AVOID",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown recommendation label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Recommendation {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Recommendation::Buy),
            "WATCH" => Ok(Recommendation::Watch),
            "AVOID" => Ok(Recommendation::Avoid),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Inputs to the rule, taken from the last bar of a series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestIndicators {
    pub close: f64,
    pub ma50: Option<f64>,
    pub ma100: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    pub ma50_above_ma100: bool,
    pub ma100_above_ma200: bool,
    pub rsi_oversold: bool,
    pub close_above_ma200: bool,
}

impl Conditions {
    pub fn evaluate(latest: &LatestIndicators) -> Self {
        Self {
            ma50_above_ma100: greater(latest.ma50, latest.ma100),
            ma100_above_ma200: greater(latest.ma100, latest.ma200),
            rsi_oversold: latest.rsi.is_some_and(|rsi| rsi < RSI_OVERSOLD),
            close_above_ma200: greater(Some(latest.close), latest.ma200),
        }
    }

    pub fn score(&self) -> u8 {
        [
            self.ma50_above_ma100,
            self.ma100_above_ma200,
            self.rsi_oversold,
            self.close_above_ma200,
        ]
        .iter()
        .filter(|&&c| c)
        .count() as u8
    }
}

fn greater(left: Option<f64>, right: Option<f64>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l > r)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub recommendation: Recommendation,
    pub score: u8,
    pub conditions: Conditions,
}

pub fn evaluate(latest: &LatestIndicators) -> Signal {
    let conditions = Conditions::evaluate(latest);
    let score = conditions.score();
    Signal {
        recommendation: Recommendation::from_score(score),
        score,
        conditions,
    }
}
