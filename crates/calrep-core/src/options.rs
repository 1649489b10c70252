//! Resolved report options.
//!
//! Option strings are the single source of truth for their enum variants:
//! parsing is case-insensitive and rejects unknown values, so invalid input
//! is caught before it reaches the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::UnknownOption;

/// Generates a string-backed option enum with `Display`, `FromStr` and serde impls.
macro_rules! define_option_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Canonical lowercase name.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($($text, " "),+).trim_ascii_end(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_option_enum! {
    /// Strategy used to test an exclusion keyword against event text.
    ExcludeMode, "exclude mode" {
        /// Case-sensitive substring.
        #[default]
        Contains => "contains",
        /// Whole-string equality.
        Exact => "exact",
        /// Case-insensitive whole word.
        Word => "word",
        /// Any whitespace-separated token is a substring.
        Any => "any",
        /// Every whitespace-separated token is a substring.
        All => "all",
        /// Case-insensitive regular expression.
        Regex => "regex",
    }
}

define_option_enum! {
    /// Time aggregation applied to the kept events.
    SummaryMode, "summary mode" {
        #[default]
        None => "none",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

define_option_enum! {
    /// Output encoding.
    OutputFormat, "output format" {
        #[default]
        Json => "json",
        Csv => "csv",
        Text => "text",
    }
}

/// Inclusive date range a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportPeriod {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    /// Header line announcing the period.
    pub fn message(&self) -> String {
        format!(
            "{}年{}月{}日から{}年{}月{}日までの予定を取得します",
            self.start.year(),
            self.start.month(),
            self.start.day(),
            self.end.year(),
            self.end.month(),
            self.end.day()
        )
    }
}

/// Everything the engine needs to turn raw events into a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub period: ReportPeriod,
    pub exclude_keywords: Vec<String>,
    pub exclude_mode: ExcludeMode,
    pub summary_mode: SummaryMode,
    pub output_format: OutputFormat,
}

impl ReportOptions {
    /// Options with defaults for everything except the period.
    pub const fn new(period: ReportPeriod) -> Self {
        Self {
            period,
            exclude_keywords: Vec::new(),
            exclude_mode: ExcludeMode::Contains,
            summary_mode: SummaryMode::None,
            output_format: OutputFormat::Json,
        }
    }
}
