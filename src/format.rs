//! Format helpers for numbers, money and dates in the active language.
//!
//! Separators and ordering come from the language's locale tag (see
//! `[format] locales`). Only the common Western conventions are covered.

use chrono::{Datelike, NaiveDate};
use polyglot_core::{config::FormatConfig, LanguageCode};

/// Number and date conventions for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Conventions {
    group: &'static str,
    decimal: char,
    /// Smallest integer-part length that gets grouping.
    min_grouping: usize,
    currency_first: bool,
    currency_space: bool,
    date_order: DateOrder,
    date_separator: char,
    /// Zero-pad day and month.
    date_padded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

impl Conventions {
    fn for_locale(tag: &str) -> Self {
        let lower = tag.to_ascii_lowercase();
        let language = lower.split(['-', '_']).next().unwrap_or_default();
        match language {
            "en" if lower == "en-us" || lower == "en" => Self {
                group: ",",
                decimal: '.',
                min_grouping: 4,
                currency_first: true,
                currency_space: false,
                date_order: DateOrder::MonthDayYear,
                date_separator: '/',
                date_padded: false,
            },
            "en" => Self {
                group: ",",
                decimal: '.',
                min_grouping: 4,
                currency_first: true,
                currency_space: false,
                date_order: DateOrder::DayMonthYear,
                date_separator: '/',
                date_padded: true,
            },
            // es-ES leaves four-digit numbers ungrouped.
            "es" => Self {
                group: ".",
                decimal: ',',
                min_grouping: 5,
                currency_first: false,
                currency_space: true,
                date_order: DateOrder::DayMonthYear,
                date_separator: '/',
                date_padded: false,
            },
            "pt" => Self {
                group: ".",
                decimal: ',',
                min_grouping: 4,
                currency_first: true,
                currency_space: true,
                date_order: DateOrder::DayMonthYear,
                date_separator: '/',
                date_padded: true,
            },
            "de" => Self {
                group: ".",
                decimal: ',',
                min_grouping: 4,
                currency_first: false,
                currency_space: true,
                date_order: DateOrder::DayMonthYear,
                date_separator: '.',
                date_padded: false,
            },
            "it" | "nl" => Self {
                group: ".",
                decimal: ',',
                min_grouping: 4,
                currency_first: false,
                currency_space: true,
                date_order: DateOrder::DayMonthYear,
                date_separator: if language == "nl" { '-' } else { '/' },
                date_padded: false,
            },
            "fr" => Self {
                group: "\u{202f}",
                decimal: ',',
                min_grouping: 4,
                currency_first: false,
                currency_space: true,
                date_order: DateOrder::DayMonthYear,
                date_separator: '/',
                date_padded: true,
            },
            _ => Self {
                group: ",",
                decimal: '.',
                min_grouping: 4,
                currency_first: true,
                currency_space: false,
                date_order: DateOrder::YearMonthDay,
                date_separator: '-',
                date_padded: true,
            },
        }
    }
}

/// Locale-keyed formatter for one language.
#[derive(Debug, Clone)]
pub struct Formatter {
    locale: String,
    currency: String,
    conventions: Conventions,
}

impl Formatter {
    /// Build a formatter for `language` using its configured locale tag and currency.
    pub fn new(language: &LanguageCode, config: &FormatConfig) -> Self {
        let locale = config.locale_tag(language);
        Self {
            conventions: Conventions::for_locale(&locale),
            currency: config.currency.to_ascii_uppercase(),
            locale,
        }
    }

    /// Locale tag in use, e.g. `pt-BR`.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn currency_code(&self) -> &str {
        &self.currency
    }

    /// Format `value` with `decimals` fraction digits, rounding half away from zero.
    pub fn number(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let fixed = format!("{:.*}", decimals, round_half_away(value.abs(), decimals));
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut out = String::with_capacity(fixed.len() + 4);
        if value < 0.0 && fixed.bytes().any(|b| b != b'0' && b != b'.') {
            out.push('-');
        }
        out.push_str(&self.group_digits(int_part));
        if let Some(frac) = frac_part {
            out.push(self.conventions.decimal);
            out.push_str(frac);
        }
        out
    }

    /// Format `amount` in the configured currency with two decimals.
    pub fn currency(&self, amount: f64) -> String {
        let symbol = currency_symbol(&self.currency);
        let number = self.number(amount.abs(), 2);
        let sign = if amount < 0.0 && number.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            "-"
        } else {
            ""
        };
        let space = if self.conventions.currency_space {
            "\u{a0}"
        } else {
            ""
        };
        if self.conventions.currency_first {
            format!("{sign}{symbol}{space}{number}")
        } else {
            format!("{sign}{number}{space}{symbol}")
        }
    }

    /// Short numeric date in the locale's field order.
    pub fn date(&self, date: NaiveDate) -> String {
        let c = &self.conventions;
        let (y, m, d) = (date.year(), date.month(), date.day());
        let (m, d) = if c.date_padded {
            (format!("{m:02}"), format!("{d:02}"))
        } else {
            (m.to_string(), d.to_string())
        };
        let sep = c.date_separator;
        match c.date_order {
            DateOrder::MonthDayYear => format!("{m}{sep}{d}{sep}{y}"),
            DateOrder::DayMonthYear => format!("{d}{sep}{m}{sep}{y}"),
            DateOrder::YearMonthDay => format!("{y}{sep}{m}{sep}{d}"),
        }
    }

    fn group_digits(&self, digits: &str) -> String {
        if digits.len() < self.conventions.min_grouping {
            return digits.to_string();
        }
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push_str(self.conventions.group);
            }
            out.push(ch);
        }
        out
    }
}

fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    (value * factor).round() / factor
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "USD" => "$",
        "BRL" => "R$",
        "GBP" => "£",
        "JPY" => "¥",
        other => other,
    }
}
