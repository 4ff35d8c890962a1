use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("integer pattern is valid"));

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d*\.\d+$").expect("decimal pattern is valid"));

/// A value that can be stored in a variable or produced by an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShellObject {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl ShellObject {
    /// Classify the right-hand side of an assignment.
    ///
    /// Quoted text becomes a string (quotes removed, no escapes), `True` and
    /// `False` become booleans, signed integers and decimals become numbers.
    /// Anything else is kept verbatim as a string.
    pub fn parse(text: &str) -> ShellObject {
        let trimmed = text.trim();

        if trimmed.len() >= 2
            && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
                || (trimmed.starts_with('"') && trimmed.ends_with('"')))
        {
            return ShellObject::String(trimmed[1..trimmed.len() - 1].to_string());
        }

        match trimmed {
            "True" => return ShellObject::Boolean(true),
            "False" => return ShellObject::Boolean(false),
            _ => {}
        }

        if INTEGER_RE.is_match(trimmed) {
            return match trimmed.parse::<i64>() {
                Ok(i) => ShellObject::Integer(i),
                // Too wide for i64, keep the magnitude as a float
                Err(_) => trimmed
                    .parse::<f64>()
                    .map(ShellObject::Float)
                    .unwrap_or_else(|_| ShellObject::String(trimmed.to_string())),
            };
        }

        if DECIMAL_RE.is_match(trimmed) {
            if let Ok(f) = trimmed.parse::<f64>() {
                return ShellObject::Float(f);
            }
        }

        ShellObject::String(trimmed.to_string())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ShellObject::String(_) => "String",
            ShellObject::Integer(_) => "Integer",
            ShellObject::Float(_) => "Float",
            ShellObject::Boolean(_) => "Boolean",
        }
    }

    /// Literal form used when echoing stored values: strings are single
    /// quoted, booleans are `True`/`False`.
    pub fn to_repr(&self) -> String {
        match self {
            ShellObject::String(s) => format!("'{}'", s),
            _ => self.to_display_string(),
        }
    }

    /// Plain text form used for expression results.
    pub fn to_display_string(&self) -> String {
        match self {
            ShellObject::String(s) => s.clone(),
            ShellObject::Integer(i) => i.to_string(),
            ShellObject::Float(f) => format_float(*f),
            ShellObject::Boolean(true) => "True".to_string(),
            ShellObject::Boolean(false) => "False".to_string(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            ShellObject::String(s) => !s.is_empty(),
            ShellObject::Integer(i) => *i != 0,
            ShellObject::Float(f) => *f != 0.0 && !f.is_nan(),
            ShellObject::Boolean(b) => *b,
        }
    }

    /// Numeric view of the value. Booleans count as 1 and 0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ShellObject::Integer(i) => Some(*i as f64),
            ShellObject::Float(f) => Some(*f),
            ShellObject::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ShellObject::String(_) => None,
        }
    }

    /// Integer view of the value, if it is an integer or a boolean.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ShellObject::Integer(i) => Some(*i),
            ShellObject::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ShellObject::Integer(_) | ShellObject::Float(_))
    }
}

/// Shortest text for a float; integral values drop the fraction.
///
/// Magnitudes from `1e21` up and below `1e-6` switch to exponent form with
/// an explicit sign, e.g. `1e+21` and `1.5e-7`.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if f == 0.0 {
        "0".to_string()
    } else if f.abs() >= 1e21 || f.abs() < 1e-6 {
        let text = format!("{:e}", f);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        f.to_string()
    }
}

/// Parse an assignment right-hand side.
pub fn parse_value(text: &str) -> ShellObject {
    ShellObject::parse(text)
}

impl From<String> for ShellObject {
    fn from(s: String) -> Self { ShellObject::String(s) }
}

impl From<&str> for ShellObject {
    fn from(s: &str) -> Self { ShellObject::String(s.to_string()) }
}

impl From<i64> for ShellObject {
    fn from(i: i64) -> Self { ShellObject::Integer(i) }
}

impl From<f64> for ShellObject {
    fn from(f: f64) -> Self { ShellObject::Float(f) }
}

impl From<bool> for ShellObject {
    fn from(b: bool) -> Self { ShellObject::Boolean(b) }
}

impl fmt::Display for ShellObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strings() {
        assert_eq!(parse_value("'John'"), ShellObject::String("John".into()));
        assert_eq!(parse_value("\"Jane\""), ShellObject::String("Jane".into()));
        assert_eq!(parse_value("  'padded'  "), ShellObject::String("padded".into()));
        // Mismatched quotes are not dequoted
        assert_eq!(parse_value("'abc\""), ShellObject::String("'abc\"".into()));
        // No escape processing
        assert_eq!(parse_value(r"'a\nb'"), ShellObject::String(r"a\nb".into()));
    }

    #[test]
    fn test_parse_booleans() {
        assert_eq!(parse_value("True"), ShellObject::Boolean(true));
        assert_eq!(parse_value("False"), ShellObject::Boolean(false));
        // Only the capitalised spelling is a boolean
        assert_eq!(parse_value("true"), ShellObject::String("true".into()));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_value("25"), ShellObject::Integer(25));
        assert_eq!(parse_value("-7"), ShellObject::Integer(-7));
        assert_eq!(parse_value("3.5"), ShellObject::Float(3.5));
        assert_eq!(parse_value("-.25"), ShellObject::Float(-0.25));
        assert_eq!(
            parse_value("99999999999999999999"),
            ShellObject::Float(1e20)
        );
        // Not a number pattern, kept as text
        assert_eq!(parse_value("1e5"), ShellObject::String("1e5".into()));
        assert_eq!(parse_value("2 + 3"), ShellObject::String("2 + 3".into()));
    }

    #[test]
    fn test_repr_and_display() {
        assert_eq!(ShellObject::from("John").to_repr(), "'John'");
        assert_eq!(ShellObject::from("John").to_display_string(), "John");
        assert_eq!(ShellObject::Boolean(true).to_repr(), "True");
        assert_eq!(ShellObject::Integer(30).to_repr(), "30");
        assert_eq!(ShellObject::Float(2.0).to_repr(), "2");
        assert_eq!(ShellObject::Float(0.5).to_repr(), "0.5");
        assert_eq!(ShellObject::Float(-0.0).to_repr(), "0");
        assert_eq!(ShellObject::Float(f64::INFINITY).to_repr(), "Infinity");
    }

    #[test]
    fn test_float_exponent_form() {
        assert_eq!(format_float(1e-7), "1e-7");
        assert_eq!(format_float(-1.5e-7), "-1.5e-7");
        assert_eq!(format_float(0.000001), "0.000001");
        assert_eq!(format_float(1e21), "1e+21");
        assert_eq!(format_float(2.5e22), "2.5e+22");
        assert_eq!(format_float(1e20), "100000000000000000000");
        assert_eq!(format_float(123.456), "123.456");
    }

    #[test]
    fn test_truthiness() {
        assert!(!ShellObject::Integer(0).is_truthy());
        assert!(!ShellObject::from("").is_truthy());
        assert!(!ShellObject::Float(f64::NAN).is_truthy());
        assert!(ShellObject::from("x").is_truthy());
        assert!(ShellObject::Float(0.1).is_truthy());
    }
}
