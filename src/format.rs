//! Per-column numeric formats.
//!
//! Every column gets one printf-style specifier, chosen from its type and
//! magnitude, so the ASCII table lines up without per-value negotiation:
//!
//! | Column                         | Specifier                               |
//! |--------------------------------|-----------------------------------------|
//! | integer                        | `%{digits(max abs) + 1}d`               |
//! | float, \|mean\| < 1            | `%12.4e`                                |
//! | float, otherwise               | `%{digits(trunc max abs) + 5}.3f`       |
//!
//! Rendering follows C `printf` output (two-digit signed exponents,
//! lowercase `nan`/`inf`) so files match what other XDI tooling writes.

use std::fmt;

use crate::table::{ColumnData, ColumnTable};

/// Width added to the digit count of integer columns (sign)
pub const INT_MARGIN: usize = 1;

/// Width added to the digit count of fixed-point columns
/// (sign, decimal point and three decimals)
pub const FIXED_MARGIN: usize = 5;

/// Decimals of fixed-point columns
pub const FIXED_PRECISION: usize = 3;

/// Field width of scientific columns
pub const SCIENTIFIC_WIDTH: usize = 12;

/// Mantissa decimals of scientific columns
pub const SCIENTIFIC_PRECISION: usize = 4;

/// Format applied to every value of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSpec {
    /// Right-justified integer, `%{width}d`
    Int {
        /// Field width
        width: usize,
    },
    /// `%12.4e`
    Scientific,
    /// `%{width}.{precision}f`
    Fixed {
        /// Field width
        width: usize,
        /// Decimal places
        precision: usize,
    },
}

impl FormatSpec {
    /// Choose the format for a column
    pub fn for_column(data: &ColumnData) -> Self {
        match data {
            ColumnData::Int(values) => {
                let max_abs = values.iter().map(|v| v.unsigned_abs()).max().unwrap_or(0);
                Self::Int {
                    width: max_abs.to_string().len() + INT_MARGIN,
                }
            }
            ColumnData::Float(values) => {
                let (sum, count, max_abs) = values
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0_f64, 0_usize, 0.0_f64), |(sum, count, max), &v| {
                        (sum + v, count + 1, max.max(v.abs()))
                    });
                let mean = if count == 0 { 0.0 } else { sum / count as f64 };
                if mean.abs() < 1.0 {
                    Self::Scientific
                } else {
                    Self::Fixed {
                        width: integer_digits(max_abs) + FIXED_MARGIN,
                        precision: FIXED_PRECISION,
                    }
                }
            }
        }
    }

    /// Render an integer value
    pub fn render_int(&self, value: i64) -> String {
        match *self {
            Self::Int { width } => format!("{:>width$}", value, width = width),
            _ => self.render_float(value as f64),
        }
    }

    /// Render a floating point value
    pub fn render_float(&self, value: f64) -> String {
        match *self {
            Self::Int { width } => {
                if value.is_finite() {
                    format!("{:>width$}", value.trunc() as i64, width = width)
                } else {
                    pad(non_finite(value), width)
                }
            }
            Self::Scientific => pad(
                if value.is_finite() {
                    c_exponential(value, SCIENTIFIC_PRECISION)
                } else {
                    non_finite(value).to_string()
                },
                SCIENTIFIC_WIDTH,
            ),
            Self::Fixed { width, precision } => {
                if value.is_finite() {
                    format!("{:>width$.precision$}", value, width = width, precision = precision)
                } else {
                    pad(non_finite(value), width)
                }
            }
        }
    }

    /// Render row `row` of a column
    pub fn render_cell(&self, data: &ColumnData, row: usize) -> Option<String> {
        match data {
            ColumnData::Int(values) => values.get(row).map(|&v| self.render_int(v)),
            ColumnData::Float(values) => values.get(row).map(|&v| self.render_float(v)),
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { width } => write!(f, "%{}d", width),
            Self::Scientific => write!(f, "%{}.{}e", SCIENTIFIC_WIDTH, SCIENTIFIC_PRECISION),
            Self::Fixed { width, precision } => write!(f, "%{}.{}f", width, precision),
        }
    }
}

/// One format per column, in column order
pub fn column_formats(table: &ColumnTable) -> Vec<FormatSpec> {
    table.iter().map(|c| FormatSpec::for_column(&c.data)).collect()
}

fn integer_digits(value: f64) -> usize {
    format!("{:.0}", value.abs().trunc()).len()
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "nan"
    } else if value > 0.0 {
        "inf"
    } else {
        "-inf"
    }
}

fn pad(text: impl AsRef<str>, width: usize) -> String {
    format!("{:>width$}", text.as_ref(), width = width)
}

// `{:e}` writes `1.2346e-9`; printf writes `1.2346e-09`.
fn c_exponential(value: f64, precision: usize) -> String {
    let rust = format!("{:.precision$e}", value, precision = precision);
    match rust.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => rust,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_width() {
        let spec = FormatSpec::for_column(&ColumnData::Int(vec![0, 99, -5]));
        assert_eq!(spec, FormatSpec::Int { width: 3 });
        assert_eq!(spec.to_string(), "%3d");
        assert_eq!(spec.render_int(-5), " -5");
        assert_eq!(spec.render_int(99), " 99");

        let zeros = FormatSpec::for_column(&ColumnData::Int(vec![0, 0]));
        assert_eq!(zeros.to_string(), "%2d");

        let extreme = FormatSpec::for_column(&ColumnData::Int(vec![i64::MIN]));
        assert_eq!(extreme, FormatSpec::Int { width: 20 });
    }

    #[test]
    fn test_small_mean_uses_scientific() {
        let spec = FormatSpec::for_column(&ColumnData::Float(vec![-2.2, 0.5, 3.2]));
        assert_eq!(spec, FormatSpec::Scientific);
        assert_eq!(spec.to_string(), "%12.4e");
        assert_eq!(spec.render_float(1.23457e-9), "  1.2346e-09");
        assert_eq!(spec.render_float(-3.2), " -3.2000e+00");
        assert_eq!(spec.render_float(0.0), "  0.0000e+00");
        assert_eq!(spec.render_float(6.02e23), "  6.0200e+23");
        assert_eq!(spec.render_float(1e-120), " 1.0000e-120");
    }

    #[test]
    fn test_large_mean_uses_fixed() {
        let spec = FormatSpec::for_column(&ColumnData::Float(vec![120.0, -999.0, 1119.0]));
        // mean 80, max |v| 1119 → 4 digits + 5
        assert_eq!(spec, FormatSpec::Fixed { width: 9, precision: 3 });

        let spec = FormatSpec::for_column(&ColumnData::Float(vec![120.0, 120.0, 999.0, -759.0]));
        assert_eq!(spec.to_string(), "%8.3f");
        assert_eq!(spec.render_float(280.5), " 280.500");
        assert_eq!(spec.render_float(-999.0), "-999.000");
    }

    #[test]
    fn test_non_finite_values() {
        let spec = FormatSpec::for_column(&ColumnData::Float(vec![f64::NAN, 300.0]));
        assert_eq!(spec, FormatSpec::Fixed { width: 8, precision: 3 });
        assert_eq!(spec.render_float(f64::NAN), "     nan");
        assert_eq!(FormatSpec::Scientific.render_float(f64::NEG_INFINITY), format!("{:>12}", "-inf"));

        let empty = FormatSpec::for_column(&ColumnData::Float(vec![]));
        assert_eq!(empty, FormatSpec::Scientific);
    }

    #[test]
    fn test_render_cell() {
        let data = ColumnData::Int(vec![7, 12]);
        let spec = FormatSpec::for_column(&data);
        assert_eq!(spec.render_cell(&data, 1).as_deref(), Some(" 12"));
        assert_eq!(spec.render_cell(&data, 2), None);
    }
}
