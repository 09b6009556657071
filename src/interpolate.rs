//! Value interpolation arms.
//!
//! Instead of re-inspecting the runtime shape of every "from" operand, the
//! interpolation arm for a track is resolved once from its first keyframe
//! (`Interpolation::for_value`) and applied for every sample. Mismatched
//! operand pairs degrade to the discrete hold-left policy rather than
//! raising.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// How a track blends between two keyframe values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpolation {
    /// Linear blend between two scalars.
    Numeric,
    /// Channel-wise color blend (`#hex`, `rgb()`, `rgba()` strings).
    Color,
    /// Hold `from` until progress reaches 1, then snap to `to`.
    Discrete,
    /// Element-wise linear blend, truncated to the shorter operand.
    NumericList,
}

impl Interpolation {
    /// Pick the arm for a value shape. Called once per track at construction.
    pub fn for_value(value: &Value) -> Self {
        match value {
            Value::Number(_) => Self::Numeric,
            Value::Text(s) => {
                if s.starts_with('#') || s.starts_with("rgb") {
                    Self::Color
                } else {
                    Self::Discrete
                }
            }
            Value::NumberList(_) => Self::NumericList,
        }
    }

    /// Blend `from` toward `to` at eased progress `t`.
    pub fn apply(&self, from: &Value, to: &Value, t: f64) -> Value {
        match self {
            Self::Numeric => match (from, to) {
                (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b, t)),
                _ => discrete(from, to, t),
            },
            Self::Color => match (from, to) {
                (Value::Text(a), Value::Text(b)) => match interpolate_color(a, b, t) {
                    Some(color) => Value::Text(color),
                    None => discrete(from, to, t),
                },
                _ => discrete(from, to, t),
            },
            Self::Discrete => discrete(from, to, t),
            Self::NumericList => match (from, to) {
                (Value::NumberList(a), Value::NumberList(b)) => {
                    let n = a.len().min(b.len());
                    Value::NumberList(
                        a.iter()
                            .zip(b.iter())
                            .take(n)
                            .map(|(x, y)| lerp(*x, *y, t))
                            .collect(),
                    )
                }
                _ => discrete(from, to, t),
            },
        }
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[inline]
fn discrete(from: &Value, to: &Value, t: f64) -> Value {
    if t < 1.0 {
        from.clone()
    } else {
        to.clone()
    }
}

/// Parsed color with 0-255 channels; alpha is normalized 0-1.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    r: f64,
    g: f64,
    b: f64,
    alpha: Option<f64>,
}

#[inline]
fn hex_digit(b: u8) -> Option<u32> {
    (b as char).to_digit(16)
}

fn parse_hex(s: &str) -> Option<Rgba> {
    // Work on bytes: string slicing would panic on a multibyte char at an
    // unaligned offset, and color parsing must never raise.
    let hex = s.strip_prefix('#')?.as_bytes();
    let (r, g, b) = match hex.len() {
        3 => {
            let channel = |i: usize| -> Option<f64> {
                let d = hex_digit(hex[i])?;
                Some((d * 16 + d) as f64)
            };
            (channel(0)?, channel(1)?, channel(2)?)
        }
        6 => {
            let channel = |i: usize| -> Option<f64> {
                let hi = hex_digit(hex[i])?;
                let lo = hex_digit(hex[i + 1])?;
                Some((hi * 16 + lo) as f64)
            };
            (channel(0)?, channel(2)?, channel(4)?)
        }
        _ => return None,
    };
    Some(Rgba {
        r,
        g,
        b,
        alpha: None,
    })
}

fn parse_functional(s: &str) -> Option<Rgba> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    let has_alpha = s[..open].trim() == "rgba";
    let mut parts = s[open + 1..close].split(',').map(|p| p.trim().parse::<f64>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    let alpha = if has_alpha {
        Some(parts.next().map_or(Some(1.0), |a| a.ok())?)
    } else {
        None
    };
    Some(Rgba { r, g, b, alpha })
}

fn parse_color(s: &str) -> Option<Rgba> {
    if s.starts_with('#') {
        parse_hex(s)
    } else if s.starts_with("rgb") {
        parse_functional(s)
    } else {
        None
    }
}

#[inline]
fn channel(a: f64, b: f64, t: f64) -> u8 {
    lerp(a, b, t).round().clamp(0.0, 255.0) as u8
}

/// Interpolate two color strings at progress `t`.
///
/// Hex inputs re-encode to hex; functional inputs re-encode as `rgb()` or,
/// when either side carries alpha, `rgba()` with the missing alpha defaulting
/// to 1. Returns None when either side fails to parse.
pub fn interpolate_color(from: &str, to: &str, t: f64) -> Option<String> {
    let a = parse_color(from)?;
    let b = parse_color(to)?;

    let r = channel(a.r, b.r, t);
    let g = channel(a.g, b.g, t);
    let bl = channel(a.b, b.b, t);

    if from.starts_with('#') {
        return Some(format!("#{r:02x}{g:02x}{bl:02x}"));
    }

    if a.alpha.is_some() || b.alpha.is_some() {
        let alpha = lerp(a.alpha.unwrap_or(1.0), b.alpha.unwrap_or(1.0), t);
        Some(format!("rgba({r}, {g}, {bl}, {alpha})"))
    } else {
        Some(format!("rgb({r}, {g}, {bl})"))
    }
}
