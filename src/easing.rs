//! Easing function library.
//!
//! Ten named closed-form curves plus custom cubic-bezier timing. Every curve
//! maps normalized time t ∈ [0,1] with f(0)=0 and f(1)=1; cubic-bezier y
//! control points may leave [0,1] to allow overshoot.
//!
//! The bezier is parametric, so evaluating it as a function of x requires a
//! numeric inversion: Newton-Raphson seeded at t = x, with a bisection
//! fallback when Newton fails to converge.

use std::fmt;

use serde::de::{self, Deserializer, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Named easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingName {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl EasingName {
    /// Get the serialized name of this curve.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "easeIn",
            Self::EaseOut => "easeOut",
            Self::EaseInOut => "easeInOut",
            Self::EaseInQuad => "easeInQuad",
            Self::EaseOutQuad => "easeOutQuad",
            Self::EaseInOutQuad => "easeInOutQuad",
            Self::EaseInCubic => "easeInCubic",
            Self::EaseOutCubic => "easeOutCubic",
            Self::EaseInOutCubic => "easeInOutCubic",
        }
    }

    /// Look up a curve by name. Unknown names fall back to linear.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            "easeIn" => Self::EaseIn,
            "easeOut" => Self::EaseOut,
            "easeInOut" => Self::EaseInOut,
            "easeInQuad" => Self::EaseInQuad,
            "easeOutQuad" => Self::EaseOutQuad,
            "easeInOutQuad" => Self::EaseInOutQuad,
            "easeInCubic" => Self::EaseInCubic,
            "easeOutCubic" => Self::EaseOutCubic,
            "easeInOutCubic" => Self::EaseInOutCubic,
            _ => Self::Linear,
        }
    }

    /// Evaluate the curve at normalized time t.
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn | Self::EaseInQuad => t * t,
            Self::EaseOut | Self::EaseOutQuad => t * (2.0 - t),
            Self::EaseInOut | Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::EaseInCubic => t * t * t,
            Self::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
        }
    }
}

impl Serialize for EasingName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EasingName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

/// Easing applied when interpolating into a keyframe.
///
/// Serializes as either a bare curve name or a 4-element control-point array
/// in human-readable formats, keeping the definition format plain data;
/// binary formats use an ordinary tagged enum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Named(EasingName),
    /// Custom cubic-bezier control points `[cp1x, cp1y, cp2x, cp2y]`.
    CubicBezier([f64; 4]),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Named(EasingName::Linear)
    }
}

const EASING_VARIANTS: &[&str] = &["Named", "CubicBezier"];

impl Serialize for Easing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            match self {
                Easing::Named(name) => name.serialize(serializer),
                Easing::CubicBezier(points) => points.serialize(serializer),
            }
        } else {
            match self {
                Easing::Named(name) => {
                    serializer.serialize_newtype_variant("Easing", 0, "Named", name)
                }
                Easing::CubicBezier(points) => {
                    serializer.serialize_newtype_variant("Easing", 1, "CubicBezier", points)
                }
            }
        }
    }
}

struct UntaggedEasingVisitor;

impl<'de> Visitor<'de> for UntaggedEasingVisitor {
    type Value = Easing;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an easing name or a 4-element control-point array")
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Easing, E> {
        Ok(Easing::Named(EasingName::from_name(s)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Easing, A::Error> {
        let mut points = [0.0f64; 4];
        for (i, slot) in points.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| de::Error::invalid_length(i, &self))?;
        }
        Ok(Easing::CubicBezier(points))
    }
}

enum EasingTag {
    Named,
    CubicBezier,
}

impl<'de> Deserialize<'de> for EasingTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl<'de> Visitor<'de> for TagVisitor {
            type Value = EasingTag;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("variant identifier")
            }

            fn visit_u64<E: de::Error>(self, index: u64) -> Result<EasingTag, E> {
                match index {
                    0 => Ok(EasingTag::Named),
                    1 => Ok(EasingTag::CubicBezier),
                    _ => Err(de::Error::invalid_value(
                        de::Unexpected::Unsigned(index),
                        &"variant index 0 <= i < 2",
                    )),
                }
            }

            fn visit_str<E: de::Error>(self, name: &str) -> Result<EasingTag, E> {
                match name {
                    "Named" => Ok(EasingTag::Named),
                    "CubicBezier" => Ok(EasingTag::CubicBezier),
                    _ => Err(de::Error::unknown_variant(name, EASING_VARIANTS)),
                }
            }
        }

        deserializer.deserialize_identifier(TagVisitor)
    }
}

struct TaggedEasingVisitor;

impl<'de> Visitor<'de> for TaggedEasingVisitor {
    type Value = Easing;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an Easing enum")
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Easing, A::Error> {
        let (tag, variant) = data.variant::<EasingTag>()?;
        match tag {
            EasingTag::Named => Ok(Easing::Named(variant.newtype_variant()?)),
            EasingTag::CubicBezier => Ok(Easing::CubicBezier(variant.newtype_variant()?)),
        }
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(UntaggedEasingVisitor)
        } else {
            deserializer.deserialize_enum("Easing", EASING_VARIANTS, TaggedEasingVisitor)
        }
    }
}

impl Easing {
    /// Evaluate the easing at normalized time t.
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Easing::Named(name) => name.evaluate(t),
            Easing::CubicBezier([x1, y1, x2, y2]) => {
                CubicBezier::new(*x1, *y1, *x2, *y2).evaluate(t)
            }
        }
    }
}

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_MIN_SLOPE: f64 = 1e-6;
const SOLVE_EPSILON: f64 = 1e-7;

/// Cubic-bezier timing function with implicit endpoints (0,0) and (1,1).
///
/// Stores the polynomial coefficients for x(t) and y(t); `evaluate` inverts
/// x(t) numerically and then samples y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl CubicBezier {
    pub fn new(cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64) -> Self {
        let cx = 3.0 * cp1x;
        let bx = 3.0 * (cp2x - cp1x) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * cp1y;
        let by = 3.0 * (cp2y - cp1y) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    #[inline]
    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    #[inline]
    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    #[inline]
    fn sample_dx(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Solve x(t) = x for the curve parameter t.
    fn solve_t(&self, x: f64) -> f64 {
        // Newton-Raphson, seeded at t = x.
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = self.sample_x(t) - x;
            if err.abs() < SOLVE_EPSILON {
                return t;
            }
            let slope = self.sample_dx(t);
            if slope.abs() < NEWTON_MIN_SLOPE {
                break;
            }
            t -= err / slope;
        }

        // Bisection fallback; x(t) is monotonic for control x in [0,1].
        let mut lo = 0.0f64;
        let mut hi = 1.0f64;
        let mut mid = x.clamp(0.0, 1.0);
        while hi - lo > SOLVE_EPSILON {
            if self.sample_x(mid) < x {
                lo = mid;
            } else {
                hi = mid;
            }
            mid = 0.5 * (lo + hi);
        }
        mid
    }

    /// Evaluate the timing function at x ∈ [0,1].
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        self.sample_y(self.solve_t(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn named_curves_endpoints() {
        let all = [
            EasingName::Linear,
            EasingName::EaseIn,
            EasingName::EaseOut,
            EasingName::EaseInOut,
            EasingName::EaseInQuad,
            EasingName::EaseOutQuad,
            EasingName::EaseInOutQuad,
            EasingName::EaseInCubic,
            EasingName::EaseOutCubic,
            EasingName::EaseInOutCubic,
        ];
        for name in all {
            assert_abs_diff_eq!(name.evaluate(0.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(name.evaluate(1.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn unknown_name_falls_back_to_linear() {
        assert_eq!(EasingName::from_name("bounceOut"), EasingName::Linear);
        let parsed: EasingName = serde_json::from_str("\"wobble\"").unwrap();
        assert_eq!(parsed, EasingName::Linear);
    }

    #[test]
    fn bezier_endpoints_and_inversion() {
        let curve = CubicBezier::new(0.25, 0.1, 0.25, 1.0);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);

        // Solved t must reproduce the sampled x within tolerance.
        for i in 1..10 {
            let x = i as f64 / 10.0;
            let t = curve.solve_t(x);
            assert!((curve.sample_x(t) - x).abs() < 1e-6, "x={x} t={t}");
        }
    }

    #[test]
    fn bezier_identity_is_linear() {
        let curve = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let x = i as f64 / 10.0;
            assert_abs_diff_eq!(curve.evaluate(x), x, epsilon = 1e-6);
        }
    }

    #[test]
    fn bezier_overshoot_allowed() {
        // y control points outside [0,1] overshoot the target.
        let curve = CubicBezier::new(0.34, 1.56, 0.64, 1.0);
        assert!(curve.evaluate(0.5) > 1.0);
    }

    #[test]
    fn easing_serde_shapes() {
        let named = Easing::Named(EasingName::EaseInOutCubic);
        assert_eq!(serde_json::to_string(&named).unwrap(), "\"easeInOutCubic\"");
        let bez = Easing::CubicBezier([0.4, 0.0, 0.2, 1.0]);
        let json = serde_json::to_string(&bez).unwrap();
        assert_eq!(serde_json::from_str::<Easing>(&json).unwrap(), bez);
    }

    #[test]
    fn easing_binary_roundtrip() {
        for easing in [
            Easing::Named(EasingName::EaseOutQuad),
            Easing::CubicBezier([0.4, 0.0, 0.2, 1.0]),
        ] {
            let bytes = bincode::serialize(&easing).unwrap();
            assert_eq!(bincode::deserialize::<Easing>(&bytes).unwrap(), easing);
        }
    }
}
