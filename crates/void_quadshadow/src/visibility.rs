//! Visibility Expression
//!
//! Shading-stage expression combining the four caster lookups. The tree can
//! be evaluated on the CPU against a [`ShadowSampler`] or emitted as WGSL for
//! the material system.
//!
//! The combination is `lit_color * min(shadow_0, shadow_1, shadow_2, shadow_3)`:
//! a point is shadowed if any caster says so, so a caster whose map still
//! describes last frame's quadrant cannot leak light.

use glam::{Vec3, Vec4};
use serde::{Serialize, Deserialize};

use crate::quadrant::QUADRANT_COUNT;

/// Per-caster shadow attenuation source
pub trait ShadowSampler {
    /// Attenuation in `[0, 1]` for `slot` at a world position (1 = lit)
    fn sample(&self, slot: usize, world: Vec3) -> f32;
}

impl<F> ShadowSampler for F
where
    F: Fn(usize, Vec3) -> f32,
{
    fn sample(&self, slot: usize, world: Vec3) -> f32 {
        self(slot, world)
    }
}

/// Shading expression node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShadowExpr {
    /// Constant color
    Color([f32; 4]),
    /// Shadow attenuation of a caster slot
    Lookup(usize),
    /// Component-wise minimum
    Min(Box<ShadowExpr>, Box<ShadowExpr>),
    /// Product
    Mul(Box<ShadowExpr>, Box<ShadowExpr>),
}

impl ShadowExpr {
    /// `lit * min(lookup_0, .., lookup_n)` over the given slots
    pub fn quadrant_visibility(slots: usize) -> Self {
        let slots = slots.clamp(1, QUADRANT_COUNT);

        let mut shadow = ShadowExpr::Lookup(0);
        for slot in 1..slots {
            shadow = ShadowExpr::Min(Box::new(shadow), Box::new(ShadowExpr::Lookup(slot)));
        }

        ShadowExpr::Mul(Box::new(ShadowExpr::Color([1.0; 4])), Box::new(shadow))
    }

    /// Evaluate at a world position
    ///
    /// Scalars are splatted across all four components.
    pub fn evaluate(&self, sampler: &dyn ShadowSampler, world: Vec3) -> Vec4 {
        match self {
            Self::Color(c) => Vec4::from_array(*c),
            Self::Lookup(slot) => Vec4::splat(sampler.sample(*slot, world).clamp(0.0, 1.0)),
            Self::Min(a, b) => a.evaluate(sampler, world).min(b.evaluate(sampler, world)),
            Self::Mul(a, b) => a.evaluate(sampler, world) * b.evaluate(sampler, world),
        }
    }

    /// Caster slots referenced by the expression, in evaluation order
    pub fn lookups(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_lookups(&mut out);
        out
    }

    fn collect_lookups(&self, out: &mut Vec<usize>) {
        match self {
            Self::Color(_) => {}
            Self::Lookup(slot) => out.push(*slot),
            Self::Min(a, b) | Self::Mul(a, b) => {
                a.collect_lookups(out);
                b.collect_lookups(out);
            }
        }
    }

    /// Emit as a WGSL expression
    ///
    /// Lookups become `shadow_<slot>` identifiers the shader builder binds to
    /// the per-caster attenuation values.
    pub fn to_wgsl(&self) -> String {
        match self {
            Self::Color(c) => format!(
                "vec4<f32>({:?}, {:?}, {:?}, {:?})",
                c[0], c[1], c[2], c[3]
            ),
            Self::Lookup(slot) => format!("shadow_{}", slot),
            Self::Min(a, b) => format!("min({}, {})", a.to_wgsl(), b.to_wgsl()),
            Self::Mul(a, b) => format!("({} * {})", a.to_wgsl(), b.to_wgsl()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrant_visibility_uses_min() {
        let expr = ShadowExpr::quadrant_visibility(4);
        let sampler = |slot: usize, _: Vec3| -> f32 { [1.0, 0.25, 0.8, 0.6][slot] };

        let color = expr.evaluate(&sampler, Vec3::ZERO);
        assert!((color - Vec4::splat(0.25)).length() < 1e-6);
    }

    #[test]
    fn test_fully_lit() {
        let expr = ShadowExpr::quadrant_visibility(4);
        let color = expr.evaluate(&|_: usize, _: Vec3| -> f32 { 1.0 }, Vec3::ONE);
        assert_eq!(color, Vec4::ONE);
    }

    #[test]
    fn test_lookup_clamped() {
        let expr = ShadowExpr::Lookup(0);
        let color = expr.evaluate(&|_: usize, _: Vec3| -> f32 { 4.0 }, Vec3::ZERO);
        assert_eq!(color, Vec4::ONE);
    }

    #[test]
    fn test_lookups_order() {
        let expr = ShadowExpr::quadrant_visibility(4);
        assert_eq!(expr.lookups(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_to_wgsl() {
        let expr = ShadowExpr::quadrant_visibility(4);
        assert_eq!(
            expr.to_wgsl(),
            "(vec4<f32>(1.0, 1.0, 1.0, 1.0) * min(min(min(shadow_0, shadow_1), shadow_2), shadow_3))"
        );
    }
}
