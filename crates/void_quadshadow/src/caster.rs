//! Quadrant Shadow Casters
//!
//! A caster is a shadow-only sub-light: it mirrors the source light's
//! transform and renders one quadrant of the source light's frustum into its
//! own shadow map.

use glam::{Mat4, Vec3};
use serde::{Serialize, Deserialize};

use crate::quadrant::ShadowFrustumBounds;
use crate::scene::{light_up_vector, DirectionalLight, NodeId};

/// Shadow map dimensions in texels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowMapSize {
    pub width: u32,
    pub height: u32,
}

impl ShadowMapSize {
    /// Square map
    pub fn square(size: u32) -> Self {
        Self { width: size, height: size }
    }

    /// Texel count
    pub fn texels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Shadow-casting sub-light bound to one quadrant
#[derive(Clone, Debug)]
pub struct SubLightShadowCaster {
    /// Slot in the allocator (0 = high resolution)
    pub slot: usize,
    /// Scene node of the caster
    pub node: NodeId,
    /// Scene node of the caster's aim target
    pub target_node: NodeId,
    /// World position, mirrored from the source light
    pub position: Vec3,
    /// Aim target, mirrored from the source light
    pub target_position: Vec3,
    /// Intensity, mirrored from the source light
    pub intensity: f32,
    /// Depth bias copied from the source light
    pub bias: f32,
    /// Normal bias copied from the source light
    pub normal_bias: f32,
    /// Bounds of the quadrant this caster renders
    pub bounds: ShadowFrustumBounds,
    /// Shadow map size
    pub resolution: ShadowMapSize,
    /// Quadrant currently rendered by this caster
    pub quadrant_index: usize,
    /// Shadow map must be re-rendered this frame
    pub needs_update: bool,
    view: Mat4,
    projection: Mat4,
}

impl SubLightShadowCaster {
    /// Create a caster for `slot` mirroring `light`
    pub(crate) fn new(
        slot: usize,
        node: NodeId,
        target_node: NodeId,
        light: &DirectionalLight,
        bounds: ShadowFrustumBounds,
        resolution: ShadowMapSize,
        quadrant_index: usize,
    ) -> Self {
        let mut caster = Self {
            slot,
            node,
            target_node,
            position: light.position,
            target_position: light.target,
            intensity: light.intensity,
            bias: light.shadow.bias,
            normal_bias: light.shadow.normal_bias,
            bounds,
            resolution,
            quadrant_index,
            needs_update: true,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        caster.update_view();
        caster.update_projection();
        caster
    }

    /// Copy position, target and intensity from the source light
    ///
    /// Returns `true` when the position or target moved, i.e. the view
    /// changed and the shadow map is stale.
    pub fn sync_from(&mut self, light: &DirectionalLight) -> bool {
        let moved = self.position != light.position || self.target_position != light.target;
        self.position = light.position;
        self.target_position = light.target;
        self.intensity = light.intensity;
        if moved {
            self.update_view();
        }
        moved
    }

    /// Recompute the look-at view matrix
    pub fn update_view(&mut self) {
        let direction = (self.target_position - self.position).normalize_or_zero();
        // Degenerate light (position == target) keeps the last valid view
        if direction == Vec3::ZERO {
            return;
        }
        self.view = Mat4::look_at_rh(self.position, self.target_position, light_up_vector(direction));
    }

    /// Recompute the projection matrix from the bounds
    pub fn update_projection(&mut self) {
        self.projection = self.bounds.projection();
    }

    /// Assign new bounds and quadrant tag
    pub fn assign(&mut self, bounds: ShadowFrustumBounds, quadrant_index: usize) {
        self.bounds = bounds;
        self.quadrant_index = quadrant_index;
    }

    /// Light view matrix
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Orthographic projection matrix
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Project a world position into this caster's clip space
    pub fn project(&self, world: Vec3) -> Vec3 {
        self.view_projection().project_point3(world)
    }

    /// Check whether a world position falls strictly inside the caster's
    /// clip rectangle, widened by `slack`
    pub fn contains_xy(&self, world: Vec3, slack: f32) -> bool {
        let clip = self.project(world);
        let limit = 1.0 + slack;
        clip.x > -limit && clip.x < limit && clip.y > -limit && clip.y < limit
    }

    /// Shadow map texel size in light-space units
    pub fn texel_size(&self) -> f32 {
        self.bounds.width() / self.resolution.width.max(1) as f32
    }

    /// Check if this caster renders at high resolution
    pub fn is_high_resolution(&self) -> bool {
        self.slot == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrant::FrustumQuadrant;

    fn light() -> DirectionalLight {
        // Looking down -Z: light-space x/y match world x/y
        DirectionalLight::new(NodeId(1), Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO)
            .with_bounds(ShadowFrustumBounds::new(-10.0, 10.0, 10.0, -10.0, 0.5, 100.0).unwrap())
    }

    fn caster(quadrant: usize) -> SubLightShadowCaster {
        let light = light();
        let bounds = light.shadow.bounds.slice(&FrustumQuadrant::by_index(quadrant).unwrap());
        SubLightShadowCaster::new(0, NodeId(2), NodeId(3), &light, bounds, ShadowMapSize::square(4096), quadrant)
    }

    #[test]
    fn test_contains_inside_quadrant() {
        let c = caster(0);
        assert!(c.contains_xy(Vec3::new(-5.0, 5.0, 0.0), 0.0));
        assert!(!c.contains_xy(Vec3::new(5.0, 5.0, 0.0), 0.0));
        assert!(!c.contains_xy(Vec3::new(-5.0, -5.0, 0.0), 0.0));
    }

    #[test]
    fn test_contains_is_strict_on_edges() {
        let c = caster(0);
        // x = 0 is the shared edge with quadrant 1
        assert!(!c.contains_xy(Vec3::new(0.0, 5.0, 0.0), 0.0));
        assert!(c.contains_xy(Vec3::new(0.0, 5.0, 0.0), 0.1));
    }

    #[test]
    fn test_sync_from_light() {
        let mut c = caster(1);
        let mut l = light();
        l.position = Vec3::new(1.0, 2.0, 60.0);
        l.intensity = 3.5;

        assert!(c.sync_from(&l));

        assert_eq!(c.position, l.position);
        assert_eq!(c.target_position, l.target);
        assert_eq!(c.intensity, 3.5);
    }

    #[test]
    fn test_sync_reports_movement_only() {
        let mut c = caster(2);
        let mut l = light();

        l.intensity = 0.25;
        assert!(!c.sync_from(&l));
        assert_eq!(c.intensity, 0.25);

        l.target = Vec3::new(0.0, 1.0, 0.0);
        assert!(c.sync_from(&l));
        assert!(!c.sync_from(&l));
    }

    #[test]
    fn test_degenerate_light_keeps_view() {
        let mut c = caster(0);
        let view = c.view();
        let mut l = light();
        l.position = l.target;

        c.sync_from(&l);
        assert_eq!(c.view(), view);
    }

    #[test]
    fn test_texel_size() {
        let c = caster(0);
        assert!((c.texel_size() - 10.0 / 4096.0).abs() < 1e-9);
        assert!(c.is_high_resolution());
    }
}
