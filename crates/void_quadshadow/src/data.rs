//! GPU Quadrant Shadow Data
//!
//! Uniform block describing the four quadrant casters. All structures are
//! bytemuck Pod/Zeroable for direct GPU upload.

use serde::{Serialize, Deserialize};

use crate::caster::SubLightShadowCaster;
use crate::quadrant::QUADRANT_COUNT;

/// GPU data for one quadrant caster
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuQuadrantCaster {
    /// Light-space view-projection matrix (column-major)
    pub matrix: [[f32; 4]; 4],

    /// Depth bias
    pub bias: f32,

    /// Normal bias
    pub normal_bias: f32,

    /// Texel size for PCF (1.0 / resolution)
    pub texel_size: f32,

    /// Quadrant rendered by this slot
    pub quadrant: u32,
}

impl GpuQuadrantCaster {
    /// Build from a caster
    pub fn from_caster(caster: &SubLightShadowCaster) -> Self {
        Self {
            matrix: caster.view_projection().to_cols_array_2d(),
            bias: caster.bias,
            normal_bias: caster.normal_bias,
            texel_size: 1.0 / caster.resolution.width.max(1) as f32,
            quadrant: caster.quadrant_index as u32,
        }
    }
}

/// Uniform block for all quadrant casters
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuQuadrantShadows {
    /// Per-slot caster data (slot 0 = high resolution)
    pub casters: [GpuQuadrantCaster; QUADRANT_COUNT],

    /// Quadrant currently rendered at high resolution
    pub active_quadrant: u32,

    /// Number of valid casters (0 before initialization)
    pub caster_count: u32,

    /// Padding to align to 16 bytes
    pub _pad: [u32; 2],
}

impl GpuQuadrantShadows {
    /// Size in bytes
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Build from the allocator's casters
    pub fn new(casters: &[SubLightShadowCaster], active_quadrant: usize) -> Self {
        let mut data = Self {
            active_quadrant: active_quadrant as u32,
            ..Default::default()
        };

        for (slot, caster) in casters.iter().take(QUADRANT_COUNT).enumerate() {
            data.casters[slot] = GpuQuadrantCaster::from_caster(caster);
            data.caster_count += 1;
        }

        data
    }

    /// Raw bytes for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
