//! # void_quadshadow - Quadrant Shadow Resolution
//!
//! Dynamic shadow resolution for a single directional light:
//! - The light's orthographic shadow frustum is split into four quadrants
//! - Each quadrant is rendered by its own caster
//! - The quadrant containing the viewer gets the high-resolution map
//! - Shading combines all four casters with `min`
//!
//! ## Example
//!
//! ```ignore
//! use void_quadshadow::prelude::*;
//!
//! let scene = SceneGraph::new().into_handle();
//! let light = DirectionalLight::new(light_node, sun_position, Vec3::ZERO).into_handle();
//! let camera = ViewerCamera::at(eye).into_handle();
//!
//! let mut shadows = QuadrantShadowAllocator::new(QuadShadowConfig::default())
//!     .with_light(light)
//!     .with_camera(camera)
//!     .with_scene(scene)
//!     .with_observer(LogObserver);
//!
//! // Material setup (initializes the casters on first use)
//! let expr = shadows.build_visibility_expression()?;
//! let wgsl = expr.to_wgsl();
//!
//! // Every frame, before draw submission
//! let report = shadows.update_before_frame()?;
//! let uniforms = shadows.gpu_data();
//! queue.write_buffer(&shadow_buffer, 0, uniforms.as_bytes());
//!
//! // Teardown
//! shadows.dispose();
//! ```

pub mod error;
pub mod quadrant;
pub mod config;
pub mod scene;
pub mod caster;
pub mod observer;
pub mod visibility;
pub mod data;
pub mod allocator;

pub use error::{QuadShadowError, Result};
pub use quadrant::{FrustumQuadrant, ShadowFrustumBounds, QUADRANTS, QUADRANT_COUNT};
pub use config::{QuadShadowConfig, ShadowUpdateMode};
pub use scene::{
    CameraHandle, DirectionalLight, LightHandle, LightShadow, NodeId, NodeKind, SceneGraph,
    SceneHandle, ViewerCamera,
};
pub use caster::{ShadowMapSize, SubLightShadowCaster};
pub use observer::{LogObserver, QuadrantObserver, QuadrantSwitch, RecordingObserver};
pub use visibility::{ShadowExpr, ShadowSampler};
pub use data::{GpuQuadrantCaster, GpuQuadrantShadows};
pub use allocator::{slot_assignment, AllocatorState, FrameReport, QuadrantShadowAllocator};

pub mod prelude {
    pub use crate::allocator::{AllocatorState, FrameReport, QuadrantShadowAllocator};
    pub use crate::config::{QuadShadowConfig, ShadowUpdateMode};
    pub use crate::observer::{LogObserver, QuadrantObserver, RecordingObserver};
    pub use crate::quadrant::ShadowFrustumBounds;
    pub use crate::scene::{DirectionalLight, NodeKind, SceneGraph, ViewerCamera};
    pub use crate::visibility::{ShadowExpr, ShadowSampler};
    pub use glam::Vec3;
}
