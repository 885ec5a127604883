//! Quadrant Shadow Allocator
//!
//! Splits a directional light's shadow frustum into four quadrants, each
//! rendered by its own caster. The caster in slot 0 owns the high-resolution
//! shadow map and always renders the quadrant containing the viewer; the
//! other three slots cover the remaining quadrants at low resolution.
//!
//! # Frame update
//!
//! `update_before_frame` runs four strictly ordered steps:
//!
//! 1. Mirror the source light's position, target and intensity into every
//!    caster.
//! 2. Project the camera position through each caster's view-projection. A
//!    caster whose clip rectangle contains it makes its quadrant active. When
//!    several casters match, the highest quadrant index wins.
//! 3. Reassign bounds: slot 0 takes the active quadrant, the slot that would
//!    normally render the active quadrant takes quadrant 0, every other slot
//!    keeps its own index.
//! 4. Rebuild projections and flag shadow maps for re-render.
//!
//! # Lifecycle
//!
//! `Uninitialized -> Initialized -> Disposed`. Initialization happens
//! explicitly or lazily from `build_visibility_expression`. Disposal (also run
//! on drop) detaches the casters and restores the source light.

use serde::{Serialize, Deserialize};

use crate::caster::{ShadowMapSize, SubLightShadowCaster};
use crate::config::QuadShadowConfig;
use crate::data::GpuQuadrantShadows;
use crate::error::{QuadShadowError, Result};
use crate::observer::{QuadrantObserver, QuadrantSwitch};
use crate::quadrant::{ShadowFrustumBounds, QUADRANTS, QUADRANT_COUNT};
use crate::scene::{CameraHandle, LightHandle, NodeKind, SceneHandle};
use crate::visibility::ShadowExpr;

/// Lifecycle state of the allocator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocatorState {
    Uninitialized,
    Initialized,
    Disposed,
}

/// Outcome of one frame update
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Frame number (starts at 1)
    pub frame: u64,
    /// Quadrant rendered at high resolution
    pub active_quadrant: usize,
    /// Active quadrant changed this frame
    pub switched: bool,
    /// Quadrant rendered by each slot
    pub slot_quadrants: [usize; QUADRANT_COUNT],
}

/// Quadrant index each slot renders when `active` is the viewer's quadrant
///
/// Identity mapping with slot 0 and slot `active` swapped.
pub fn slot_assignment(active: usize) -> [usize; QUADRANT_COUNT] {
    let mut mapping = [0; QUADRANT_COUNT];
    mapping[0] = active;
    for (slot, quadrant) in mapping.iter_mut().enumerate().skip(1) {
        *quadrant = if slot == active { 0 } else { slot };
    }
    mapping
}

/// Dynamic quadrant shadow resolution allocator
pub struct QuadrantShadowAllocator {
    config: QuadShadowConfig,
    light: Option<LightHandle>,
    camera: Option<CameraHandle>,
    scene: Option<SceneHandle>,
    state: AllocatorState,
    casters: Vec<SubLightShadowCaster>,
    base_bounds: ShadowFrustumBounds,
    quadrant_bounds: [ShadowFrustumBounds; QUADRANT_COUNT],
    active_quadrant: usize,
    frame: u64,
    light_was_visible: bool,
    observers: Vec<Box<dyn QuadrantObserver>>,
}

impl QuadrantShadowAllocator {
    /// Create an allocator; collaborators are supplied with the `with_*`
    /// builders before initialization
    pub fn new(mut config: QuadShadowConfig) -> Self {
        config.validate();

        Self {
            config,
            light: None,
            camera: None,
            scene: None,
            state: AllocatorState::Uninitialized,
            casters: Vec::with_capacity(QUADRANT_COUNT),
            base_bounds: ShadowFrustumBounds::default(),
            quadrant_bounds: [ShadowFrustumBounds::default(); QUADRANT_COUNT],
            active_quadrant: 0,
            frame: 0,
            light_was_visible: true,
            observers: Vec::new(),
        }
    }

    /// Source light whose shadow is split
    pub fn with_light(mut self, light: LightHandle) -> Self {
        self.light = Some(light);
        self
    }

    /// Viewer camera deciding the active quadrant
    pub fn with_camera(mut self, camera: CameraHandle) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Scene the casters are attached to
    pub fn with_scene(mut self, scene: SceneHandle) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Register a quadrant switch observer
    pub fn with_observer(mut self, observer: impl QuadrantObserver + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    /// Register a quadrant switch observer
    pub fn add_observer(&mut self, observer: impl QuadrantObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Create the four casters and attach them to the scene
    ///
    /// No-op when already initialized.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            AllocatorState::Initialized => return Ok(()),
            AllocatorState::Disposed => return Err(QuadShadowError::Disposed),
            AllocatorState::Uninitialized => {}
        }

        let light = self.light.clone().ok_or_else(|| QuadShadowError::missing("source light"))?;
        if self.camera.is_none() {
            return Err(QuadShadowError::missing("viewer camera"));
        }
        let scene = self.scene.clone().ok_or_else(|| QuadShadowError::missing("scene root"))?;

        let source = light.read().clone();
        source.shadow.bounds.validate()?;

        self.base_bounds = source.shadow.bounds;
        for (quadrant, bounds) in self.quadrant_bounds.iter_mut().enumerate() {
            *bounds = self.base_bounds.slice(&QUADRANTS[quadrant]);
        }

        {
            let mut scene = scene.write();
            let parent = scene.parent_of(source.node).unwrap_or_else(|| scene.root());

            self.casters.clear();
            for slot in 0..QUADRANT_COUNT {
                let node = scene.add(NodeKind::ShadowCaster(slot), parent);
                let target_node = scene.add(NodeKind::CasterTarget(slot), parent);
                let resolution = ShadowMapSize::square(self.config.resolution_for_slot(slot));

                self.casters.push(SubLightShadowCaster::new(
                    slot,
                    node,
                    target_node,
                    &source,
                    self.quadrant_bounds[slot],
                    resolution,
                    slot,
                ));
            }
        }

        {
            let mut light = light.write();
            self.light_was_visible = light.visible;
            light.visible = false;
        }

        self.active_quadrant = 0;
        self.frame = 0;
        self.state = AllocatorState::Initialized;

        log::info!(
            "Quadrant shadows initialized: high {}x{}, low {}x{}",
            self.config.high_resolution,
            self.config.high_resolution,
            self.config.low_resolution,
            self.config.low_resolution
        );

        Ok(())
    }

    /// Per-frame update; call before submitting draws
    pub fn update_before_frame(&mut self) -> Result<FrameReport> {
        self.ensure_initialized()?;

        let (light, camera) = match (&self.light, &self.camera) {
            (Some(light), Some(camera)) => (light.clone(), camera.clone()),
            _ => return Err(QuadShadowError::NotInitialized),
        };

        self.frame += 1;
        let previous_quadrant = self.active_quadrant;
        let previous_mapping = self.slot_quadrants();

        // 1. Follow the (possibly animated) source light
        let mut light_moved = false;
        {
            let light = light.read();
            for caster in &mut self.casters {
                light_moved |= caster.sync_from(&light);
            }
        }

        // 2. Find the quadrant containing the viewer. Ties go to the highest
        // quadrant index, independent of which slot currently holds it.
        let camera_position = camera.read().position;
        let slack = self.config.clip_slack;
        let hit = self
            .casters
            .iter()
            .filter(|caster| caster.contains_xy(camera_position, slack))
            .map(|caster| caster.quadrant_index)
            .max();
        if let Some(quadrant) = hit {
            self.active_quadrant = quadrant;
        }

        // 3. Reassign frustum bounds
        let mapping = slot_assignment(self.active_quadrant);
        for (caster, &quadrant) in self.casters.iter_mut().zip(mapping.iter()) {
            caster.assign(self.quadrant_bounds[quadrant], quadrant);
        }

        // 4. Rebuild projections and flag maps
        let changed = light_moved || mapping != previous_mapping;
        for caster in &mut self.casters {
            caster.update_projection();
            caster.needs_update = caster.is_high_resolution()
                || self.config.low_res_update.should_update(self.frame, changed);
        }

        let switched = self.active_quadrant != previous_quadrant;
        if switched {
            let event = QuadrantSwitch {
                frame: self.frame,
                from: previous_quadrant,
                to: self.active_quadrant,
                slot_quadrants: mapping,
            };
            for observer in &self.observers {
                observer.on_quadrant_switch(&event);
            }
        }

        log::trace!(
            "Quadrant shadows frame {}: active {}, slots {:?}",
            self.frame, self.active_quadrant, mapping
        );

        Ok(FrameReport {
            frame: self.frame,
            active_quadrant: self.active_quadrant,
            switched,
            slot_quadrants: mapping,
        })
    }

    /// Shading expression combining the four casters
    ///
    /// Initializes the allocator on first use.
    pub fn build_visibility_expression(&mut self) -> Result<ShadowExpr> {
        if self.state == AllocatorState::Uninitialized {
            self.initialize()?;
        }
        self.ensure_initialized()?;

        Ok(ShadowExpr::quadrant_visibility(self.casters.len()))
    }

    /// Detach casters and restore the source light
    ///
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.state == AllocatorState::Disposed {
            return;
        }

        if self.state == AllocatorState::Initialized {
            if let Some(scene) = &self.scene {
                let mut scene = scene.write();
                for caster in &self.casters {
                    scene.remove(caster.target_node);
                    scene.remove(caster.node);
                }
            }

            if let Some(light) = &self.light {
                light.write().visible = self.light_was_visible;
            }

            log::info!("Quadrant shadows disposed after {} frames", self.frame);
        }

        self.casters.clear();
        self.observers.clear();
        self.state = AllocatorState::Disposed;
    }

    /// Clear re-render flags once the renderer has drawn the shadow maps
    pub fn mark_rendered(&mut self) {
        for caster in &mut self.casters {
            caster.needs_update = false;
        }
    }

    fn ensure_initialized(&self) -> Result<()> {
        match self.state {
            AllocatorState::Initialized => Ok(()),
            AllocatorState::Uninitialized => Err(QuadShadowError::NotInitialized),
            AllocatorState::Disposed => Err(QuadShadowError::Disposed),
        }
    }

    /// Lifecycle state
    pub fn state(&self) -> AllocatorState {
        self.state
    }

    /// Check if the casters exist
    pub fn is_initialized(&self) -> bool {
        self.state == AllocatorState::Initialized
    }

    /// Quadrant currently rendered at high resolution
    pub fn active_quadrant(&self) -> usize {
        self.active_quadrant
    }

    /// Frames updated since initialization
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Effective configuration
    pub fn config(&self) -> &QuadShadowConfig {
        &self.config
    }

    /// Casters by slot
    pub fn casters(&self) -> &[SubLightShadowCaster] {
        &self.casters
    }

    /// Caster in a slot
    pub fn caster(&self, slot: usize) -> Option<&SubLightShadowCaster> {
        self.casters.get(slot)
    }

    /// Quadrant tag of each slot
    pub fn slot_quadrants(&self) -> [usize; QUADRANT_COUNT] {
        let mut mapping = [0; QUADRANT_COUNT];
        for (slot, caster) in self.casters.iter().enumerate().take(QUADRANT_COUNT) {
            mapping[slot] = caster.quadrant_index;
        }
        mapping
    }

    /// Source light bounds captured at initialization
    pub fn base_bounds(&self) -> ShadowFrustumBounds {
        self.base_bounds
    }

    /// Light-space bounds of a quadrant
    pub fn quadrant_bounds(&self, quadrant: usize) -> Option<ShadowFrustumBounds> {
        if self.is_initialized() {
            self.quadrant_bounds.get(quadrant).copied()
        } else {
            None
        }
    }

    /// Uniform block for the current assignment
    pub fn gpu_data(&self) -> GpuQuadrantShadows {
        GpuQuadrantShadows::new(&self.casters, self.active_quadrant)
    }

    /// Shared light handle, if set
    pub fn light(&self) -> Option<&LightHandle> {
        self.light.as_ref()
    }

    /// Shared scene handle, if set
    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }
}

impl Default for QuadrantShadowAllocator {
    fn default() -> Self {
        Self::new(QuadShadowConfig::default())
    }
}

impl Drop for QuadrantShadowAllocator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for QuadrantShadowAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadrantShadowAllocator")
            .field("state", &self.state)
            .field("active_quadrant", &self.active_quadrant)
            .field("frame", &self.frame)
            .field("slot_quadrants", &self.slot_quadrants())
            .field("observers", &self.observers.len())
            .finish()
    }
}
