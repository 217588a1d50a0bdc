//! Host-facing bolt component: anchor positions in, renderable mesh out.

use glam::{Affine3A, Vec3};
use tracing::debug;

use crate::config::{MeshConfig, ShapeConfig};
use crate::error::ConfigResult;
use crate::mesh::{TubeMesh, TubeMeshBuilder};
use crate::shape::ShapeGenerator;

/// Owns one shape generator and one mesh builder and mirrors the host's
/// anchor transforms.
///
/// Anchors are world-space; they are pulled into the emitter's local space
/// before generation, so the host is free to move and orient the emitter
/// without touching the generated geometry. The host submits the returned
/// mesh to its own render pipeline and keeps the anchors current.
pub struct BoltEmitter {
    generator: ShapeGenerator,
    builder: TubeMeshBuilder,
    /// Emitter placement in the world (local to world).
    transform: Affine3A,
    origin: Option<Vec3>,
    impact: Option<Vec3>,
}

impl BoltEmitter {
    /// # Errors
    ///
    /// Returns an error if either configuration fails validation.
    pub fn new(shape: ShapeConfig, mesh: MeshConfig, seed: u64) -> ConfigResult<Self> {
        Ok(Self {
            generator: ShapeGenerator::new(shape, seed)?,
            builder: TubeMeshBuilder::new(mesh)?,
            transform: Affine3A::IDENTITY,
            origin: None,
            impact: None,
        })
    }

    pub fn set_transform(&mut self, transform: Affine3A) {
        self.transform = transform;
    }

    /// World-space start of the bolt. `None` suspends generation.
    pub fn set_origin(&mut self, world_position: Option<Vec3>) {
        self.origin = world_position;
    }

    /// World-space end of the bolt. `None` suspends generation.
    pub fn set_impact(&mut self, world_position: Option<Vec3>) {
        self.impact = world_position;
    }

    /// Advance one tick and hand back the mesh.
    ///
    /// While either anchor is missing the tick is skipped and nothing is
    /// produced; the host keeps running.
    pub fn update(&mut self, dt: f32) -> Option<&TubeMesh> {
        let (Some(origin), Some(impact)) = (self.origin, self.impact) else {
            debug!("bolt tick skipped: anchor missing");
            return None;
        };

        let world_to_local = self.transform.inverse();
        let branches = self.generator.generate(
            dt,
            world_to_local.transform_point3(origin),
            world_to_local.transform_point3(impact),
        );
        Some(self.builder.build(&branches))
    }

    /// Explicitly release the retained mesh buffers.
    pub fn release(&mut self) {
        self.builder.release();
    }
}
