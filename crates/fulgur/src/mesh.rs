//! Tube mesh construction with amortized buffer reuse.
//!
//! Converts a branch list into a triangle tube: one ring of vertices per
//! point, consecutive rings stitched within each branch. Buffers are sized
//! exactly once per topology change and rewritten in place otherwise,
//! which is the common per-frame path since shape jitter rarely changes
//! point counts.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::branch::BoltBranch;
use crate::config::MeshConfig;
use crate::error::ConfigResult;

/// Renderable tube geometry.
///
/// `uvs[i].x` carries the owning branch's intensity so a shader can drive
/// emission per branch; the V channel is unused.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TubeMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl TubeMesh {
    fn with_exact_size(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; vertex_count],
            uvs: vec![Vec2::ZERO; vertex_count],
            indices: Vec::with_capacity(index_count),
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds and retains the tube mesh for successive shape snapshots.
///
/// The retained mesh is reallocated only when the incoming topology (total
/// point count or ring resolution) differs from the cached one; otherwise
/// vertex data is rewritten in place. Not designed for concurrent use;
/// callers serialize access to a builder.
pub struct TubeMeshBuilder {
    config: MeshConfig,
    cached_point_count: usize,
    cached_resolution: usize,
    mesh: TubeMesh,
    rebuilds: u64,
}

impl TubeMeshBuilder {
    /// # Errors
    ///
    /// Rejects a ring resolution below 3 or a non-positive radius.
    pub fn new(config: MeshConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            cached_point_count: 0,
            cached_resolution: config.segment_resolution,
            config,
            mesh: TubeMesh::default(),
            rebuilds: 0,
        })
    }

    /// Change the ring resolution; takes effect on the next build.
    ///
    /// # Errors
    ///
    /// Rejects a resolution below 3.
    pub fn set_segment_resolution(&mut self, segment_resolution: usize) -> ConfigResult<()> {
        MeshConfig {
            segment_resolution,
            ..self.config
        }
        .validate()?;
        self.config.segment_resolution = segment_resolution;
        Ok(())
    }

    /// Change the base tube radius; rewritten into the vertices on the next
    /// build without forcing a reallocation.
    pub fn set_segment_radius(&mut self, segment_radius: f32) {
        self.config.segment_radius = segment_radius;
    }

    /// How many times the mesh buffers have been reallocated.
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Triangulate the branch list into the retained mesh.
    pub fn build(&mut self, branches: &[BoltBranch]) -> &TubeMesh {
        let resolution = self.config.segment_resolution;
        let total_points: usize = branches.iter().map(|branch| branch.points.len()).sum();

        if total_points == self.cached_point_count && resolution == self.cached_resolution {
            self.write_vertices(branches);
        } else {
            self.reallocate(branches, total_points, resolution);
        }
        &self.mesh
    }

    /// Drop the retained mesh and forget the cached topology; the next
    /// build allocates from scratch.
    pub fn release(&mut self) {
        self.mesh = TubeMesh::default();
        self.cached_point_count = 0;
    }

    fn reallocate(&mut self, branches: &[BoltBranch], total_points: usize, resolution: usize) {
        let total_segments: usize = branches.iter().map(BoltBranch::segment_count).sum();
        let vertex_count = total_points * resolution;
        let index_count = total_segments * resolution * 2 * 3;

        // Replacing the retained mesh frees the old buffers right here, not
        // at some later collection point.
        self.mesh = TubeMesh::with_exact_size(vertex_count, index_count);
        self.cached_point_count = total_points;
        self.cached_resolution = resolution;
        Self::write_topology(&mut self.mesh, branches, resolution);
        self.write_vertices(branches);
        self.rebuilds += 1;
        debug!(
            vertices = vertex_count,
            indices = index_count,
            "tube mesh reallocated"
        );
    }

    /// Emit the ring-to-ring triangle stitching for every branch.
    ///
    /// Rings are never stitched across branch boundaries. Quads wrap around
    /// the ring (index i pairs with i+1 modulo the resolution) and each one
    /// splits into two triangles, previous ring first and current ring
    /// second, which keeps the tube normals facing outward.
    #[allow(clippy::cast_possible_truncation)]
    fn write_topology(mesh: &mut TubeMesh, branches: &[BoltBranch], resolution: usize) {
        let ring = resolution as u32;
        let mut branch_base = 0u32;
        for branch in branches {
            for segment in 0..branch.segment_count() as u32 {
                let previous = branch_base + segment * ring;
                let current = previous + ring;
                for i in 0..ring {
                    let j = (i + 1) % ring;
                    mesh.indices
                        .extend([previous + i, current + i, previous + j]);
                    mesh.indices
                        .extend([previous + j, current + i, current + j]);
                }
            }
            branch_base += branch.points.len() as u32 * ring;
        }
    }

    /// Rewrite ring vertices and UVs for the current branch list.
    #[allow(clippy::cast_precision_loss)]
    fn write_vertices(&mut self, branches: &[BoltBranch]) {
        let resolution = self.cached_resolution;
        let turn = TAU / (resolution - 1) as f32;
        let mut cursor = 0;
        for branch in branches {
            let ring_radius = self.config.segment_radius * branch.width;
            let uv = Vec2::new(branch.intensity, 0.0);
            for point in &branch.points {
                for i in 0..resolution {
                    // The ring parameterization spans resolution - 1 steps,
                    // so the last vertex wraps onto the first and the seam
                    // closes exactly.
                    let angle = turn * ((i % (resolution - 1)) as f32);
                    let (sin, cos) = angle.sin_cos();
                    let offset = point.frame.right * cos + point.frame.up * sin;
                    self.mesh.positions[cursor] = point.position + offset * ring_radius;
                    self.mesh.uvs[cursor] = uv;
                    cursor += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branch::BoltPoint;
    use crate::frame::Frame;

    fn straight_branch(point_count: usize, width: f32, intensity: f32) -> BoltBranch {
        let frame = Frame::from_forward(Vec3::NEG_Y);
        BoltBranch {
            creation_generation: 0,
            spawn_point_index: 0,
            intensity,
            width,
            points: (0..point_count)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let y = -(i as f32);
                    BoltPoint::new(Vec3::new(0.0, y, 0.0), frame, true)
                })
                .collect(),
        }
    }

    fn builder(resolution: usize) -> TubeMeshBuilder {
        TubeMeshBuilder::new(MeshConfig {
            segment_resolution: resolution,
            segment_radius: 0.5,
        })
        .unwrap()
    }

    #[test]
    fn test_capacity_accounting() {
        // One branch, 5 points, resolution 6: 30 vertices and
        // 2 * 6 * 4 = 48 triangles (144 index entries).
        let mut builder = builder(6);
        let mesh = builder.build(&[straight_branch(5, 1.0, 1.0)]);

        assert_eq!(mesh.vertex_count(), 30);
        assert_eq!(mesh.triangle_count(), 48);
        assert_eq!(mesh.indices.len(), 144);
    }

    #[test]
    fn test_multi_branch_offsets() {
        let mut builder = builder(4);
        let branches = [straight_branch(3, 1.0, 1.0), straight_branch(2, 0.5, 0.5)];
        let mesh = builder.build(&branches);

        assert_eq!(mesh.vertex_count(), (3 + 2) * 4);
        // Segments: 2 + 1, two triangles per ring vertex per segment.
        assert_eq!(mesh.triangle_count(), 2 * 4 * 3);

        // The second branch's triangles must only reference its own rings.
        let second_base = 3 * 4;
        let second_branch_indices =
            &mesh.indices[2 * 4 * 2 * 3..];
        assert!(
            second_branch_indices
                .iter()
                .all(|&i| i as usize >= second_base)
        );
    }

    #[test]
    fn test_ring_closure_is_exact() {
        let mut builder = builder(6);
        let mesh = builder.build(&[straight_branch(5, 1.0, 1.0)]);

        for point in 0..5 {
            let first = mesh.positions[point * 6];
            let last = mesh.positions[point * 6 + 5];
            assert_eq!(first, last);
        }
    }

    #[test]
    fn test_ring_radius_scales_with_branch_width() {
        let mut builder = builder(8);
        let mesh = builder.build(&[straight_branch(2, 0.5, 1.0)]);

        let center = Vec3::ZERO;
        for vertex in &mesh.positions[0..8] {
            let distance = (*vertex - center).length();
            assert!((distance - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_uv_carries_intensity() {
        let mut builder = builder(4);
        let branches = [straight_branch(2, 1.0, 1.0), straight_branch(2, 1.0, 0.25)];
        let mesh = builder.build(&branches);

        assert!(mesh.uvs[0..8].iter().all(|uv| (uv.x - 1.0).abs() < 1e-6));
        assert!(mesh.uvs[8..16].iter().all(|uv| (uv.x - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_buffers_reused_when_topology_is_stable() {
        let mut builder = builder(6);

        let first_ptr = {
            let mesh = builder.build(&[straight_branch(5, 1.0, 1.0)]);
            mesh.positions.as_ptr()
        };
        assert_eq!(builder.rebuild_count(), 1);

        // Same point count and resolution: in-place rewrite, same buffers.
        let second_ptr = {
            let mesh = builder.build(&[straight_branch(5, 0.7, 0.9)]);
            mesh.positions.as_ptr()
        };
        assert_eq!(builder.rebuild_count(), 1);
        assert_eq!(first_ptr, second_ptr);
    }

    #[test]
    fn test_point_count_change_forces_rebuild() {
        let mut builder = builder(6);
        builder.build(&[straight_branch(5, 1.0, 1.0)]);
        builder.build(&[straight_branch(6, 1.0, 1.0)]);
        assert_eq!(builder.rebuild_count(), 2);

        let mesh = builder.build(&[straight_branch(6, 1.0, 1.0)]);
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(builder.rebuild_count(), 2);
    }

    #[test]
    fn test_resolution_change_forces_rebuild() {
        let mut builder = builder(6);
        builder.build(&[straight_branch(5, 1.0, 1.0)]);
        builder.set_segment_resolution(8).unwrap();
        let mesh = builder.build(&[straight_branch(5, 1.0, 1.0)]);

        assert_eq!(mesh.vertex_count(), 40);
        assert_eq!(builder.rebuild_count(), 2);
    }

    #[test]
    fn test_release_forgets_cached_topology() {
        let mut builder = builder(6);
        builder.build(&[straight_branch(5, 1.0, 1.0)]);
        builder.release();

        let mesh = builder.build(&[straight_branch(5, 1.0, 1.0)]);
        assert_eq!(mesh.vertex_count(), 30);
        assert_eq!(builder.rebuild_count(), 2);
    }

    #[test]
    fn test_empty_branch_list_builds_empty_mesh() {
        let mut builder = builder(6);
        let mesh = builder.build(&[]);
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_degenerate_resolution_rejected() {
        let result = TubeMeshBuilder::new(MeshConfig {
            segment_resolution: 2,
            segment_radius: 0.5,
        });
        assert!(result.is_err());

        let mut builder = builder(6);
        assert!(builder.set_segment_resolution(1).is_err());
    }
}
