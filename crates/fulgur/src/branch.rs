//! Shape model: polyline points and forkable branches.

use glam::Vec3;

use crate::frame::Frame;

/// A single point on a bolt polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltPoint {
    /// Position in generator-local space.
    pub position: Vec3,
    /// Orientation of the mesh ring laid out around this point.
    pub frame: Frame,
    /// Whether midpoints inserted next to this point may still be displaced
    /// in later subdivision generations. A structural freeze flag, not a
    /// rendering property.
    pub supports_next_generations: bool,
}

impl BoltPoint {
    #[must_use]
    pub fn new(position: Vec3, frame: Frame, supports_next_generations: bool) -> Self {
        Self {
            position,
            frame,
            supports_next_generations,
        }
    }

    /// Re-aim this point's frame at its successor on the polyline.
    pub fn face(&mut self, target: Vec3) {
        self.frame = Frame::looking_at(self.position, target);
    }
}

/// One forkable lightning path: an ordered polyline plus fork metadata.
///
/// Insertion order is load-bearing: adjacency between consecutive points
/// defines both the subdivision pairs and the mesh segments. A branch with
/// N points always has exactly N - 1 segments.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltBranch {
    /// Generation at which this branch was spawned. 0 for the trunk.
    pub creation_generation: u32,
    /// Where this branch forked off its parent. Subdivision of this branch
    /// resumes here rather than at the start of the prefix shared with the
    /// parent.
    pub spawn_point_index: usize,
    /// Emission attenuation relative to the trunk, compounded per fork.
    pub intensity: f32,
    /// Tube width attenuation relative to the trunk, compounded per fork.
    pub width: f32,
    /// The polyline, in path order.
    pub points: Vec<BoltPoint>,
}

impl BoltBranch {
    /// The trunk spanning `origin` to `impact`, before any subdivision.
    #[must_use]
    pub fn trunk(origin: Vec3, impact: Vec3) -> Self {
        let frame = Frame::looking_at(origin, impact);
        Self {
            creation_generation: 0,
            spawn_point_index: 0,
            intensity: 1.0,
            width: 1.0,
            points: vec![
                BoltPoint::new(origin, frame, true),
                BoltPoint::new(impact, frame, true),
            ],
        }
    }

    /// Fork a child off this branch.
    ///
    /// The entire point list is value-copied so parent and child evolve
    /// independently afterwards. Intensity and width attenuate relative to
    /// this branch, compounding down the fork chain.
    #[must_use]
    pub fn fork(
        &self,
        generation: u32,
        spawn_point_index: usize,
        intensity_decay: f32,
        width_decay: f32,
    ) -> Self {
        Self {
            creation_generation: generation,
            spawn_point_index,
            intensity: self.intensity * intensity_decay,
            width: self.width * width_decay,
            points: self.points.clone(),
        }
    }

    /// Number of segments connecting adjacent points.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}
