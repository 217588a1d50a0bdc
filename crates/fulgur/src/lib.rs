//! Procedural lightning bolt geometry.
//!
//! Generates a branching bolt shape between two anchor points through
//! stochastic generational midpoint subdivision, then triangulates it into
//! a renderable tube mesh with amortized buffer reuse. The host calls once
//! per simulation tick and submits the resulting mesh to whatever render
//! pipeline it owns.
//!
//! # Design principles
//!
//! - **Deterministic**: all shape randomness comes from an explicitly
//!   seeded RNG that is reset per call; the same seed and the same tick
//!   timings reproduce the same bolt exactly.
//! - **Synchronous**: no async, no threading primitives; the caller
//!   controls scheduling and serializes access to each builder.
//! - **Allocation-conscious**: mesh buffers are sized exactly once per
//!   topology change and rewritten in place otherwise.
//!
//! # Example
//!
//! ```
//! use fulgur::{BoltEmitter, MeshConfig, ShapeConfig};
//! use glam::Vec3;
//!
//! let mut emitter = BoltEmitter::new(ShapeConfig::default(), MeshConfig::default(), 7)?;
//! emitter.set_origin(Some(Vec3::ZERO));
//! emitter.set_impact(Some(Vec3::new(0.0, -10.0, 0.0)));
//!
//! let mesh = emitter.update(1.0 / 60.0).expect("both anchors are set");
//! assert_eq!(mesh.positions.len(), mesh.uvs.len());
//! # Ok::<(), fulgur::ConfigError>(())
//! ```

mod branch;
mod config;
mod emitter;
mod error;
mod flicker;
mod frame;
mod mesh;
mod shape;

pub use branch::{BoltBranch, BoltPoint};
pub use config::{MeshConfig, ShapeConfig};
pub use emitter::BoltEmitter;
pub use error::{ConfigError, ConfigResult};
pub use frame::Frame;
pub use mesh::{TubeMesh, TubeMeshBuilder};
pub use shape::ShapeGenerator;
