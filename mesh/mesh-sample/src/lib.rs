//! Area-weighted surface sampling of polygon meshes.
//!
//! Converts a [`SurfaceMesh`](mesh_types::SurfaceMesh) into an oriented
//! [`PointCloud`](mesh_pointcloud::PointCloud): mesh vertices are kept, and
//! the remaining points are spread over the surface so that point density is
//! uniform per unit area.
//!
//! # Features
//!
//! - **Exact totals**: the output has exactly the requested number of points
//! - **Error diffusion**: per-triangle counts carry their rounding error
//!   forward instead of rounding each triangle independently
//! - **Flat normals**: generated points carry their face normal unchanged
//! - **Reproducible**: pass your own generator, or a seed via [`SamplingParams`]
//! - **Parallel**: optional per-triangle sampling on the rayon pool
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Example
//!
//! ```
//! use mesh_sample::{SamplingParams, sample_surface_with_params};
//! use mesh_types::unit_cube;
//!
//! let cube = unit_cube();
//! let result = sample_surface_with_params(&cube, &SamplingParams::reproducible(1008, 1));
//! println!("{}", result);
//!
//! assert_eq!(result.cloud.len(), 1008);
//! assert!(result.cloud.has_normals());
//! ```
//!
//! # Algorithm
//!
//! 1. Copy every vertex with its vertex normal
//! 2. Fan-triangulate every face and measure each triangle's area
//! 3. Give each triangle `area * needed / total_area` samples, carrying the
//!    fractional remainders forward; the last triangle takes the rest
//! 4. Draw points uniformly inside each triangle with the square-root
//!    barycentric transform

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod allocate;
mod params;
mod result;
mod sampler;

pub use allocate::allocate_samples;
pub use params::SamplingParams;
pub use result::SamplingResult;
pub use sampler::{sample_surface, sample_surface_with_params};
