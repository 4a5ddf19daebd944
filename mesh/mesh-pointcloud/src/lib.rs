//! Point clouds with per-point properties, normal estimation and
//! consistent normal orientation.
//!
//! - [`PointCloud`] - Positions plus named, typed per-point properties
//! - [`NeighborIndex`] - k-nearest-neighbour queries backed by a k-d tree
//! - [`estimate_normals`] - PCA plane fit per neighbourhood, with optional
//!   surface variation ("curvature")
//! - [`reorient_normals`] - Sign propagation over a minimum spanning forest
//!   of the neighbour graph
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with zero Bevy dependencies. All types are
//! designed for use in pure Rust computational pipelines.
//!
//! # Quick Start
//!
//! ```
//! use mesh_pointcloud::{PointCloud, estimate_normals, reorient_normals};
//! use nalgebra::Point3;
//!
//! // Points on a gently curved sheet
//! let positions: Vec<_> = (0..12)
//!     .flat_map(|i| (0..12).map(move |j| {
//!         let (x, y) = (f64::from(i) * 0.1, f64::from(j) * 0.1);
//!         Point3::new(x, y, 0.05 * (x * x + y * y))
//!     }))
//!     .collect();
//! let mut cloud = PointCloud::from_positions(&positions);
//!
//! estimate_normals(&mut cloud, 10, true).unwrap();
//! let stats = reorient_normals(&mut cloud, 10).unwrap();
//!
//! assert_eq!(stats.components, 1);
//! assert!(cloud.normals().unwrap().iter().all(|n| n.z > 0.0));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cloud;
mod error;
mod knn;
pub mod normals;

pub use cloud::{CURVATURE, NORMAL, PointCloud};
pub use error::{CloudError, CloudResult};
pub use knn::NeighborIndex;
pub use normals::{
    NormalEstimationParams, OrientationStats, estimate_normals, estimate_normals_with_params,
    reorient_normals,
};
