//! Core geometry types for surface sampling and point cloud processing.
//!
//! This crate provides the foundational types shared by the sampling and
//! normal estimation crates:
//!
//! - [`VertexId`], [`HalfedgeId`], [`FaceId`], [`PointId`] - Element handles
//! - [`PropertyRegistry`] - Named, typed per-element property arrays
//! - [`SurfaceMesh`] - Polygonal half-edge mesh
//! - [`Triangle`] - A concrete triangle with vertex positions
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Python bindings
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**. Face winding is
//! **counter-clockwise (CCW) when viewed from outside**; normals point
//! outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use mesh_types::{SurfaceMesh, Point3, Vector3, VERTEX_NORMAL};
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0));
//! let f = mesh.add_triangle(a, b, c).unwrap();
//!
//! assert_eq!(mesh.n_faces(), 1);
//! assert!((mesh.compute_face_normal(f).unwrap().z - 1.0).abs() < 1e-12);
//!
//! let normals = mesh.update_vertex_normals().unwrap();
//! assert_eq!(
//!     mesh.vertex_properties().get::<Vector3<f64>>(VERTEX_NORMAL),
//!     Some(normals)
//! );
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod handle;
mod property;
mod surface_mesh;
mod triangle;

// Re-export core types
pub use error::{MeshError, MeshResult, PropertyError, PropertyResult};
pub use handle::{FaceId, HalfedgeId, Handle, PointId, VertexId};
pub use property::{Property, PropertyRegistry};
pub use surface_mesh::{FACE_NORMAL, SurfaceMesh, VERTEX_NORMAL, unit_cube};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
