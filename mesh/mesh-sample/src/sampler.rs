//! Surface sampling.

use mesh_pointcloud::PointCloud;
use mesh_types::{FACE_NORMAL, SurfaceMesh, Triangle, VERTEX_NORMAL};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::allocate::allocate_samples;
use crate::params::SamplingParams;
use crate::result::SamplingResult;

/// A fan triangle together with the normal of the face it came from.
struct SourceTriangle {
    triangle: Triangle,
    normal: Vector3<f64>,
}

/// Samples a mesh surface into a point cloud with normals.
///
/// Every mesh vertex is copied first, with its normal taken from the
/// [`VERTEX_NORMAL`] property or computed on the fly. If `target_count`
/// exceeds the vertex count, the remaining points are spread over the fan
/// triangles in proportion to their area (see [`allocate_samples`]) and
/// drawn uniformly inside each triangle. Generated points carry the normal
/// of their face, from [`FACE_NORMAL`] or computed on the fly.
///
/// The output always has `max(target_count, n_vertices)` points unless the
/// mesh has no surface area to sample, in which case only the vertices are
/// returned and [`SamplingResult::shortfall`] records the missing count.
///
/// # Example
///
/// ```
/// use mesh_sample::sample_surface;
/// use mesh_types::unit_cube;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let cube = unit_cube();
/// let mut rng = StdRng::seed_from_u64(7);
/// let result = sample_surface(&cube, 1008, &mut rng);
///
/// assert_eq!(result.cloud.len(), 1008);
/// assert_eq!(result.vertex_points, 8);
/// assert_eq!(result.generated_points, 1000);
/// assert_eq!(result.cloud.name(), "unit_cube_sampled");
/// ```
pub fn sample_surface<R: Rng + ?Sized>(
    mesh: &SurfaceMesh,
    target_count: usize,
    rng: &mut R,
) -> SamplingResult {
    sample(mesh, target_count, rng, false)
}

/// Samples a mesh surface with configurable parameters.
///
/// Uses a generator seeded from [`SamplingParams::seed`] when given, so two
/// runs with the same seed produce identical clouds. With
/// [`SamplingParams::parallel`], triangles are sampled on the rayon pool;
/// each triangle draws from its own generator seeded from the main one, so
/// seeded parallel runs are reproducible too.
///
/// # Example
///
/// ```
/// use mesh_sample::{SamplingParams, sample_surface_with_params};
/// use mesh_types::unit_cube;
///
/// let params = SamplingParams::reproducible(500, 42).with_parallel(true);
/// let a = sample_surface_with_params(&unit_cube(), &params);
/// let b = sample_surface_with_params(&unit_cube(), &params);
///
/// assert_eq!(a.cloud.len(), 500);
/// assert_eq!(a.cloud.positions(), b.cloud.positions());
/// ```
pub fn sample_surface_with_params(mesh: &SurfaceMesh, params: &SamplingParams) -> SamplingResult {
    let mut rng: Box<dyn RngCore> = if let Some(seed) = params.seed {
        Box::new(StdRng::seed_from_u64(seed))
    } else {
        Box::new(rand::thread_rng())
    };
    sample(mesh, params.target_count, rng.as_mut(), params.parallel)
}

fn sample<R: Rng + ?Sized>(
    mesh: &SurfaceMesh,
    target_count: usize,
    rng: &mut R,
    parallel: bool,
) -> SamplingResult {
    info!(
        vertices = mesh.n_vertices(),
        faces = mesh.n_faces(),
        target = target_count,
        "Sampling surface"
    );

    let (mut positions, mut normals) = vertex_samples(mesh);
    let vertex_points = positions.len();
    let needed = target_count.saturating_sub(vertex_points);

    if needed == 0 {
        debug!(vertex_points, "Mesh vertices already meet the target");
        return SamplingResult {
            cloud: build_cloud(mesh, positions, &normals),
            vertex_points,
            generated_points: 0,
            triangle_count: 0,
            surface_area: 0.0,
            shortfall: 0,
        };
    }

    let triangles = collect_triangles(mesh);
    let areas: Vec<f64> = triangles.iter().map(|t| t.triangle.area()).collect();
    let surface_area: f64 = areas.iter().sum();
    let counts = allocate_samples(&areas, needed);
    let generated_points: usize = counts.iter().sum();
    let shortfall = needed - generated_points;

    debug!(
        triangles = triangles.len(),
        surface_area, needed, "Allocated samples over fan triangles"
    );
    if shortfall > 0 {
        warn!(
            needed,
            triangles = triangles.len(),
            surface_area,
            "Mesh has no area to sample, returning vertices only"
        );
    }

    positions.reserve(generated_points);
    normals.reserve(generated_points);

    if parallel {
        let seeds: Vec<u64> = counts.iter().map(|_| rng.r#gen()).collect();
        let batches: Vec<Vec<Point3<f64>>> = triangles
            .par_iter()
            .zip(counts.par_iter())
            .zip(seeds.par_iter())
            .map(|((source, &count), &seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..count)
                    .map(|_| draw_point(&source.triangle, &mut rng))
                    .collect()
            })
            .collect();

        for (source, batch) in triangles.iter().zip(batches) {
            normals.extend(std::iter::repeat_n(source.normal, batch.len()));
            positions.extend(batch);
        }
    } else {
        for (source, &count) in triangles.iter().zip(&counts) {
            for _ in 0..count {
                positions.push(draw_point(&source.triangle, rng));
                normals.push(source.normal);
            }
        }
    }

    let cloud = build_cloud(mesh, positions, &normals);
    info!(points = cloud.len(), generated_points, "Surface sampling complete");

    SamplingResult {
        cloud,
        vertex_points,
        generated_points,
        triangle_count: triangles.len(),
        surface_area,
        shortfall,
    }
}

/// Positions and normals of all mesh vertices, in vertex order.
fn vertex_samples(mesh: &SurfaceMesh) -> (Vec<Point3<f64>>, Vec<Vector3<f64>>) {
    let props = mesh.vertex_properties();
    let normals = match props.get::<Vector3<f64>>(VERTEX_NORMAL) {
        Some(prop) => props.values(prop).to_vec(),
        None => mesh
            .vertices()
            .map(|v| mesh.compute_vertex_normal(v).unwrap_or_else(Vector3::zeros))
            .collect(),
    };
    (mesh.positions().to_vec(), normals)
}

/// Fan triangles of all faces in face-then-fan order.
fn collect_triangles(mesh: &SurfaceMesh) -> Vec<SourceTriangle> {
    let props = mesh.face_properties();
    let face_normals = props.get::<Vector3<f64>>(FACE_NORMAL);

    mesh.faces()
        .flat_map(move |f| {
            let normal = match face_normals {
                Some(prop) => *props.value(prop, f),
                None => mesh.compute_face_normal(f).unwrap_or_else(Vector3::zeros),
            };
            mesh.fan_triangles(f).map(move |tri| SourceTriangle {
                triangle: mesh.triangle(tri),
                normal,
            })
        })
        .collect()
}

/// A uniformly distributed point inside `triangle`.
fn draw_point<R: Rng + ?Sized>(triangle: &Triangle, rng: &mut R) -> Point3<f64> {
    let s = rng.r#gen::<f64>().sqrt();
    let t = rng.r#gen::<f64>();
    triangle.point_at([1.0 - s, s * (1.0 - t), s * t])
}

fn build_cloud(
    mesh: &SurfaceMesh,
    positions: Vec<Point3<f64>>,
    normals: &[Vector3<f64>],
) -> PointCloud {
    let mut cloud = PointCloud::from_positions_and_normals(positions, normals);
    cloud.set_name(format!("{}_sampled", mesh.name()));
    cloud
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{VertexId, unit_cube};

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn single_triangle() -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(2.0, 0.0, 0.5));
        let c = mesh.add_vertex(Point3::new(0.3, 1.5, -0.2));
        mesh.add_triangle(a, b, c).unwrap();
        mesh
    }

    #[test]
    fn test_cube_exact_count() {
        let cube = unit_cube();
        let result = sample_surface(&cube, 1008, &mut seeded(1));

        assert_eq!(result.cloud.len(), 1008);
        assert_eq!(result.total_points(), 1008);
        assert_eq!(result.vertex_points, 8);
        assert_eq!(result.generated_points, 1000);
        assert_eq!(result.triangle_count, 12);
        assert_relative_eq!(result.surface_area, 6.0, epsilon = 1e-12);
        assert!(!result.is_degenerate());
    }

    #[test]
    fn test_cube_points_spread_evenly_over_faces() {
        let cube = unit_cube();
        let result = sample_surface(&cube, 1008, &mut seeded(2));
        let normals = &result.cloud.normals().unwrap()[8..];

        let axes = [
            Vector3::x(),
            -Vector3::x(),
            Vector3::y(),
            -Vector3::y(),
            Vector3::z(),
            -Vector3::z(),
        ];
        for axis in axes {
            let on_face = normals.iter().filter(|n| n.dot(&axis) > 0.99).count();
            // Two triangles per face, 1000/12 samples each give or take one.
            assert!((165..=168).contains(&on_face), "{on_face} points on {axis:?} face");
        }
    }

    #[test]
    fn test_vertices_copied_first() {
        let cube = unit_cube();
        let result = sample_surface(&cube, 100, &mut seeded(3));
        assert_eq!(&result.cloud.positions()[..8], cube.positions());

        let normals = result.cloud.normals().unwrap();
        for v in cube.vertices() {
            assert_eq!(normals[v.idx()], cube.compute_vertex_normal(v).unwrap());
        }
    }

    #[test]
    fn test_target_below_vertex_count() {
        let cube = unit_cube();
        for target in [0, 5, 8] {
            let result = sample_surface(&cube, target, &mut seeded(4));
            assert_eq!(result.cloud.len(), 8);
            assert_eq!(result.generated_points, 0);
            assert_eq!(result.triangle_count, 0);
        }

        let result = sample_surface(&cube, 3, &mut seeded(4));
        let normals = result.cloud.normals().unwrap();
        let diagonal = Vector3::new(-1.0, -1.0, -1.0).normalize();
        assert_relative_eq!(normals[0], diagonal, epsilon = 1e-12);
    }

    #[test]
    fn test_stored_vertex_normals_are_copied() {
        let mut cube = unit_cube();
        let prop = cube
            .vertex_properties_mut()
            .add(VERTEX_NORMAL, Vector3::new(0.0, 0.0, 2.0))
            .unwrap();
        cube.vertex_properties_mut()
            .set(prop, VertexId::new(3), Vector3::new(1.0, 2.0, 3.0));

        let result = sample_surface(&cube, 8, &mut seeded(5));
        let normals = result.cloud.normals().unwrap();
        assert_eq!(normals[0], Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(normals[3], Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_generated_normals_equal_face_normal() {
        let mut cube = unit_cube();
        let prop = cube.update_face_normals().unwrap();
        // Distinctive stored values are used verbatim.
        let stored: Vec<Vector3<f64>> = cube
            .faces()
            .map(|f| Vector3::new(f.idx() as f64 + 0.125, 0.5, -0.25))
            .collect();
        cube.face_properties_mut()
            .values_mut(prop)
            .copy_from_slice(&stored);

        let result = sample_surface(&cube, 508, &mut seeded(6));
        for n in &result.cloud.normals().unwrap()[8..] {
            assert!(stored.contains(n), "normal {n:?} is not a stored face normal");
        }
    }

    #[test]
    fn test_points_inside_triangle() {
        let mesh = single_triangle();
        let tri = mesh.triangles().next().unwrap().1;
        let expected_normal = tri.normal().unwrap();
        let result = sample_surface(&mesh, 503, &mut seeded(7));

        assert_eq!(result.generated_points, 500);
        let normals = result.cloud.normals().unwrap();
        for (p, n) in result.cloud.positions().iter().zip(normals).skip(3) {
            let [a, b, c] = tri.barycentric(p).unwrap();
            assert!(a >= -1e-9 && b >= -1e-9 && c >= -1e-9);
            assert_relative_eq!(a + b + c, 1.0, epsilon = 1e-9);
            assert_eq!(*n, mesh.compute_face_normal(mesh.faces().next().unwrap()).unwrap());
            assert_relative_eq!(*n, expected_normal, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_polygon_faces_are_fanned() {
        let positions: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let a = f64::from(i) * std::f64::consts::FRAC_PI_3;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        let mesh = SurfaceMesh::from_polygons(&positions, &[vec![0, 1, 2, 3, 4, 5]]).unwrap();
        let result = sample_surface(&mesh, 1000, &mut seeded(8));

        assert_eq!(result.triangle_count, 4);
        assert_eq!(result.cloud.len(), 1000);
        for n in result.cloud.normals().unwrap() {
            assert_relative_eq!(*n, Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mesh_without_faces() {
        let mut mesh = SurfaceMesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        let result = sample_surface(&mesh, 10, &mut seeded(9));
        assert_eq!(result.cloud.len(), 2);
        assert_eq!(result.shortfall, 8);
        assert!(result.is_degenerate());
        assert_eq!(result.cloud.normals().unwrap(), &[Vector3::zeros(); 2]);
    }

    #[test]
    fn test_zero_area_mesh() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(2.0, 0.0, 0.0));
        mesh.add_triangle(a, b, c).unwrap();

        let result = sample_surface(&mesh, 10, &mut seeded(10));
        assert_eq!(result.cloud.len(), 3);
        assert_eq!(result.triangle_count, 1);
        assert_eq!(result.shortfall, 7);
    }

    #[test]
    fn test_empty_mesh() {
        let result = sample_surface(&SurfaceMesh::new(), 0, &mut seeded(11));
        assert!(result.cloud.is_empty());
        assert!(!result.is_degenerate());
    }

    #[test]
    fn test_output_name() {
        let mut mesh = single_triangle();
        mesh.set_name("bunny");
        let result = sample_surface(&mesh, 10, &mut seeded(12));
        assert_eq!(result.cloud.name(), "bunny_sampled");
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let cube = unit_cube();
        let params = SamplingParams::reproducible(2000, 99);
        let a = sample_surface_with_params(&cube, &params);
        let b = sample_surface_with_params(&cube, &params);
        assert_eq!(a.cloud.positions(), b.cloud.positions());

        let c = sample_surface_with_params(&cube, &params.clone().with_seed(100));
        assert_ne!(a.cloud.positions(), c.cloud.positions());
    }

    #[test]
    fn test_parallel_sampling() {
        let cube = unit_cube();
        let params = SamplingParams::reproducible(5008, 3).with_parallel(true);
        let a = sample_surface_with_params(&cube, &params);
        let b = sample_surface_with_params(&cube, &params);

        assert_eq!(a.cloud.len(), 5008);
        assert_eq!(a.generated_points, 5000);
        assert_eq!(a.cloud.positions(), b.cloud.positions());
        assert_eq!(a.cloud.normals(), b.cloud.normals());
    }

    #[test]
    fn test_unseeded_params() {
        let result = sample_surface_with_params(&unit_cube(), &SamplingParams::with_target_count(50));
        assert_eq!(result.cloud.len(), 50);
    }
}
