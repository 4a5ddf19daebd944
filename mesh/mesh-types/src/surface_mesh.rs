//! Polygonal half-edge surface mesh.
//!
//! Faces are arbitrary simple polygons. Each face owns one half-edge per
//! side; half-edges of neighbouring faces sharing an edge are linked as
//! opposites. Boundary sides simply have no opposite.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};
use crate::handle::{FaceId, HalfedgeId, VertexId};
use crate::property::{Property, PropertyRegistry};
use crate::triangle::Triangle;

/// Name of the standard per-vertex normal property.
pub const VERTEX_NORMAL: &str = "v:normal";

/// Name of the standard per-face normal property.
pub const FACE_NORMAL: &str = "f:normal";

#[derive(Debug, Clone, Copy)]
struct HalfedgeConnectivity {
    to: VertexId,
    next: HalfedgeId,
    prev: HalfedgeId,
    face: FaceId,
    opposite: Option<HalfedgeId>,
}

/// A polygonal surface mesh with half-edge connectivity.
///
/// Vertices, half-edges and faces are addressed by handles
/// ([`VertexId`], [`HalfedgeId`], [`FaceId`]) and enumerated in insertion
/// order. Arbitrary per-vertex and per-face data can be attached through
/// the property registries.
///
/// # Example
///
/// ```
/// use mesh_types::{SurfaceMesh, Point3};
///
/// let mut mesh = SurfaceMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
/// let d = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// let quad = mesh.add_face(&[a, b, c, d]).unwrap();
///
/// assert_eq!(mesh.valence(quad), 4);
/// assert_eq!(mesh.fan_triangles(quad).count(), 2);
/// assert!((mesh.surface_area() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    name: String,
    positions: Vec<Point3<f64>>,
    vertex_halfedges: Vec<Option<HalfedgeId>>,
    halfedges: Vec<HalfedgeConnectivity>,
    face_halfedges: Vec<HalfedgeId>,
    edge_lookup: HashMap<(VertexId, VertexId), HalfedgeId>,
    vertex_props: PropertyRegistry<VertexId>,
    face_props: PropertyRegistry<FaceId>,
}

impl SurfaceMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from positions and polygons given as vertex indices.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`add_face`](Self::add_face).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{SurfaceMesh, Point3};
    ///
    /// let positions = [
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = SurfaceMesh::from_polygons(&positions, &[vec![0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.n_faces(), 1);
    /// ```
    pub fn from_polygons(positions: &[Point3<f64>], polygons: &[Vec<u32>]) -> MeshResult<Self> {
        let mut mesh = Self::new();
        for p in positions {
            mesh.add_vertex(*p);
        }
        for polygon in polygons {
            let vertices: Vec<VertexId> = polygon
                .iter()
                .map(|&i| VertexId::new(i as usize))
                .collect();
            mesh.add_face(&vertices)?;
        }
        Ok(mesh)
    }

    /// Name of the mesh (empty by default).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the mesh name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Add an isolated vertex.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let v = VertexId::new(self.positions.len());
        self.positions.push(position);
        self.vertex_halfedges.push(None);
        self.vertex_props.push();
        v
    }

    /// Add a polygonal face through the given vertices (CCW from outside).
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidFace`] for fewer than three or repeated vertices
    /// - [`MeshError::InvalidVertex`] for an unknown vertex handle
    /// - [`MeshError::ComplexEdge`] if a directed side already belongs to
    ///   another face
    pub fn add_face(&mut self, vertices: &[VertexId]) -> MeshResult<FaceId> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::InvalidFace {
                reason: format!("a face needs at least 3 vertices, got {n}"),
            });
        }

        for (i, &v) in vertices.iter().enumerate() {
            if v.idx() >= self.positions.len() {
                return Err(MeshError::InvalidVertex {
                    vertex: v,
                    vertex_count: self.positions.len(),
                });
            }
            if vertices[..i].contains(&v) {
                return Err(MeshError::InvalidFace {
                    reason: format!("vertex {v} appears more than once"),
                });
            }
        }

        for i in 0..n {
            let from = vertices[i];
            let to = vertices[(i + 1) % n];
            if self.edge_lookup.contains_key(&(from, to)) {
                return Err(MeshError::ComplexEdge { from, to });
            }
        }

        let face = FaceId::new(self.face_halfedges.len());
        let base = self.halfedges.len();

        for i in 0..n {
            let from = vertices[i];
            let to = vertices[(i + 1) % n];
            let h = HalfedgeId::new(base + i);

            let opposite = self.edge_lookup.get(&(to, from)).copied();
            if let Some(o) = opposite {
                self.halfedges[o.idx()].opposite = Some(h);
            }

            self.halfedges.push(HalfedgeConnectivity {
                to,
                next: HalfedgeId::new(base + (i + 1) % n),
                prev: HalfedgeId::new(base + (i + n - 1) % n),
                face,
                opposite,
            });
            self.edge_lookup.insert((from, to), h);

            let out = &mut self.vertex_halfedges[from.idx()];
            if out.is_none() {
                *out = Some(h);
            }
        }

        // The face half-edge points at the first vertex so that fans start there.
        self.face_halfedges.push(HalfedgeId::new(base + n - 1));
        self.face_props.push();
        Ok(face)
    }

    /// Add a triangle.
    ///
    /// # Errors
    ///
    /// See [`add_face`](Self::add_face).
    pub fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> MeshResult<FaceId> {
        self.add_face(&[a, b, c])
    }

    /// Add a quad.
    ///
    /// # Errors
    ///
    /// See [`add_face`](Self::add_face).
    pub fn add_quad(
        &mut self,
        a: VertexId,
        b: VertexId,
        c: VertexId,
        d: VertexId,
    ) -> MeshResult<FaceId> {
        self.add_face(&[a, b, c, d])
    }

    // -------------------------------------------------------------------
    // Counts and enumeration
    // -------------------------------------------------------------------

    /// Number of vertices.
    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn n_faces(&self) -> usize {
        self.face_halfedges.len()
    }

    /// Number of half-edges (one per face side).
    #[must_use]
    pub fn n_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// True if the mesh has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All vertex handles in insertion order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = VertexId> + use<> {
        (0..self.n_vertices()).map(VertexId::new)
    }

    /// All face handles in insertion order.
    pub fn faces(&self) -> impl ExactSizeIterator<Item = FaceId> + use<> {
        (0..self.n_faces()).map(FaceId::new)
    }

    // -------------------------------------------------------------------
    // Half-edge traversal
    // -------------------------------------------------------------------

    /// The half-edge of a face; its target is the face's first vertex.
    #[must_use]
    pub fn halfedge(&self, face: FaceId) -> HalfedgeId {
        self.face_halfedges[face.idx()]
    }

    /// One outgoing half-edge of a vertex, `None` if it is isolated.
    #[must_use]
    pub fn vertex_halfedge(&self, vertex: VertexId) -> Option<HalfedgeId> {
        self.vertex_halfedges[vertex.idx()]
    }

    /// Next half-edge around the same face.
    #[must_use]
    pub fn next_halfedge(&self, h: HalfedgeId) -> HalfedgeId {
        self.halfedges[h.idx()].next
    }

    /// Previous half-edge around the same face.
    #[must_use]
    pub fn prev_halfedge(&self, h: HalfedgeId) -> HalfedgeId {
        self.halfedges[h.idx()].prev
    }

    /// The oppositely oriented half-edge of the neighbouring face, if any.
    #[must_use]
    pub fn opposite_halfedge(&self, h: HalfedgeId) -> Option<HalfedgeId> {
        self.halfedges[h.idx()].opposite
    }

    /// Vertex the half-edge points to.
    #[must_use]
    pub fn to_vertex(&self, h: HalfedgeId) -> VertexId {
        self.halfedges[h.idx()].to
    }

    /// Vertex the half-edge emanates from.
    #[must_use]
    pub fn from_vertex(&self, h: HalfedgeId) -> VertexId {
        self.to_vertex(self.prev_halfedge(h))
    }

    /// Face the half-edge belongs to.
    #[must_use]
    pub fn face_of(&self, h: HalfedgeId) -> FaceId {
        self.halfedges[h.idx()].face
    }

    /// True if the half-edge has no opposite.
    #[must_use]
    pub fn is_boundary(&self, h: HalfedgeId) -> bool {
        self.opposite_halfedge(h).is_none()
    }

    /// Number of vertices of a face.
    #[must_use]
    pub fn valence(&self, face: FaceId) -> usize {
        self.halfedges_around_face(face).count()
    }

    /// Half-edges of a face, starting with [`halfedge`](Self::halfedge).
    pub fn halfedges_around_face(&self, face: FaceId) -> impl Iterator<Item = HalfedgeId> + '_ {
        let start = self.halfedge(face);
        std::iter::successors(Some(start), move |&h| {
            let next = self.next_halfedge(h);
            (next != start).then_some(next)
        })
    }

    /// Vertices of a face in winding order, starting with its first vertex.
    pub fn vertices_around_face(&self, face: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.halfedges_around_face(face)
            .map(move |h| self.to_vertex(h))
    }

    /// Outgoing half-edges of a vertex.
    ///
    /// Walks the one-ring through opposite links and, at a boundary,
    /// continues from the other side. Only the fan containing
    /// [`vertex_halfedge`](Self::vertex_halfedge) is visited at a
    /// non-manifold vertex.
    #[must_use]
    pub fn halfedges_around_vertex(&self, vertex: VertexId) -> Vec<HalfedgeId> {
        let Some(start) = self.vertex_halfedge(vertex) else {
            return Vec::new();
        };

        let mut result = vec![start];
        let mut h = start;
        loop {
            match self.opposite_halfedge(self.prev_halfedge(h)) {
                Some(o) if o == start => return result,
                Some(o) => {
                    result.push(o);
                    h = o;
                }
                None => break,
            }
        }

        // Hit a boundary: rotate the other way from the start.
        let mut h = start;
        while let Some(o) = self.opposite_halfedge(h) {
            h = self.next_halfedge(o);
            if h == start {
                break;
            }
            result.push(h);
        }
        result
    }

    /// Faces incident to a vertex.
    #[must_use]
    pub fn faces_around_vertex(&self, vertex: VertexId) -> Vec<FaceId> {
        self.halfedges_around_vertex(vertex)
            .into_iter()
            .map(|h| self.face_of(h))
            .collect()
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// Position of a vertex.
    #[must_use]
    pub fn position(&self, vertex: VertexId) -> Point3<f64> {
        self.positions[vertex.idx()]
    }

    /// Move a vertex.
    pub fn set_position(&mut self, vertex: VertexId, position: Point3<f64>) {
        self.positions[vertex.idx()] = position;
    }

    /// All vertex positions, indexed by vertex handle.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Unit normal of a face by Newell's method.
    ///
    /// For triangles this is the normalized cross product of two edges.
    /// Returns `None` for faces with zero area.
    #[must_use]
    pub fn compute_face_normal(&self, face: FaceId) -> Option<Vector3<f64>> {
        let mut n = Vector3::zeros();
        for h in self.halfedges_around_face(face) {
            let p = self.position(self.from_vertex(h)).coords;
            let q = self.position(self.to_vertex(h)).coords;
            n += p.cross(&q);
        }
        let len = n.norm();
        (len > f64::EPSILON).then(|| n / len)
    }

    /// Unit vertex normal, the angle-weighted average of incident face normals.
    ///
    /// Returns `None` for isolated vertices or if all incident faces are
    /// degenerate.
    #[must_use]
    pub fn compute_vertex_normal(&self, vertex: VertexId) -> Option<Vector3<f64>> {
        let p = self.position(vertex);
        let mut n = Vector3::zeros();

        for h in self.halfedges_around_vertex(vertex) {
            let Some(face_normal) = self.compute_face_normal(self.face_of(h)) else {
                continue;
            };
            let a = self.position(self.to_vertex(h)) - p;
            let b = self.position(self.from_vertex(self.prev_halfedge(h))) - p;
            let angle = a.cross(&b).norm().atan2(a.dot(&b));
            n += face_normal * angle;
        }

        let len = n.norm();
        (len > f64::EPSILON).then(|| n / len)
    }

    /// Compute all face normals into the [`FACE_NORMAL`] property.
    ///
    /// Degenerate faces get a zero vector.
    ///
    /// # Errors
    ///
    /// Fails if [`FACE_NORMAL`] exists with a type other than `Vector3<f64>`.
    pub fn update_face_normals(&mut self) -> MeshResult<Property<Vector3<f64>>> {
        let normals: Vec<Vector3<f64>> = self
            .faces()
            .map(|f| self.compute_face_normal(f).unwrap_or_else(Vector3::zeros))
            .collect();
        let prop = self
            .face_props
            .get_or_add(FACE_NORMAL, Vector3::<f64>::zeros())?;
        self.face_props.values_mut(prop).copy_from_slice(&normals);
        Ok(prop)
    }

    /// Compute all vertex normals into the [`VERTEX_NORMAL`] property.
    ///
    /// Isolated vertices get a zero vector.
    ///
    /// # Errors
    ///
    /// Fails if [`VERTEX_NORMAL`] exists with a type other than `Vector3<f64>`.
    pub fn update_vertex_normals(&mut self) -> MeshResult<Property<Vector3<f64>>> {
        let normals: Vec<Vector3<f64>> = self
            .vertices()
            .map(|v| self.compute_vertex_normal(v).unwrap_or_else(Vector3::zeros))
            .collect();
        let prop = self
            .vertex_props
            .get_or_add(VERTEX_NORMAL, Vector3::<f64>::zeros())?;
        self.vertex_props.values_mut(prop).copy_from_slice(&normals);
        Ok(prop)
    }

    /// Fan triangulation of a face as vertex triples.
    ///
    /// All `valence - 2` triangles share the face's first vertex.
    pub fn fan_triangles(&self, face: FaceId) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        let start = self.halfedge(face);
        let apex = self.to_vertex(start);
        let first = self.next_halfedge(self.next_halfedge(start));
        std::iter::successors(Some(first), move |&h| Some(self.next_halfedge(h)))
            .take_while(move |&h| h != start)
            .map(move |h| [apex, self.from_vertex(h), self.to_vertex(h)])
    }

    /// Resolve a vertex triple to a [`Triangle`].
    #[must_use]
    pub fn triangle(&self, [a, b, c]: [VertexId; 3]) -> Triangle {
        Triangle::new(self.position(a), self.position(b), self.position(c))
    }

    /// All fan triangles of the mesh in face-then-fan order, with their face.
    pub fn triangles(&self) -> impl Iterator<Item = (FaceId, Triangle)> + '_ {
        self.faces().flat_map(move |f| {
            self.fan_triangles(f)
                .map(move |tri| (f, self.triangle(tri)))
        })
    }

    /// Total surface area (sum of fan triangle areas).
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|(_, tri)| tri.area()).sum()
    }

    // -------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------

    /// Per-vertex properties.
    #[must_use]
    pub const fn vertex_properties(&self) -> &PropertyRegistry<VertexId> {
        &self.vertex_props
    }

    /// Mutable per-vertex properties.
    pub fn vertex_properties_mut(&mut self) -> &mut PropertyRegistry<VertexId> {
        &mut self.vertex_props
    }

    /// Per-face properties.
    #[must_use]
    pub const fn face_properties(&self) -> &PropertyRegistry<FaceId> {
        &self.face_props
    }

    /// Mutable per-face properties.
    pub fn face_properties_mut(&mut self) -> &mut PropertyRegistry<FaceId> {
        &mut self.face_props
    }
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1) made of six quads with
/// outward-facing normals.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.n_vertices(), 8);
/// assert_eq!(cube.n_faces(), 6);
/// assert_eq!(cube.triangles().count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> SurfaceMesh {
    let positions = [
        Point3::new(0.0, 0.0, 0.0), // 0
        Point3::new(1.0, 0.0, 0.0), // 1
        Point3::new(1.0, 1.0, 0.0), // 2
        Point3::new(0.0, 1.0, 0.0), // 3
        Point3::new(0.0, 0.0, 1.0), // 4
        Point3::new(1.0, 0.0, 1.0), // 5
        Point3::new(1.0, 1.0, 1.0), // 6
        Point3::new(0.0, 1.0, 1.0), // 7
    ];

    let quads: [[usize; 4]; 6] = [
        [0, 3, 2, 1], // bottom (z=0), -Z
        [4, 5, 6, 7], // top (z=1), +Z
        [0, 1, 5, 4], // front (y=0), -Y
        [3, 7, 6, 2], // back (y=1), +Y
        [0, 4, 7, 3], // left (x=0), -X
        [1, 2, 6, 5], // right (x=1), +X
    ];

    let mut mesh = SurfaceMesh::new();
    mesh.set_name("unit_cube");
    let v: Vec<VertexId> = positions.iter().map(|p| mesh.add_vertex(*p)).collect();
    for [a, b, c, d] in quads {
        // The quads above form a closed, consistently oriented surface.
        let added = mesh.add_quad(v[a], v[b], v[c], v[d]);
        debug_assert!(added.is_ok(), "unit cube quads are manifold");
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_triangle() -> SurfaceMesh {
        SurfaceMesh::from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[vec![0, 1, 2]],
        )
        .unwrap()
    }

    fn hexagon() -> SurfaceMesh {
        let positions: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / 6.0;
                Point3::new(t.cos(), t.sin(), 0.0)
            })
            .collect();
        SurfaceMesh::from_polygons(&positions, &[vec![0, 1, 2, 3, 4, 5]]).unwrap()
    }

    #[test]
    fn add_face_links_halfedges() {
        let mesh = single_triangle();
        let f = FaceId::new(0);
        assert_eq!(mesh.n_halfedges(), 3);

        let verts: Vec<_> = mesh.vertices_around_face(f).collect();
        assert_eq!(verts, vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)]);

        let h = mesh.halfedge(f);
        assert_eq!(mesh.to_vertex(h), VertexId::new(0));
        assert_eq!(mesh.from_vertex(h), VertexId::new(2));
        assert_eq!(mesh.next_halfedge(mesh.prev_halfedge(h)), h);
        assert!(mesh.is_boundary(h));
    }

    #[test]
    fn add_face_rejects_bad_input() {
        let mut mesh = single_triangle();
        let v = |i| VertexId::new(i);

        assert!(matches!(
            mesh.add_face(&[v(0), v(1)]),
            Err(MeshError::InvalidFace { .. })
        ));
        assert!(matches!(
            mesh.add_face(&[v(0), v(1), v(9)]),
            Err(MeshError::InvalidVertex { .. })
        ));
        assert!(matches!(
            mesh.add_face(&[v(0), v(1), v(0)]),
            Err(MeshError::InvalidFace { .. })
        ));

        // Same winding as the existing triangle reuses directed edge 0 -> 1.
        let d = mesh.add_vertex(Point3::new(1.0, -1.0, 0.0));
        assert!(matches!(
            mesh.add_face(&[v(0), v(1), d]),
            Err(MeshError::ComplexEdge { .. })
        ));
        // Opposite winding is fine.
        assert!(mesh.add_face(&[v(1), v(0), d]).is_ok());
    }

    #[test]
    fn shared_edge_sets_opposites() {
        let mut mesh = single_triangle();
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        let f1 = mesh.add_face(&[VertexId::new(1), d, VertexId::new(2)]).unwrap();

        let shared: Vec<_> = mesh
            .halfedges_around_face(f1)
            .filter(|&h| !mesh.is_boundary(h))
            .collect();
        assert_eq!(shared.len(), 1);
        let o = mesh.opposite_halfedge(shared[0]).unwrap();
        assert_eq!(mesh.face_of(o), FaceId::new(0));
        assert_eq!(mesh.to_vertex(o), mesh.from_vertex(shared[0]));
    }

    #[test]
    fn fan_triangulation_of_hexagon() {
        let mesh = hexagon();
        let fans: Vec<_> = mesh.fan_triangles(FaceId::new(0)).collect();
        assert_eq!(fans.len(), 4);
        for (i, tri) in fans.iter().enumerate() {
            assert_eq!(tri[0], VertexId::new(0));
            assert_eq!(tri[1], VertexId::new(i + 1));
            assert_eq!(tri[2], VertexId::new(i + 2));
        }

        // Regular hexagon with unit circumradius.
        let expected = 3.0 * 3.0_f64.sqrt() / 2.0;
        assert_relative_eq!(mesh.surface_area(), expected, epsilon = 1e-12);
    }

    #[test]
    fn face_normal_of_polygon() {
        let mesh = hexagon();
        let n = mesh.compute_face_normal(FaceId::new(0)).unwrap();
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_face_has_no_normal() {
        let mesh = SurfaceMesh::from_polygons(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            &[vec![0, 1, 2]],
        )
        .unwrap();
        assert!(mesh.compute_face_normal(FaceId::new(0)).is_none());
        assert!(mesh.compute_vertex_normal(VertexId::new(1)).is_none());
    }

    #[test]
    fn cube_topology() {
        let cube = unit_cube();
        assert_eq!(cube.n_vertices(), 8);
        assert_eq!(cube.n_faces(), 6);
        assert_eq!(cube.n_halfedges(), 24);
        for f in cube.faces() {
            assert_eq!(cube.valence(f), 4);
            for h in cube.halfedges_around_face(f) {
                assert!(!cube.is_boundary(h), "cube is closed");
            }
        }
        for v in cube.vertices() {
            assert_eq!(cube.faces_around_vertex(v).len(), 3);
        }
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn cube_face_normals_point_outward() {
        let cube = unit_cube();
        for f in cube.faces() {
            let n = cube.compute_face_normal(f).unwrap();
            let centroid: Vector3<f64> = cube
                .vertices_around_face(f)
                .map(|v| cube.position(v).coords)
                .sum::<Vector3<f64>>()
                / 4.0;
            let outward = centroid - Vector3::new(0.5, 0.5, 0.5);
            assert!(n.dot(&outward) > 0.0);
        }
    }

    #[test]
    fn cube_vertex_normals_are_corner_diagonals() {
        let cube = unit_cube();
        let center = Point3::new(0.5, 0.5, 0.5);
        for v in cube.vertices() {
            let n = cube.compute_vertex_normal(v).unwrap();
            let expected = (cube.position(v) - center).normalize();
            assert_relative_eq!(n, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn set_position_moves_geometry() {
        let mut cube = unit_cube();
        for i in 4..8 {
            let v = VertexId::new(i);
            let p = cube.position(v);
            cube.set_position(v, Point3::new(p.x, p.y, 2.0));
        }
        assert_relative_eq!(cube.position(VertexId::new(6)).z, 2.0);
        assert_relative_eq!(cube.surface_area(), 10.0, epsilon = 1e-12);

        // Side faces keep their normals, connectivity is untouched.
        let front = cube.compute_face_normal(FaceId::new(2)).unwrap();
        assert_relative_eq!(front, -Vector3::y(), epsilon = 1e-12);
        assert_eq!(cube.n_halfedges(), 24);
    }

    #[test]
    fn boundary_vertex_one_ring() {
        // Two triangles sharing the edge 1-2; vertex 1 is on the boundary.
        let mut mesh = single_triangle();
        let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_face(&[VertexId::new(1), d, VertexId::new(2)]).unwrap();

        assert_eq!(mesh.faces_around_vertex(VertexId::new(1)).len(), 2);
        assert_eq!(mesh.faces_around_vertex(VertexId::new(2)).len(), 2);
        assert_eq!(mesh.faces_around_vertex(VertexId::new(0)).len(), 1);
        assert_eq!(mesh.faces_around_vertex(d).len(), 1);

        let n = mesh.compute_vertex_normal(VertexId::new(1)).unwrap();
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn isolated_vertex_has_no_normal() {
        let mut mesh = SurfaceMesh::new();
        let v = mesh.add_vertex(Point3::origin());
        assert!(mesh.vertex_halfedge(v).is_none());
        assert!(mesh.compute_vertex_normal(v).is_none());
        assert!(mesh.faces_around_vertex(v).is_empty());
    }

    #[test]
    fn update_normals_fills_properties() {
        let mut cube = unit_cube();
        let fprop = cube.update_face_normals().unwrap();
        let vprop = cube.update_vertex_normals().unwrap();

        assert_eq!(cube.face_properties().values(fprop).len(), 6);
        assert_eq!(
            cube.vertex_properties().get::<Vector3<f64>>(VERTEX_NORMAL),
            Some(vprop)
        );
        let top = cube.face_properties().value(fprop, FaceId::new(1));
        assert_relative_eq!(top.z, 1.0, epsilon = 1e-12);

        // A second update reuses the same property.
        assert_eq!(cube.update_face_normals().unwrap(), fprop);
    }

    #[test]
    fn update_normals_rejects_mistyped_property() {
        let mut cube = unit_cube();
        cube.face_properties_mut().add(FACE_NORMAL, 0_u8).unwrap();
        assert!(matches!(
            cube.update_face_normals(),
            Err(MeshError::Property(_))
        ));
    }

    #[test]
    fn properties_track_element_count() {
        let mut mesh = SurfaceMesh::new();
        let weight = mesh.vertex_properties_mut().add("v:weight", 1.0_f64).unwrap();
        mesh.add_vertex(Point3::origin());
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertex_properties().values(weight), &[1.0, 1.0]);
    }
}
