//! Point cloud data structure.

use mesh_types::{PointId, Property, PropertyRegistry};
use nalgebra::{Point3, Vector3};

use crate::error::CloudResult;

/// Name of the per-point normal property (`Vector3<f64>`).
pub const NORMAL: &str = "v:normal";

/// Name of the per-point curvature property (`f64`).
pub const CURVATURE: &str = "v:curvature";

/// An ordered collection of 3D points with named per-point properties.
///
/// Points are identified by [`PointId`] handles handed out in creation
/// order. Attributes such as normals or curvature live in a
/// [`PropertyRegistry`] and are grown automatically as points are added.
///
/// # Example
///
/// ```
/// use mesh_pointcloud::PointCloud;
/// use nalgebra::{Point3, Vector3};
///
/// let mut cloud = PointCloud::new();
/// let p = cloud
///     .add_point_with_normal(Point3::new(1.0, 2.0, 3.0), Vector3::z())
///     .unwrap();
///
/// assert_eq!(cloud.len(), 1);
/// assert_eq!(cloud.position(p), Point3::new(1.0, 2.0, 3.0));
/// assert_eq!(cloud.normals().unwrap()[p.idx()], Vector3::z());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    name: String,
    positions: Vec<Point3<f64>>,
    props: PropertyRegistry<PointId>,
}

impl PointCloud {
    /// Creates an empty point cloud.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty point cloud with room for `capacity` points.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Creates a point cloud from a slice of 3D positions.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_pointcloud::PointCloud;
    /// use nalgebra::Point3;
    ///
    /// let cloud = PointCloud::from_positions(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    /// ]);
    /// assert_eq!(cloud.len(), 2);
    /// ```
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        let mut props = PropertyRegistry::new();
        props.resize(positions.len());
        Self {
            name: String::new(),
            positions: positions.to_vec(),
            props,
        }
    }

    /// Creates a point cloud with one normal per position.
    ///
    /// Extra normals are ignored; missing ones are zero vectors.
    #[must_use]
    pub fn from_positions_and_normals(
        positions: Vec<Point3<f64>>,
        normals: &[Vector3<f64>],
    ) -> Self {
        let mut values = vec![Vector3::zeros(); positions.len()];
        for (slot, n) in values.iter_mut().zip(normals) {
            *slot = *n;
        }
        let (props, _) = PropertyRegistry::with_values(NORMAL, Vector3::zeros(), values);
        Self {
            name: String::new(),
            positions,
            props,
        }
    }

    /// Name of the cloud (empty by default).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the cloud name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the number of points in the cloud.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Adds a point and returns its handle.
    ///
    /// Every registered property receives its default value for the new point.
    pub fn add_point(&mut self, position: Point3<f64>) -> PointId {
        let id = PointId::new(self.positions.len());
        self.positions.push(position);
        self.props.push();
        id
    }

    /// Adds a point and sets its normal, creating the normal property if needed.
    ///
    /// # Errors
    ///
    /// Fails if [`NORMAL`] is registered with a type other than `Vector3<f64>`.
    pub fn add_point_with_normal(
        &mut self,
        position: Point3<f64>,
        normal: Vector3<f64>,
    ) -> CloudResult<PointId> {
        let normals = self.normal_property()?;
        let id = self.add_point(position);
        self.props.set(normals, id, normal);
        Ok(id)
    }

    /// Reserve room for `additional` more points.
    pub fn reserve(&mut self, additional: usize) {
        self.positions.reserve(additional);
    }

    /// All point handles in creation order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = PointId> + use<> {
        (0..self.len()).map(PointId::new)
    }

    /// Position of a point.
    #[must_use]
    pub fn position(&self, id: PointId) -> Point3<f64> {
        self.positions[id.idx()]
    }

    /// All positions, indexed by point handle.
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Mean of all positions, or `None` for an empty cloud.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.positions.iter().map(|p| p.coords).sum();
        Some(Point3::from(sum / self.len() as f64))
    }

    /// Per-point properties.
    #[must_use]
    pub const fn properties(&self) -> &PropertyRegistry<PointId> {
        &self.props
    }

    /// Mutable per-point properties.
    pub fn properties_mut(&mut self) -> &mut PropertyRegistry<PointId> {
        &mut self.props
    }

    /// The normal property, registered with zero vectors if absent.
    ///
    /// # Errors
    ///
    /// Fails if [`NORMAL`] is registered with a type other than `Vector3<f64>`.
    pub fn normal_property(&mut self) -> CloudResult<Property<Vector3<f64>>> {
        Ok(self.props.get_or_add(NORMAL, Vector3::zeros())?)
    }

    /// The curvature property, registered with zeros if absent.
    ///
    /// # Errors
    ///
    /// Fails if [`CURVATURE`] is registered with a type other than `f64`.
    pub fn curvature_property(&mut self) -> CloudResult<Property<f64>> {
        Ok(self.props.get_or_add(CURVATURE, 0.0)?)
    }

    /// Per-point normals, if the cloud has a normal property.
    #[must_use]
    pub fn normals(&self) -> Option<&[Vector3<f64>]> {
        self.props
            .get::<Vector3<f64>>(NORMAL)
            .map(|p| self.props.values(p))
    }

    /// Per-point curvature, if the cloud has a curvature property.
    #[must_use]
    pub fn curvatures(&self) -> Option<&[f64]> {
        self.props.get::<f64>(CURVATURE).map(|p| self.props.values(p))
    }

    /// Returns true if the cloud is non-empty and carries normals.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        !self.is_empty() && self.normals().is_some()
    }
}

impl FromIterator<Point3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        let positions: Vec<Point3<f64>> = iter.into_iter().collect();
        Self::from_positions(&positions)
    }
}
