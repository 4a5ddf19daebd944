//! Result type for sampling operations.

use mesh_pointcloud::PointCloud;

/// Result of surface sampling.
#[derive(Debug, Clone)]
pub struct SamplingResult {
    /// The sampled cloud: mesh vertices first, then generated points in
    /// triangle order.
    pub cloud: PointCloud,

    /// Number of points copied from mesh vertices.
    pub vertex_points: usize,

    /// Number of points generated on triangles.
    pub generated_points: usize,

    /// Number of fan triangles sampled from.
    pub triangle_count: usize,

    /// Total area of the sampled triangles.
    pub surface_area: f64,

    /// Points requested but not generated because the mesh has no area.
    pub shortfall: usize,
}

impl SamplingResult {
    /// Total number of points in the cloud.
    #[must_use]
    pub const fn total_points(&self) -> usize {
        self.vertex_points + self.generated_points
    }

    /// True if the mesh could not supply the requested number of points.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.shortfall > 0
    }
}

impl std::fmt::Display for SamplingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sampling: {} points ({} vertices + {} generated over {} triangles, area {:.4})",
            self.total_points(),
            self.vertex_points,
            self.generated_points,
            self.triangle_count,
            self.surface_area
        )?;
        if self.is_degenerate() {
            write!(f, ", {} short", self.shortfall)?;
        }
        Ok(())
    }
}
