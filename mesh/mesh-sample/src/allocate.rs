//! Distribution of sample counts over triangles.

/// Splits `needed` samples over triangles in proportion to their areas.
///
/// Each triangle's ideal share `area * needed / total_area` is truncated and
/// its fractional part is added to an error term shared by all triangles.
/// Whenever that term exceeds one, the current triangle receives an extra
/// sample. The last triangle takes whatever remains, so the counts always
/// sum to exactly `needed`.
///
/// Returns all zeros when there is nothing to distribute over: no triangles,
/// or a total area that is zero or not finite.
///
/// # Example
///
/// ```
/// use mesh_sample::allocate_samples;
///
/// let counts = allocate_samples(&[1.0, 1.0, 1.0], 10);
/// assert_eq!(counts, vec![3, 3, 4]);
/// assert_eq!(counts.iter().sum::<usize>(), 10);
/// ```
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn allocate_samples(areas: &[f64], needed: usize) -> Vec<usize> {
    let mut counts = vec![0; areas.len()];
    let total: f64 = areas.iter().sum();
    if areas.is_empty() || !total.is_finite() || total <= 0.0 {
        return counts;
    }

    let density = needed as f64 / total;
    let last = areas.len() - 1;
    let mut error = 0.0;
    let mut generated = 0;

    for (i, (&area, count)) in areas.iter().zip(&mut counts).enumerate() {
        if i == last {
            *count = needed.saturating_sub(generated);
            break;
        }

        let ideal = area * density;
        let mut quantized = ideal as usize;
        error += ideal - quantized as f64;
        if error > 1.0 {
            error -= 1.0;
            quantized += 1;
        }

        *count = quantized;
        generated += quantized;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_exact() {
        let areas = [0.3, 1.7, 0.01, 2.2, 0.9];
        for needed in [0, 1, 7, 100, 12_345] {
            let counts = allocate_samples(&areas, needed);
            assert_eq!(counts.iter().sum::<usize>(), needed);
        }
    }

    #[test]
    fn test_equal_areas() {
        let counts = allocate_samples(&[0.5; 12], 1000);
        assert_eq!(counts.iter().sum::<usize>(), 1000);
        for c in counts {
            assert!((83..=84).contains(&c), "count {c} far from 1000/12");
        }
    }

    #[test]
    fn test_error_carries_to_later_triangles() {
        // Ideal share 0.6 each: the carry lands on the second triangle.
        let counts = allocate_samples(&[1.0; 5], 3);
        assert_eq!(counts, vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn test_proportional_to_area() {
        let counts = allocate_samples(&[1.0, 3.0], 400);
        assert_eq!(counts, vec![100, 300]);
    }

    #[test]
    fn test_last_triangle_takes_remainder() {
        let counts = allocate_samples(&[10.0, 0.0], 5);
        assert_eq!(counts, vec![5, 0]);

        let counts = allocate_samples(&[0.0, 10.0], 5);
        assert_eq!(counts, vec![0, 5]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(allocate_samples(&[], 10).is_empty());
        assert_eq!(allocate_samples(&[0.0, 0.0], 10), vec![0, 0]);
        assert_eq!(allocate_samples(&[f64::NAN, 1.0], 10), vec![0, 0]);
    }

    #[test]
    fn test_single_triangle() {
        assert_eq!(allocate_samples(&[0.25], 17), vec![17]);
    }
}
