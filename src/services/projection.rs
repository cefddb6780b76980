/// ============================================================
///  Equal-area reprojection & footprint area measurement
///
///  Pipeline:
///   1. Parameterize an Albers equal-area conic per ring —
///      standard parallels at the ring's min/max latitude,
///      central meridian at its longitude midpoint
///   2. Degenerate cone (n ≈ 0, ring symmetric about the
///      equator) → Lambert cylindrical equal-area instead
///   3. Project vertices onto the plane
///   4. Shoelace formula for the planar polygon area
///
///  Per-ring parameterization keeps distortion negligible for
///  building-scale extents anywhere on the globe.
/// ============================================================

use crate::models::geo::Ring;
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;
/// Mean Earth radius (m), spherical model.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Cone constant below this is treated as cylindrical.
const MIN_CONE_CONSTANT: f64 = 1e-6;

enum Projection {
    /// Spherical Albers conic: n, C, central meridian (rad).
    Conic { n: f64, c: f64, lam0: f64 },
    /// Lambert cylindrical, standard parallel at the equator.
    Cylindrical { lam0: f64 },
}

impl Projection {
    /// Parameterizes the projection for one ring.
    fn for_ring(ring: &Ring) -> Self {
        let phi1 = ring.min_lat() * DEG;
        let phi2 = ring.max_lat() * DEG;
        let lam0 = ring.mid_lon() * DEG;

        // Snyder, Map Projections ch. 14 (spherical case)
        let n = (phi1.sin() + phi2.sin()) / 2.0;
        if n.abs() < MIN_CONE_CONSTANT {
            return Projection::Cylindrical { lam0 };
        }
        let c = phi1.cos().powi(2) + 2.0 * n * phi1.sin();
        Projection::Conic { n, c, lam0 }
    }

    /// Projects (lon, lat) in degrees to planar meters. Only relative
    /// positions matter for area, so no false origin is applied.
    fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg * DEG;
        let lam = lon_deg * DEG;
        match *self {
            Projection::Conic { n, c, lam0 } => {
                let rho = EARTH_RADIUS_M / n * (c - 2.0 * n * phi.sin()).max(0.0).sqrt();
                let theta = n * (lam - lam0);
                (rho * theta.sin(), -rho * theta.cos())
            }
            Projection::Cylindrical { lam0 } => {
                (EARTH_RADIUS_M * (lam - lam0), EARTH_RADIUS_M * phi.sin())
            }
        }
    }
}

/// Shoelace area of a planar ring (closing edge implied), absolute value.
fn planar_ring_area(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    (sum / 2.0).abs()
}

/// Results under this are projection noise from near-degenerate rings,
/// not roofs.
const MIN_FOOTPRINT_SQM: f64 = 1.0;

/// True ground area of a footprint ring, in square meters.
///
/// Returns `None` for degenerate geometry (collinear vertices, sub-m² area)
/// or a non-finite result; the caller treats that as "no footprint".
pub fn ring_ground_area_sqm(ring: &Ring) -> Option<f64> {
    let projection = Projection::for_ring(ring);
    let projected: Vec<(f64, f64)> = ring
        .vertices()
        .iter()
        .map(|&(lon, lat)| projection.project(lon, lat))
        .collect();
    let area = planar_ring_area(&projected);
    if !area.is_finite() || area < MIN_FOOTPRINT_SQM {
        return None;
    }
    Some(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Analytic area of a lat/lon-aligned spherical quadrangle.
    fn spherical_quad_area(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> f64 {
        EARTH_RADIUS_M.powi(2)
            * (lon2 - lon1).abs()
            * DEG
            * ((lat2 * DEG).sin() - (lat1 * DEG).sin()).abs()
    }

    fn quad(lat1: f64, lat2: f64, lon1: f64, lon2: f64) -> Ring {
        Ring::new(vec![
            (lon1, lat1),
            (lon2, lat1),
            (lon2, lat2),
            (lon1, lat2),
        ])
        .unwrap()
    }

    #[test]
    fn mid_latitude_quad_matches_analytic_area() {
        // ~111 m × ~79 m block near Turin
        let ring = quad(45.0, 45.001, 7.0, 7.001);
        let area = ring_ground_area_sqm(&ring).unwrap();
        let expected = spherical_quad_area(45.0, 45.001, 7.0, 7.001);
        let rel = (area - expected).abs() / expected;
        assert!(rel < 1e-3, "area {:.2} vs expected {:.2} (rel {:.2e})", area, expected, rel);
        // Sanity: order of magnitude of a city block
        assert!(area > 5_000.0 && area < 12_000.0, "got {}", area);
    }

    #[test]
    fn southern_hemisphere_quad() {
        let ring = quad(-33.9, -33.899, 151.2, 151.201);
        let area = ring_ground_area_sqm(&ring).unwrap();
        let expected = spherical_quad_area(-33.9, -33.899, 151.2, 151.201);
        assert!((area - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn equator_symmetric_ring_uses_cylindrical_fallback() {
        // min/max latitudes cancel, n = 0 — must not divide by the cone constant
        let ring = quad(-0.0005, 0.0005, 10.0, 10.001);
        let area = ring_ground_area_sqm(&ring).unwrap();
        let expected = spherical_quad_area(-0.0005, 0.0005, 10.0, 10.001);
        assert!((area - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn collinear_ring_has_no_area() {
        let ring = Ring::new(vec![(7.0, 45.0), (7.001, 45.001), (7.002, 45.002)]).unwrap();
        assert!(ring_ground_area_sqm(&ring).is_none());
    }

    #[test]
    fn vertex_order_does_not_change_magnitude() {
        let cw = Ring::new(vec![(7.0, 45.0), (7.0, 45.001), (7.001, 45.001), (7.001, 45.0)]).unwrap();
        let ccw = quad(45.0, 45.001, 7.0, 7.001);
        let a = ring_ground_area_sqm(&cw).unwrap();
        let b = ring_ground_area_sqm(&ccw).unwrap();
        assert!((a - b).abs() < 1e-6 * a);
    }
}
