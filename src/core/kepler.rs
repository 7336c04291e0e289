//! Orbital position calculator.
//!
//! A simplified Keplerian model projected to 2D: the mean anomaly is
//! advanced linearly with time, Kepler's equation is solved for the
//! eccentric anomaly, and the in-plane position is rotated by the
//! ascending node with the cross-track axis foreshortened by the
//! inclination. Good enough for a schematic orrery, not for navigation.
//!
//! The function is total over its numeric domain: zero periods and zero
//! semi-major axes degenerate to fixed positions instead of dividing by
//! zero.

use std::f64::consts::TAU;

use super::body::OrbitalElements;

/// Newton iterations for Kepler's equation. Converges in a handful of
/// steps for the eccentricities the journal produces.
const KEPLER_ITERATIONS: usize = 8;

/// Eccentricity ceiling; journal data occasionally carries junk and the
/// solver requires e < 1.
const MAX_ECCENTRICITY: f64 = 0.99;

/// Compute a body's 2D offset from its parent (metres) at `elapsed_secs`
/// into the animation.
///
/// A period of zero freezes the body at its scanned mean anomaly; a zero
/// semi-major axis collapses it onto its parent.
pub fn orbital_offset(elements: &OrbitalElements, elapsed_secs: f64) -> (f64, f64) {
    if elements.semi_major_axis <= 0.0 {
        return (0.0, 0.0);
    }

    let mean_anomaly = if elements.period > 0.0 {
        elements.mean_anomaly + TAU * elapsed_secs / elements.period
    } else {
        elements.mean_anomaly
    };

    let e = elements.eccentricity.clamp(0.0, MAX_ECCENTRICITY);
    let ecc_anomaly = solve_kepler(mean_anomaly, e);

    let radius = elements.semi_major_axis * (1.0 - e * ecc_anomaly.cos());
    let true_anomaly = ((1.0 - e * e).sqrt() * ecc_anomaly.sin()).atan2(ecc_anomaly.cos() - e);

    let angle = true_anomaly + elements.ascending_node;
    let x = radius * angle.cos();
    let y = radius * angle.sin() * elements.inclination.cos();
    (x, y)
}

/// Solve Kepler's equation `M = E - e*sin(E)` for the eccentric anomaly
/// by Newton iteration, seeded with the mean anomaly.
fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc_anomaly = mean_anomaly;
    for _ in 0..KEPLER_ITERATIONS {
        let delta = ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly;
        ecc_anomaly -= delta / (1.0 - e * ecc_anomaly.cos());
    }
    ecc_anomaly
}
