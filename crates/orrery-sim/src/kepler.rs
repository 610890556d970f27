//! Two-body Kepler solutions
//!
//! Pure numeric functions shared by the element evaluator and the world
//! builder: mean motion, Newton-Raphson eccentric anomaly, orbital period.
//! Time and distance units must be compatible with the supplied GM; the
//! engine uses meters and seconds throughout.

use orrery_core::constants::GRAVITATIONAL_CONST;
use std::f64::consts::PI;

/// Convergence tolerance for the eccentric-anomaly iteration, radians.
/// Roughly 7 mm of position error at the distance of Pluto.
const ANOMALY_TOLERANCE: f64 = 1e-12;

/// Hard cap on Newton-Raphson iterations; past this the last estimate is
/// returned with a warning instead of looping further.
const MAX_ITERATIONS: u32 = 10;

/// Combined gravitational parameter G·(m0 + m1) for a two-body pair.
pub fn gm_combined(m0: f64, m1: f64) -> f64 {
    GRAVITATIONAL_CONST * (m0 + m1)
}

/// Mean motion n = sqrt(GM / a³) around a dominating body.
///
/// Requires GM > 0 and a > 0; both are validated when orbital elements are
/// constructed, not here.
pub fn mean_motion(gm: f64, a: f64) -> f64 {
    (gm / (a * a * a)).sqrt()
}

/// Mean motion from a known orbital period.
pub fn mean_motion_from_period(tau: f64) -> f64 {
    (2.0 * PI) / tau
}

/// Orbital period 2π·sqrt(a³ / GM) around a dominating body, seconds.
pub fn orbital_period(a: f64, gm: f64) -> f64 {
    2.0 * PI * ((a * a * a) / gm).sqrt()
}

/// One Newton-Raphson refinement of the eccentric anomaly estimate.
fn anomaly_step(e_i: f64, ecc: f64, m: f64) -> f64 {
    e_i - (e_i - ecc * e_i.sin() - m) / (1.0 - ecc * e_i.cos())
}

/// Eccentric anomaly at time `t`, with t = 0 at periapsis passage.
///
/// Solves Kepler's equation E - e·sin(E) = n·t by Newton-Raphson, seeded at
/// the mean anomaly. Non-convergence within the iteration cap is not fatal:
/// the last estimate is returned and the condition recorded, so callers get
/// degraded but usable accuracy.
pub fn eccentric_anomaly(ecc: f64, n: f64, t: f64) -> f64 {
    let mean_anomaly = n * t;

    let mut e_prev = mean_anomaly;
    let mut e_next = anomaly_step(e_prev, ecc, mean_anomaly);
    let mut iters = 0u32;

    while (e_next - e_prev).abs() > ANOMALY_TOLERANCE {
        e_prev = e_next;
        e_next = anomaly_step(e_prev, ecc, mean_anomaly);
        iters += 1;

        if iters > MAX_ITERATIONS {
            tracing::warn!(
                iters,
                residual = (e_next - e_prev).abs(),
                "eccentric anomaly did not converge"
            );
            break;
        }
    }

    tracing::trace!(iters, "eccentric anomaly solved");
    e_next
}
