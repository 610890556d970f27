//! Large-world coordinates
//!
//! Positions in a planetary system span from meters to tens of AU, which is
//! more dynamic range than a bare f64 keeps useful precision for once values
//! are differenced. [`LargeWorldCoord`] splits each axis into an integer
//! segment count plus a local f64 offset, so nearby positions subtract
//! exactly and far-apart positions never lose their small components.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Length of one coordinate segment in meters (2^20).
///
/// Offsets are kept within half a segment, which bounds the local f64
/// magnitude and keeps offset granularity well below a micrometre.
pub const SEGMENT_LEN: f64 = 1_048_576.0;

/// Precision-preserving position at planetary-system scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LargeWorldCoord {
    /// Whole segments per axis
    pub seg: Vector3<i64>,
    /// Local offset within the segment, meters
    pub offs: Vector3<f64>,
}

impl LargeWorldCoord {
    /// Create from absolute meters; the result is normalized.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let mut coord = Self {
            seg: Vector3::zeros(),
            offs: Vector3::new(x, y, z),
        };
        coord.normalize();
        coord
    }

    pub fn origin() -> Self {
        Self {
            seg: Vector3::zeros(),
            offs: Vector3::zeros(),
        }
    }

    /// Absolute position in meters. Lossy at large distances from the
    /// origin; use [`LargeWorldCoord::vector_to`] for differences.
    pub fn global(&self) -> Vector3<f64> {
        self.seg.map(|s| s as f64) * SEGMENT_LEN + self.offs
    }

    /// Move whole segments out of the offset so |offs| stays within half a
    /// segment per axis.
    pub fn normalize(&mut self) {
        for i in 0..3 {
            let carry = (self.offs[i] / SEGMENT_LEN).round();
            if carry != 0.0 {
                self.seg[i] += carry as i64;
                self.offs[i] -= carry * SEGMENT_LEN;
            }
        }
    }

    /// Translate by a delta in meters, renormalizing afterwards.
    pub fn translate(&mut self, delta: Vector3<f64>) {
        self.offs += delta;
        self.normalize();
    }

    /// Vector from `self` to `other` in meters, formed segment-first so the
    /// difference of two far-out coordinates keeps full local precision.
    pub fn vector_to(&self, other: &LargeWorldCoord) -> Vector3<f64> {
        (other.seg - self.seg).map(|s| s as f64) * SEGMENT_LEN + (other.offs - self.offs)
    }
}

impl Default for LargeWorldCoord {
    fn default() -> Self {
        Self::origin()
    }
}
