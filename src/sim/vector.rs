//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam already covers add/sub/scale/dot/length. The collision solver also
//! needs a normalize that reports degenerate input instead of producing NaN,
//! and a 90° rotation for the tangent basis.

use glam::Vec2;

use crate::error::{PhysicsError, Result};

pub trait VectorExt {
    /// Unit vector in the same direction, or `DegenerateVector` for zero length
    fn unit(self) -> Result<Vec2>;

    /// Rotate counter-clockwise by 90°: (x, y) -> (-y, x)
    fn rotate_90(self) -> Vec2;

    /// Both components finite
    fn is_finite_vec(self) -> bool;
}

impl VectorExt for Vec2 {
    #[inline]
    fn unit(self) -> Result<Vec2> {
        self.try_normalize().ok_or(PhysicsError::DegenerateVector)
    }

    #[inline]
    fn rotate_90(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    #[inline]
    fn is_finite_vec(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
