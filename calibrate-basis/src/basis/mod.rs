//! Oblique basis computation from four picked model points.
//!
//! The first point becomes the origin. The second fixes `basis1`, the third
//! fixes the plane and an in-plane `basis2` orthogonal to `basis1`, and the
//! fourth sets the signed height of `basis3` along that plane's normal.
//!
//! ```text
//!            P3
//!            |  basis3 (plane normal * signed height)
//!            |
//!   P2       |
//!   | basis2 |
//!   |        |
//!   P0 ------+------> P1
//!        basis1
//! ```

/// Triple product, coplanarity test, line projection and planes.
pub mod geometry;

/// The four-point basis solver and its output record.
pub mod solver;

pub use geometry::{are_coplanar, triple_product};
pub use solver::{Basis, BasisRecord, solve_basis};
