//! Geometry
//!
//! Axis-aligned rectangles on an integer grid (y grows southward), the four
//! travel directions, and transfer points that join one placed segment to
//! the next.

mod dir;
mod rect;

pub use dir::Dir;
pub use rect::{ClosestSide, Point, Rect, Size, Tpr};
