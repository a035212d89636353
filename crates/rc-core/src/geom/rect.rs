//! Rectangles, sizes and transfer points
//!
//! Rectangles are half-open on the integer grid: a room at `x` with width
//! `w` covers columns `x..x + w`. Two rooms that merely share an edge do not
//! overlap, which is what lets a room be placed flush against the side of
//! the one before it.

use serde::{Deserialize, Serialize};

use super::Dir;
use crate::error::GeomError;
use crate::queue::Id;

/// A grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Both dimensions strictly positive
    pub const fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Orient a tunnel-style size for travel in `dir`.
    ///
    /// `width` is the breadth across the travel direction and `height` the
    /// length along it, so horizontal travel swaps the two.
    pub const fn along(self, dir: Dir) -> Size {
        if dir.is_vertical() {
            self
        } else {
            Size::new(self.height, self.width)
        }
    }
}

/// Axis-aligned rectangle with non-negative size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRect")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Deserialize)]
struct RawRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl TryFrom<RawRect> for Rect {
    type Error = GeomError;

    fn try_from(raw: RawRect) -> Result<Self, Self::Error> {
        Rect::try_new(raw.x, raw.y, raw.width, raw.height)
    }
}

/// Nearest edge of a rectangle to some point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSide {
    /// The edge as a zero-thickness rectangle
    pub side: Rect,
    /// Which side of the rectangle the edge is
    pub dir: Dir,
    /// The point projected onto the edge
    pub point: Point,
    /// Euclidean distance from the point to `point`
    pub distance: f64,
}

impl Rect {
    /// Create a new rectangle.
    ///
    /// Panics on a negative size; use [`Rect::try_new`] for untrusted input.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        match Self::try_new(x, y, width, height) {
            Ok(rect) => rect,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a new rectangle, rejecting a negative size
    pub fn try_new(x: i32, y: i32, width: i32, height: i32) -> Result<Self, GeomError> {
        if width < 0 || height < 0 {
            return Err(GeomError::NegativeSize { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Rectangle of `size` with its top-left corner at `at`
    pub fn at(at: Point, size: Size) -> Self {
        Self::new(at.x, at.y, size.width, size.height)
    }

    /// Exclusive right edge
    pub const fn x2(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub const fn y2(&self) -> i32 {
        self.y + self.height
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Middle point, rounded toward the top-left
    pub const fn middle(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// The edge on side `dir` as a zero-thickness rectangle
    pub const fn side(&self, dir: Dir) -> Rect {
        match dir {
            Dir::North => Rect {
                x: self.x,
                y: self.y,
                width: self.width,
                height: 0,
            },
            Dir::South => Rect {
                x: self.x,
                y: self.y2(),
                width: self.width,
                height: 0,
            },
            Dir::West => Rect {
                x: self.x,
                y: self.y,
                width: 0,
                height: self.height,
            },
            Dir::East => Rect {
                x: self.x2(),
                y: self.y,
                width: 0,
                height: self.height,
            },
        }
    }

    /// Corner where the `horizontal` (east/west) and `vertical` (north/south)
    /// sides meet
    pub fn corner(&self, horizontal: Dir, vertical: Dir) -> Point {
        assert!(
            !horizontal.is_vertical() && vertical.is_vertical(),
            "corner needs an east/west and a north/south side, got {horizontal} and {vertical}"
        );
        let x = if horizontal == Dir::East { self.x2() } else { self.x };
        let y = if vertical == Dir::South { self.y2() } else { self.y };
        Point::new(x, y)
    }

    /// Move the rectangle so its `dir` side lies on `coord`.
    ///
    /// `coord` is a y value for north/south and an x value for east/west.
    pub const fn set_pos_to_side(self, dir: Dir, coord: i32) -> Rect {
        let mut rect = self;
        match dir {
            Dir::North => rect.y = coord,
            Dir::South => rect.y = coord - rect.height,
            Dir::West => rect.x = coord,
            Dir::East => rect.x = coord - rect.width,
        }
        rect
    }

    /// Strict overlap of the half-open areas; shared edges do not count
    pub const fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x2() && self.x2() > other.x && self.y < other.y2() && self.y2() > other.y
    }

    /// `other` lies entirely within this rectangle
    pub const fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x && other.x2() <= self.x2() && other.y >= self.y && other.y2() <= self.y2()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.x2().max(other.x2()) - x,
            self.y2().max(other.y2()) - y,
        )
    }

    /// Nearest side to `point`; ties go to the first side in clockwise order
    /// from north
    pub fn closest_side(&self, point: Point) -> ClosestSide {
        let mut best: Option<ClosestSide> = None;
        for dir in Dir::all() {
            let side = self.side(dir);
            let projected = Point::new(
                point.x.clamp(side.x, side.x2()),
                point.y.clamp(side.y, side.y2()),
            );
            let dx = (point.x - projected.x) as f64;
            let dy = (point.y - projected.y) as f64;
            let distance = dx.hypot(dy);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(ClosestSide {
                    side,
                    dir,
                    point: projected,
                    distance,
                });
            }
        }
        // Dir::all() is never empty
        best.unwrap_or_else(|| unreachable!())
    }

    /// Rectangle of `size` whose entrance edge touches `tpr` and is centred on
    /// it, extending away from the point in the direction of travel.
    ///
    /// For northward travel the rectangle's south edge sits on the point, for
    /// southward travel its north edge, and likewise east/west.
    pub fn centered(size: Size, tpr: &Tpr) -> Rect {
        let rect = Rect::new(
            tpr.x - size.width / 2,
            tpr.y - size.height / 2,
            size.width,
            size.height,
        );
        let entrance = tpr.dir.flip();
        let coord = if tpr.dir.is_vertical() { tpr.y } else { tpr.x };
        rect.set_pos_to_side(entrance, coord)
    }
}

/// Transfer point: where a placed segment connects onward to another id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tpr {
    pub x: i32,
    pub y: i32,
    /// Direction of travel through the point
    pub dir: Dir,
    /// The id on the other side of the point, if any
    #[serde(default)]
    pub dest: Option<Id>,
}

impl Tpr {
    pub const fn new(at: Point, dir: Dir, dest: Option<Id>) -> Self {
        Self {
            x: at.x,
            y: at.y,
            dir,
            dest,
        }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Transfer point on the middle of `rect`'s `dir` side, leading out that way
    pub const fn leaving(rect: &Rect, dir: Dir, dest: Option<Id>) -> Self {
        Self::new(rect.side(dir).middle(), dir, dest)
    }
}

impl Default for Tpr {
    /// The origin, travelling north
    fn default() -> Self {
        Self::new(Point::default(), Dir::North, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rejects_negative_size() {
        assert_eq!(
            Rect::try_new(0, 0, -1, 3),
            Err(GeomError::NegativeSize {
                width: -1,
                height: 3
            })
        );
        assert!(Rect::try_new(0, 0, 0, 0).is_ok());
    }

    #[test]
    #[should_panic]
    fn test_rect_new_panics_on_negative_size() {
        Rect::new(0, 0, 2, -2);
    }

    #[test]
    fn test_rect_deserialize_checks_size() {
        let ok: Rect = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(ok, Rect::new(1, 2, 3, 4));
        let bad = serde_json::from_str::<Rect>(r#"{"x":1,"y":2,"width":-3,"height":4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_middle_and_sides() {
        let r = Rect::new(10, 20, 6, 4);
        assert_eq!(r.middle(), Point::new(13, 22));
        assert_eq!(r.side(Dir::North), Rect::new(10, 20, 6, 0));
        assert_eq!(r.side(Dir::South), Rect::new(10, 24, 6, 0));
        assert_eq!(r.side(Dir::West), Rect::new(10, 20, 0, 4));
        assert_eq!(r.side(Dir::East), Rect::new(16, 20, 0, 4));
    }

    #[test]
    fn test_corner() {
        let r = Rect::new(0, 0, 5, 3);
        assert_eq!(r.corner(Dir::West, Dir::North), Point::new(0, 0));
        assert_eq!(r.corner(Dir::East, Dir::South), Point::new(5, 3));
        assert_eq!(r.corner(Dir::East, Dir::North), Point::new(5, 0));
    }

    #[test]
    #[should_panic]
    fn test_corner_rejects_two_vertical_sides() {
        Rect::new(0, 0, 5, 3).corner(Dir::North, Dir::South);
    }

    #[test]
    fn test_set_pos_to_side() {
        let r = Rect::new(0, 0, 4, 2);
        assert_eq!(r.set_pos_to_side(Dir::North, 7), Rect::new(0, 7, 4, 2));
        assert_eq!(r.set_pos_to_side(Dir::South, 7), Rect::new(0, 5, 4, 2));
        assert_eq!(r.set_pos_to_side(Dir::West, -3), Rect::new(-3, 0, 4, 2));
        assert_eq!(r.set_pos_to_side(Dir::East, -3), Rect::new(-7, 0, 4, 2));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        let touching = Rect::new(10, 0, 5, 5);
        let far = Rect::new(20, 20, 1, 1);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&touching));
        assert!(!a.overlaps(&far));
        // edges have no area
        assert!(!a.overlaps(&a.side(Dir::East)));
    }

    #[test]
    fn test_contains_and_union() {
        let outer = Rect::new(0, 0, 20, 20);
        let inner = Rect::new(5, 5, 10, 10);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(
            Rect::new(0, 0, 2, 2).union(&Rect::new(5, -3, 1, 1)),
            Rect::new(0, -3, 6, 5)
        );
    }

    #[test]
    fn test_closest_side() {
        let r = Rect::new(0, 0, 10, 4);

        let above = r.closest_side(Point::new(3, -5));
        assert_eq!(above.dir, Dir::North);
        assert_eq!(above.point, Point::new(3, 0));
        assert_eq!(above.distance, 5.0);

        let right = r.closest_side(Point::new(12, 2));
        assert_eq!(right.dir, Dir::East);
        assert_eq!(right.point, Point::new(10, 2));

        let inside = r.closest_side(Point::new(5, 3));
        assert_eq!(inside.dir, Dir::South);
        assert_eq!(inside.distance, 1.0);

        // a corner is equally close to north and west; north wins
        assert_eq!(r.closest_side(Point::new(0, 0)).dir, Dir::North);
    }

    #[test]
    fn test_centered_extends_in_travel_direction() {
        let size = Size::new(4, 2);
        let at = |dir| Tpr::new(Point::new(0, 0), dir, None);

        assert_eq!(Rect::centered(size, &at(Dir::North)), Rect::new(-2, -2, 4, 2));
        assert_eq!(Rect::centered(size, &at(Dir::South)), Rect::new(-2, 0, 4, 2));
        assert_eq!(Rect::centered(size, &at(Dir::East)), Rect::new(0, -1, 4, 2));
        assert_eq!(Rect::centered(size, &at(Dir::West)), Rect::new(-4, -1, 4, 2));
    }

    #[test]
    fn test_centered_room_touches_previous_without_overlap() {
        let first = Rect::new(0, 0, 4, 4);
        for dir in Dir::all() {
            let exit = Tpr::leaving(&first, dir, Some(1));
            let next = Rect::centered(Size::new(4, 4), &exit);
            assert!(!first.overlaps(&next), "{dir}");
            assert_eq!(next.side(dir.flip()).middle(), exit.point());
        }
    }

    #[test]
    fn test_size_along() {
        let tunnel = Size::new(2, 5);
        assert_eq!(tunnel.along(Dir::North), Size::new(2, 5));
        assert_eq!(tunnel.along(Dir::East), Size::new(5, 2));
    }
}
