//! The geometry operations decomposition relies on.
//!
//! Decomposition only ever asks four things of a shape: its bounding box,
//! its part inside a tile envelope, whether anything is left, and whether a
//! tile envelope lies completely inside it. [`TileGeometry`] captures those,
//! with implementations for the `geo` types.

use geo::{
    BooleanOps, BoundingRect, Contains, Geometry, GeometryCollection, Intersects, LineString,
    MultiLineString, MultiPoint, MultiPolygon, Polygon, Rect,
};

/// Shapes that can be split across quadtree tiles.
pub trait TileGeometry: Sized {
    /// Bounding box, `None` for an empty shape.
    fn query_envelope(&self) -> Option<Rect<f64>>;

    /// The part of this shape inside `envelope`, boundary included.
    fn intersect_envelope(&self, envelope: &Rect<f64>) -> Self;

    fn is_empty(&self) -> bool;

    /// True when `envelope` lies completely within this shape.
    fn envelope_within(&self, envelope: &Rect<f64>) -> bool;
}

fn clip_lines(lines: &MultiLineString<f64>, envelope: &Rect<f64>) -> MultiLineString<f64> {
    if lines.0.is_empty() {
        return MultiLineString::new(Vec::new());
    }
    envelope.to_polygon().clip(lines, false)
}

fn clip_polygons(polygons: &MultiPolygon<f64>, envelope: &Rect<f64>) -> MultiPolygon<f64> {
    if polygons.0.is_empty() {
        return MultiPolygon::new(Vec::new());
    }
    polygons.intersection(&MultiPolygon::new(vec![envelope.to_polygon()]))
}

fn clip_polygon(polygon: Polygon<f64>, envelope: &Rect<f64>) -> MultiPolygon<f64> {
    clip_polygons(&MultiPolygon::new(vec![polygon]), envelope)
}

impl TileGeometry for MultiPolygon<f64> {
    fn query_envelope(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn intersect_envelope(&self, envelope: &Rect<f64>) -> Self {
        clip_polygons(self, envelope)
    }

    fn is_empty(&self) -> bool {
        geo::HasDimensions::is_empty(self)
    }

    fn envelope_within(&self, envelope: &Rect<f64>) -> bool {
        !self.0.is_empty() && self.contains(&envelope.to_polygon())
    }
}

impl TileGeometry for MultiLineString<f64> {
    fn query_envelope(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn intersect_envelope(&self, envelope: &Rect<f64>) -> Self {
        clip_lines(self, envelope)
    }

    fn is_empty(&self) -> bool {
        geo::HasDimensions::is_empty(self)
    }

    fn envelope_within(&self, _envelope: &Rect<f64>) -> bool {
        false
    }
}

impl TileGeometry for MultiPoint<f64> {
    fn query_envelope(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn intersect_envelope(&self, envelope: &Rect<f64>) -> Self {
        self.iter()
            .filter(|point| point.intersects(envelope))
            .copied()
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn envelope_within(&self, _envelope: &Rect<f64>) -> bool {
        false
    }
}

impl TileGeometry for Geometry<f64> {
    fn query_envelope(&self) -> Option<Rect<f64>> {
        self.bounding_rect()
    }

    fn intersect_envelope(&self, envelope: &Rect<f64>) -> Self {
        match self {
            Geometry::Point(point) => {
                if point.intersects(envelope) {
                    Geometry::Point(*point)
                } else {
                    Geometry::MultiPoint(MultiPoint::new(Vec::new()))
                }
            }
            Geometry::MultiPoint(points) => Geometry::MultiPoint(points.intersect_envelope(envelope)),
            Geometry::Line(line) => {
                let lines = MultiLineString::new(vec![LineString::from(vec![line.start, line.end])]);
                Geometry::MultiLineString(clip_lines(&lines, envelope))
            }
            Geometry::LineString(line_string) => {
                let lines = MultiLineString::new(vec![line_string.clone()]);
                Geometry::MultiLineString(clip_lines(&lines, envelope))
            }
            Geometry::MultiLineString(lines) => {
                Geometry::MultiLineString(clip_lines(lines, envelope))
            }
            Geometry::Polygon(polygon) => {
                Geometry::MultiPolygon(clip_polygon(polygon.clone(), envelope))
            }
            Geometry::MultiPolygon(polygons) => {
                Geometry::MultiPolygon(polygons.intersect_envelope(envelope))
            }
            Geometry::Rect(rect) => {
                Geometry::MultiPolygon(clip_polygon(rect.to_polygon(), envelope))
            }
            Geometry::Triangle(triangle) => {
                Geometry::MultiPolygon(clip_polygon(triangle.to_polygon(), envelope))
            }
            Geometry::GeometryCollection(collection) => {
                let parts: Vec<Geometry<f64>> = collection
                    .iter()
                    .map(|part| part.intersect_envelope(envelope))
                    .filter(|part| !TileGeometry::is_empty(part))
                    .collect();
                Geometry::GeometryCollection(GeometryCollection::new_from(parts))
            }
        }
    }

    fn is_empty(&self) -> bool {
        geo::HasDimensions::is_empty(self)
    }

    fn envelope_within(&self, envelope: &Rect<f64>) -> bool {
        let tile: Polygon<f64> = envelope.to_polygon();
        match self {
            Geometry::Polygon(polygon) => polygon.contains(&tile),
            Geometry::MultiPolygon(polygons) => polygons.envelope_within(envelope),
            Geometry::Rect(rect) => rect.to_polygon().contains(&tile),
            Geometry::Triangle(triangle) => triangle.to_polygon().contains(&tile),
            Geometry::GeometryCollection(collection) => collection
                .iter()
                .any(|part| part.envelope_within(envelope)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, point, polygon};

    fn square(min: f64, max: f64) -> Rect<f64> {
        Rect::new(coord! { x: min, y: min }, coord! { x: max, y: max })
    }

    fn assert_rect_near(actual: Rect<f64>, expected: Rect<f64>) {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(
            close(actual.min().x, expected.min().x)
                && close(actual.min().y, expected.min().y)
                && close(actual.max().x, expected.max().x)
                && close(actual.max().y, expected.max().y),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_polygon_clip_and_within() {
        let shape = Geometry::Polygon(polygon![
            (x: 40.0, y: 40.0),
            (x: 40.0, y: 120.0),
            (x: 120.0, y: 120.0),
            (x: 120.0, y: 40.0),
            (x: 40.0, y: 40.0),
        ]);
        let envelope = shape.query_envelope().unwrap();
        assert_eq!(envelope, square(40.0, 120.0));

        assert!(shape.envelope_within(&square(40.0, 80.0)));
        assert!(shape.envelope_within(&square(40.0, 120.0)));
        assert!(!shape.envelope_within(&square(0.0, 80.0)));

        let clipped = shape.intersect_envelope(&square(0.0, 80.0));
        assert!(!TileGeometry::is_empty(&clipped));
        assert_rect_near(clipped.query_envelope().unwrap(), square(40.0, 80.0));

        // touching along an edge leaves nothing with area
        let touching = shape.intersect_envelope(&square(0.0, 40.0));
        assert!(TileGeometry::is_empty(&touching));

        let outside = shape.intersect_envelope(&square(200.0, 300.0));
        assert!(TileGeometry::is_empty(&outside));
    }

    #[test]
    fn test_point_on_boundary_is_kept() {
        let shape = Geometry::Point(point!(x: 40.0, y: 40.0));
        let kept = shape.intersect_envelope(&square(0.0, 40.0));
        assert!(!TileGeometry::is_empty(&kept));
        let dropped = shape.intersect_envelope(&square(50.0, 60.0));
        assert!(TileGeometry::is_empty(&dropped));
        assert!(!shape.envelope_within(&square(0.0, 40.0)));
    }

    #[test]
    fn test_line_clip() {
        let shape = Geometry::LineString(line_string![
            (x: 0.0, y: 5.0),
            (x: 20.0, y: 5.0),
        ]);
        let clipped = shape.intersect_envelope(&square(0.0, 10.0));
        let envelope = clipped.query_envelope().unwrap();
        assert_rect_near(
            envelope,
            Rect::new(coord! { x: 0.0, y: 5.0 }, coord! { x: 10.0, y: 5.0 }),
        );
        assert!(TileGeometry::is_empty(&shape.intersect_envelope(&square(11.0, 12.0))));
    }

    #[test]
    fn test_multipoint_filter() {
        let points: MultiPoint<f64> = vec![(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)].into();
        let inside = points.intersect_envelope(&square(0.0, 5.0));
        assert_eq!(inside.0.len(), 2);
        assert_eq!(points.query_envelope().unwrap(), square(1.0, 9.0));
    }

    #[test]
    fn test_collection_drops_empty_parts() {
        let collection = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::Point(point!(x: 1.0, y: 1.0)),
            Geometry::Point(point!(x: 50.0, y: 50.0)),
        ]));
        match collection.intersect_envelope(&square(0.0, 10.0)) {
            Geometry::GeometryCollection(parts) => assert_eq!(parts.0.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
