//! SVG shapes to font-space outlines.

use kurbo::{
    Affine, BezPath, Circle, CubicBez, Ellipse, PathEl, Point, Rect, RoundedRect, Shape,
};
use log::trace;
use roxmltree::{Document, Node, ParsingOptions};
use svgtypes::{NumberListParser, Transform};

use crate::error::{Error, Result};

/// Flattening tolerance for primitive shapes, in SVG user units.
const SHAPE_TOLERANCE: f64 = 0.01;

/// Maximum distance between a cubic and its quadratic approximation, in font units.
const QUAD_ACCURACY: f64 = 1.0;

/// Subtrees that never render directly.
const SKIPPED_ELEMENTS: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "marker",
    "pattern",
    "symbol",
    "linearGradient",
    "radialGradient",
    "style",
    "script",
    "title",
    "desc",
    "metadata",
];

/// A glyph outline in font units.
#[derive(Debug, Clone)]
pub struct Outline {
    /// Quadratic-only path, y-up, points rounded to integers.
    pub path: BezPath,
    pub advance: u16,
}

impl Outline {
    /// Number of drawn contours and their total point count.
    pub fn counts(&self) -> (u16, u16) {
        let mut contours = 0u16;
        let mut points = 0u16;
        for el in self.path.elements() {
            match el {
                PathEl::MoveTo(_) => {
                    contours = contours.saturating_add(1);
                    points = points.saturating_add(1);
                }
                PathEl::LineTo(_) => points = points.saturating_add(1),
                PathEl::QuadTo(..) => points = points.saturating_add(2),
                PathEl::CurveTo(..) => points = points.saturating_add(3),
                PathEl::ClosePath => {}
            }
        }
        (contours, points)
    }

    pub fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }
}

/// Convert SVG markup into an outline scaled so the viewBox height spans
/// `units_per_em`.
pub fn svg_outline(glyph: &str, source: &str, units_per_em: u16) -> Result<Outline> {
    let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    let doc = Document::parse_with_options(source, options)
        .map_err(|source| Error::Svg { glyph: glyph.to_string(), source })?;
    let root = doc.root_element();

    let view_box = view_box(root).ok_or_else(|| Error::NoViewBox(glyph.to_string()))?;
    let scale = f64::from(units_per_em) / view_box.height();
    let to_font = Affine::new([
        scale,
        0.0,
        0.0,
        -scale,
        -view_box.x0 * scale,
        view_box.y1 * scale,
    ]);

    let mut collected = BezPath::new();
    collect_shapes(glyph, root, Affine::IDENTITY, &mut collected)?;
    collected.apply_affine(to_font);

    let path = to_quadratic(&collected);
    trace!("{glyph}: {} path elements", path.elements().len());

    Ok(Outline { path, advance: (view_box.width() * scale).round().clamp(0.0, 65535.0) as u16 })
}

fn view_box(root: Node) -> Option<Rect> {
    if let Some(value) = root.attribute("viewBox") {
        let numbers = parse_numbers(value)?;
        if let [x, y, width, height] = numbers[..] {
            if width > 0.0 && height > 0.0 {
                return Some(Rect::new(x, y, x + width, y + height));
            }
        }
    }

    let width = root.attribute("width").and_then(parse_length)?;
    let height = root.attribute("height").and_then(parse_length)?;
    (width > 0.0 && height > 0.0).then(|| Rect::new(0.0, 0.0, width, height))
}

fn collect_shapes(glyph: &str, node: Node, parent: Affine, out: &mut BezPath) -> Result<()> {
    for child in node.children().filter(Node::is_element) {
        let tag = child.tag_name().name();
        if SKIPPED_ELEMENTS.contains(&tag) || child.attribute("display") == Some("none") {
            continue;
        }

        let transform = match child.attribute("transform") {
            Some(value) => parent * parse_transform(glyph, value)?,
            None => parent,
        };

        let shape = match tag {
            "g" | "a" | "svg" => {
                collect_shapes(glyph, child, transform, out)?;
                continue;
            }
            "path" => match child.attribute("d") {
                Some(d) => BezPath::from_svg(d).map_err(|e| Error::PathData {
                    glyph: glyph.to_string(),
                    message: e.to_string(),
                })?,
                None => continue,
            },
            "rect" => rect_path(child),
            "circle" => {
                let r = number(child, "r");
                if r <= 0.0 {
                    continue;
                }
                Circle::new((number(child, "cx"), number(child, "cy")), r).to_path(SHAPE_TOLERANCE)
            }
            "ellipse" => {
                let (rx, ry) = (number(child, "rx"), number(child, "ry"));
                if rx <= 0.0 || ry <= 0.0 {
                    continue;
                }
                Ellipse::new((number(child, "cx"), number(child, "cy")), (rx, ry), 0.0)
                    .to_path(SHAPE_TOLERANCE)
            }
            "polygon" | "polyline" => {
                points_path(glyph, child.attribute("points").unwrap_or_default())?
            }
            _ => continue,
        };

        let mut shape = shape;
        shape.apply_affine(transform);
        out.extend(shape.iter());
    }
    Ok(())
}

fn rect_path(node: Node) -> BezPath {
    let (x, y) = (number(node, "x"), number(node, "y"));
    let (width, height) = (number(node, "width"), number(node, "height"));
    if width <= 0.0 || height <= 0.0 {
        return BezPath::new();
    }

    let rx = node.attribute("rx").and_then(parse_length);
    let ry = node.attribute("ry").and_then(parse_length);
    let radius = rx.or(ry).unwrap_or(0.0).min(width / 2.0).min(height / 2.0);
    let rect = Rect::new(x, y, x + width, y + height);
    if radius > 0.0 {
        RoundedRect::from_rect(rect, radius).to_path(SHAPE_TOLERANCE)
    } else {
        rect.to_path(SHAPE_TOLERANCE)
    }
}

fn points_path(glyph: &str, points: &str) -> Result<BezPath> {
    let mut path = BezPath::new();
    let numbers = parse_numbers(points).ok_or_else(|| Error::PathData {
        glyph: glyph.to_string(),
        message: format!("invalid points list \"{points}\""),
    })?;
    let mut pairs = numbers.chunks_exact(2).map(|p| Point::new(p[0], p[1]));
    if let Some(first) = pairs.next() {
        path.move_to(first);
        pairs.for_each(|p| path.line_to(p));
        path.close_path();
    }
    Ok(path)
}

/// Rewrite cubics as quadratics and round every point to the font grid.
/// Subpaths that never draw are dropped.
fn to_quadratic(path: &BezPath) -> BezPath {
    let mut out = BezPath::new();
    let mut pending_move: Option<Point> = None;
    let mut current = Point::ORIGIN;
    let mut start = Point::ORIGIN;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                pending_move = Some(p);
                current = p;
                start = p;
            }
            PathEl::ClosePath => {
                if pending_move.is_none() {
                    out.close_path();
                }
                current = start;
            }
            segment => {
                if let Some(p) = pending_move.take() {
                    out.move_to(round(p));
                }
                match segment {
                    PathEl::LineTo(p) => out.line_to(round(p)),
                    PathEl::QuadTo(p1, p2) => out.quad_to(round(p1), round(p2)),
                    PathEl::CurveTo(p1, p2, p3) => {
                        for (_, _, quad) in CubicBez::new(current, p1, p2, p3).to_quads(QUAD_ACCURACY) {
                            out.quad_to(round(quad.p1), round(quad.p2));
                        }
                    }
                    PathEl::MoveTo(_) | PathEl::ClosePath => {}
                }
                current = segment.end_point().unwrap_or(current);
            }
        }
    }
    out
}

fn round(p: Point) -> Point {
    Point::new(p.x.round(), p.y.round())
}

/// Parse an SVG `transform` list into a single affine, applied left to right.
pub(crate) fn parse_transform(glyph: &str, value: &str) -> Result<Affine> {
    let ts: Transform = value.parse().map_err(|e: svgtypes::Error| Error::Transform {
        glyph: glyph.to_string(),
        message: format!("\"{value}\": {e}"),
    })?;
    Ok(Affine::new([ts.a, ts.b, ts.c, ts.d, ts.e, ts.f]))
}

fn number(node: Node, name: &str) -> f64 {
    node.attribute(name).and_then(parse_length).unwrap_or(0.0)
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

fn parse_numbers(value: &str) -> Option<Vec<f64>> {
    NumberListParser::from(value).collect::<std::result::Result<_, _>>().ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn points(path: &BezPath) -> Vec<(f64, f64)> {
        path.elements()
            .iter()
            .filter_map(|el| el.end_point())
            .map(|p| (p.x, p.y))
            .collect()
    }

    #[test]
    fn test_view_box_scaled_and_flipped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0H12V12Z"/></svg>"#;
        let outline = svg_outline("box", svg, 1024).unwrap();
        assert_eq!(outline.advance, 1024);
        assert_eq!(points(&outline.path), vec![(0.0, 1024.0), (512.0, 1024.0), (512.0, 512.0)]);
    }

    #[test]
    fn test_dimensions_without_view_box() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="16"><rect width="32" height="16"/></svg>"#;
        let outline = svg_outline("wide", svg, 1024).unwrap();
        assert_eq!(outline.advance, 2048);
        assert_eq!(outline.counts(), (1, 4));
    }

    #[test]
    fn test_missing_view_box() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0L1 1"/></svg>"#;
        assert!(matches!(svg_outline("x", svg, 1024), Err(Error::NoViewBox(name)) if name == "x"));
    }

    #[test]
    fn test_cubics_become_quadratics() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10"/></svg>"#;
        let outline = svg_outline("dot", svg, 1024).unwrap();
        assert!(!outline.is_empty());
        assert!(outline.path.elements().iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
    }

    #[test]
    fn test_group_transforms_apply() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><g transform="translate(5 0)"><polygon points="0,0 1,0 1,1"/></g></svg>"#;
        let outline = svg_outline("tri", svg, 10).unwrap();
        assert_eq!(points(&outline.path), vec![(5.0, 10.0), (6.0, 10.0), (6.0, 9.0)]);
    }

    #[test]
    fn test_defs_are_not_drawn() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><defs><rect width="10" height="10"/></defs></svg>"#;
        assert!(svg_outline("empty", svg, 1024).unwrap().is_empty());
    }

    #[test]
    fn test_parse_transform_list() {
        let affine = parse_transform("t", "translate(10, 20) scale(2)").unwrap();
        assert_eq!(affine * Point::new(1.0, 1.0), Point::new(12.0, 22.0));

        let compact = parse_transform("t", "translate(5-2)").unwrap();
        assert_eq!(compact * Point::ORIGIN, Point::new(5.0, -2.0));
    }

    #[test]
    fn test_invalid_transform_is_reported() {
        assert!(matches!(parse_transform("t", "bogus(1)"), Err(Error::Transform { .. })));

        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><g transform="translate(1"><rect width="1" height="1"/></g></svg>"#;
        assert!(matches!(
            svg_outline("bad", svg, 10),
            Err(Error::Transform { glyph, .. }) if glyph == "bad"
        ));
    }

    #[test]
    fn test_compact_points_list() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><polygon points="0,0 4-0 4,4"/></svg>"#;
        let outline = svg_outline("tri", svg, 10).unwrap();
        assert_eq!(points(&outline.path), vec![(0.0, 10.0), (4.0, 10.0), (4.0, 6.0)]);

        let bad = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><polygon points="0,0 x"/></svg>"#;
        assert!(matches!(svg_outline("bad", bad, 10), Err(Error::PathData { .. })));
    }

    #[test]
    fn test_invalid_path_data() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path d="M0 0 Q"/></svg>"#;
        assert!(matches!(svg_outline("bad", svg, 1024), Err(Error::PathData { .. })));
    }
}
