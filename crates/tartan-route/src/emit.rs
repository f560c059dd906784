//! Stitch element emission.
//!
//! Routed shapes become [`StitchElement`]s: the geometry plus the
//! embroidery parameters the stitch engine reads. Elements export their
//! parameters as `inkstitch:` attribute pairs and their geometry as SVG
//! path data, ready to be written into a document.

use log::debug;
use serde::Serialize;

use crate::geometry::{LineString, Point, Polygon, COORD_EPSILON};
use crate::settings::{StitchType, TartanSettings};
use crate::shapes::{Direction, RoutedShape};

/// Command markers sit this far beyond their annotated point, measured
/// from the element's center.
pub const COMMAND_OFFSET: f64 = 20.0;

/// Fill algorithm of a fill element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMethod {
    AutoFill,
    LegacyFill,
}

impl FillMethod {
    pub fn name(&self) -> &'static str {
        match self {
            FillMethod::AutoFill => "auto_fill",
            FillMethod::LegacyFill => "legacy_fill",
        }
    }
}

/// Embroidery parameters of a fill element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillParams {
    pub method: Option<FillMethod>,
    /// Auto-fill only.
    pub underpath: Option<bool>,
    pub underlay: bool,
    pub row_spacing_mm: f64,
    pub angle: f64,
    /// Legacy fill flags.
    pub reverse: bool,
    pub flip: bool,
}

/// What an element stitches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Fill { polygon: Polygon, params: FillParams },
    Stroke { line: LineString, bean_stitch_repeats: Option<u32> },
    /// Geometry only: a running move between stripes.
    Travel { line: LineString },
}

/// Visual commands attached to fill elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    FillStart,
    FillEnd,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::FillStart => "fill_start",
            Command::FillEnd => "fill_end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CommandMarker {
    pub command: Command,
    pub position: Point,
}

/// One finished, stitchable element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StitchElement {
    pub color: String,
    pub kind: ElementKind,
    /// Provisional entry point, consumed by command attachment.
    pub start: Option<Point>,
    /// Provisional exit point, consumed by command attachment.
    pub end: Option<Point>,
    pub commands: Vec<CommandMarker>,
}

impl StitchElement {
    pub fn is_fill(&self) -> bool {
        matches!(self.kind, ElementKind::Fill { .. })
    }

    pub fn is_travel(&self) -> bool {
        matches!(self.kind, ElementKind::Travel { .. })
    }

    pub fn fill_params(&self) -> Option<&FillParams> {
        match &self.kind {
            ElementKind::Fill { params, .. } => Some(params),
            _ => None,
        }
    }

    pub fn fill_params_mut(&mut self) -> Option<&mut FillParams> {
        match &mut self.kind {
            ElementKind::Fill { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Inline style of the element.
    pub fn style(&self) -> String {
        match self.kind {
            ElementKind::Fill { .. } => format!("fill:{};fill-opacity:0.6;", self.color),
            _ => format!("fill:none;stroke:{};stroke-opacity:0.6;", self.color),
        }
    }

    /// Geometry as SVG path data. Fills close every ring, holes follow the
    /// exterior.
    pub fn path_data(&self) -> String {
        let mut d = String::new();
        match &self.kind {
            ElementKind::Fill { polygon, .. } => {
                for ring in polygon.rings().filter(|ring| !ring.is_empty()) {
                    append_points(&mut d, ring);
                    d.push_str(" Z");
                }
            }
            ElementKind::Stroke { line, .. } | ElementKind::Travel { line } => {
                append_points(&mut d, &line.points);
            }
        }
        d
    }

    /// Embroidery parameters as `inkstitch:` attribute pairs.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let mut attrs = Vec::new();
        let mut set = |name: &str, value: String| attrs.push((format!("inkstitch:{}", name), value));

        match &self.kind {
            ElementKind::Fill { params, .. } => {
                if let Some(method) = params.method {
                    set("fill_method", method.name().to_string());
                }
                if let Some(underpath) = params.underpath {
                    set("underpath", underpath.to_string());
                }
                set("fill_underlay", params.underlay.to_string());
                set("row_spacing_mm", params.row_spacing_mm.to_string());
                set("angle", params.angle.to_string());
                if params.method == Some(FillMethod::LegacyFill) {
                    set("reverse", params.reverse.to_string());
                    set("flip", params.flip.to_string());
                }
            }
            ElementKind::Stroke { bean_stitch_repeats: Some(repeats), .. } => {
                set("bean_stitch_repeats", repeats.to_string());
            }
            ElementKind::Stroke { .. } | ElementKind::Travel { .. } => {}
        }

        if let Some(start) = self.start {
            set("start", format_point(start));
        }
        if let Some(end) = self.end {
            set("end", format_point(end));
        }
        attrs
    }

    /// Turn the start/end annotations of a fill into command markers.
    pub fn attach_commands(&mut self) {
        let ElementKind::Fill { polygon, .. } = &self.kind else {
            return;
        };
        let markers: Vec<CommandMarker> = [(Command::FillStart, self.start), (Command::FillEnd, self.end)]
            .into_iter()
            .filter_map(|(command, point)| {
                point.map(|p| CommandMarker { command, position: command_position(polygon, p) })
            })
            .collect();

        self.commands.extend(markers);
        self.strip_annotations();
    }

    /// Drop the provisional start/end annotations.
    pub fn strip_annotations(&mut self) {
        self.start = None;
        self.end = None;
    }
}

fn append_points(d: &mut String, points: &[Point]) {
    for (i, p) in points.iter().enumerate() {
        if !d.is_empty() {
            d.push(' ');
        }
        let op = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{} {} {}", op, p.x, p.y));
    }
}

fn format_point(p: Point) -> String {
    format!("({}, {})", p.x, p.y)
}

/// Marker position for an annotated point of a fill.
///
/// The point is pushed [`COMMAND_OFFSET`] further out along the ray from the
/// fill's bounding-box center, so the marker sits beside the stripe instead
/// of covering its entry.
pub fn command_position(polygon: &Polygon, point: Point) -> Point {
    let Some(center) = polygon.center() else {
        return point;
    };
    let len = center.distance(point);
    if len <= COORD_EPSILON {
        return point;
    }
    let factor = 1.0 + COMMAND_OFFSET / len;
    Point::new(
        center.x + (point.x - center.x) * factor,
        center.y + (point.y - center.y) * factor,
    )
}

/// Builds stitch elements from routed shapes.
pub struct ElementEmitter<'a> {
    settings: &'a TartanSettings,
}

impl<'a> ElementEmitter<'a> {
    pub fn new(settings: &'a TartanSettings) -> Self {
        Self { settings }
    }

    /// Element for one routed shape; `None` for empty geometry.
    pub fn emit(&self, color: &str, shape: &RoutedShape) -> Option<StitchElement> {
        match shape {
            RoutedShape::Fill(fill) => {
                self.fill_element(color, &fill.polygon, fill.direction, fill.start, fill.end)
            }
            RoutedShape::Line(line) => self.line_element(color, &line.line, line.travel),
        }
    }

    /// Elements for a list of routed shapes, skipping empty geometry.
    pub fn emit_all(&self, color: &str, shapes: &[RoutedShape]) -> Vec<StitchElement> {
        shapes.iter().filter_map(|shape| self.emit(color, shape)).collect()
    }

    pub fn fill_element(
        &self,
        color: &str,
        polygon: &Polygon,
        direction: Direction,
        start: Option<Point>,
        end: Option<Point>,
    ) -> Option<StitchElement> {
        if polygon.outer.is_empty() {
            debug!("{} {}: skipping fill with no coordinates", direction, color);
            return None;
        }

        let method = match self.settings.stitch_type {
            StitchType::AutoFill => Some(FillMethod::AutoFill),
            StitchType::LegacyFill => Some(FillMethod::LegacyFill),
            StitchType::Manual => None,
        };
        let params = FillParams {
            method,
            underpath: (method == Some(FillMethod::AutoFill)).then_some(self.settings.underpath),
            underlay: false,
            row_spacing_mm: self.settings.row_spacing,
            angle: self.settings.fill_angle(direction),
            reverse: false,
            flip: false,
        };

        Some(StitchElement {
            color: color.to_string(),
            kind: ElementKind::Fill { polygon: polygon.clone(), params },
            start,
            end,
            commands: Vec::new(),
        })
    }

    pub fn line_element(&self, color: &str, line: &LineString, travel: bool) -> Option<StitchElement> {
        if line.is_empty() {
            debug!("{}: skipping line with no coordinates", color);
            return None;
        }

        let kind = if travel {
            ElementKind::Travel { line: line.clone() }
        } else {
            let repeats = self.settings.bean_stitch_repeats;
            ElementKind::Stroke {
                line: line.clone(),
                bean_stitch_repeats: (repeats > 0).then_some(repeats),
            }
        };

        Some(StitchElement {
            color: color.to_string(),
            kind,
            start: None,
            end: None,
            commands: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
        attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn fill_carries_direction_angle_and_annotations() {
        let settings = TartanSettings { rotate: 10.0, angle_weft: 90.0, ..Default::default() };
        let emitter = ElementEmitter::new(&settings);
        let shape = RoutedShape::fill(Polygon::rect(0.0, 0.0, 10.0, 4.0), p(0.0, 0.0), p(10.0, 4.0), Direction::Weft);

        let element = emitter.emit("#112233", &shape).unwrap();
        let attrs = element.attributes();
        assert_eq!(attr(&attrs, "inkstitch:fill_method"), Some("auto_fill"));
        assert_eq!(attr(&attrs, "inkstitch:underpath"), Some("false"));
        assert_eq!(attr(&attrs, "inkstitch:fill_underlay"), Some("false"));
        assert_eq!(attr(&attrs, "inkstitch:angle"), Some("80"));
        assert_eq!(attr(&attrs, "inkstitch:start"), Some("(0, 0)"));
        assert_eq!(attr(&attrs, "inkstitch:end"), Some("(10, 4)"));
        assert_eq!(attr(&attrs, "inkstitch:reverse"), None, "flags belong to legacy fill");
        assert_eq!(element.style(), "fill:#112233;fill-opacity:0.6;");
    }

    #[test]
    fn manual_fill_has_no_method() {
        let settings = TartanSettings { stitch_type: StitchType::Manual, ..Default::default() };
        let element = ElementEmitter::new(&settings)
            .fill_element("red", &Polygon::rect(0.0, 0.0, 1.0, 1.0), Direction::Warp, None, None)
            .unwrap();
        let attrs = element.attributes();
        assert_eq!(attr(&attrs, "inkstitch:fill_method"), None);
        assert_eq!(attr(&attrs, "inkstitch:underpath"), None);
        assert_eq!(attr(&attrs, "inkstitch:row_spacing_mm"), Some("0.25"));
    }

    #[test]
    fn bean_repeats_only_on_stitched_lines() {
        let settings = TartanSettings { bean_stitch_repeats: 2, ..Default::default() };
        let emitter = ElementEmitter::new(&settings);
        let line = LineString::segment(p(0.0, 0.0), p(5.0, 0.0));

        let stroke = emitter.emit("red", &RoutedShape::stroke(line.clone(), Direction::Warp)).unwrap();
        assert_eq!(attr(&stroke.attributes(), "inkstitch:bean_stitch_repeats"), Some("2"));
        assert_eq!(stroke.style(), "fill:none;stroke:red;stroke-opacity:0.6;");

        let travel = emitter.emit("red", &RoutedShape::travel(line, Direction::Warp)).unwrap();
        assert!(travel.is_travel());
        assert!(travel.attributes().is_empty(), "travel carries geometry only");
    }

    #[test]
    fn zero_repeats_are_not_exported() {
        let settings = TartanSettings::default();
        let stroke = ElementEmitter::new(&settings)
            .line_element("red", &LineString::segment(p(0.0, 0.0), p(5.0, 0.0)), false)
            .unwrap();
        assert!(stroke.attributes().is_empty());
    }

    #[test]
    fn empty_geometry_is_skipped() {
        let settings = TartanSettings::default();
        let emitter = ElementEmitter::new(&settings);
        assert!(emitter.line_element("red", &LineString::default(), true).is_none());
        assert!(emitter
            .fill_element("red", &Polygon::new(vec![]), Direction::Warp, None, None)
            .is_none());
    }

    #[test]
    fn path_data_closes_rings() {
        let settings = TartanSettings::default();
        let polygon = Polygon::with_holes(
            Polygon::rect(0.0, 0.0, 10.0, 10.0).outer,
            vec![Polygon::rect(2.0, 2.0, 4.0, 4.0).outer],
        );
        let element = ElementEmitter::new(&settings)
            .fill_element("red", &polygon, Direction::Warp, None, None)
            .unwrap();
        let d = element.path_data();
        assert!(d.starts_with("M 0 0"), "got {}", d);
        assert_eq!(d.matches('Z').count(), 2);
        assert_eq!(d.matches('M').count(), 2);

        let stroke = ElementEmitter::new(&settings)
            .line_element("red", &LineString::segment(p(1.0, 2.0), p(3.0, 4.5)), false)
            .unwrap();
        assert_eq!(stroke.path_data(), "M 1 2 L 3 4.5");
    }

    #[test]
    fn command_markers_are_pushed_outward() {
        let polygon = Polygon::rect(0.0, 0.0, 100.0, 20.0);
        // center (50, 10), point 30 to the right
        let pos = command_position(&polygon, p(80.0, 10.0));
        assert!((pos.x - 100.0).abs() < 1e-9);
        assert!((pos.y - 10.0).abs() < 1e-9);

        assert_eq!(command_position(&polygon, p(50.0, 10.0)), p(50.0, 10.0));
    }

    #[test]
    fn attach_commands_consumes_annotations() {
        let settings = TartanSettings::default();
        let mut element = ElementEmitter::new(&settings)
            .fill_element("red", &Polygon::rect(0.0, 0.0, 100.0, 20.0), Direction::Warp, Some(p(0.0, 10.0)), Some(p(100.0, 10.0)))
            .unwrap();

        element.attach_commands();
        assert!(element.start.is_none() && element.end.is_none());
        assert_eq!(element.commands.len(), 2);
        assert_eq!(element.commands[0].command, Command::FillStart);
        assert!((element.commands[0].position.x - -20.0).abs() < 1e-9);
        assert_eq!(element.commands[1].command.name(), "fill_end");
        assert!((element.commands[1].position.x - 120.0).abs() < 1e-9);
    }
}
