//! Raster rendering of maneuver icons.
//!
//! Icons are described as a handful of primitive shapes in a 100×100 design
//! space, then scaled to the requested size. Left-hand variants reuse the
//! right-hand shapes under a horizontal mirror transform.

use std::path::Path;

use image::RgbaImage;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use super::icon::{ManeuverIcon, ResolvedIcon};

/// Side length of the design space all shapes are expressed in.
const DESIGN_SIZE: f32 = 100.0;

/// Stroke width in design units.
const STROKE_WIDTH: f32 = 10.0;

/// Arrow head length and half-width in design units.
const HEAD_LENGTH: f32 = 14.0;
const HEAD_HALF_WIDTH: f32 = 11.0;

/// Roundabout exit angle limits in degrees.
pub const MIN_ROUNDABOUT_ANGLE: f32 = 60.0;
pub const MAX_ROUNDABOUT_ANGLE: f32 = 300.0;
pub const DEFAULT_ROUNDABOUT_ANGLE: f32 = 180.0;

/// Errors raised while rendering or encoding an icon.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Requested size cannot back a pixmap.
    #[error("invalid icon size: {0}")]
    InvalidSize(u32),

    /// A shape produced an empty or degenerate path.
    #[error("failed to build path for {0}")]
    Path(ManeuverIcon),

    /// Encoding or writing the image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Colors and geometry parameters of a rendered icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconStyle {
    /// RGBA color of the route the driver follows.
    pub primary: [u8; 4],
    /// RGBA color of the branches not taken.
    pub secondary: [u8; 4],
    /// Output width and height in pixels.
    pub size: u32,
    /// Exit angle for roundabout icons, in degrees.
    pub roundabout_angle: f32,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            primary: [255, 255, 255, 255],
            secondary: [255, 255, 255, 110],
            size: 128,
            roundabout_angle: DEFAULT_ROUNDABOUT_ANGLE,
        }
    }
}

impl IconStyle {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_colors(mut self, primary: [u8; 4], secondary: [u8; 4]) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// Sets the roundabout exit angle, clamped to the drawable range.
    pub fn with_roundabout_angle(mut self, degrees: f32) -> Self {
        self.roundabout_angle = clamp_roundabout_angle(degrees);
        self
    }
}

/// Clamps a roundabout exit angle to `[60, 300]` degrees.
pub fn clamp_roundabout_angle(degrees: f32) -> f32 {
    if degrees.is_nan() {
        return DEFAULT_ROUNDABOUT_ANGLE;
    }
    degrees.clamp(MIN_ROUNDABOUT_ANGLE, MAX_ROUNDABOUT_ANGLE)
}

/// Which style color a shape is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Primary,
    Secondary,
}

/// Primitive shape in design space.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Open polyline, optionally capped with an arrow head at its last point.
    Line {
        layer: Layer,
        points: Vec<(f32, f32)>,
        head: bool,
    },
    /// Filled circle.
    Dot {
        layer: Layer,
        center: (f32, f32),
        radius: f32,
    },
    /// Stroked circle outline.
    Ring {
        layer: Layer,
        center: (f32, f32),
        radius: f32,
    },
}

fn line(layer: Layer, points: &[(f32, f32)], head: bool) -> Shape {
    Shape::Line {
        layer,
        points: points.to_vec(),
        head,
    }
}

/// Describes an icon as primitive shapes, unmirrored.
pub fn shapes(icon: ManeuverIcon, roundabout_angle: f32) -> Vec<Shape> {
    use Layer::{Primary, Secondary};

    match icon {
        ManeuverIcon::ArrowStraight => vec![line(Primary, &[(50.0, 88.0), (50.0, 14.0)], true)],
        ManeuverIcon::ArrowRight => vec![line(
            Primary,
            &[(30.0, 88.0), (30.0, 50.0), (38.0, 40.0), (86.0, 40.0)],
            true,
        )],
        ManeuverIcon::ArrowSlightRight => vec![line(
            Primary,
            &[(40.0, 88.0), (40.0, 56.0), (72.0, 20.0)],
            true,
        )],
        ManeuverIcon::ArrowSharpRight => vec![line(
            Primary,
            &[(34.0, 88.0), (34.0, 30.0), (76.0, 74.0)],
            true,
        )],
        ManeuverIcon::Arrow180Right => vec![line(
            Primary,
            &[
                (32.0, 88.0),
                (32.0, 40.0),
                (38.0, 28.0),
                (50.0, 22.0),
                (62.0, 28.0),
                (68.0, 40.0),
                (68.0, 76.0),
            ],
            true,
        )],
        ManeuverIcon::Arrive => vec![
            line(Primary, &[(50.0, 88.0), (50.0, 48.0)], false),
            Shape::Dot {
                layer: Primary,
                center: (50.0, 28.0),
                radius: 13.0,
            },
        ],
        ManeuverIcon::ArriveRight => vec![
            line(Primary, &[(34.0, 88.0), (34.0, 24.0)], false),
            Shape::Dot {
                layer: Primary,
                center: (70.0, 40.0),
                radius: 13.0,
            },
        ],
        ManeuverIcon::Merge => vec![
            line(Secondary, &[(28.0, 88.0), (28.0, 66.0), (50.0, 44.0)], false),
            line(
                Primary,
                &[(72.0, 88.0), (72.0, 66.0), (50.0, 44.0), (50.0, 14.0)],
                true,
            ),
        ],
        ManeuverIcon::OffRamp => vec![
            line(Secondary, &[(40.0, 88.0), (40.0, 14.0)], false),
            line(Primary, &[(40.0, 72.0), (70.0, 40.0), (70.0, 16.0)], true),
        ],
        ManeuverIcon::Fork => vec![
            line(Secondary, &[(50.0, 88.0), (50.0, 58.0), (30.0, 18.0)], false),
            line(Primary, &[(50.0, 88.0), (50.0, 58.0), (70.0, 18.0)], true),
        ],
        ManeuverIcon::Roundabout => roundabout_shapes(roundabout_angle),
    }
}

/// Roundabout: ring plus an entry, an arc driven counter-clockwise and a
/// radial exit at `angle` degrees from the entry.
fn roundabout_shapes(angle: f32) -> Vec<Shape> {
    let center = (50.0_f32, 46.0_f32);
    let radius = 20.0_f32;
    let angle = clamp_roundabout_angle(angle);

    // Screen coordinates: theta 90° is the bottom of the ring. Driving
    // counter-clockwise on screen means decreasing theta.
    let entry_theta = 90.0_f32;
    let exit_theta = entry_theta - angle;

    let mut points = vec![(center.0, 92.0)];
    let steps = (angle / 10.0).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let theta = (entry_theta - angle * i as f32 / steps as f32).to_radians();
        points.push((
            center.0 + radius * theta.cos(),
            center.1 + radius * theta.sin(),
        ));
    }
    let exit = exit_theta.to_radians();
    points.push((
        center.0 + (radius + 24.0) * exit.cos(),
        center.1 + (radius + 24.0) * exit.sin(),
    ));

    vec![
        Shape::Ring {
            layer: Layer::Secondary,
            center,
            radius,
        },
        Shape::Line {
            layer: Layer::Primary,
            points,
            head: true,
        },
    ]
}

fn paint_for(layer: Layer, style: &IconStyle) -> Paint<'static> {
    let rgba = match layer {
        Layer::Primary => style.primary,
        Layer::Secondary => style.secondary,
    };
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
    paint.anti_alias = true;
    paint
}

fn polyline(points: &[(f32, f32)]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for p in rest {
        pb.line_to(p.0, p.1);
    }
    pb.finish()
}

/// Arrow head opening backwards from `tip` along the `from → tip` direction.
fn arrow_head(from: (f32, f32), tip: (f32, f32)) -> Option<tiny_skia::Path> {
    let (dx, dy) = (tip.0 - from.0, tip.1 - from.1);
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    let back = (tip.0 - ux * HEAD_LENGTH, tip.1 - uy * HEAD_LENGTH);
    let (px, py) = (-uy * HEAD_HALF_WIDTH, ux * HEAD_HALF_WIDTH);

    polyline(&[
        (back.0 + px, back.1 + py),
        (tip.0 + ux * 2.0, tip.1 + uy * 2.0),
        (back.0 - px, back.1 - py),
    ])
}

/// Maps design space onto the pixmap, mirrored when requested.
fn icon_transform(size: u32, flip: bool) -> Transform {
    let scale = size as f32 / DESIGN_SIZE;
    if flip {
        Transform::from_row(-scale, 0.0, 0.0, scale, size as f32, 0.0)
    } else {
        Transform::from_scale(scale, scale)
    }
}

/// Renders a resolved icon into a transparent pixmap.
pub fn render(resolved: ResolvedIcon, style: &IconStyle) -> Result<Pixmap, RenderError> {
    let mut pixmap = Pixmap::new(style.size, style.size).ok_or(RenderError::InvalidSize(style.size))?;
    let transform = icon_transform(style.size, resolved.flip);
    let stroke = Stroke {
        width: STROKE_WIDTH,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };

    for shape in shapes(resolved.icon, style.roundabout_angle) {
        match shape {
            Shape::Line {
                layer,
                points,
                head,
            } => {
                let paint = paint_for(layer, style);
                let path = polyline(&points).ok_or(RenderError::Path(resolved.icon))?;
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);

                if head {
                    if let [.., from, tip] = points.as_slice() {
                        let head = arrow_head(*from, *tip).ok_or(RenderError::Path(resolved.icon))?;
                        pixmap.stroke_path(&head, &paint, &stroke, transform, None);
                    }
                }
            }
            Shape::Dot {
                layer,
                center,
                radius,
            } => {
                let paint = paint_for(layer, style);
                let path = PathBuilder::from_circle(center.0, center.1, radius)
                    .ok_or(RenderError::Path(resolved.icon))?;
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
            Shape::Ring {
                layer,
                center,
                radius,
            } => {
                let paint = paint_for(layer, style);
                let path = PathBuilder::from_circle(center.0, center.1, radius)
                    .ok_or(RenderError::Path(resolved.icon))?;
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
    }

    Ok(pixmap)
}

/// Converts a premultiplied pixmap into a straight-alpha RGBA image.
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = image::Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}

/// Renders an icon and writes it to `path`; the format follows the extension.
pub fn save_icon(
    resolved: ResolvedIcon,
    style: &IconStyle,
    path: impl AsRef<Path>,
) -> Result<(), RenderError> {
    let pixmap = render(resolved, style)?;
    let image = to_rgba_image(&pixmap);
    image.save(path.as_ref())?;
    tracing::debug!(
        icon = %resolved,
        size = style.size,
        path = %path.as_ref().display(),
        "Saved maneuver icon"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maneuver::resolve_str;

    /// Counts visible pixels in the left and right halves of a pixmap.
    fn half_coverage(pixmap: &Pixmap) -> (usize, usize) {
        let width = pixmap.width() as usize;
        let mut left = 0;
        let mut right = 0;
        for (i, px) in pixmap.pixels().iter().enumerate() {
            if px.alpha() > 0 {
                if i % width < width / 2 {
                    left += 1;
                } else {
                    right += 1;
                }
            }
        }
        (left, right)
    }

    #[test]
    fn test_render_size() {
        let resolved = resolve_str(Some("turn"), Some("right"), None);
        let pixmap = render(resolved, &IconStyle::default().with_size(64)).unwrap();
        assert_eq!(pixmap.width(), 64);
        assert_eq!(pixmap.height(), 64);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let resolved = resolve_str(None, None, None);
        let result = render(resolved, &IconStyle::default().with_size(0));
        assert!(matches!(result, Err(RenderError::InvalidSize(0))));
    }

    #[test]
    fn test_right_arrow_leans_right() {
        let resolved = resolve_str(Some("turn"), Some("right"), None);
        let pixmap = render(resolved, &IconStyle::default()).unwrap();
        let (left, right) = half_coverage(&pixmap);
        assert!(right > left, "left={} right={}", left, right);
    }

    #[test]
    fn test_left_arrow_is_mirrored() {
        let resolved = resolve_str(Some("turn"), Some("left"), None);
        assert!(resolved.flip);
        let pixmap = render(resolved, &IconStyle::default()).unwrap();
        let (left, right) = half_coverage(&pixmap);
        assert!(left > right, "left={} right={}", left, right);
    }

    #[test]
    fn test_every_icon_renders_pixels() {
        for icon in [
            ManeuverIcon::Merge,
            ManeuverIcon::OffRamp,
            ManeuverIcon::Fork,
            ManeuverIcon::Roundabout,
            ManeuverIcon::Arrive,
            ManeuverIcon::ArriveRight,
            ManeuverIcon::ArrowSlightRight,
            ManeuverIcon::ArrowRight,
            ManeuverIcon::ArrowSharpRight,
            ManeuverIcon::Arrow180Right,
            ManeuverIcon::ArrowStraight,
        ] {
            let pixmap = render(ResolvedIcon { icon, flip: false }, &IconStyle::default()).unwrap();
            let (left, right) = half_coverage(&pixmap);
            assert!(left + right > 0, "{} rendered nothing", icon);
        }
    }

    #[test]
    fn test_arrive_has_destination_dot() {
        let shapes = shapes(ManeuverIcon::Arrive, DEFAULT_ROUNDABOUT_ANGLE);
        assert!(shapes.iter().any(|s| matches!(s, Shape::Dot { .. })));
    }

    #[test]
    fn test_roundabout_angle_is_clamped() {
        assert_eq!(clamp_roundabout_angle(10.0), MIN_ROUNDABOUT_ANGLE);
        assert_eq!(clamp_roundabout_angle(359.0), MAX_ROUNDABOUT_ANGLE);
        assert_eq!(clamp_roundabout_angle(f32::NAN), DEFAULT_ROUNDABOUT_ANGLE);
        assert_eq!(
            IconStyle::default().with_roundabout_angle(90.0).roundabout_angle,
            90.0
        );
    }

    #[test]
    fn test_roundabout_exit_follows_angle() {
        // A 90° exit in right-hand traffic leaves the ring to the right
        let shapes = shapes(ManeuverIcon::Roundabout, 90.0);
        let exit = shapes
            .iter()
            .find_map(|s| match s {
                Shape::Line { points, .. } => points.last().copied(),
                _ => None,
            })
            .unwrap();
        assert!(exit.0 > 80.0, "exit point {:?}", exit);
        assert!((exit.1 - 46.0).abs() < 1.0, "exit point {:?}", exit);
    }

    #[test]
    fn test_save_icon_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uturn.png");
        let resolved = resolve_str(Some("turn"), Some("uturn"), Some("left"));

        save_icon(resolved, &IconStyle::default().with_size(48), &path).unwrap();

        let image = image::open(&path).unwrap();
        assert_eq!(image.width(), 48);
        assert_eq!(image.height(), 48);
    }
}
