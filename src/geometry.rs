use eframe::egui::{pos2, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum box width as a percentage of the canvas width.
pub const MIN_WIDTH_PCT: f32 = 5.0;
/// Minimum box height as a percentage of the canvas height.
pub const MIN_HEIGHT_PCT: f32 = 3.0;
/// Upper bound for the left/top offsets, keeping boxes reachable on screen.
pub const MAX_OFFSET_PCT: f32 = 95.0;

/// One of the eight compass resize handles on a box perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl Anchor {
    pub const ALL: [Anchor; 8] = [
        Anchor::Nw,
        Anchor::N,
        Anchor::Ne,
        Anchor::E,
        Anchor::Se,
        Anchor::S,
        Anchor::Sw,
        Anchor::W,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Nw => "nw",
            Anchor::N => "n",
            Anchor::Ne => "ne",
            Anchor::E => "e",
            Anchor::Se => "se",
            Anchor::S => "s",
            Anchor::Sw => "sw",
            Anchor::W => "w",
        }
    }

    /// West-side anchors move the left edge while resizing.
    pub fn is_west(self) -> bool {
        matches!(self, Anchor::Nw | Anchor::Sw | Anchor::W)
    }

    /// North-side anchors move the top edge while resizing.
    pub fn is_north(self) -> bool {
        matches!(self, Anchor::Nw | Anchor::N | Anchor::Ne)
    }

    pub fn is_east(self) -> bool {
        matches!(self, Anchor::Ne | Anchor::E | Anchor::Se)
    }

    pub fn is_south(self) -> bool {
        matches!(self, Anchor::Se | Anchor::S | Anchor::Sw)
    }

    /// Screen position of this handle on the perimeter of `rect`.
    pub fn handle_pos(self, rect: Rect) -> Pos2 {
        let center = rect.center();
        match self {
            Anchor::Nw => rect.left_top(),
            Anchor::N => pos2(center.x, rect.top()),
            Anchor::Ne => rect.right_top(),
            Anchor::E => pos2(rect.right(), center.y),
            Anchor::Se => rect.right_bottom(),
            Anchor::S => pos2(center.x, rect.bottom()),
            Anchor::Sw => rect.left_bottom(),
            Anchor::W => pos2(rect.left(), center.y),
        }
    }
}

/// Position and size of a box expressed as percentages of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BoxGeometry {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Screen rectangle of this geometry inside `canvas`.
    pub fn to_canvas(&self, canvas: Rect) -> Rect {
        let min = pos2(
            canvas.left() + self.left / 100.0 * canvas.width(),
            canvas.top() + self.top / 100.0 * canvas.height(),
        );
        let size = Vec2::new(
            self.width / 100.0 * canvas.width(),
            self.height / 100.0 * canvas.height(),
        );
        Rect::from_min_size(min, size)
    }

    /// Geometry of `rect` relative to `canvas`, in percentages.
    pub fn from_canvas(rect: Rect, canvas: Rect) -> Self {
        if canvas.width() <= 0.0 || canvas.height() <= 0.0 {
            return Self::new(0.0, 0.0, MIN_WIDTH_PCT, MIN_HEIGHT_PCT);
        }
        Self {
            left: (rect.left() - canvas.left()) / canvas.width() * 100.0,
            top: (rect.top() - canvas.top()) / canvas.height() * 100.0,
            width: rect.width() / canvas.width() * 100.0,
            height: rect.height() / canvas.height() * 100.0,
        }
    }

    /// Geometry after dragging by `delta` (a percentage delta). The size is
    /// unchanged and the offsets stay inside `[0, 95]`.
    pub fn dragged(&self, delta: Vec2) -> Self {
        Self {
            left: (self.left + delta.x).clamp(0.0, MAX_OFFSET_PCT),
            top: (self.top + delta.y).clamp(0.0, MAX_OFFSET_PCT),
            width: self.width,
            height: self.height,
        }
    }

    /// Geometry after resizing from `anchor` by `delta` (a percentage delta).
    ///
    /// Minimum sizes are enforced; when a minimum triggers, the edge opposite
    /// the grabbed anchor keeps its pre-gesture position.
    pub fn resized(&self, anchor: Anchor, delta: Vec2) -> Self {
        let mut left = self.left;
        let mut top = self.top;
        let mut width = self.width;
        let mut height = self.height;

        if anchor.is_west() {
            left += delta.x;
            width -= delta.x;
        } else if anchor.is_east() {
            width += delta.x;
        }
        if anchor.is_north() {
            top += delta.y;
            height -= delta.y;
        } else if anchor.is_south() {
            height += delta.y;
        }

        if width < MIN_WIDTH_PCT {
            if anchor.is_west() {
                // Keep the east edge fixed.
                left = self.left + self.width - MIN_WIDTH_PCT;
            }
            width = MIN_WIDTH_PCT;
        }
        if height < MIN_HEIGHT_PCT {
            if anchor.is_north() {
                // Keep the south edge fixed.
                top = self.top + self.height - MIN_HEIGHT_PCT;
            }
            height = MIN_HEIGHT_PCT;
        }

        Self {
            left: left.clamp(0.0, MAX_OFFSET_PCT),
            top: top.clamp(0.0, MAX_OFFSET_PCT),
            width,
            height,
        }
    }
}

/// Pointer movement from `from` to `to` converted into a percentage delta of
/// the canvas. A degenerate canvas yields a zero delta.
pub fn percent_delta(from: Pos2, to: Pos2, canvas: Rect) -> Vec2 {
    if canvas.width() <= 0.0 || canvas.height() <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (to.x - from.x) / canvas.width() * 100.0,
        (to.y - from.y) / canvas.height() * 100.0,
    )
}

/// Persisted form of a box geometry: the four values as percentage strings,
/// e.g. `"42.5%"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: String,
}

impl GeometryRecord {
    pub fn from_geometry(geometry: &BoxGeometry) -> Self {
        Self {
            left: format_percent(geometry.left),
            top: format_percent(geometry.top),
            width: format_percent(geometry.width),
            height: format_percent(geometry.height),
        }
    }

    /// Parse and validate the record. Returns `None` when any value is
    /// malformed or outside the invariants, in which case the box keeps its
    /// natural layout.
    pub fn parse(&self) -> Option<BoxGeometry> {
        let geometry = BoxGeometry {
            left: parse_percent(&self.left)?,
            top: parse_percent(&self.top)?,
            width: parse_percent(&self.width)?,
            height: parse_percent(&self.height)?,
        };
        let offsets_ok = (0.0..=MAX_OFFSET_PCT).contains(&geometry.left)
            && (0.0..=MAX_OFFSET_PCT).contains(&geometry.top);
        if offsets_ok && geometry.width >= MIN_WIDTH_PCT && geometry.height >= MIN_HEIGHT_PCT {
            Some(geometry)
        } else {
            None
        }
    }
}

fn format_percent(value: f32) -> String {
    format!("{value}%")
}

fn parse_percent(value: &str) -> Option<f32> {
    let number = value.trim().strip_suffix('%')?;
    let parsed: f32 = number.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}
