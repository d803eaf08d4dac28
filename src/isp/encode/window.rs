use crate::isp::error::ValidationError;

const COORD_BITS: u32 = 12;
const COORD_MASK: u32 = (1 << COORD_BITS) - 1;
const START_SHIFT: u32 = 16;

/// Largest coordinate bound a 12-bit window field can express.
pub const WINDOW_COORD_LIMIT: u32 = 1 << COORD_BITS;

/// Pixel coordinate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Rectangle spanned by its top-left and bottom-right corners.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowGeometry {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl WindowGeometry {
    pub const fn new(top_left: Point, bottom_right: Point) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.bottom_right.x.saturating_sub(self.top_left.x)
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.bottom_right.y.saturating_sub(self.top_left.y)
    }

    /// Checks ordering and that both corners are below `max` on each axis.
    pub fn validate(&self, max: u32) -> Result<(), ValidationError> {
        let ordered =
            self.top_left.x < self.bottom_right.x && self.top_left.y < self.bottom_right.y;
        let in_range = self.bottom_right.x < max && self.bottom_right.y < max;
        if ordered && in_range {
            Ok(())
        } else {
            Err(ValidationError::InvalidWindow)
        }
    }
}

/// Horizontal and vertical scale words of a statistics window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowWords {
    pub h: u32,
    pub v: u32,
}

/// Packs a window: left/top in bits 16..27, right/bottom in bits 0..11.
///
/// `max` is the engine's coordinate bound and is capped at [`WINDOW_COORD_LIMIT`].
pub fn encode_window(window: &WindowGeometry, max: u32) -> Result<WindowWords, ValidationError> {
    window.validate(max.min(WINDOW_COORD_LIMIT))?;
    Ok(WindowWords {
        h: (window.top_left.x << START_SHIFT) | window.bottom_right.x,
        v: (window.top_left.y << START_SHIFT) | window.bottom_right.y,
    })
}

/// Unpacks the window held in a pair of scale words.
pub fn decode_window(words: &WindowWords) -> WindowGeometry {
    WindowGeometry {
        top_left: Point::new(
            (words.h >> START_SHIFT) & COORD_MASK,
            (words.v >> START_SHIFT) & COORD_MASK,
        ),
        bottom_right: Point::new(words.h & COORD_MASK, words.v & COORD_MASK),
    }
}
