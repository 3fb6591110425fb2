//! Integer geometry and the brace notation used by plist manifests
//!
//! Points and sizes are written `{a,b}`; rectangles are an origin and a size
//! wrapped in another pair of braces, `{{x,y},{w,h}}`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for geometry strings that do not follow the brace notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("'{text}' is not wrapped in braces")]
    MissingBraces { text: String },
    #[error("'{text}' must contain exactly two comma-separated values, found {found}")]
    ComponentCount { text: String, found: usize },
    #[error("'{text}' is not an integer")]
    InvalidNumber { text: String },
    #[error("'{text}' has no separator between origin and size")]
    MissingSeparator { text: String },
}

/// A signed position or displacement in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn swapped(self) -> Self {
        Self { x: self.y, y: self.x }
    }
}

/// A width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn swapped(self) -> Self {
        Self { width: self.height, height: self.width }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    pub const fn origin(&self) -> Point {
        Point { x: self.x, y: self.y }
    }

    pub const fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Same origin, width and height exchanged.
    pub const fn with_swapped_size(self) -> Self {
        Self { x: self.x, y: self.y, width: self.height, height: self.width }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.x, self.y)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.origin(), self.size())
    }
}

/// Remove one pair of enclosing braces, ignoring surrounding whitespace.
fn strip_braces(text: &str) -> Result<&str, GeometryError> {
    text.trim()
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| GeometryError::MissingBraces { text: text.to_string() })
}

/// Decode `{a,b}` into its two integers.
fn parse_pair(text: &str) -> Result<(i32, i32), GeometryError> {
    let inner = strip_braces(text)?;
    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 2 {
        return Err(GeometryError::ComponentCount { text: text.to_string(), found: parts.len() });
    }

    let number = |s: &str| {
        s.trim().parse::<i32>().map_err(|_| GeometryError::InvalidNumber { text: s.trim().to_string() })
    };
    Ok((number(parts[0])?, number(parts[1])?))
}

impl FromStr for Point {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = parse_pair(s)?;
        Ok(Point { x, y })
    }
}

impl FromStr for Size {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = parse_pair(s)?;
        Ok(Size { width, height })
    }
}

impl FromStr for Rect {
    type Err = GeometryError;

    /// The origin/size separator is the first comma after the first `}`, so the
    /// comma inside the origin pair is never mistaken for it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = strip_braces(s)?;
        let missing = || GeometryError::MissingSeparator { text: s.to_string() };

        let close = inner.find('}').ok_or_else(missing)?;
        let split = inner[close..].find(',').map(|i| close + i).ok_or_else(missing)?;

        let origin: Point = inner[..split].parse()?;
        let size: Size = inner[split + 1..].parse()?;
        Ok(Rect::from_parts(origin, size))
    }
}
