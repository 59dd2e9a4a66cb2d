use std::fmt;
use std::num::ParseFloatError;
use std::str::FromStr;

/// Could not parse a vector from text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseVectorError {
    /// The text had the wrong number of `|`-separated components.
    #[error("expected {expected} components separated by '|', got {found}")]
    ComponentCount {
        /// Components the vector type needs.
        expected: usize,
        /// Components found in the text.
        found: usize,
    },
    /// A component was not a number.
    #[error(transparent)]
    ParseFloatError(#[from] ParseFloatError),
}

fn parse_components<const N: usize>(s: &str) -> Result<[f32; N], ParseVectorError> {
    let parts: Vec<&str> = s.split('|').collect();
    if parts.len() != N {
        return Err(ParseVectorError::ComponentCount {
            expected: N,
            found: parts.len(),
        });
    }
    let mut components = [0.0; N];
    for (component, part) in components.iter_mut().zip(parts) {
        *component = part.trim().parse()?;
    }
    Ok(components)
}

/// A position in 3D space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector3 {
    /// The x component.
    pub x: f32,
    /// The y component.
    pub y: f32,
    /// The z component.
    pub z: f32,
}

impl Vector3 {
    /// Create a vector.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.x, self.y, self.z)
    }
}

/// Parses the `x|y|z` notation used by patch instructions.
impl FromStr for Vector3 {
    type Err = ParseVectorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z] = parse_components::<3>(s)?;
        Ok(Self { x, y, z })
    }
}

/// An orientation quaternion.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector4 {
    /// The x component.
    pub x: f32,
    /// The y component.
    pub y: f32,
    /// The z component.
    pub z: f32,
    /// The w component.
    pub w: f32,
}

impl Vector4 {
    /// Create a vector.
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}|{}", self.x, self.y, self.z, self.w)
    }
}

/// Parses the `x|y|z|w` notation used by patch instructions.
impl FromStr for Vector4 {
    type Err = ParseVectorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, z, w] = parse_components::<4>(s)?;
        Ok(Self { x, y, z, w })
    }
}
