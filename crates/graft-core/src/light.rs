//! Punctual lights from `KHR_lights_punctual`.

/// Kind of punctual light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

impl LightType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "directional" => Some(Self::Directional),
            "point" => Some(Self::Point),
            "spot" => Some(Self::Spot),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Point => "point",
            Self::Spot => "spot",
        }
    }
}

/// A punctual light referenced by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightType,
    /// Linear RGB.
    pub color: [f32; 3],
    /// Candela for point/spot lights, lux for directional lights.
    pub intensity: f32,
    /// Attenuation cutoff; never present on directional lights.
    pub range: Option<f32>,
    /// Spot lights only.
    pub inner_cone_angle: Option<f32>,
    /// Spot lights only.
    pub outer_cone_angle: Option<f32>,
    pub name: Option<String>,
}
