//! Keyframe animation data.

/// Which node property an animation channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl AnimationPath {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "weights" => Some(Self::Weights),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Translation => "translation",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Weights => "weights",
        }
    }
}

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "LINEAR" => Some(Self::Linear),
            "STEP" => Some(Self::Step),
            "CUBICSPLINE" => Some(Self::CubicSpline),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "LINEAR",
            Self::Step => "STEP",
            Self::CubicSpline => "CUBICSPLINE",
        }
    }
}

/// Binds a sampler to a node property.
///
/// Within one animation, the (node, path) pair of every channel is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    pub sampler: usize,
    pub node: Option<usize>,
    pub path: AnimationPath,
}

/// Keyframe times and values.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSampler {
    /// Accessor with the keyframe times, scalar floating-point.
    pub input: usize,
    /// Accessor with the keyframe values.
    pub output: usize,
    pub interpolation: Interpolation,
}

/// A named set of channels and samplers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub channels: Vec<AnimationChannel>,
    pub samplers: Vec<AnimationSampler>,
    pub name: Option<String>,
}
