use std::fmt;
use std::str::FromStr;

/// Greatest common divisor by Euclid's recursion.
pub fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Reduced `W:H` ratio of an image's pixel dimensions.
///
/// Only meaningful once the image has decoded to positive dimensions; zero
/// in either axis is rejected.
pub fn resolve(width: u32, height: u32) -> Option<String> {
    if width == 0 || height == 0 {
        return None;
    }
    let g = gcd(width, height);
    Some(format!("{}:{}", width / g, height / g))
}

/// Values offered by the aspect-ratio selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AspectRatioChoice {
    /// Follow the model photo's ratio.
    #[default]
    UseModel,
    /// Follow the product photo's ratio.
    UseProduct,
    Square,
    Portrait3x4,
    Landscape4x3,
    Portrait2x3,
    Landscape3x2,
}

impl AspectRatioChoice {
    pub const ALL: [AspectRatioChoice; 7] = [
        AspectRatioChoice::UseModel,
        AspectRatioChoice::UseProduct,
        AspectRatioChoice::Square,
        AspectRatioChoice::Portrait3x4,
        AspectRatioChoice::Landscape4x3,
        AspectRatioChoice::Portrait2x3,
        AspectRatioChoice::Landscape3x2,
    ];

    /// Identifier used on the command line and in logs.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AspectRatioChoice::UseModel => "use-model-ratio",
            AspectRatioChoice::UseProduct => "use-product-ratio",
            AspectRatioChoice::Square => "1:1",
            AspectRatioChoice::Portrait3x4 => "3:4",
            AspectRatioChoice::Landscape4x3 => "4:3",
            AspectRatioChoice::Portrait2x3 => "2:3",
            AspectRatioChoice::Landscape3x2 => "3:2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatioChoice::UseModel => "Same as model photo",
            AspectRatioChoice::UseProduct => "Same as product photo",
            AspectRatioChoice::Square => "Square (1:1)",
            AspectRatioChoice::Portrait3x4 => "Portrait (3:4)",
            AspectRatioChoice::Landscape4x3 => "Landscape (4:3)",
            AspectRatioChoice::Portrait2x3 => "Portrait (2:3)",
            AspectRatioChoice::Landscape3x2 => "Landscape (3:2)",
        }
    }

    /// The concrete ratio, or `None` for the sentinels that must be resolved
    /// against an uploaded photo.
    pub fn fixed_ratio(&self) -> Option<&'static str> {
        match self {
            AspectRatioChoice::UseModel | AspectRatioChoice::UseProduct => None,
            other => Some(other.wire_name()),
        }
    }
}

impl fmt::Display for AspectRatioChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for AspectRatioChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|choice| choice.wire_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown aspect ratio '{wanted}'"))
    }
}

/// True for strings of the form `W:H` with positive integers on both sides.
pub fn is_concrete_ratio(ratio: &str) -> bool {
    let Some((w, h)) = ratio.trim().split_once(':') else {
        return false;
    };
    matches!(
        (w.parse::<u32>(), h.parse::<u32>()),
        (Ok(w), Ok(h)) if w > 0 && h > 0
    )
}
