use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// A block of the option catalog.
///
/// The serde names are the category names used in catalog documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "market")]
    Market,
    /// Model/make code, derived from the style key.
    #[serde(rename = "mmc")]
    Mmc,
    #[serde(rename = "peg")]
    Trim,
    #[serde(rename = "drivetrain")]
    Drivetrain,
    #[serde(rename = "bodystyle")]
    BodyStyle,
    #[serde(rename = "color")]
    Color,
    /// Interior material / color theme.
    #[serde(rename = "leather")]
    Leather,
    #[serde(rename = "wheels")]
    Wheels,
    #[serde(rename = "packaging and accessories")]
    Accessories,
    #[serde(rename = "standard part")]
    StandardPart,
    #[serde(rename = "style")]
    Style,
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "camera")]
    Camera,
    #[serde(rename = "shadow")]
    Shadow,
    #[serde(rename = "background")]
    Background,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Core categories; changing one of them selects a new style.
    pub const STYLE: [Category; 4] = [
        Category::Trim,
        Category::Market,
        Category::Drivetrain,
        Category::BodyStyle,
    ];

    /// Categories re-picked after a style change, in correction order.
    pub const NON_CORE: [Category; 3] = [Category::Color, Category::Leather, Category::Wheels];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Market => "market",
            Category::Mmc => "mmc",
            Category::Trim => "peg",
            Category::Drivetrain => "drivetrain",
            Category::BodyStyle => "bodystyle",
            Category::Color => "color",
            Category::Leather => "leather",
            Category::Wheels => "wheels",
            Category::Accessories => "packaging and accessories",
            Category::StandardPart => "standard part",
            Category::Style => "style",
            Category::Default => "default",
            Category::Date => "date",
            Category::Camera => "camera",
            Category::Shadow => "shadow",
            Category::Background => "background",
            Category::Unknown => "unknown",
        }
    }

    pub fn is_style(&self) -> bool {
        Self::STYLE.contains(self)
    }

    pub fn is_non_core(&self) -> bool {
        Self::NON_CORE.contains(self)
    }

    /// Whether an activation may pin this category to a single code.
    pub fn is_lockable(&self) -> bool {
        !matches!(self, Category::Accessories | Category::StandardPart)
    }

    /// Codes of these categories are kept in the accessory set of the options.
    pub fn is_accessory_like(&self) -> bool {
        matches!(self, Category::Accessories | Category::StandardPart)
    }

    /// Whether codes of this category take part in code to category lookup.
    pub fn is_indexed(&self) -> bool {
        !matches!(
            self,
            Category::Accessories
                | Category::Date
                | Category::Default
                | Category::Camera
                | Category::Unknown
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    /// Accepts catalog names plus the friendlier `trim`, `accessories`,
    /// `standard` and `interior` aliases (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let category = match normalized.as_str() {
            "market" => Category::Market,
            "mmc" => Category::Mmc,
            "peg" | "trim" => Category::Trim,
            "drivetrain" => Category::Drivetrain,
            "bodystyle" | "body" => Category::BodyStyle,
            "color" | "colour" => Category::Color,
            "leather" | "interior" => Category::Leather,
            "wheels" => Category::Wheels,
            "packaging and accessories" | "accessories" => Category::Accessories,
            "standard part" | "standard" => Category::StandardPart,
            "style" => Category::Style,
            "default" => Category::Default,
            "date" => Category::Date,
            "camera" => Category::Camera,
            "shadow" => Category::Shadow,
            "background" => Category::Background,
            _ => return Err(ModelError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// An enable-code channel: one boolean string per affected category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Extra codes attached to the render.
    #[serde(rename = "attach")]
    Attach,
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "wheels")]
    Wheels,
    #[serde(rename = "leather")]
    Leather,
    #[serde(rename = "packaging and accessories")]
    Accessories,
}

impl Channel {
    /// Resolution order.
    pub const ALL: [Channel; 5] = [
        Channel::Attach,
        Channel::Color,
        Channel::Wheels,
        Channel::Leather,
        Channel::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Attach => "attach",
            Channel::Color => "color",
            Channel::Wheels => "wheels",
            Channel::Leather => "leather",
            Channel::Accessories => "packaging and accessories",
        }
    }

    /// The options category this channel constrains, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Channel::Attach => None,
            Channel::Color => Some(Category::Color),
            Channel::Wheels => Some(Category::Wheels),
            Channel::Leather => Some(Category::Leather),
            Channel::Accessories => Some(Category::Accessories),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
