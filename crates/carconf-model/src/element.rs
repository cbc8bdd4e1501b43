//! Catalog document types.

use serde::{Deserialize, Serialize};

use crate::category::{Category, Channel};

/// Codes an element pulls in, one boolean string per channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableSpec {
    /// Style key this variant applies to; absent or empty means every style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_ref: Option<String>,
    #[serde(default)]
    pub attach: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub wheels: String,
    #[serde(default)]
    pub leather: String,
    #[serde(default, rename = "packaging and accessories")]
    pub accessories: String,
}

static EMPTY_SPEC: EnableSpec = EnableSpec {
    style_ref: None,
    attach: String::new(),
    color: String::new(),
    wheels: String::new(),
    leather: String::new(),
    accessories: String::new(),
};

impl EnableSpec {
    pub fn channel(&self, channel: Channel) -> &str {
        match channel {
            Channel::Attach => &self.attach,
            Channel::Color => &self.color,
            Channel::Wheels => &self.wheels,
            Channel::Leather => &self.leather,
            Channel::Accessories => &self.accessories,
        }
    }

    fn matches_style(&self, style: &str) -> bool {
        self.style_ref
            .as_deref()
            .is_none_or(|style_ref| style_ref.is_empty() || style_ref == style)
    }
}

/// Either a single spec or a list of per-style variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnableCodes {
    Variants(Vec<EnableSpec>),
    Single(EnableSpec),
}

impl EnableCodes {
    /// The spec in effect for `style`.
    ///
    /// A single spec always applies. For variants, the first one without a
    /// style reference or referencing `style` wins; otherwise every channel
    /// is empty.
    pub fn for_style(&self, style: &str) -> &EnableSpec {
        match self {
            EnableCodes::Single(spec) => spec,
            EnableCodes::Variants(variants) => variants
                .iter()
                .find(|variant| variant.matches_style(style))
                .unwrap_or(&EMPTY_SPEC),
        }
    }
}

/// A selectable catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub code: String,
    #[serde(default)]
    pub label: String,
    /// When true the element is forced on. Absent means never standard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    /// When true the element may be chosen. Absent means never available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_codes: Option<EnableCodes>,
    /// Codes whose selection keeps a standard part off.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutually_excluded: Vec<String>,
    /// Target category; only used by entries of the default list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Presentation type; `EXT`/`INT` for cameras.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Element {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_standard(mut self, expr: impl Into<String>) -> Self {
        self.standard = Some(expr.into());
        self
    }

    #[must_use]
    pub fn with_available(mut self, expr: impl Into<String>) -> Self {
        self.available = Some(expr.into());
        self
    }

    #[must_use]
    pub fn with_enable_codes(mut self, enable_codes: EnableCodes) -> Self {
        self.enable_codes = Some(enable_codes);
        self
    }

    pub fn has_enable_codes(&self) -> bool {
        self.enable_codes.is_some()
    }

    /// The enable spec in effect for `style`, if the element has any.
    pub fn enable_spec(&self, style: &str) -> Option<&EnableSpec> {
        self.enable_codes
            .as_ref()
            .map(|enable_codes| enable_codes.for_style(style))
    }
}

/// A sub-group inside a hybrid group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubGroup {
    #[serde(default)]
    pub multiple_selection: bool,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupMember {
    SubGroup(SubGroup),
    Element(Element),
}

/// A named group of elements, as used for accessories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementGroup {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub multiple_selection: bool,
    /// Members are [`SubGroup`]s, each with its own selection mode.
    #[serde(default)]
    pub hybrid_selection: bool,
    pub group_elements: Vec<GroupMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    Group(ElementGroup),
    Element(Element),
}

impl CatalogEntry {
    /// The elements this entry stands for, groups flattened.
    pub fn elements(&self) -> Vec<&Element> {
        match self {
            CatalogEntry::Element(element) => vec![element],
            CatalogEntry::Group(group) => group
                .group_elements
                .iter()
                .flat_map(|member| match member {
                    GroupMember::Element(element) => vec![element],
                    GroupMember::SubGroup(sub) => sub.elements.iter().collect(),
                })
                .collect(),
        }
    }
}

/// One `{category, elements}` block of a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBlock {
    pub category: Category,
    #[serde(default)]
    pub elements: Vec<CatalogEntry>,
    /// Only present on the `date` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_as_of: Option<String>,
}

pub type CatalogDocument = Vec<CategoryBlock>;

/// Selection unit of the accessory deriver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryGroup {
    pub multiple_selection: bool,
    pub elements: Vec<Element>,
}

impl AccessoryGroup {
    pub fn contains(&self, code: &str) -> bool {
        self.elements.iter().any(|element| element.code == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraKind {
    #[serde(rename = "EXT")]
    Exterior,
    #[serde(rename = "INT")]
    Interior,
}

impl CameraKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraKind::Exterior => "EXT",
            CameraKind::Interior => "INT",
        }
    }
}

/// A render viewpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    pub kind: CameraKind,
    pub code: String,
    pub group: Option<String>,
    pub available: Option<String>,
}

impl Camera {
    /// Comma-joined form used in render queries: `EXT,C01`.
    pub fn query_fragment(&self) -> String {
        format!("{},{}", self.kind.as_str(), self.code)
    }
}
