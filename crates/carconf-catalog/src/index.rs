//! Read-only lookup index over a catalog document.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::warn;

use carconf_expr::{Selection, evaluate};
use carconf_model::{
    AccessoryGroup, Camera, CameraKind, CatalogDocument, CatalogEntry, Category, Element,
    GroupMember, StyleKey,
};

use crate::error::CatalogError;

/// One `market-mmc-trim` combination and the codes it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub key: StyleKey,
    pub label: String,
    pub available: String,
}

impl StyleRecord {
    /// Whether the style key or the availability string names `code`.
    pub fn references(&self, code: &str) -> bool {
        self.key.tokens().any(|token| token == code)
            || carconf_expr::parse(&self.available)
                .map(|expr| expr.codes().contains(&code))
                .unwrap_or(false)
    }
}

/// An entry of the default list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEntry {
    pub category: Category,
    pub code: String,
}

/// Lookup index built once per catalog load.
#[derive(Debug, Clone)]
pub struct Catalog {
    elements: IndexMap<Category, Vec<Element>>,
    by_code: HashMap<String, (Category, usize)>,
    category_by_code: HashMap<String, Category>,
    accessory_groups: Vec<AccessoryGroup>,
    styles: Vec<StyleRecord>,
    defaults: Vec<DefaultEntry>,
    cameras: Vec<Camera>,
    correct_as_of: Option<NaiveDate>,
    fingerprint: String,
}

impl Catalog {
    pub(crate) fn build(
        document: CatalogDocument,
        fingerprint: String,
    ) -> Result<Self, CatalogError> {
        let mut elements: IndexMap<Category, Vec<Element>> = IndexMap::new();
        let mut accessory_groups = Vec::new();
        let mut correct_as_of = None;

        for block in document {
            if block.category == Category::Unknown {
                continue;
            }
            if let Some(value) = &block.correct_as_of {
                correct_as_of = Some(parse_date(value)?);
            }
            if block.category == Category::Accessories {
                accessory_groups.extend(block.elements.iter().flat_map(accessory_groups_of));
            }
            let flattened = elements.entry(block.category).or_default();
            for entry in &block.elements {
                flattened.extend(entry.elements().into_iter().cloned());
            }
        }

        let mut by_code = HashMap::new();
        let mut category_by_code = HashMap::new();
        for (category, list) in &elements {
            for (index, element) in list.iter().enumerate() {
                if matches!(category, Category::Date | Category::Default) {
                    continue;
                }
                by_code
                    .entry(element.code.clone())
                    .or_insert((*category, index));
                if category.is_indexed() {
                    category_by_code
                        .entry(element.code.clone())
                        .or_insert(*category);
                }
            }
        }

        let styles = elements
            .get(&Category::Style)
            .into_iter()
            .flatten()
            .map(|element| {
                Ok(StyleRecord {
                    key: StyleKey::parse(element.code.clone())?,
                    label: element.label.clone(),
                    available: element.available.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        let defaults = elements
            .get(&Category::Default)
            .into_iter()
            .flatten()
            .map(|element| match element.category {
                Some(category) => Ok(DefaultEntry {
                    category,
                    code: element.code.clone(),
                }),
                None => Err(CatalogError::MissingCategory {
                    code: element.code.clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cameras = elements
            .get(&Category::Camera)
            .into_iter()
            .flatten()
            .map(camera_from_element)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            elements,
            by_code,
            category_by_code,
            accessory_groups,
            styles,
            defaults,
            cameras,
            correct_as_of,
            fingerprint,
        })
    }

    /// First element with `code`, searching every block but `date` and `default`.
    pub fn find_element(&self, code: &str) -> Option<&Element> {
        let (category, index) = self.by_code.get(code)?;
        self.elements.get(category)?.get(*index)
    }

    /// Category owning `code`. Codes found nowhere else are accessories.
    pub fn category_of(&self, code: &str) -> Category {
        self.category_by_code
            .get(code)
            .copied()
            .unwrap_or(Category::Accessories)
    }

    /// Every element of `category`, groups flattened.
    pub fn elements_of(&self, category: Category) -> &[Element] {
        self.elements
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn style_records(&self) -> &[StyleRecord] {
        &self.styles
    }

    pub fn style_record(&self, key: &StyleKey) -> Option<&StyleRecord> {
        self.styles.iter().find(|style| &style.key == key)
    }

    pub fn default_list(&self) -> &[DefaultEntry] {
        &self.defaults
    }

    pub fn accessory_groups(&self) -> &[AccessoryGroup] {
        &self.accessory_groups
    }

    pub fn accessory_group_of(&self, code: &str) -> Option<&AccessoryGroup> {
        self.accessory_groups.iter().find(|group| group.contains(code))
    }

    pub fn mmc_records(&self) -> &[Element] {
        self.elements_of(Category::Mmc)
    }

    /// First MMC whose availability holds for `selected`. A missing
    /// availability string counts as always true.
    pub fn valid_mmc<S: Selection + ?Sized>(&self, selected: &S) -> Option<&Element> {
        self.mmc_records().iter().find(|mmc| {
            let available = mmc.available.as_deref().unwrap_or("");
            match evaluate(available, selected) {
                Ok(result) => result,
                Err(error) => {
                    warn!(code = %mmc.code, %error, "malformed mmc availability");
                    false
                }
            }
        })
    }

    /// Trims that appear in at least one style of `market`.
    pub fn filtered_trims(&self, market: &str) -> Vec<&Element> {
        let trims: Vec<String> = self
            .styles
            .iter()
            .map(|style| style.key.parts())
            .filter(|parts| parts.market == market)
            .map(|parts| parts.trim)
            .collect();
        self.elements_of(Category::Trim)
            .iter()
            .filter(|trim| trims.contains(&trim.code))
            .collect()
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn cameras_of(&self, kind: CameraKind) -> impl Iterator<Item = &Camera> {
        self.cameras.iter().filter(move |camera| camera.kind == kind)
    }

    pub fn correct_as_of(&self) -> Option<NaiveDate> {
        self.correct_as_of
    }

    /// Lowercase hex sha256 of the source document.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Categories present in the catalog, in document order.
    pub fn categories(&self) -> impl Iterator<Item = Category> {
        self.elements.keys().copied()
    }
}

fn accessory_groups_of(entry: &CatalogEntry) -> Vec<AccessoryGroup> {
    match entry {
        CatalogEntry::Element(element) => vec![AccessoryGroup {
            multiple_selection: true,
            elements: vec![element.clone()],
        }],
        CatalogEntry::Group(group) if !group.hybrid_selection => vec![AccessoryGroup {
            multiple_selection: group.multiple_selection,
            elements: entry.elements().into_iter().cloned().collect(),
        }],
        CatalogEntry::Group(group) => group
            .group_elements
            .iter()
            .map(|member| match member {
                GroupMember::SubGroup(sub) => AccessoryGroup {
                    multiple_selection: sub.multiple_selection,
                    elements: sub.elements.clone(),
                },
                GroupMember::Element(element) => AccessoryGroup {
                    multiple_selection: true,
                    elements: vec![element.clone()],
                },
            })
            .collect(),
    }
}

fn camera_from_element(element: &Element) -> Result<Camera, CatalogError> {
    let kind = match element.kind.as_deref() {
        Some("EXT") => CameraKind::Exterior,
        Some("INT") => CameraKind::Interior,
        other => {
            return Err(CatalogError::InvalidCamera {
                code: element.code.clone(),
                kind: other.map(str::to_string),
            });
        }
    };
    Ok(Camera {
        kind,
        code: element.code.clone(),
        group: element.group.clone(),
        available: element.available.clone(),
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, CatalogError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(trimmed).map(|datetime| datetime.date_naive())
        })
        .map_err(|source| CatalogError::InvalidDate {
            value: value.to_string(),
            source,
        })
}
