//! The current selection.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ModelError;
use crate::category::Category;

/// `market-mmc-trim`, the key style records and enable-code variants use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleKey(String);

/// The three parts of a [`StyleKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleParts {
    pub market: String,
    pub mmc: String,
    pub trim: String,
}

impl StyleKey {
    pub fn from_parts(market: &str, mmc: &str, trim: &str) -> Self {
        Self(format!("{market}-{mmc}-{trim}"))
    }

    pub fn parse(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if value.split('-').count() != 3 {
            return Err(ModelError::InvalidStyleKey(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parts(&self) -> StyleParts {
        let mut split = self.0.splitn(3, '-');
        let mut next = || split.next().unwrap_or_default().to_string();
        StyleParts {
            market: next(),
            mmc: next(),
            trim: next(),
        }
    }

    /// The style key's segments, used for code matching.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split('-')
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selected code per single-select category plus the accessory set.
///
/// Both maps keep insertion order; the flattened code list depends on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsState {
    #[serde(flatten)]
    values: IndexMap<Category, String>,
    #[serde(default, rename = "packaging and accessories")]
    accessories: IndexMap<String, bool>,
}

impl OptionsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected code, or `""` when nothing is selected.
    pub fn get(&self, category: Category) -> &str {
        self.values.get(&category).map_or("", String::as_str)
    }

    pub fn value(&self, category: Category) -> Option<&str> {
        self.values
            .get(&category)
            .map(String::as_str)
            .filter(|code| !code.is_empty())
    }

    /// Set a single-select value. Accessory-like categories go to the accessory set.
    pub fn set(&mut self, category: Category, code: impl Into<String>) {
        if category.is_accessory_like() {
            self.select_accessory(code);
        } else {
            self.values.insert(category, code.into());
        }
    }

    #[must_use]
    pub fn with(mut self, category: Category, code: impl Into<String>) -> Self {
        self.set(category, code);
        self
    }

    pub fn values(&self) -> impl Iterator<Item = (Category, &str)> {
        self.values
            .iter()
            .map(|(category, code)| (*category, code.as_str()))
    }

    pub fn accessories(&self) -> &IndexMap<String, bool> {
        &self.accessories
    }

    pub fn is_accessory_selected(&self, code: &str) -> bool {
        self.accessories.get(code).copied().unwrap_or(false)
    }

    /// Accessory codes currently switched on, in selection order.
    pub fn active_accessories(&self) -> Vec<&str> {
        self.accessories
            .iter()
            .filter(|(_, on)| **on)
            .map(|(code, _)| code.as_str())
            .collect()
    }

    pub fn select_accessory(&mut self, code: impl Into<String>) {
        self.accessories.insert(code.into(), true);
    }

    pub fn remove_accessory(&mut self, code: &str) {
        self.accessories.shift_remove(code);
    }

    pub fn clear_accessories(&mut self) {
        self.accessories.clear();
    }

    /// Flattened code list: MMC first, then every other value in insertion
    /// order, then the switched-on accessories. Empty codes are dropped.
    pub fn selected_codes(&self) -> Vec<String> {
        let mut codes = Vec::with_capacity(self.values.len() + self.accessories.len());
        if let Some(mmc) = self.value(Category::Mmc) {
            codes.push(mmc.to_string());
        }
        codes.extend(
            self.values
                .iter()
                .filter(|(category, code)| **category != Category::Mmc && !code.is_empty())
                .map(|(_, code)| code.clone()),
        );
        codes.extend(
            self.active_accessories()
                .into_iter()
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        );
        codes
    }

    pub fn style_key(&self) -> StyleKey {
        StyleKey::from_parts(
            self.get(Category::Market),
            self.get(Category::Mmc),
            self.get(Category::Trim),
        )
    }

    /// Categories among `categories` whose value differs from `other`.
    pub fn changed_categories(&self, other: &Self, categories: &[Category]) -> Vec<Category> {
        categories
            .iter()
            .copied()
            .filter(|category| self.get(*category) != other.get(*category))
            .collect()
    }
}

/// Parse a `CATEGORY=CODE` assignment.
pub fn parse_assignment(value: &str) -> Result<(Category, String), ModelError> {
    let Some((category, code)) = value.split_once('=') else {
        return Err(ModelError::InvalidAssignment(value.to_string()));
    };
    let code = code.trim();
    if code.is_empty() {
        return Err(ModelError::InvalidAssignment(value.to_string()));
    }
    Ok((category.parse()?, code.to_string()))
}
