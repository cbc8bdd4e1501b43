//! User-facing operations over a caller-owned [`Configuration`].
//!
//! Every operation takes the current configuration by reference and returns
//! a new one. A rejected operation returns an error and the caller keeps
//! what it had.

use tracing::{debug, debug_span, warn};

use carconf_catalog::Catalog;
use carconf_model::{
    ActivationTree, Category, EngineOptions, LockedCategories, OptionsState, ReverseMap,
    StyleKey, StyleTieBreak,
};

use crate::derive::{Configuration, derive_standard_and_hidden};
use crate::error::{EngineError, Result};
use crate::merge::{activate, remove_activation_and_update};
use crate::style::{
    ReapplyStatus, StyleCandidate, find_compatible_or_groups, find_compatible_styles,
    rank_by_minimal_change, reapply_activations,
};

/// Result of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Applied(Configuration),
    /// Several styles tie for the fewest core changes; pick one and pass it
    /// to [`Configurator::apply_candidate`].
    Ambiguous(Vec<StyleCandidate>),
}

impl SelectOutcome {
    pub fn applied(self) -> Option<Configuration> {
        match self {
            SelectOutcome::Applied(configuration) => Some(configuration),
            SelectOutcome::Ambiguous(_) => None,
        }
    }
}

/// Entry point of the engine, bound to one catalog.
#[derive(Debug, Clone)]
pub struct Configurator<'c> {
    catalog: &'c Catalog,
    options: EngineOptions,
}

impl<'c> Configurator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn engine_options(&self) -> &EngineOptions {
        &self.options
    }

    /// Build the initial configuration from the catalog's default list.
    ///
    /// A style entry contributes its MMC. Default elements with enable codes,
    /// and default accessories, are activated in list order; an element that
    /// cannot be activated is logged and left as set.
    pub fn apply_defaults(&self) -> Configuration {
        let catalog = self.catalog;
        let mut options = OptionsState::new();
        let mut to_activate = Vec::new();

        for entry in catalog.default_list() {
            if entry.category == Category::Style {
                match StyleKey::parse(entry.code.clone()) {
                    Ok(key) => options.set(Category::Mmc, key.parts().mmc),
                    Err(error) => warn!(%error, "ignoring malformed default style"),
                }
                continue;
            }
            let Some(element) = catalog.find_element(&entry.code) else {
                warn!(code = %entry.code, category = %entry.category, "default element not found");
                continue;
            };
            options.set(entry.category, entry.code.clone());
            if element.has_enable_codes() || entry.category.is_accessory_like() {
                to_activate.push(element);
            }
        }

        let mut activated = options.clone();
        let mut tree = ActivationTree::new();
        for element in to_activate {
            match activate(catalog, &activated, &tree, element, &[]) {
                Ok(state) => (activated, tree) = state,
                Err(error) => warn!(code = %element.code, %error, "failed to activate default element"),
            }
        }

        if self.options.warn_on_default_drift {
            let tracked: Vec<Category> = Category::STYLE
                .into_iter()
                .chain(Category::NON_CORE)
                .collect();
            let changed = options.changed_categories(&activated, &tracked);
            if !changed.is_empty() {
                warn!(?changed, "default options changed after activation");
            }
        }

        derive_standard_and_hidden(catalog, &activated, &tree, None)
    }

    pub fn reset_to_defaults(&self) -> Configuration {
        self.apply_defaults()
    }

    /// Select `code` in `category`.
    ///
    /// Re-selecting the current value of a single-select category, or an
    /// accessory that is already on, returns the configuration unchanged.
    pub fn select_option(
        &self,
        current: &Configuration,
        category: Category,
        code: &str,
    ) -> Result<SelectOutcome> {
        let _span = debug_span!("select", %category, code).entered();

        if category == Category::Accessories {
            return self
                .select_accessory(current, code)
                .map(SelectOutcome::Applied);
        }
        if current.options.get(category) == code {
            debug!("already selected");
            return Ok(SelectOutcome::Applied(current.clone()));
        }
        if category.is_style() {
            return self.select_style(current, category, code);
        }
        if category.is_non_core() {
            return self
                .select_non_core(current, category, code)
                .map(SelectOutcome::Applied);
        }
        Err(EngineError::NotSelectable { category })
    }

    /// Derive the configuration for a style candidate.
    pub fn apply_candidate(&self, candidate: &StyleCandidate) -> Configuration {
        derive_standard_and_hidden(self.catalog, &candidate.options, &candidate.tree, None)
    }

    /// Switch off an accessory that was selected directly.
    pub fn deselect_accessory(&self, current: &Configuration, code: &str) -> Result<Configuration> {
        let catalog = self.catalog;
        if !catalog.category_of(code).is_accessory_like() {
            return Err(EngineError::NotAnAccessory(code.to_string()));
        }
        if !current.options.is_accessory_selected(code) {
            return Ok(current.clone());
        }

        let reverse = current.tree.reverse_map(true);
        if let Some(by) = reverse.activated_by(code).filter(|by| !by.is_empty()) {
            return Err(EngineError::PassivelyActivated {
                code: code.to_string(),
                by: by.iter().cloned().collect(),
            });
        }

        let (mut options, tree) =
            remove_activation_and_update(catalog, &current.options, &current.tree, code);
        options.remove_accessory(code);
        Ok(derive_standard_and_hidden(catalog, &options, &tree, None))
    }

    /// Which base codes activated and disabled each code, bases excluded.
    pub fn explain(&self, current: &Configuration) -> ReverseMap {
        current.tree.reverse_map(true)
    }

    /// Categories pinned by other selections, with the alternatives offered.
    pub fn locked_categories(&self, current: &Configuration) -> LockedCategories {
        current.tree.locked_categories(false)
    }

    fn select_style(
        &self,
        current: &Configuration,
        category: Category,
        code: &str,
    ) -> Result<SelectOutcome> {
        let catalog = self.catalog;
        let styles = find_compatible_styles(
            catalog,
            &current.options,
            category,
            code,
            self.options.market_fallback,
        );
        if styles.is_empty() {
            return Err(EngineError::NoCompatibleStyle {
                category,
                code: code.to_string(),
            });
        }

        let ranked = rank_by_minimal_change(catalog, &current.options, &styles, category, code)?;
        let candidates: Vec<StyleCandidate> = ranked.into_values().collect();
        debug!(candidates = candidates.len(), "ranked styles");

        match candidates.len() {
            0 => Err(EngineError::NoCompatibleStyle {
                category,
                code: code.to_string(),
            }),
            1 => Ok(SelectOutcome::Applied(self.apply_candidate(&candidates[0]))),
            _ if self.options.style_tie_break == StyleTieBreak::First => {
                Ok(SelectOutcome::Applied(self.apply_candidate(&candidates[0])))
            }
            _ => Ok(SelectOutcome::Ambiguous(candidates)),
        }
    }

    fn select_non_core(
        &self,
        current: &Configuration,
        category: Category,
        code: &str,
    ) -> Result<Configuration> {
        let catalog = self.catalog;
        let reverse = current.tree.reverse_map(true);
        if let Some(by) = reverse.disabled_by(code) {
            return Err(EngineError::DisabledBy {
                code: code.to_string(),
                by: by.iter().cloned().collect(),
            });
        }
        let element = catalog
            .find_element(code)
            .ok_or_else(|| EngineError::ElementNotFound(code.to_string()))?;
        let old = current.options.get(category);

        let mut reapplied = None;
        if self.options.reapply_or_groups {
            let groups = find_compatible_or_groups(&current.tree, category, old, code);
            if !groups.is_empty() {
                let outcome = reapply_activations(catalog, &current.options, &current.tree, &groups);
                if outcome.status == ReapplyStatus::Failed {
                    warn!("failed to reapply activations, falling back to plain activation");
                } else {
                    reapplied = Some((outcome.options, outcome.tree));
                }
            }
        }

        let (options, tree) = match reapplied {
            Some(state) => state,
            None => {
                let mut tree = current.tree.clone();
                tree.remove_activation(old, false);
                activate(catalog, &current.options, &tree, element, &[])?
            }
        };
        Ok(derive_standard_and_hidden(catalog, &options, &tree, None))
    }

    fn select_accessory(&self, current: &Configuration, code: &str) -> Result<Configuration> {
        let catalog = self.catalog;
        let element = catalog
            .find_element(code)
            .ok_or_else(|| EngineError::ElementNotFound(code.to_string()))?;
        if !catalog.category_of(code).is_accessory_like() {
            return Err(EngineError::NotAnAccessory(code.to_string()));
        }
        if current.options.is_accessory_selected(code) {
            debug!("accessory already selected");
            return Ok(current.clone());
        }

        let mut tree = current.tree.clone();
        if let Some(group) = catalog
            .accessory_group_of(code)
            .filter(|group| !group.multiple_selection)
        {
            for sibling in group.elements.iter().filter(|element| element.code != code) {
                tree.remove_activation(&sibling.code, false);
            }
        }

        let (options, tree) = activate(catalog, &current.options, &tree, element, &[])?;
        Ok(derive_standard_and_hidden(catalog, &options, &tree, Some(code)))
    }
}
