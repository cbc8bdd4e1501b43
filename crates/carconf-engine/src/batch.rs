//! Batch enumeration of valid configurations for export.
//!
//! Starting from a configuration, every requested dimension is expanded in
//! the order trim, drivetrain, body style, color, color theme, then camera.
//! Combinations that cannot be made valid are logged and skipped.

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use carconf_catalog::Catalog;
use carconf_model::{ActivationTree, Camera, CameraKind, Category, Element, OptionsState};

use crate::availability::{
    available_elements, invalid_non_core_categories, standard_or_first_available,
};
use crate::derive::{Configuration, derive_standard_and_hidden};
use crate::merge::activate;
use crate::render::{code_list, file_stem};

/// Which dimensions to expand. A dimension left off keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchDimensions {
    pub trims: bool,
    pub drivetrains: bool,
    pub bodystyles: bool,
    pub colors: bool,
    pub color_themes: bool,
    pub exterior_cameras: bool,
    pub interior_cameras: bool,
}

impl BatchDimensions {
    /// Whether a core dimension is expanded, which requires a fresh MMC.
    pub fn any_core(&self) -> bool {
        self.trims || self.drivetrains || self.bodystyles
    }
}

/// One image to export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItem {
    pub options: OptionsState,
    pub standard_parts: Vec<String>,
    pub camera: Camera,
    pub code_list: String,
    pub file_stem: String,
}

/// Lazily enumerate the export items for `base`.
pub fn enumerate_batch<'c>(
    catalog: &'c Catalog,
    base: &Configuration,
    camera: &Camera,
    dims: BatchDimensions,
) -> impl Iterator<Item = BatchItem> + use<'c> {
    let cameras = cameras_for(catalog, camera, dims);
    let mut start = base.options.clone();
    start.clear_accessories();

    core_combinations(catalog, &start, dims)
        .into_iter()
        .flat_map(move |core| color_states(catalog, &core, dims))
        .flat_map(move |(options, tree)| theme_states(catalog, &options, &tree, dims))
        .filter_map(move |(options, tree)| finish(catalog, &options, &tree))
        .flat_map(move |configuration| {
            cameras
                .clone()
                .into_iter()
                .map(move |camera| item(&configuration, camera))
        })
}

fn cameras_for(catalog: &Catalog, current: &Camera, dims: BatchDimensions) -> Vec<Camera> {
    if !dims.exterior_cameras && !dims.interior_cameras {
        return vec![current.clone()];
    }
    let mut cameras = Vec::new();
    if dims.exterior_cameras {
        cameras.extend(catalog.cameras_of(CameraKind::Exterior).cloned());
    }
    if dims.interior_cameras {
        cameras.extend(catalog.cameras_of(CameraKind::Interior).cloned());
    }
    cameras
}

fn codes(elements: Vec<&Element>) -> Vec<String> {
    elements.into_iter().map(|element| element.code.clone()).collect()
}

/// Trim, drivetrain and body style combinations, each with a valid MMC
/// when a core dimension is expanded.
fn core_combinations(
    catalog: &Catalog,
    start: &OptionsState,
    dims: BatchDimensions,
) -> Vec<OptionsState> {
    let none = IndexSet::new();
    let trims = if dims.trims {
        codes(catalog.filtered_trims(start.get(Category::Market)))
    } else {
        vec![start.get(Category::Trim).to_string()]
    };

    let mut combinations = Vec::new();
    for trim in trims {
        let with_trim = start.clone().with(Category::Trim, trim);
        let drivetrains = if dims.drivetrains {
            codes(available_elements(catalog, &with_trim, Category::Drivetrain, &none))
        } else {
            vec![start.get(Category::Drivetrain).to_string()]
        };

        for drivetrain in drivetrains {
            let with_drivetrain = with_trim.clone().with(Category::Drivetrain, drivetrain);
            let bodystyles = if dims.bodystyles {
                codes(available_elements(
                    catalog,
                    &with_drivetrain,
                    Category::BodyStyle,
                    &none,
                ))
            } else {
                vec![start.get(Category::BodyStyle).to_string()]
            };

            for bodystyle in bodystyles {
                let mut core = with_drivetrain.clone().with(Category::BodyStyle, bodystyle);
                if dims.any_core() {
                    let selected = core.selected_codes();
                    let Some(mmc) = catalog.valid_mmc(&selected) else {
                        warn!(selected = ?selected, "no valid mmc, skipping combination");
                        continue;
                    };
                    core.set(Category::Mmc, mmc.code.clone());
                }
                combinations.push(core);
            }
        }
    }
    combinations
}

fn color_states(
    catalog: &Catalog,
    core: &OptionsState,
    dims: BatchDimensions,
) -> Vec<(OptionsState, ActivationTree)> {
    let none = IndexSet::new();
    let colors = if dims.colors {
        available_elements(catalog, core, Category::Color, &none)
    } else {
        standard_or_first_available(catalog, core, Category::Color, &none)
            .into_iter()
            .collect()
    };
    if colors.is_empty() {
        return vec![(core.clone().with(Category::Color, ""), ActivationTree::new())];
    }

    colors
        .into_iter()
        .filter_map(|color| {
            match activate(catalog, core, &ActivationTree::new(), color, &[]) {
                Ok(state) => Some(state),
                Err(error) => {
                    warn!(code = %color.code, %error, "skipping color");
                    None
                }
            }
        })
        .collect()
}

fn theme_states(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
    dims: BatchDimensions,
) -> Vec<(OptionsState, ActivationTree)> {
    let disabled = tree.disabled_codes();
    let themes = if dims.color_themes {
        available_elements(catalog, options, Category::Leather, &disabled)
    } else {
        standard_or_first_available(catalog, options, Category::Leather, &disabled)
            .into_iter()
            .collect()
    };
    if themes.is_empty() {
        return correct_wheels(catalog, options.clone(), tree.clone(), &disabled)
            .into_iter()
            .collect();
    }

    themes
        .into_iter()
        .filter_map(|theme| {
            let mut base_tree = tree.clone();
            base_tree.remove_activation(options.get(Category::Leather), false);
            let (options, tree) = match activate(catalog, options, &base_tree, theme, &[]) {
                Ok(state) => state,
                Err(error) => {
                    warn!(code = %theme.code, %error, "skipping color theme");
                    return None;
                }
            };
            correct_wheels(catalog, options, tree, &disabled)
        })
        .collect()
}

fn correct_wheels(
    catalog: &Catalog,
    mut options: OptionsState,
    mut tree: ActivationTree,
    disabled: &IndexSet<String>,
) -> Option<(OptionsState, ActivationTree)> {
    tree.remove_activation(options.get(Category::Wheels), false);
    let Some(wheel) = standard_or_first_available(catalog, &options, Category::Wheels, disabled)
    else {
        options.set(Category::Wheels, "");
        return Some((options, tree));
    };
    match activate(catalog, &options, &tree, wheel, &[]) {
        Ok(state) => Some(state),
        Err(error) => {
            warn!(code = %wheel.code, %error, "skipping combination, wheel cannot be activated");
            None
        }
    }
}

fn finish(
    catalog: &Catalog,
    options: &OptionsState,
    tree: &ActivationTree,
) -> Option<Configuration> {
    let invalid = invalid_non_core_categories(catalog, options, tree);
    if !invalid.is_empty() {
        warn!(
            style = %options.style_key(),
            categories = ?invalid,
            "skipping combination with invalid values"
        );
        return None;
    }
    Some(derive_standard_and_hidden(catalog, options, tree, None))
}

fn item(configuration: &Configuration, camera: Camera) -> BatchItem {
    let codes = code_list(
        &configuration.options,
        &configuration.tree,
        &configuration.standard_parts,
    );
    let stem = file_stem(&configuration.options, &camera);
    debug!(file_stem = %stem, "batch item");
    BatchItem {
        options: configuration.options.clone(),
        standard_parts: configuration.standard_parts.clone(),
        camera,
        code_list: codes,
        file_stem: stem,
    }
}
