//! Loading the catalog and replaying command-line selections.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use carconf_catalog::{Catalog, default_catalog_path, load_catalog, load_engine_options};
use carconf_engine::{Configuration, Configurator, SelectOutcome, StyleCandidate};
use carconf_model::{EngineOptions, StyleTieBreak, parse_assignment};

/// Engine switches given on the command line; they win over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOverrides {
    pub no_reapply: bool,
    pub no_market_fallback: bool,
    pub first_style: bool,
}

impl EngineOverrides {
    pub fn apply(&self, mut options: EngineOptions) -> EngineOptions {
        if self.no_reapply {
            options.reapply_or_groups = false;
        }
        if self.no_market_fallback {
            options.market_fallback = false;
        }
        if self.first_style {
            options.style_tie_break = StyleTieBreak::First;
        }
        options
    }
}

/// A selection matched several styles equally and no `--pick` was given.
#[derive(Debug)]
pub struct AmbiguousSelection {
    pub assignment: String,
    pub candidates: Vec<StyleCandidate>,
}

impl fmt::Display for AmbiguousSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self
            .candidates
            .iter()
            .map(|candidate| candidate.style.as_str())
            .collect();
        write!(
            f,
            "{} matches {} styles equally ({}); choose one with --pick",
            self.assignment,
            self.candidates.len(),
            keys.join(", ")
        )
    }
}

impl std::error::Error for AmbiguousSelection {}

/// `--catalog`, else `$CARCONF_CATALOG`.
pub fn catalog_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(default_catalog_path)
        .ok_or_else(|| anyhow!("no catalog given; pass --catalog or set CARCONF_CATALOG"))
}

pub fn open_catalog(explicit: Option<&Path>) -> Result<Catalog> {
    let path = catalog_path(explicit)?;
    let catalog =
        load_catalog(&path).with_context(|| format!("load catalog {}", path.display()))?;
    info!(
        path = %path.display(),
        correct_as_of = ?catalog.correct_as_of(),
        "catalog loaded"
    );
    Ok(catalog)
}

pub fn engine_options(config: Option<&Path>, overrides: EngineOverrides) -> Result<EngineOptions> {
    let options = match config {
        Some(path) => load_engine_options(path)
            .with_context(|| format!("load engine options {}", path.display()))?,
        None => EngineOptions::default(),
    };
    Ok(overrides.apply(options))
}

/// Start from the defaults, apply every `CATEGORY=CODE` assignment in order,
/// then switch off the `deselect` accessories.
///
/// When a selection matches several styles equally, `pick` chooses the
/// candidate; without it the replay fails with [`AmbiguousSelection`].
pub fn replay(
    configurator: &Configurator<'_>,
    assignments: &[String],
    deselect: &[String],
    pick: Option<usize>,
) -> Result<Configuration> {
    let mut current = configurator.apply_defaults();

    for assignment in assignments {
        let (category, code) = parse_assignment(assignment)
            .with_context(|| format!("parse selection '{assignment}'"))?;
        let outcome = configurator
            .select_option(&current, category, &code)
            .with_context(|| format!("select {category}={code}"))?;
        current = match outcome {
            SelectOutcome::Applied(next) => next,
            SelectOutcome::Ambiguous(candidates) => {
                let Some(index) = pick else {
                    return Err(AmbiguousSelection {
                        assignment: assignment.clone(),
                        candidates,
                    }
                    .into());
                };
                let candidate = candidates.get(index).with_context(|| {
                    format!("--pick {index} out of range for {} candidates", candidates.len())
                })?;
                debug!(style = %candidate.style, "picked style candidate");
                configurator.apply_candidate(candidate)
            }
        };
    }

    for code in deselect {
        current = configurator
            .deselect_accessory(&current, code)
            .with_context(|| format!("deselect {code}"))?;
    }

    Ok(current)
}
