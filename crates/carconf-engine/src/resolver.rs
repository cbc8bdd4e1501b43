//! Activation resolver.
//!
//! Resolving a root element walks its enable codes depth first and decides,
//! per channel, which alternative to activate. The walk runs twice:
//!
//! 1. a discovery pass that never fails and collects, per channel, every OR
//!    group and excluded code met anywhere in the walk;
//! 2. a resolution pass that skips excluded codes and alternatives outside
//!    the intersection of the OR groups, and fails with
//!    [`EngineError::Unsatisfiable`] when a channel has no alternative left.
//!
//! Disabled codes found in the discovery pass stay disabled for the second.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use carconf_catalog::Catalog;
use carconf_expr::{Segregation, segregate};
use carconf_model::{
    ActivationNode, ActivationRecord, Category, Channel, Element, EnableSpec, OptionsState,
    OrCodeGroup, StyleKey,
};

use crate::error::{EngineError, Result};

/// Resolve `root` into an activation record.
///
/// `skip_codes` are never activated; the OR-group reapply path uses them to
/// steer a base code towards one alternative.
pub fn resolve(
    catalog: &Catalog,
    options: &OptionsState,
    root: &Element,
    style: &StyleKey,
    skip_codes: &[String],
) -> Result<ActivationRecord> {
    let mut resolver = Resolver::new(catalog, options, style.as_str());
    let roots = [root.code.clone()];
    let skip: IndexSet<String> = skip_codes.iter().cloned().collect();

    resolver.walk(&roots, &skip, false)?;

    let (filtered, next_skip) = resolver.filter_or_groups(&skip);
    resolver.reset();
    debug!(code = %root.code, skip = ?next_skip, "resolution pass");
    let nodes = resolver.walk(&roots, &next_skip, true)?;

    Ok(ActivationRecord {
        base: root.code.clone(),
        nodes,
        attach: resolver.attach.into_iter().collect(),
        disabled_codes: resolver.pending_disabled.into_iter().collect(),
        filtered_code_groups: filtered,
        locked_categories: resolver.locked,
    })
}

/// OR groups and excluded codes collected for one channel.
#[derive(Debug, Default)]
struct ChannelGroups {
    or: Vec<Vec<String>>,
    not: Vec<String>,
}

struct Checkpoint {
    disabled: IndexSet<String>,
    pending_disabled: IndexSet<String>,
    attach: IndexSet<String>,
    locked: IndexMap<Category, String>,
    visiting: IndexSet<String>,
}

struct Resolver<'a> {
    catalog: &'a Catalog,
    options: &'a OptionsState,
    style: &'a str,
    /// Disabled codes across both passes.
    disabled: IndexSet<String>,
    /// Disabled by the alternatives accepted in the current pass.
    pending_disabled: IndexSet<String>,
    attach: IndexSet<String>,
    locked: IndexMap<Category, String>,
    /// Codes already expanded; meeting one again counts as satisfied.
    visiting: IndexSet<String>,
    or_groups: IndexMap<Channel, ChannelGroups>,
}

impl<'a> Resolver<'a> {
    fn new(catalog: &'a Catalog, options: &'a OptionsState, style: &'a str) -> Self {
        Self {
            catalog,
            options,
            style,
            disabled: IndexSet::new(),
            pending_disabled: IndexSet::new(),
            attach: IndexSet::new(),
            locked: IndexMap::new(),
            visiting: IndexSet::new(),
            or_groups: IndexMap::new(),
        }
    }

    /// Clear per-pass state. Collected OR groups and disabled codes survive.
    fn reset(&mut self) {
        self.pending_disabled.clear();
        self.attach.clear();
        self.locked.clear();
        self.visiting.clear();
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            disabled: self.disabled.clone(),
            pending_disabled: self.pending_disabled.clone(),
            attach: self.attach.clone(),
            locked: self.locked.clone(),
            visiting: self.visiting.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.disabled = checkpoint.disabled;
        self.pending_disabled = checkpoint.pending_disabled;
        self.attach = checkpoint.attach;
        self.locked = checkpoint.locked;
        self.visiting = checkpoint.visiting;
    }

    fn lock(&mut self, category: Category, code: &str) {
        if category.is_lockable() && !self.locked.contains_key(&category) {
            self.locked.insert(category, code.to_string());
        }
    }

    fn walk(
        &mut self,
        codes: &[String],
        skip: &IndexSet<String>,
        strict: bool,
    ) -> Result<ActivationNode> {
        let catalog = self.catalog;
        let mut node = ActivationNode::default();

        for code in codes {
            if skip.contains(code) {
                continue;
            }
            let category = catalog.category_of(code);

            if self.locked.get(&category) == Some(code) || self.visiting.contains(code) {
                node.insert(code.clone(), ActivationNode::default());
                continue;
            }
            if category.is_lockable() && self.locked.contains_key(&category) {
                debug!(code, %category, "skipping code of locked category");
                continue;
            }

            let Some(element) = catalog.find_element(code) else {
                warn!(code, "element not found, activating without enable codes");
                node.insert(code.clone(), ActivationNode::default());
                continue;
            };

            match element.enable_spec(self.style) {
                Some(spec) => self.walk_channels(code, category, spec, skip, strict, &mut node)?,
                None => {
                    self.visiting.insert(code.clone());
                    self.lock(category, code);
                    node.insert(code.clone(), ActivationNode::default());
                }
            }
        }

        Ok(node)
    }

    fn walk_channels(
        &mut self,
        code: &str,
        category: Category,
        spec: &EnableSpec,
        skip: &IndexSet<String>,
        strict: bool,
        node: &mut ActivationNode,
    ) -> Result<()> {
        for channel in Channel::ALL {
            let expr = spec.channel(channel);
            if channel == Channel::Attach && expr.is_empty() {
                continue;
            }
            node.entry(code);

            let segregations = match segregate(expr) {
                Ok(segregations) => self.prioritize(segregations, channel),
                Err(error) => {
                    warn!(code, %channel, expr, %error, "malformed enable codes");
                    if strict {
                        return Err(EngineError::Unsatisfiable {
                            code: code.to_string(),
                            channel,
                        });
                    }
                    continue;
                }
            };

            let single = segregations.len() == 1;
            let mut selected = false;

            for (index, segregation) in segregations.iter().enumerate() {
                if index == 0 && channel != Channel::Attach {
                    self.record_or_groups(channel, segregation, single);
                }

                if segregation.is_trivial() {
                    selected = true;
                    self.pending_disabled.extend(segregation.not.iter().cloned());
                    self.lock(category, code);
                    continue;
                }

                let blocked = segregation.and.iter().any(|required| {
                    self.disabled.contains(required)
                        || self.pending_disabled.contains(required)
                        || skip.contains(required)
                });
                if selected || blocked {
                    continue;
                }

                let checkpoint = strict.then(|| self.checkpoint());
                self.pending_disabled.extend(segregation.not.iter().cloned());
                self.visiting.insert(code.to_string());
                self.disabled.extend(self.pending_disabled.iter().cloned());

                match self.walk(&segregation.and, skip, strict) {
                    Ok(child) if child.is_empty() => {}
                    Ok(child) => {
                        self.lock(category, code);
                        selected = true;
                        if channel == Channel::Attach {
                            self.attach.extend(segregation.and.iter().cloned());
                        }
                        node.entry(code).merge(child);
                    }
                    Err(error) => {
                        debug!(code, %channel, %error, "alternative failed, trying the next");
                        if let Some(checkpoint) = checkpoint {
                            self.restore(checkpoint);
                        }
                    }
                }
            }

            if strict && !selected {
                debug!(code, %channel, "no alternative satisfied");
                return Err(EngineError::Unsatisfiable {
                    code: code.to_string(),
                    channel,
                });
            }
        }
        Ok(())
    }

    /// Try alternatives containing the current value of a non-core channel first.
    fn prioritize(&self, mut segregations: Vec<Segregation>, channel: Channel) -> Vec<Segregation> {
        let Some(category) = channel.category().filter(Category::is_non_core) else {
            return segregations;
        };
        let current = self.options.get(category);
        if let Some(index) = segregations
            .iter()
            .position(|segregation| segregation.and.iter().any(|code| code == current))
        {
            let preferred = segregations.remove(index);
            segregations.insert(0, preferred);
        }
        segregations
    }

    /// Accessories only contribute the excluded codes of their first visit.
    fn record_or_groups(&mut self, channel: Channel, segregation: &Segregation, single: bool) {
        let offered = || match &segregation.or_groups {
            Some(groups) => groups.clone(),
            None if single && !segregation.and.is_empty() => vec![segregation.and.clone()],
            None => Vec::new(),
        };

        match self.or_groups.get_mut(&channel) {
            None => {
                let or = if channel == Channel::Accessories {
                    Vec::new()
                } else {
                    offered()
                };
                self.or_groups.insert(
                    channel,
                    ChannelGroups {
                        or,
                        not: segregation.not.clone(),
                    },
                );
            }
            Some(groups) if channel != Channel::Accessories => {
                groups.or.extend(offered());
                groups.not.extend(segregation.not.iter().cloned());
            }
            Some(_) => {}
        }
    }

    /// Intersect each channel's OR groups. Returns the filtered groups and
    /// the skip set for the resolution pass.
    fn filter_or_groups(
        &self,
        skip: &IndexSet<String>,
    ) -> (IndexMap<Channel, OrCodeGroup>, IndexSet<String>) {
        let mut filtered = IndexMap::new();
        let mut next_skip = skip.clone();

        for (channel, groups) in &self.or_groups {
            let intersection = intersect(&groups.or);
            next_skip.extend(groups.not.iter().cloned());
            next_skip.extend(
                groups
                    .or
                    .iter()
                    .flatten()
                    .filter(|code| !intersection.contains(*code))
                    .cloned(),
            );
            filtered.insert(
                *channel,
                OrCodeGroup {
                    or: intersection,
                    not: groups.not.clone(),
                },
            );
        }

        (filtered, next_skip)
    }
}

/// Codes present in every group, in the order of the first group.
fn intersect(groups: &[Vec<String>]) -> Vec<String> {
    let Some((first, rest)) = groups.split_first() else {
        return Vec::new();
    };
    let mut common: IndexSet<&String> = first.iter().collect();
    for group in rest {
        common.retain(|code| group.contains(code));
    }
    common.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|group| group.iter().map(|code| code.to_string()).collect())
            .collect()
    }

    #[test]
    fn intersects_groups() {
        assert!(intersect(&[]).is_empty());
        assert_eq!(intersect(&groups(&[&["a", "b", "a"]])), vec!["a", "b"]);
        assert_eq!(
            intersect(&groups(&[&["a", "b", "c"], &["c", "b"], &["b", "c", "d"]])),
            vec!["b", "c"]
        );
        assert!(intersect(&groups(&[&["a"], &["b"]])).is_empty());
    }
}
