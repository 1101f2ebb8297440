use std::collections::{BTreeMap, BTreeSet};

use crate::error::ConsistencyError;
use crate::extension::Extension;
use crate::feature::Feature;
use crate::registry::Registry;
use crate::slice::ApiSlice;

/// One api name's view of the registry: its features in ascending version
/// order and the extensions written against it.
///
/// The feature at index `i` has the feature at `i - 1` as its predecessor;
/// the ordering is total, so no feature stores a link of its own.
#[derive(Clone, Debug)]
pub struct Api<'r> {
    registry: &'r Registry,
    pub name: &'r str,
    pub features: Vec<&'r Feature>,
    pub extensions: Vec<&'r Extension>,
}

/// The resolved symbol slice for one feature. `profile` holds the final,
/// deduplicated set valid at this version; requirement blocks re-listing
/// symbols of earlier versions have already been folded away.
#[derive(Clone, Debug)]
pub struct ApiVersion<'r> {
    pub feature: &'r Feature,
    pub profile: ApiSlice,
}

/// The output of resolving one target version: every version from the
/// oldest up to the target, oldest first. Each symbol valid at the target
/// appears in exactly one version's slice.
#[derive(Clone, Debug)]
pub struct VersionChain<'r> {
    pub versions: Vec<ApiVersion<'r>>,
}

impl<'r> VersionChain<'r> {
    /// The version that was requested; the chain is never empty.
    pub fn target(&self) -> &ApiVersion<'r> {
        self.versions.last().expect("chain is never empty")
    }

    pub fn previous(&self, index: usize) -> Option<&ApiVersion<'r>> {
        index.checked_sub(1).and_then(|i| self.versions.get(i))
    }
}

/// An extension's requirements filtered to one profile and merged across
/// its requirement blocks. An extension may resolve to zero commands and
/// still be meaningful (it can exist purely to add enum values).
#[derive(Clone, Debug)]
pub struct ApiExtension {
    pub name: String,
    pub requires: ApiSlice,
}

/// Groups the registry's features by api name, sorts each group ascending
/// by `(major, minor)`, and attaches the supported extensions.
///
/// Two features of one api sharing a version number have no defined order,
/// so that is reported as a consistency error rather than resolved
/// arbitrarily.
pub fn link(registry: &Registry) -> Result<BTreeMap<&str, Api<'_>>, ConsistencyError> {
    let mut apis: BTreeMap<&str, Api> = BTreeMap::new();

    for feature in registry.features.values() {
        apis.entry(feature.api.as_str())
            .or_insert_with(|| Api {
                registry,
                name: feature.api.as_str(),
                features: Vec::new(),
                extensions: Vec::new(),
            })
            .features
            .push(feature);
    }

    for api in apis.values_mut() {
        api.features.sort_by_key(|feature| feature.version_key());
        for pair in api.features.windows(2) {
            if pair[0].version_key() == pair[1].version_key() {
                return Err(ConsistencyError::DuplicateVersion {
                    api: api.name.to_owned(),
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                    number: pair[0].number.clone(),
                });
            }
        }

        for extension in registry.extensions.values() {
            if extension.supports_api(api.name) {
                api.extensions.push(extension);
            }
        }
    }

    Ok(apis)
}

impl<'r> Api<'r> {
    /// Resolves the chain ending at the feature whose `number` equals
    /// `version`. `None` if no feature carries that number; callers must
    /// branch on it.
    pub fn link_version(&self, version: &str, profile: &str) -> Option<VersionChain<'r>> {
        let target = self
            .features
            .iter()
            .position(|feature| feature.number == version)?;
        Some(self.resolve(target, profile))
    }

    /// Resolves every version of this api in order, each with its own
    /// independent chain.
    pub fn link_all_versions(&self, profile: &str) -> Vec<VersionChain<'r>> {
        (0..self.features.len())
            .map(|target| self.resolve(target, profile))
            .collect()
    }

    /// The closure algorithm. Walking from the target down to the oldest
    /// version, each feature's matching `require` blocks are merged and the
    /// removal accumulator is subtracted, then the feature's own `remove`
    /// blocks are folded into the accumulator so they also strike the
    /// symbols from every earlier version. A second, ascending pass
    /// subtracts each earlier version's final slice so that every symbol is
    /// attributed to exactly one version.
    ///
    /// The accumulator is created fresh here on every call; nothing is
    /// shared between two resolutions against the same registry.
    fn resolve(&self, target: usize, profile: &str) -> VersionChain<'r> {
        let mut removed = ApiSlice::default();
        let mut pending = Vec::with_capacity(target + 1);

        for index in (0..=target).rev() {
            let feature = self.features[index];
            let mut slice = ApiSlice::with_profile(Some(profile.to_owned()));
            for require in &feature.requires {
                if require.applies_to(profile) {
                    slice.add_all(require);
                }
            }
            slice.remove_all(&removed);
            for remove in &feature.removes {
                if remove.applies_to(profile) {
                    removed.add_all(remove);
                }
            }
            pending.push((feature, slice));
        }

        let mut versions: Vec<ApiVersion<'r>> = Vec::with_capacity(target + 1);
        for (feature, mut slice) in pending.into_iter().rev() {
            for earlier in &versions {
                slice.remove_all(&earlier.profile);
            }
            versions.push(ApiVersion { feature, profile: slice });
        }

        VersionChain { versions }
    }

    /// Filters and merges this api's extensions for one profile. With a
    /// name filter, only the named extensions are considered. Every command
    /// an emitted extension requires must exist in the registry.
    pub fn link_extensions(
        &self,
        profile: &str,
        filter: Option<&BTreeSet<String>>,
    ) -> Result<Vec<ApiExtension>, ConsistencyError> {
        let mut linked = Vec::new();
        for extension in &self.extensions {
            if let Some(filter) = filter {
                if !filter.contains(&extension.name) {
                    continue;
                }
            }

            let mut requires = ApiSlice::with_profile(Some(profile.to_owned()));
            for require in &extension.requires {
                if require.applies_to(profile) {
                    requires.add_all(require);
                }
            }
            for command in &requires.commands {
                self.registry.command(&extension.name, command)?;
            }

            linked.push(ApiExtension {
                name: extension.name.clone(),
                requires,
            });
        }
        Ok(linked)
    }

    /// Every profile name mentioned by this api's require/remove blocks.
    pub fn profiles(&self) -> BTreeSet<&'r str> {
        let mut profiles = BTreeSet::new();
        for feature in &self.features {
            for block in feature.requires.iter().chain(feature.removes.iter()) {
                if let Some(profile) = block.profile.as_deref() {
                    profiles.insert(profile);
                }
            }
        }
        profiles
    }
}
