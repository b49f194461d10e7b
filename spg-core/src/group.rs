// spg-core/src/group.rs
//! All platform builds of one (name, version, source), as seen by the resolver.
//!
//! A [`CandidateGroup`] picks the best build per platform lazily and remembers
//! the answer, tracks which platforms the resolver has activated, and projects
//! the dependency edges those platforms contribute. Its identity is the
//! name, version, source and the *sorted* activated platforms, so two groups
//! activated for the same platforms are interchangeable in sets and maps no
//! matter which builds they were created from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use spg_common::config::{Config, DEFAULT_FRAMEWORK_PACKAGE};
use spg_common::dependency::{DependencyExt, Requirement, ScopedDependency};
use spg_common::error::{Result, SpgError};
use spg_common::model::{PackageSpec, Platform, ResolvedSpec, Source, SpecKind, Version};
use tracing::{debug, trace};

use crate::platform::{CompatibilityMatcher, PlatformMatcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupOptions {
    /// The resolver's own package.
    pub framework_package: String,
    /// Drop edges to `framework_package` so it never becomes a graph node.
    pub ignores_framework_dependencies: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            framework_package: DEFAULT_FRAMEWORK_PACKAGE.to_string(),
            ignores_framework_dependencies: true,
        }
    }
}

impl From<&Config> for GroupOptions {
    fn from(config: &Config) -> Self {
        Self {
            framework_package: config.framework_package.clone(),
            ignores_framework_dependencies: config.ignores_framework_dependencies,
        }
    }
}

#[derive(Debug)]
pub struct CandidateGroup {
    name: String,
    version: Version,
    source: Source,
    all_specs: Arc<[Arc<PackageSpec>]>,
    matcher: Arc<dyn PlatformMatcher>,
    options: GroupOptions,
    activated_platforms: Vec<Platform>,
    platform_match: RefCell<HashMap<Platform, Option<Arc<PackageSpec>>>>,
    dependency_cache: RefCell<HashMap<Platform, Vec<ScopedDependency>>>,
}

impl CandidateGroup {
    /// Builds a group with the default matcher and options.
    ///
    /// Name, version and source come from the first spec; the rest are
    /// expected to agree. Fails with `InvalidArgument` when `specs` is empty.
    pub fn new<I>(specs: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arc<PackageSpec>>,
    {
        Self::with_matcher(specs, Arc::new(CompatibilityMatcher), GroupOptions::default())
    }

    pub fn with_matcher<I>(
        specs: I,
        matcher: Arc<dyn PlatformMatcher>,
        options: GroupOptions,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Arc<PackageSpec>>,
    {
        let all_specs: Arc<[Arc<PackageSpec>]> = specs.into_iter().map(Into::into).collect();
        let Some(exemplar) = all_specs.first() else {
            return Err(SpgError::InvalidArgument(
                "cannot build a candidate group from an empty specification list".to_string(),
            ));
        };
        debug!(
            "Creating candidate group for {} ({}) with {} build(s)",
            exemplar.name,
            exemplar.version,
            all_specs.len()
        );
        Ok(Self::from_parts(
            exemplar.name.clone(),
            exemplar.version.clone(),
            exemplar.source.clone(),
            Arc::clone(&all_specs),
            matcher,
            options,
        ))
    }

    fn from_parts(
        name: String,
        version: Version,
        source: Source,
        all_specs: Arc<[Arc<PackageSpec>]>,
        matcher: Arc<dyn PlatformMatcher>,
        options: GroupOptions,
    ) -> Self {
        Self {
            name,
            version,
            source,
            all_specs,
            matcher,
            options,
            activated_platforms: Vec::new(),
            platform_match: RefCell::new(HashMap::new()),
            dependency_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn all_specs(&self) -> &[Arc<PackageSpec>] {
        &self.all_specs
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    /// Activated platforms in activation order.
    pub fn activated_platforms(&self) -> &[Platform] {
        &self.activated_platforms
    }

    pub fn sorted_activated_platforms(&self) -> Vec<&Platform> {
        let mut sorted: Vec<&Platform> = self.activated_platforms.iter().collect();
        sorted.sort();
        sorted
    }

    pub fn ignores_framework_dependencies(&self) -> bool {
        self.options.ignores_framework_dependencies
    }

    pub fn set_ignores_framework_dependencies(&mut self, ignores: bool) {
        if self.options.ignores_framework_dependencies != ignores {
            self.options.ignores_framework_dependencies = ignores;
            self.dependency_cache.get_mut().clear();
        }
    }

    /// The best build for `platform`, asking the matcher at most once per platform.
    pub fn spec_for(&self, platform: &Platform) -> Option<Arc<PackageSpec>> {
        if let Some(cached) = self.platform_match.borrow().get(platform) {
            return cached.clone();
        }
        let matched = self.matcher.best_match(&self.all_specs, platform);
        self.platform_match
            .borrow_mut()
            .insert(platform.clone(), matched.clone());
        matched
    }

    pub fn is_for(&self, platform: &Platform) -> bool {
        self.spec_for(platform).is_some()
    }

    /// Adds `platform` to the activated set. Returns whether the set grew.
    ///
    /// Platforms without a matching build and already activated platforms are
    /// ignored.
    pub fn activate(&mut self, platform: &Platform) -> bool {
        if !self.is_for(platform) {
            trace!("{} has no build for {}; not activating", self, platform);
            return false;
        }
        if self.activated_platforms.contains(platform) {
            return false;
        }
        self.activated_platforms.push(platform.clone());
        debug!("Activated {} for {}", platform, self.name);
        true
    }

    /// A fresh group over the same builds, activated for `platform` only.
    pub fn copy_for(&self, platform: &Platform) -> Option<Self> {
        let mut copy = Self::from_parts(
            self.name.clone(),
            self.version.clone(),
            self.source.clone(),
            Arc::clone(&self.all_specs),
            Arc::clone(&self.matcher),
            self.options.clone(),
        );
        if !copy.is_for(platform) {
            return None;
        }
        copy.activate(platform);
        Some(copy)
    }

    /// The concrete builds for all activated platforms, in activation order,
    /// with platforms that share a build collapsed to one entry.
    pub fn to_concrete_specs(&self) -> Vec<ResolvedSpec> {
        let mut resolved: Vec<ResolvedSpec> = Vec::new();
        for platform in &self.activated_platforms {
            let Some(spec) = self.spec_for(platform) else {
                continue;
            };
            let concrete = ResolvedSpec {
                name: self.name.clone(),
                version: self.version.clone(),
                platform: spec.platform.clone(),
                source: self.source.clone(),
                dependencies: spec.dependencies.clone(),
            };
            if !resolved.contains(&concrete) {
                resolved.push(concrete);
            }
        }
        resolved
    }

    /// Every edge the activated platforms contribute: the declared dependencies
    /// of all activated platforms, then their metadata-derived ones, each in
    /// activation order.
    pub fn dependencies_for_activated_platforms(&self) -> Vec<ScopedDependency> {
        let declared = self
            .activated_platforms
            .iter()
            .flat_map(|platform| self.declared_dependencies(platform));
        let metadata = self
            .activated_platforms
            .iter()
            .flat_map(|platform| self.metadata_dependencies(platform));
        declared.chain(metadata).collect()
    }

    fn declared_dependencies(&self, platform: &Platform) -> Vec<ScopedDependency> {
        if let Some(cached) = self.dependency_cache.borrow().get(platform) {
            return cached.clone();
        }
        let edges: Vec<ScopedDependency> = match self.spec_for(platform) {
            Some(spec) => spec
                .dependencies
                .non_development()
                .into_iter()
                .filter(|dep| {
                    !(self.options.ignores_framework_dependencies
                        && dep.name == self.options.framework_package)
                })
                .map(|dep| {
                    ScopedDependency::new(Requirement::Package(dep.clone()), platform.clone())
                })
                .collect(),
            None => Vec::new(),
        };
        self.dependency_cache
            .borrow_mut()
            .insert(platform.clone(), edges.clone());
        edges
    }

    // Stubs would need a registry round-trip to read these fields, so they never
    // contribute metadata edges.
    fn metadata_dependencies(&self, platform: &Platform) -> Vec<ScopedDependency> {
        let Some(spec) = self.spec_for(platform) else {
            return Vec::new();
        };
        let SpecKind::Fetched {
            required_runtime_version,
            required_package_manager_version,
        } = &spec.kind
        else {
            trace!("Skipping metadata edges for stub '{}'", spec.full_name());
            return Vec::new();
        };

        let mut edges = Vec::new();
        if let Some(constraint) = required_runtime_version.as_ref().filter(|c| !c.is_any()) {
            edges.push(ScopedDependency::new(
                Requirement::Runtime(constraint.clone()),
                platform.clone(),
            ));
        }
        if let Some(constraint) = required_package_manager_version
            .as_ref()
            .filter(|c| !c.is_any())
        {
            edges.push(ScopedDependency::new(
                Requirement::PackageManager(constraint.clone()),
                platform.clone(),
            ));
        }
        edges
    }
}

impl PartialEq for CandidateGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.sorted_activated_platforms() == other.sorted_activated_platforms()
            && self.source == other.source
    }
}

impl Eq for CandidateGroup {}

impl Hash for CandidateGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.sorted_activated_platforms().hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for CandidateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let platforms = self
            .sorted_activated_platforms()
            .iter()
            .map(|p| p.tag())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} ({}) ({})", self.name, self.version, platforms)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use spg_common::dependency::Dependency;
    use spg_common::model::Constraint;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingMatcher {
        calls: Cell<usize>,
    }

    impl PlatformMatcher for CountingMatcher {
        fn best_match(
            &self,
            specs: &[Arc<PackageSpec>],
            platform: &Platform,
        ) -> Option<Arc<PackageSpec>> {
            self.calls.set(self.calls.get() + 1);
            CompatibilityMatcher.best_match(specs, platform)
        }
    }

    fn platform(tag: &str) -> Platform {
        Platform::new(tag).unwrap()
    }

    fn build(tag: &str, dependencies: Vec<Dependency>) -> PackageSpec {
        PackageSpec {
            name: "json".into(),
            version: Version::new(2, 7, 1),
            platform: platform(tag),
            source: Source::registry("https://rubygems.org"),
            dependencies,
            kind: SpecKind::Stub,
        }
    }

    #[test]
    fn matcher_runs_once_per_platform() {
        let matcher = Arc::new(CountingMatcher::default());
        let mut group = CandidateGroup::with_matcher(
            vec![build("arm64_sonoma", vec![]), build("all", vec![])],
            matcher.clone(),
            GroupOptions::default(),
        )
        .unwrap();

        let sonoma = platform("arm64_sonoma");
        let linux = platform("x86_64_linux");
        for _ in 0..3 {
            assert!(group.is_for(&sonoma));
            assert!(group.is_for(&linux));
        }
        group.activate(&sonoma);
        group.activate(&linux);
        group.dependencies_for_activated_platforms();
        group.to_concrete_specs();

        assert_eq!(matcher.calls.get(), 2);
    }

    #[test]
    fn absent_matches_are_cached_too() {
        let matcher = Arc::new(CountingMatcher::default());
        let group = CandidateGroup::with_matcher(
            vec![build("arm64_sonoma", vec![])],
            matcher.clone(),
            GroupOptions::default(),
        )
        .unwrap();

        let linux = platform("x86_64_linux");
        assert!(!group.is_for(&linux));
        assert!(group.spec_for(&linux).is_none());
        assert_eq!(matcher.calls.get(), 1);
    }

    #[test]
    fn copies_get_their_own_cache() {
        let matcher = Arc::new(CountingMatcher::default());
        let group = CandidateGroup::with_matcher(
            vec![build("all", vec![])],
            matcher.clone(),
            GroupOptions::default(),
        )
        .unwrap();

        let linux = platform("x86_64_linux");
        assert!(group.is_for(&linux));
        let copy = group.copy_for(&linux).unwrap();
        assert!(copy.is_for(&linux));
        assert_eq!(matcher.calls.get(), 2);
        assert!(Arc::ptr_eq(&group.all_specs, &copy.all_specs));
    }

    #[test]
    fn toggling_framework_flag_refreshes_edges() {
        let mut group = CandidateGroup::new(vec![build(
            "all",
            vec![
                Dependency::new_runtime("bundler", Constraint::any()),
                Dependency::new_runtime("rake", Constraint::any()),
            ],
        )])
        .unwrap();
        group.activate(&Platform::universal());

        assert_eq!(group.dependencies_for_activated_platforms().len(), 1);
        group.set_ignores_framework_dependencies(false);
        assert!(!group.ignores_framework_dependencies());
        let edges = group.dependencies_for_activated_platforms();
        let names: Vec<Option<&str>> = edges.iter().map(ScopedDependency::name).collect();
        assert_eq!(names, vec![Some("bundler"), Some("rake")]);
    }

    #[test]
    fn options_follow_config() {
        let config = Config {
            framework_package: "spg".into(),
            ignores_framework_dependencies: false,
            platform: None,
        };
        let options = GroupOptions::from(&config);
        assert_eq!(options.framework_package, "spg");
        assert!(!options.ignores_framework_dependencies);
    }
}
