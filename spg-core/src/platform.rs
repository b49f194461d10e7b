// spg-core/src/platform.rs
//! Platform compatibility predicates and the policy that picks one build per platform.

use std::process::Command;
use std::sync::Arc;

use spg_common::model::{Arch, Os, PackageSpec, Platform, PlatformKind};
use tracing::{debug, trace, warn};

/// How well a build's platform fits a target platform. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    Exact,
    /// Same architecture, built for a macOS release this many versions older.
    OlderRelease(usize),
    Universal,
}

/// Ranks `spec_platform` against `target`; `None` when the build cannot run there.
pub fn match_rank(spec_platform: &Platform, target: &Platform) -> Option<MatchRank> {
    if spec_platform == target {
        return Some(MatchRank::Exact);
    }
    if spec_platform.is_universal() {
        return Some(MatchRank::Universal);
    }
    match (spec_platform.kind(), target.kind()) {
        (
            PlatformKind::Native {
                arch: spec_arch,
                os: spec_os,
            },
            PlatformKind::Native {
                arch: target_arch,
                os: target_os,
            },
        ) if spec_arch == target_arch && *spec_arch != Arch::Unknown => {
            older_release_distance(spec_os, target_os).map(MatchRank::OlderRelease)
        }
        _ => None,
    }
}

pub fn is_compatible(spec_platform: &Platform, target: &Platform) -> bool {
    match_rank(spec_platform, target).is_some()
}

// macOS builds run on the release they were built for and every newer one.
fn older_release_distance(spec_os: &Os, target_os: &Os) -> Option<usize> {
    let spec_age = spec_os.macos_age()?;
    let target_age = target_os.macos_age()?;
    (spec_age > target_age).then(|| spec_age - target_age)
}

/// Selects the single best build of a package for a target platform.
pub trait PlatformMatcher: std::fmt::Debug {
    fn best_match(
        &self,
        specs: &[Arc<PackageSpec>],
        platform: &Platform,
    ) -> Option<Arc<PackageSpec>>;
}

/// Prefers an exact build, then the closest older macOS release of the same
/// architecture, then the universal build. Ties go to the earliest spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityMatcher;

impl PlatformMatcher for CompatibilityMatcher {
    fn best_match(
        &self,
        specs: &[Arc<PackageSpec>],
        platform: &Platform,
    ) -> Option<Arc<PackageSpec>> {
        let mut best: Option<(MatchRank, &Arc<PackageSpec>)> = None;
        for spec in specs {
            let Some(rank) = match_rank(&spec.platform, platform) else {
                trace!(
                    "Build '{}' is not usable on platform '{}'",
                    spec.full_name(),
                    platform
                );
                continue;
            };
            if best.as_ref().map_or(true, |(current, _)| rank < *current) {
                best = Some((rank, spec));
            }
        }
        match best {
            Some((rank, spec)) => {
                debug!(
                    "Selected build '{}' for platform '{}' ({:?})",
                    spec.full_name(),
                    platform,
                    rank
                );
                Some(Arc::clone(spec))
            }
            None => {
                debug!(
                    "No build among {:?} is usable on platform '{}'",
                    specs.iter().map(|s| s.platform.tag()).collect::<Vec<_>>(),
                    platform
                );
                None
            }
        }
    }
}

/// Detects the platform tag of the running host.
pub fn current_platform() -> Platform {
    let arch = if std::env::consts::ARCH == "aarch64" {
        "arm64"
    } else {
        std::env::consts::ARCH
    };

    let tag = if cfg!(target_os = "macos") {
        match macos_release_name() {
            // Intel Macs use the bare release name
            Some(release) if arch == "arm64" => format!("{arch}_{release}"),
            Some(release) => release.to_string(),
            None => {
                warn!("Could not determine macOS release; using the universal platform.");
                return Platform::universal();
            }
        }
    } else if cfg!(target_os = "linux") {
        format!("{arch}_linux")
    } else {
        warn!(
            "Unsupported host OS '{}'; using the universal platform.",
            std::env::consts::OS
        );
        return Platform::universal();
    };

    Platform::new(&tag).unwrap_or_else(|e| {
        warn!("Detected platform tag '{tag}' is invalid ({e}); using the universal platform.");
        Platform::universal()
    })
}

fn macos_release_name() -> Option<&'static str> {
    let output = Command::new("/usr/bin/sw_vers")
        .arg("-productVersion")
        .output()
        .map_err(|e| warn!("Failed to execute '/usr/bin/sw_vers': {e}"))
        .ok()?;
    if !output.status.success() {
        warn!(
            "'/usr/bin/sw_vers -productVersion' failed (status: {})",
            output.status
        );
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    release_name_for_version(stdout.trim())
}

/// Maps a macOS product version such as `14.5` to its release name.
pub fn release_name_for_version(version: &str) -> Option<&'static str> {
    let mut parts = version.split('.');
    match parts.next()? {
        "15" => Some("sequoia"),
        "14" => Some("sonoma"),
        "13" => Some("ventura"),
        "12" => Some("monterey"),
        "11" => Some("big_sur"),
        "10" => match parts.next()? {
            "15" => Some("catalina"),
            "14" => Some("mojave"),
            "13" => Some("high_sierra"),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use spg_common::model::{Source, SpecKind, Version};

    use super::*;

    fn platform(tag: &str) -> Platform {
        Platform::new(tag).unwrap()
    }

    fn build(tag: &str) -> Arc<PackageSpec> {
        Arc::new(PackageSpec {
            name: "ffi".into(),
            version: Version::new(1, 17, 0),
            platform: platform(tag),
            source: Source::registry("https://rubygems.org"),
            dependencies: vec![],
            kind: SpecKind::Stub,
        })
    }

    #[rstest]
    #[case("arm64_sonoma", "arm64_sonoma", Some(MatchRank::Exact))]
    #[case("arm64_ventura", "arm64_sonoma", Some(MatchRank::OlderRelease(1)))]
    #[case("arm64_big_sur", "arm64_sequoia", Some(MatchRank::OlderRelease(4)))]
    #[case("arm64_sequoia", "arm64_sonoma", None)]
    #[case("ventura", "arm64_sonoma", None)]
    #[case("all", "x86_64_linux", Some(MatchRank::Universal))]
    #[case("x86_64_linux", "arm64_linux", None)]
    #[case("x86_64_linux", "all", None)]
    #[case("java", "java", Some(MatchRank::Exact))]
    #[case("sonoma", "x86_64_sonoma", Some(MatchRank::Exact))]
    #[case("x86_64_ventura", "sonoma", Some(MatchRank::OlderRelease(1)))]
    fn ranks_platforms(
        #[case] spec: &str,
        #[case] target: &str,
        #[case] expected: Option<MatchRank>,
    ) {
        assert_eq!(match_rank(&platform(spec), &platform(target)), expected);
        assert_eq!(
            is_compatible(&platform(spec), &platform(target)),
            expected.is_some()
        );
    }

    #[test]
    fn exact_beats_older_beats_universal() {
        let specs = vec![build("all"), build("arm64_monterey"), build("arm64_ventura")];
        let picked = CompatibilityMatcher
            .best_match(&specs, &platform("arm64_sonoma"))
            .unwrap();
        assert_eq!(picked.platform.tag(), "arm64_ventura");

        let mut with_exact = specs.clone();
        with_exact.push(build("arm64_sonoma"));
        let picked = CompatibilityMatcher
            .best_match(&with_exact, &platform("arm64_sonoma"))
            .unwrap();
        assert_eq!(picked.platform.tag(), "arm64_sonoma");

        let picked = CompatibilityMatcher
            .best_match(&specs, &platform("x86_64_linux"))
            .unwrap();
        assert!(picked.platform.is_universal());
    }

    #[test]
    fn intel_alias_target_finds_bare_release_build() {
        let specs = vec![build("all"), build("sonoma")];
        let picked = CompatibilityMatcher
            .best_match(&specs, &platform("x86_64_sonoma"))
            .unwrap();
        assert_eq!(picked.platform.tag(), "sonoma");
    }

    #[test]
    fn no_match_without_compatible_build() {
        let specs = vec![build("arm64_sonoma"), build("x86_64_linux")];
        assert!(CompatibilityMatcher
            .best_match(&specs, &platform("arm64_linux"))
            .is_none());
    }

    #[test]
    fn ties_keep_first_spec() {
        let first = build("all");
        let second = build("all");
        let picked = CompatibilityMatcher
            .best_match(&[Arc::clone(&first), second], &platform("x86_64_linux"))
            .unwrap();
        assert!(Arc::ptr_eq(&picked, &first));
    }

    #[rstest]
    #[case("15.1", Some("sequoia"))]
    #[case("14.5", Some("sonoma"))]
    #[case("10.15.7", Some("catalina"))]
    #[case("10.9", None)]
    #[case("", None)]
    fn maps_product_versions(#[case] version: &str, #[case] expected: Option<&str>) {
        assert_eq!(release_name_for_version(version), expected);
    }

    #[test]
    fn current_platform_is_parseable() {
        let host = current_platform();
        assert!(Platform::new(host.tag()).is_ok());
    }
}
