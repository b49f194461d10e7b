use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use spg_common::config::Config;
use spg_common::dependency::Requirement;
use spg_common::error::Result;
use spg_common::model::Platform;
use spg_common::specfile::read_specs;
use spg_core::{current_platform, CandidateGroup, CompatibilityMatcher, GroupOptions};
use tracing::debug;

#[derive(Args, Debug)]
pub struct Inspect {
    /// JSON file listing every platform build of one package version
    pub file: PathBuf,

    /// Platform to activate; repeat for several. Defaults to SPG_PLATFORM or the host
    #[arg(short, long = "platform", value_name = "TAG")]
    pub platforms: Vec<Platform>,

    /// Keep dependency edges that point at the resolver's own package
    #[arg(long)]
    pub include_framework: bool,
}

impl Inspect {
    pub fn run(&self, config: &Config) -> Result<()> {
        let specs = read_specs(&self.file)?;
        let mut group = CandidateGroup::with_matcher(
            specs,
            Arc::new(CompatibilityMatcher),
            GroupOptions::from(config),
        )?;
        if self.include_framework {
            group.set_ignores_framework_dependencies(false);
        }

        let targets = if self.platforms.is_empty() {
            vec![config.platform.clone().unwrap_or_else(current_platform)]
        } else {
            self.platforms.clone()
        };
        debug!("Activating platforms: {:?}", targets);

        for platform in activate_targets(&mut group, &targets) {
            println!(
                "{} no build of {} for {}",
                "Warning:".yellow().bold(),
                group.name(),
                platform
            );
        }

        println!("{}", group.to_string().bold());

        let edges = group.dependencies_for_activated_platforms();
        if edges.is_empty() {
            println!("{}", "No dependencies".yellow());
        } else {
            println!("{}", "Dependencies:".bold());
            for edge in &edges {
                let rendered = match &edge.requirement {
                    Requirement::Package(_) => edge.requirement.to_string().normal(),
                    Requirement::Runtime(_) | Requirement::PackageManager(_) => {
                        edge.requirement.to_string().cyan()
                    }
                };
                println!("  {} [{}]", rendered, edge.platform.to_string().dimmed());
            }
        }

        let resolved = group.to_concrete_specs();
        if !resolved.is_empty() {
            println!("{}", "Resolved builds:".bold());
            for spec in &resolved {
                println!("  {} from {}", spec.to_string().green(), spec.source);
            }
        }
        Ok(())
    }
}

/// Activates every usable target and returns the ones without a matching build.
fn activate_targets(group: &mut CandidateGroup, targets: &[Platform]) -> Vec<Platform> {
    let mut unmatched = Vec::new();
    for platform in targets {
        if group.is_for(platform) {
            group.activate(platform);
        } else if !unmatched.contains(platform) {
            debug!("No build of {} is usable on {}", group.name(), platform);
            unmatched.push(platform.clone());
        }
    }
    unmatched
}

#[cfg(test)]
mod tests {
    use spg_common::model::{PackageSpec, Source, SpecKind, Version};

    use super::*;

    fn platform(tag: &str) -> Platform {
        Platform::new(tag).unwrap()
    }

    #[test]
    fn unmatched_targets_are_reported_once() {
        let build = PackageSpec {
            name: "ffi".into(),
            version: Version::new(1, 17, 0),
            platform: platform("arm64_sonoma"),
            source: Source::registry("https://rubygems.org"),
            dependencies: vec![],
            kind: SpecKind::Stub,
        };
        let mut group = CandidateGroup::new(vec![build]).unwrap();
        let targets = vec![
            platform("x86_64_linux"),
            platform("arm64_sonoma"),
            platform("x86_64_linux"),
        ];

        let unmatched = activate_targets(&mut group, &targets);
        assert_eq!(unmatched, vec![platform("x86_64_linux")]);
        assert_eq!(group.activated_platforms(), &[platform("arm64_sonoma")]);
    }
}
