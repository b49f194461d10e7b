// Reads package specification lists from JSON.
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SpgError};
use crate::model::PackageSpec;

/// Parses a JSON array of package specifications.
pub fn parse_specs(data: &str) -> Result<Vec<PackageSpec>> {
    let specs: Vec<PackageSpec> = serde_json::from_str(data)?;
    debug!("Parsed {} package specifications.", specs.len());
    Ok(specs)
}

/// Loads a JSON array of package specifications from `path`.
pub fn read_specs(path: &Path) -> Result<Vec<PackageSpec>> {
    debug!("Loading package specifications from {}", path.display());
    if !path.exists() {
        return Err(SpgError::InvalidArgument(format!(
            "Specification file {} does not exist",
            path.display()
        )));
    }
    let raw = fs::read_to_string(path)?;
    parse_specs(&raw)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::model::SpecKind;

    const SPECS: &str = r#"[
        {
            "name": "nokogiri",
            "version": "1.16.0",
            "platform": "arm64_sonoma",
            "source": {"type": "registry", "url": "https://rubygems.org"},
            "dependencies": [
                {"name": "racc", "constraint": "~> 1.4"},
                {"name": "rake-compiler", "tags": "DEVELOPMENT"}
            ],
            "kind": {"type": "fetched", "required_runtime_version": ">= 3.0"}
        },
        {
            "name": "nokogiri",
            "version": "1.16.0",
            "platform": "all",
            "source": {"type": "registry", "url": "https://rubygems.org"}
        }
    ]"#;

    #[test]
    fn reads_specs_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SPECS.as_bytes()).unwrap();

        let specs = read_specs(file.path()).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].dependencies.len(), 2);
        assert!(specs[0].dependencies[1].is_development());
        assert!(specs[0].kind.is_fetched());
        assert_eq!(specs[1].kind, SpecKind::Stub);
        assert!(specs[1].platform.is_universal());
    }

    #[test]
    fn missing_file_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_specs(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SpgError::InvalidArgument(_)));
    }

    #[test]
    fn overflowing_constraint_is_an_error() {
        let data = r#"[{
            "name": "racc",
            "version": "1.7.3",
            "platform": "all",
            "source": {"type": "registry", "url": "https://rubygems.org"},
            "dependencies": [{"name": "rake", "constraint": "~> 18446744073709551615"}]
        }]"#;
        let err = parse_specs(data).unwrap_err();
        assert!(matches!(err, SpgError::Json(_)));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse_specs("[{\"name\": 1}]").unwrap_err();
        assert!(matches!(err, SpgError::Json(_)));
    }
}
