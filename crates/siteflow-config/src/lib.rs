pub mod error;
pub mod model;
pub mod parser;

pub use error::*;
pub use model::*;
pub use parser::parse_site;

use std::path::{Path, PathBuf};

/// siteflow config directory (`~/.config/siteflow`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("siteflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Locate the site file for the current project.
///
/// Search order:
/// 1. SITE_CONFIG_PATH environment variable (direct path)
/// 2. current directory: site.local.kdl, .site.local.kdl, site.kdl, .site.kdl
/// 3. ./.siteflow/ directory, same order
/// 4. ~/.config/siteflow/site.kdl (global)
pub fn find_site_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("SITE_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = ["site.local.kdl", ".site.local.kdl", "site.kdl", ".site.kdl"];

    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let site_dir = current_dir.join(".siteflow");
    if site_dir.is_dir() {
        for filename in &candidates {
            let path = site_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("siteflow").join("site.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::SiteFileNotFound)
}

/// Load and parse a site file from a path.
pub fn load(path: impl AsRef<Path>) -> Result<SiteConfig> {
    let path = path.as_ref();
    tracing::debug!("loading site file: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_site(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let result = get_config_dir();
        assert!(result.is_ok());

        let config_dir = result.unwrap();
        assert!(config_dir.ends_with("siteflow"));
        assert!(config_dir.exists());
    }

    #[test]
    #[serial]
    fn test_find_site_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("site.kdl"), "site \"test\"").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_site_file();
        assert!(result.is_ok());
        assert!(result.unwrap().ends_with("site.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_site_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("site.kdl"), "site \"shared\"").unwrap();
        fs::write(temp_dir.path().join("site.local.kdl"), "site \"local\"").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_site_file().unwrap();
        assert!(result.ends_with("site.local.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_site_file_in_siteflow_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let site_dir = temp_dir.path().join(".siteflow");
        fs::create_dir(&site_dir).unwrap();
        fs::write(site_dir.join("site.kdl"), "site \"test\"").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_site_file().unwrap();
        assert!(result.ends_with(".siteflow/site.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_site_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "site \"custom\"").unwrap();

        unsafe {
            std::env::set_var("SITE_CONFIG_PATH", config_path.to_str().unwrap());
        }

        let result = find_site_file().unwrap();
        assert_eq!(result, config_path);

        unsafe {
            std::env::remove_var("SITE_CONFIG_PATH");
        }
    }

    #[test]
    fn test_not_found_message_matches_search_order() {
        // Local variants are found first, so they are listed first.
        let message = ConfigError::SiteFileNotFound.to_string();
        let local = message.find("site.local.kdl").unwrap();
        let shared = message.find("site.kdl").unwrap();
        assert!(local < shared);
    }

    #[test]
    #[serial]
    fn test_find_site_file_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_site_file();
        assert!(matches!(result, Err(ConfigError::SiteFileNotFound)));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("site.kdl");
        fs::write(
            &path,
            r#"
            site "my-site" {
                stage "prod" {
                    path "./public"
                }
            }
            "#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.name, "my-site");
        assert_eq!(config.stage("prod").source_path(), "./public");
    }
}
