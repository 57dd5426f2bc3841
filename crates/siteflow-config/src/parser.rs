//! KDL site file parsing

use crate::error::{ConfigError, Result};
use crate::model::{SiteConfig, StageSettings};
use kdl::{KdlDocument, KdlNode};

/// Parse a site file.
///
/// Expected shape:
///
/// ```kdl
/// site "my-site" {
///     region "ap-northeast-1"
///
///     stage "prod" {
///         path "./public"
///         index-document "index.html"
///         error-document "404.html"
///     }
/// }
/// ```
pub fn parse_site(input: &str) -> Result<SiteConfig> {
    let doc: KdlDocument = input.parse()?;

    let site_node = doc
        .nodes()
        .iter()
        .find(|n| n.name().value() == "site")
        .ok_or_else(|| ConfigError::InvalidConfig("missing `site` node".to_string()))?;

    parse_site_node(site_node)
}

fn parse_site_node(node: &KdlNode) -> Result<SiteConfig> {
    let name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::InvalidConfig("site requires a name".to_string()))?
        .to_string();

    if name.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "site name must not be empty".to_string(),
        ));
    }

    let mut config = SiteConfig {
        name,
        region: None,
        stages: Default::default(),
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "region" => {
                    config.region = first_string(child);
                }
                "stage" => {
                    let (stage_name, settings) = parse_stage(child)?;
                    config.stages.insert(stage_name, settings);
                }
                // Unknown nodes are tolerated
                _ => {}
            }
        }
    }

    Ok(config)
}

/// Parse a stage node
fn parse_stage(node: &KdlNode) -> Result<(String, StageSettings)> {
    let name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::InvalidConfig("stage requires a name".to_string()))?
        .to_string();

    let mut settings = StageSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "path" => {
                    settings.path = first_string(child);
                }
                "index_document" | "index-document" => {
                    settings.index_document = first_string(child);
                }
                "error_document" | "error-document" => {
                    settings.error_document = first_string(child);
                }
                other => {
                    tracing::debug!("ignoring unknown stage setting: {}", other);
                }
            }
        }
    }

    Ok((name, settings))
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_site() {
        let kdl = r#"
            site "my-site"
        "#;
        let config = parse_site(kdl).unwrap();
        assert_eq!(config.name, "my-site");
        assert!(config.region.is_none());
        assert!(config.stages.is_empty());
    }

    #[test]
    fn test_parse_site_with_stage() {
        let kdl = r#"
            site "my-site" {
                region "ap-northeast-1"
                stage "prod" {
                    path "./public"
                    index-document "index.html"
                    error-document "404.html"
                }
            }
        "#;
        let config = parse_site(kdl).unwrap();
        assert_eq!(config.name, "my-site");
        assert_eq!(config.region.as_deref(), Some("ap-northeast-1"));

        let prod = config.stages.get("prod").unwrap();
        assert_eq!(prod.path.as_deref(), Some("./public"));
        assert_eq!(prod.index_document.as_deref(), Some("index.html"));
        assert_eq!(prod.error_document.as_deref(), Some("404.html"));
    }

    #[test]
    fn test_parse_stage_snake_case() {
        let kdl = r#"
            site "my-site" {
                stage "dev" {
                    index_document "home.html"
                    error_document "oops.html"
                }
            }
        "#;
        let config = parse_site(kdl).unwrap();
        let dev = config.stages.get("dev").unwrap();
        assert_eq!(dev.index_document.as_deref(), Some("home.html"));
        assert_eq!(dev.error_document.as_deref(), Some("oops.html"));
    }

    #[test]
    fn test_parse_stage_with_unknown_setting() {
        let kdl = r#"
            site "my-site" {
                stage "dev" {
                    path "./www"
                    cache_ttl 600
                }
            }
        "#;
        let config = parse_site(kdl).unwrap();
        let dev = config.stages.get("dev").unwrap();
        assert_eq!(dev.path.as_deref(), Some("./www"));
    }

    #[test]
    fn test_parse_missing_site_node() {
        let kdl = r#"
            stage "dev"
        "#;
        let result = parse_site(kdl);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_site_without_name() {
        let kdl = r#"
            site {
                stage "dev"
            }
        "#;
        let result = parse_site(kdl);
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_invalid_kdl() {
        let result = parse_site("site \"unterminated");
        assert!(matches!(result, Err(ConfigError::Kdl(_))));
    }
}
