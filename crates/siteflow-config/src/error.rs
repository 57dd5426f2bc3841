use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config directory not found")]
    ConfigDirNotFound,

    #[error(
        "no site file found. Checked:\n\
        - current directory: site.local.kdl, .site.local.kdl, site.kdl, .site.kdl\n\
        - ./.siteflow/ directory, same order\n\
        - ~/.config/siteflow/site.kdl\n\
        You can also point SITE_CONFIG_PATH at a file directly"
    )]
    SiteFileNotFound,

    #[error("invalid site configuration: {0}")]
    InvalidConfig(String),

    #[error("KDL parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
