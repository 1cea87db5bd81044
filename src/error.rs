use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Not authenticated. Set GITHUB_TOKEN or add `token` under [auth] in the config file.")]
    NotAuthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub client error: {0}")]
    Client(String),

    #[error("GitHub request failed: {0}")]
    Transport(String),

    #[error("GraphQL query for {org} returned errors: {}", .messages.join("; "))]
    GraphQl { org: String, messages: Vec<String> },

    #[error("Organization not found: {0}")]
    OrgNotFound(String),

    #[error("No organization data could be retrieved")]
    NoOrganizationData,

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),
}

impl From<octocrab::Error> for DashboardError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                DashboardError::Transport(format!("{}: {}", source.status_code, source.message))
            }
            other => DashboardError::Transport(other.to_string()),
        }
    }
}

impl From<handlebars::RenderError> for DashboardError {
    fn from(err: handlebars::RenderError) -> Self {
        DashboardError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for DashboardError {
    fn from(err: handlebars::TemplateError) -> Self {
        DashboardError::Render(format!("invalid template: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
