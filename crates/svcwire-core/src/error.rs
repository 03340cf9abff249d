use thiserror::Error;

pub type WireResult<T> = Result<T, WireError>;

/// Crate-wide error.
///
/// A dependency that resolves to nothing is not an error at this level:
/// `find` reports it as an absent entry. `Missing` is only produced by the
/// strict typed accessors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("config error: {0}")]
    Config(String),

    #[error("service '{name}' is not available")]
    Missing { name: String },

    #[error("service '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("duplicate service name '{0}'")]
    Duplicate(String),

    #[error("render depth limit {limit} exceeded at component '{component}'")]
    DepthExceeded { component: String, limit: usize },

    #[error("component error [{component}]: {source}")]
    Component {
        component: String,
        #[source]
        source: anyhow::Error,
    },
}

impl WireError {
    #[inline]
    pub fn component(component: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Component {
            component: component.into(),
            source: source.into(),
        }
    }
}
