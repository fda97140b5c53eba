use thiserror::Error;

/// Library error type for the image slider.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer than two usable items remain after sanitising the configuration.
    #[error("need at least two images, found {found}")]
    TooFewItems { found: usize },

    /// An image or audio asset could not be loaded; the slider stays disabled.
    #[error("failed to load asset {reference}")]
    AssetLoad {
        reference: String,
        #[source]
        source: anyhow::Error,
    },

    /// The host reported a track width the slider cannot be laid out on.
    #[error("invalid slider track width: {width}")]
    InvalidLayout { width: f64 },

    /// The transparency replacement colour is not `#rrggbb`.
    #[error("invalid colour: {0}")]
    InvalidColor(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
