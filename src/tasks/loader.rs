use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::select;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::assets::{AssetKind, AssetRequest};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Everything the slider needs, indexed by item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedAssets {
    pub images: Vec<Option<LoadedImage>>,
    pub audio: Vec<Option<PathBuf>>,
}

impl LoadedAssets {
    /// Per-item audio presence, in item order.
    pub fn has_audio(&self) -> Vec<bool> {
        self.audio.iter().map(Option::is_some).collect()
    }
}

enum Loaded {
    Image(usize, LoadedImage),
    Audio(usize, PathBuf),
}

// Only the header is decoded; pixels are the renderer's business.
fn read_dimensions(path: &Path) -> anyhow::Result<(u32, u32)> {
    let dims = image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(dims)
}

async fn load_one(request: AssetRequest) -> Result<Loaded, Error> {
    let AssetRequest {
        item,
        kind,
        reference,
        path,
    } = request;
    let result = match kind {
        AssetKind::Image => {
            let p = path.clone();
            tokio::task::spawn_blocking(move || read_dimensions(&p))
                .await
                .context("image decode task panicked")
                .and_then(|dims| dims)
                .map(|(width, height)| {
                    Loaded::Image(
                        item,
                        LoadedImage {
                            path: path.clone(),
                            width,
                            height,
                        },
                    )
                })
        }
        AssetKind::Audio => tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("cannot stat {}", path.display()))
            .and_then(|meta| {
                anyhow::ensure!(meta.is_file(), "{} is not a file", path.display());
                Ok(Loaded::Audio(item, path.clone()))
            }),
    };
    result.map_err(|source| Error::AssetLoad { reference, source })
}

/// Load every requested asset; all must succeed before the slider is enabled.
///
/// - At most `max_in_flight` loads run at once.
/// - The first failure aborts the remaining loads and is returned.
/// - Returns `Ok(None)` if `cancel` fires first.
pub async fn preload(
    requests: Vec<AssetRequest>,
    item_total: usize,
    max_in_flight: usize,
    cancel: CancellationToken,
) -> Result<Option<LoadedAssets>, Error> {
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks: JoinSet<Result<Loaded, Error>> = JoinSet::new();
    for request in requests {
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            load_one(request).await
        });
    }

    let mut assets = LoadedAssets {
        images: vec![None; item_total],
        audio: vec![None; item_total],
    };

    loop {
        select! {
            _ = cancel.cancelled() => {
                debug!("preload cancelled");
                return Ok(None);
            }
            joined = tasks.join_next() => {
                let Some(joined) = joined else { break };
                let loaded = match joined {
                    Ok(loaded) => loaded,
                    Err(err) => Err(Error::AssetLoad {
                        reference: "<task>".to_string(),
                        source: err.into(),
                    }),
                };
                match loaded {
                    Ok(Loaded::Image(item, image)) => {
                        debug!(
                            item,
                            path = %image.path.display(),
                            width = image.width,
                            height = image.height,
                            "image loaded"
                        );
                        if let Some(slot) = assets.images.get_mut(item) {
                            *slot = Some(image);
                        }
                    }
                    Ok(Loaded::Audio(item, path)) => {
                        debug!(item, path = %path.display(), "audio available");
                        if let Some(slot) = assets.audio.get_mut(item) {
                            *slot = Some(path);
                        }
                    }
                    Err(err) => {
                        warn!(error = ?err, "asset failed to load; slider stays disabled");
                        // Dropping the set aborts whatever is still loading.
                        return Err(err);
                    }
                }
            }
        }
    }

    Ok(Some(assets))
}
