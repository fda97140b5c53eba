use std::path::{Path, PathBuf};

use crate::config::Configuration;

/// Turns a configured asset reference into something loadable.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, reference: &str, content_id: u64) -> PathBuf;
}

/// Resolves references the way content packages are laid out on disk:
/// absolute paths and URLs pass through, everything else lives under
/// `<root>/content/<content_id>/`.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetResolver for DirectoryResolver {
    fn resolve(&self, reference: &str, content_id: u64) -> PathBuf {
        let path = Path::new(reference);
        if path.is_absolute() || reference.contains("://") {
            return path.to_path_buf();
        }
        self.root
            .join("content")
            .join(content_id.to_string())
            .join(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Audio,
}

/// One asset the slider needs before it can be enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub item: usize,
    pub kind: AssetKind,
    pub reference: String,
    pub path: PathBuf,
}

/// Every image plus every audio track of a sanitized configuration.
pub fn requests(
    config: &Configuration,
    resolver: &dyn AssetResolver,
    content_id: u64,
) -> Vec<AssetRequest> {
    let mut requests = Vec::new();
    for (item, entry) in config.items.iter().enumerate() {
        if let Some(reference) = entry.image_path() {
            requests.push(AssetRequest {
                item,
                kind: AssetKind::Image,
                reference: reference.to_string(),
                path: resolver.resolve(reference, content_id),
            });
        }
        if let Some(reference) = entry.audio_path() {
            requests.push(AssetRequest {
                item,
                kind: AssetKind::Audio,
                reference: reference.to_string(),
                path: resolver.resolve(reference, content_id),
            });
        }
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageRef, ItemConfig};

    #[test]
    fn relative_references_land_in_content_dir() {
        let resolver = DirectoryResolver::new("/srv/h5p");
        assert_eq!(
            resolver.resolve("images/a.png", 42),
            PathBuf::from("/srv/h5p/content/42/images/a.png")
        );
        assert_eq!(
            resolver.resolve("/abs/b.png", 42),
            PathBuf::from("/abs/b.png")
        );
    }

    #[test]
    fn requests_cover_images_and_audio() {
        let config = Configuration {
            items: vec![
                ItemConfig {
                    image: Some(ImageRef {
                        path: Some("a.png".into()),
                        ..ImageRef::default()
                    }),
                    audio: Some("a.mp3".into()),
                    ..ItemConfig::default()
                },
                ItemConfig {
                    image: Some(ImageRef {
                        path: Some("b.png".into()),
                        ..ImageRef::default()
                    }),
                    ..ItemConfig::default()
                },
            ],
            ..Configuration::default()
        };
        let resolver = DirectoryResolver::new("/r");
        let requests = requests(&config, &resolver, 1);
        let kinds: Vec<(usize, AssetKind)> = requests.iter().map(|r| (r.item, r.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, AssetKind::Image),
                (0, AssetKind::Audio),
                (1, AssetKind::Image)
            ]
        );
    }
}
