use std::fs;

use agamotto::assets::{self, DirectoryResolver};
use agamotto::config::Configuration;
use agamotto::error::Error;
use agamotto::tasks::loader::preload;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

const CONFIG: &str = r#"
items:
  - image: { path: "then.png" }
    audio: "then.ogg"
  - image: { path: "now.png" }
"#;

fn content_dir(root: &std::path::Path) -> std::path::PathBuf {
    let dir = root.join("content").join("7");
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn preload_reads_dimensions_and_audio() {
    let tmp = tempdir().unwrap();
    let dir = content_dir(tmp.path());
    image::RgbaImage::new(32, 24).save(dir.join("then.png")).unwrap();
    image::RgbaImage::new(16, 8).save(dir.join("now.png")).unwrap();
    fs::write(dir.join("then.ogg"), b"OggS").unwrap();

    let cfg: Configuration = serde_yaml::from_str(CONFIG).unwrap();
    let resolver = DirectoryResolver::new(tmp.path());
    let requests = assets::requests(&cfg, &resolver, 7);
    assert_eq!(requests.len(), 3);

    let loaded = preload(requests, 2, 2, CancellationToken::new())
        .await
        .unwrap()
        .expect("not cancelled");

    let then = loaded.images[0].as_ref().unwrap();
    assert_eq!((then.width, then.height), (32, 24));
    let now = loaded.images[1].as_ref().unwrap();
    assert_eq!((now.width, now.height), (16, 8));
    assert_eq!(loaded.has_audio(), vec![true, false]);
    assert_eq!(loaded.audio[0].as_deref(), Some(dir.join("then.ogg").as_path()));
}

#[tokio::test]
async fn missing_asset_fails_the_whole_preload() {
    let tmp = tempdir().unwrap();
    let dir = content_dir(tmp.path());
    image::RgbaImage::new(4, 4).save(dir.join("then.png")).unwrap();
    fs::write(dir.join("then.ogg"), b"OggS").unwrap();

    let cfg: Configuration = serde_yaml::from_str(CONFIG).unwrap();
    let requests = assets::requests(&cfg, &DirectoryResolver::new(tmp.path()), 7);

    let err = preload(requests, 2, 1, CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        Error::AssetLoad { reference, .. } => assert_eq!(reference, "now.png"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn audio_reference_must_be_a_file() {
    let tmp = tempdir().unwrap();
    let dir = content_dir(tmp.path());
    image::RgbaImage::new(4, 4).save(dir.join("then.png")).unwrap();
    image::RgbaImage::new(4, 4).save(dir.join("now.png")).unwrap();
    fs::create_dir(dir.join("then.ogg")).unwrap();

    let cfg: Configuration = serde_yaml::from_str(CONFIG).unwrap();
    let requests = assets::requests(&cfg, &DirectoryResolver::new(tmp.path()), 7);
    let err = preload(requests, 2, 4, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AssetLoad { ref reference, .. } if reference == "then.ogg"));
}

#[tokio::test]
async fn cancelled_preload_returns_none() {
    let tmp = tempdir().unwrap();
    let cfg: Configuration = serde_yaml::from_str(CONFIG).unwrap();
    let requests = assets::requests(&cfg, &DirectoryResolver::new(tmp.path()), 7);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let loaded = preload(requests, 2, 1, cancel).await.unwrap();
    assert!(loaded.is_none());
}
