//! Uploads the static asset tree into media storage and writes a manifest
//! mapping each relative path to its public URL.
//!
//! Usage: push-assets [ASSET_DIR] [MANIFEST_PATH]

use portfolio_cms::assets::{push_assets, write_manifest};
use portfolio_cms::config::AppConfig;
use portfolio_cms::media::LocalMediaStorage;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_cms=info".into()),
        )
        .init();

    let config = AppConfig::default();
    let mut args = env::args().skip(1);
    let asset_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.static_root.join("assets"));
    let manifest_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("asset-manifest.json"));

    let storage = LocalMediaStorage::new(&config.media_root, &config.media_public_base);
    tracing::info!(
        source = %asset_dir.display(),
        target = %storage.root().display(),
        "pushing assets"
    );

    let report = match push_assets(&storage, &asset_dir).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error reading {}: {}", asset_dir.display(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_manifest(&manifest_path, &report.manifest).await {
        eprintln!("Error writing manifest {}: {}", manifest_path.display(), e);
        std::process::exit(1);
    }

    println!("\nUploaded : {}", report.manifest.len());
    println!("Failed   : {}", report.failed.len());
    println!("Manifest : {}\n", manifest_path.display());

    if !report.failed.is_empty() {
        std::process::exit(2);
    }
}
