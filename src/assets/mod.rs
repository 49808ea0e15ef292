/*!
 * Static Assets
 * Directory listings of the site's bundled assets and a bulk push into media storage
 */
pub mod catalog;
pub mod push;

pub use catalog::{CompanyLogo, StaticCatalog, VideoAsset};
pub use push::{push_assets, write_manifest, AssetManifest, PushReport};
