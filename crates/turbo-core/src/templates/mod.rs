//! Template catalog, fetching, copying and rendering
//!
//! This module provides:
//! - Catalog entry types ([`TemplateInfo`]) and tag filtering
//! - Catalog fetching from a remote URL or a local file
//! - Template package installation into the template cache
//! - Copying a package's `template/` directory and rendering its placeholders

pub mod copier;
pub mod fetcher;
pub mod ignore;
pub mod installer;
pub mod manifest;
pub mod render;

pub use copier::copy_template;
pub use fetcher::{TemplateFetcher, TemplateSource};
pub use ignore::IgnoreSet;
pub use installer::{
    fetch_template, install_custom, install_normal, FetchOutcome, InstallState, TemplateInstaller,
};
pub use manifest::{templates_for, TemplateInfo, TemplateType};
pub use render::{render_dir, Renderer};
