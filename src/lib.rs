//! SHELF application library
//!
//! The book record schema of a personal reading list, with a conformance
//! check and the HTTP module that publishes both.

pub mod modules;

pub use modules::books::{self, Book, BookId, BookRecord, RawBook, BOOK_STATUS};

use anyhow::Context;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build a registry holding every application module.
pub fn registry(settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings);
    registry
}

/// Run the modules and the HTTP server until shutdown.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = registry(&settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings)
        .await
        .context("HTTP server exited with an error");

    registry.stop_all().await?;
    served
}
