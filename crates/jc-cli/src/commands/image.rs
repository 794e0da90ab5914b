//! Image command implementations

use std::path::Path;

use anyhow::{Context, Result};

use jc_core::error::ActionError;
use jc_core::BuildOptions;

use super::{session, EngineContext};
use crate::output::{format_images, print_error};

/// Build an image and stream the build log.
///
/// Opening the build stream is what starts the build, so the session has
/// nothing further to trigger.
pub async fn build(ctx: &EngineContext, path: &Path, options: BuildOptions) -> Result<()> {
    let context = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to resolve build context")?
            .join(path)
    };
    let options = BuildOptions {
        context: context.to_string_lossy().into_owned(),
        ..options
    };

    let endpoint = ctx.client.url().image_build(&options);
    session::stream(ctx, endpoint.as_str(), async { Ok::<_, ActionError>(()) }).await
}

/// Remove each image, printing the id of every one removed
pub async fn remove(ctx: &EngineContext, images: &[String]) -> Result<()> {
    let mut failed = 0;
    for image in images {
        match ctx.client.remove_image(image).await {
            Ok(id) => println!("{}", id),
            Err(e) => {
                print_error(&format!("{}: {}", image, e));
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("failed to remove {} of {} images", failed, images.len());
    }
    Ok(())
}

/// List images
pub async fn list(ctx: &EngineContext) -> Result<()> {
    let images = ctx.client.list_images().await?;
    println!("{}", format_images(&images, chrono::Utc::now()));
    Ok(())
}
