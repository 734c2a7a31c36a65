use std::path::PathBuf;

use shotgen::types::shots::ShotStatus;
use shotgen::{GeminiImageGenerator, ReferenceImage, Studio};
use tracing_subscriber::EnvFilter;

fn extension_from_mime(mime: &str) -> &str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn output_dir() -> PathBuf {
    std::env::var("SHOTGEN_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("shotgen-output"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "shotgen=info".into()),
        )
        .init();

    let studio = Studio::new(GeminiImageGenerator::from_env()?);
    if let Ok(name) = std::env::var("SHOTGEN_PRODUCT") {
        studio.set_product_name(name);
    }
    if let Ok(path) = std::env::var("SHOTGEN_REFERENCE") {
        studio.set_reference_image(ReferenceImage::from_path(path).await?);
    }
    if !studio.can_submit() {
        eprintln!("set SHOTGEN_PRODUCT and/or SHOTGEN_REFERENCE");
        return Ok(());
    }

    studio.submit_batch().await?;

    let dir = output_dir();
    tokio::fs::create_dir_all(&dir).await?;
    for shot in studio.snapshot().shots {
        match (shot.status, shot.result_image) {
            (ShotStatus::Completed, Some(image)) => {
                let file = dir.join(format!(
                    "{}.{}",
                    shot.kind.as_str().to_lowercase(),
                    extension_from_mime(&image.mime_type)
                ));
                tokio::fs::write(&file, &image.data).await?;
                println!("{:<20} saved {}", shot.label, file.display());
            }
            _ => println!(
                "{:<20} failed: {}",
                shot.label,
                shot.last_error.unwrap_or_default()
            ),
        }
    }
    Ok(())
}
