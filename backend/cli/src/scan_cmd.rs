//! `stockscan scan`: image file → extraction → pending item → inventory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use stockscan_capture::{Facing, StillImageDevice, Viewfinder};
use stockscan_core::ItemField;
use stockscan_extraction::LabelExtractor;
use stockscan_inventory::{ScanController, ScanOutcome};
use stockscan_logging::{EventLogger, InventoryEvent};
use tracing::info;

use crate::app::App;
use crate::prompt::parse_assignment;
use crate::terminal_output::{note_error, note_info, note_success};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Label photos to read, one item each
    #[arg(required = true, value_name = "IMAGE")]
    pub images: Vec<PathBuf>,
    /// Save every result without the review prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Override an extracted field, e.g. `--set quantity=3`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub sets: Vec<String>,
    /// Camera facing (environment or user)
    #[arg(long)]
    pub facing: Option<String>,
}

pub async fn run(app: &mut App, args: ScanArgs) -> Result<()> {
    let overrides = args
        .sets
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;
    for (field, _) in &overrides {
        field.parse::<ItemField>()?;
    }
    let facing: Facing = match &args.facing {
        Some(raw) => raw.parse()?,
        None => app.settings.facing,
    };

    let extractor = app.extractor().await?;
    let mut scanner = ScanController::new(app.settings.delays);

    let mut failed = 0;
    for path in &args.images {
        if let Err(e) = scan_one(app, &extractor, &mut scanner, path, facing, &overrides, args.yes).await
        {
            failed += 1;
            note_error(&format!("{}: {e:#}", path.display()));
        }
    }

    if failed > 0 {
        bail!("{failed} of {} scans failed", args.images.len());
    }
    Ok(())
}

async fn scan_one(
    app: &mut App,
    extractor: &LabelExtractor,
    scanner: &mut ScanController,
    path: &Path,
    facing: Facing,
    overrides: &[(String, String)],
    yes: bool,
) -> Result<()> {
    let ticket = scanner.begin(&app.workflow)?;

    // The viewfinder is released as soon as the frame is grabbed.
    let frame = {
        let device = Box::new(StillImageDevice::new(path));
        let captured = Viewfinder::mount(device, facing, app.settings.encoding)
            .and_then(|mut viewfinder| viewfinder.capture());
        match captured {
            Ok(frame) => frame,
            Err(e) => {
                scanner.device_failed(&e);
                // Each image is its own device; the next one may be fine.
                scanner.clear_device_error();
                return Err(e.into());
            }
        }
    };

    note_info(&format!(
        "Analyzing {} with {} ({})",
        path.display(),
        extractor.provider_name(),
        extractor.model()
    ));
    let result = tokio::select! {
        result = extractor.extract(frame) => result,
        _ = tokio::signal::ctrl_c() => {
            scanner.cancel();
            bail!("scan cancelled");
        }
    };

    match scanner.complete(ticket, result, &mut app.workflow) {
        ScanOutcome::Opened => {}
        ScanOutcome::Stale => bail!("result discarded: the scan was cancelled"),
        ScanOutcome::Failed(e) => {
            EventLogger::log_event(InventoryEvent::ExtractionFailed {
                provider: extractor.provider_name().to_string(),
                error_msg: e.to_string(),
            });
            return Err(e.into());
        }
    }

    info!(path = %path.display(), "Label read");
    note_success("Label read");
    app.confirm_pending(overrides, yes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use stockscan_config::{apply_all_defaults, ExtractionConfig, StockscanConfig};

    async fn mock_app(dir: &Path, response: &str) -> App {
        let cfg = StockscanConfig {
            extraction: Some(ExtractionConfig {
                provider: Some("mock".into()),
                mock_response: Some(response.into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg, dir);
        let settings = Settings::from_config(&cfg, dir.join("config.yaml")).unwrap();
        App::open(settings).await
    }

    fn label_image(dir: &Path) -> PathBuf {
        let path = dir.join("label.png");
        image::RgbImage::from_pixel(64, 48, image::Rgb([240, 240, 240]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn scan_adds_item_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = mock_app(
            dir.path(),
            "```json\n{\"brand\":\"ACME\",\"barcode\":4006381333931,\"price\":\"10 EUR\"}\n```",
        )
        .await;
        let args = ScanArgs {
            images: vec![label_image(dir.path())],
            yes: true,
            sets: vec!["quantity=2".into()],
            facing: None,
        };
        run(&mut app, args).await.unwrap();

        let item = &app.inventory.items()[0];
        assert_eq!(item.brand, "ACME");
        assert_eq!(item.barcode, "4006381333931");
        assert_eq!(item.model, "N/A");
        assert_eq!(item.quantity, 2);
    }

    #[tokio::test]
    async fn failures_leave_inventory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = mock_app(dir.path(), "[1, 2, 3]").await;
        let args = ScanArgs {
            images: vec![label_image(dir.path()), dir.path().join("missing.jpg")],
            yes: true,
            sets: vec![],
            facing: Some("user".into()),
        };
        let err = run(&mut app, args).await.unwrap_err();
        assert!(err.to_string().contains("2 of 2"));
        assert!(app.inventory.is_empty());
        assert!(!app.workflow.is_pending());
    }

    #[tokio::test]
    async fn bad_override_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = mock_app(dir.path(), "{}").await;
        let args = ScanArgs {
            images: vec![label_image(dir.path())],
            yes: true,
            sets: vec!["weight=3".into()],
            facing: None,
        };
        assert!(run(&mut app, args).await.is_err());
        assert!(app.inventory.is_empty());
    }
}
