//! One-shot scans: manual entry, product photos, and offline decoding.

use std::path::Path;

use anyhow::{anyhow, bail};
use nutriscan_barcode::{
    has_supported_extension, open_image, BarcodeExtractor, ExtractionError, SUPPORTED_EXTENSIONS,
};
use nutriscan_capture::Analyzer;
use nutriscan_core::{AppConfig, ScanReport};
use nutriscan_foodfacts::FoodFactsClient;
use nutriscan_scoring::GeminiScorer;

pub(crate) type LiveAnalyzer = Analyzer<FoodFactsClient, GeminiScorer>;

/// Builds the production analyzer from config.
///
/// # Errors
///
/// Returns an error if either HTTP client cannot be built.
pub(crate) fn build_analyzer(config: &AppConfig) -> anyhow::Result<LiveAnalyzer> {
    let lookup = FoodFactsClient::from_config(config)
        .map_err(|e| anyhow!("failed to build food database client: {e}"))?;
    let scorer = GeminiScorer::from_config(config)
        .map_err(|e| anyhow!("failed to build scoring client: {e}"))?;
    Ok(Analyzer::new(lookup, scorer))
}

/// Analyze a barcode typed by the user.
///
/// # Errors
///
/// Returns an error if the input has no digits, the product is unknown or
/// could not be fetched, or scoring fails.
pub(crate) async fn run_barcode(config: &AppConfig, digits: &str) -> anyhow::Result<()> {
    let analyzer = build_analyzer(config)?;
    let report = analyzer.analyze(digits).await?;
    print_report(&report);
    Ok(())
}

/// Resolve the barcode in a product photo and analyze it.
///
/// # Errors
///
/// Returns an error for unsupported or unreadable files, when no barcode in
/// the photo resolves, or when scoring fails.
pub(crate) async fn run_image(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    if !has_supported_extension(path) {
        bail!(
            "unsupported file type {}; expected one of: {}",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    let analyzer = build_analyzer(config)?;
    let extractor =
        BarcodeExtractor::new().with_upscale_min_dimension(config.upscale_min_dimension);

    let product = match extractor.extract_from_path(path, analyzer.lookup()).await {
        Ok(product) => product,
        Err(e @ ExtractionError::NoBarcodeFound { .. }) => {
            eprintln!("hint: enter the digits instead with `nutriscan barcode <DIGITS>`");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Detected {} ({}, rotated {} degrees)",
        product.barcode,
        product.symbology,
        product.rotation.degrees()
    );
    let report = analyzer
        .score_record(&product.barcode, product.record)
        .await?;
    print_report(&report);
    Ok(())
}

/// List every symbol decoded from a photo, per rotation.
///
/// # Errors
///
/// Returns an error if the image cannot be opened.
pub(crate) fn run_decode(path: &Path) -> anyhow::Result<()> {
    let image = open_image(path)?;
    let hits = BarcodeExtractor::new().scan(&image);

    if hits.is_empty() {
        println!("no barcodes found in {}", path.display());
        return Ok(());
    }

    println!("{:<10}{:<8}PAYLOAD", "ROTATION", "TYPE");
    for (rotation, symbol) in &hits {
        println!(
            "{:<10}{:<8}{}",
            rotation.degrees(),
            symbol.symbology.name(),
            symbol.payload
        );
    }
    Ok(())
}

pub(crate) fn print_report(report: &ScanReport) {
    println!("Barcode: {}", report.barcode);
    println!("Score:   {}/100", report.score);
    println!();
    println!("{}", report.comment);
    println!();
    println!("Nutrition details:");
    println!("{}", report.nutrition.to_pretty_json());
}
