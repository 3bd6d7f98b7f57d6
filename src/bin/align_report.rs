use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Parser;
use hannom_align::alignment::projection::{
    flatten_boxes, ocr_render_class, reference_render_class,
};
use hannom_align::input::{merge_punctuation, read_page_boxes, read_reference_words};
use hannom_align::{AlignerConfig, Page, PageAlignerBuilder, PageAlignment, RenderClass};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Align OCR page detections against reference transcriptions and write a
/// JSON review report.
#[derive(Debug, Parser)]
#[command(name = "align_report")]
struct Args {
    /// Translation dictionary (JSON: reference word -> renderings)
    #[arg(long)]
    translation_dict: PathBuf,
    /// Similarity dictionary (JSON: glyph -> confusable glyphs)
    #[arg(long)]
    similarity_dict: PathBuf,
    /// Directory of per-page detection JSON files
    #[arg(long)]
    pages: PathBuf,
    /// Directory of reference text files (<page>_word.txt, <page>_text.txt)
    #[arg(long)]
    reference: PathBuf,
    /// Output report path
    #[arg(long, default_value = "alignment_report.json")]
    output: PathBuf,
    /// Minimum recognition confidence for a box to be considered
    #[arg(long, default_value_t = AlignerConfig::DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence_threshold: f64,
    /// Keep boxes that never matched the reference in the report
    #[arg(long)]
    keep_spurious: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    schema_version: u32,
    meta: Meta,
    pages: Vec<PageReport>,
    skipped: Vec<SkippedPage>,
}

#[derive(Debug, Serialize)]
struct Meta {
    generated_at: String,
    translation_dict: String,
    similarity_dict: String,
    confidence_threshold: f64,
    page_count: usize,
}

#[derive(Debug, Serialize)]
struct SkippedPage {
    name: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct PageReport {
    name: String,
    cost: u32,
    glyph_count: usize,
    reference_word_count: usize,
    boxes: Vec<BoxReport>,
}

#[derive(Debug, Serialize)]
struct BoxReport {
    id: String,
    points: Vec<[f64; 2]>,
    spurious: bool,
    ocr: Vec<UnitReport>,
    reference: Vec<UnitReport>,
}

#[derive(Debug, Serialize)]
struct UnitReport {
    text: String,
    class: RenderClass,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    if run().is_err() {
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let aligner = PageAlignerBuilder::new(AlignerConfig {
        translation_dict_path: args.translation_dict.to_string_lossy().to_string(),
        similarity_dict_path: args.similarity_dict.to_string_lossy().to_string(),
        confidence_threshold: args.confidence_threshold,
    })
    .build()
    .map_err(|e| {
        tracing::error!(error = %e, "failed to build aligner");
        e.to_string()
    })?;

    let page_names = discover_pages(&args.pages)?;
    if page_names.is_empty() {
        return Err(format!("no page JSON files under {}", args.pages.display()));
    }

    let pb = ProgressBar::new(page_names.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .map_err(|e| e.to_string())?,
    );

    let mut pages = Vec::new();
    let mut display_streams = Vec::new();
    let mut skipped = Vec::new();
    for name in &page_names {
        pb.set_message(name.clone());
        match load_page(&args, name) {
            Ok((page, display)) => {
                pages.push(page);
                display_streams.push((name.clone(), display));
            }
            Err(reason) => {
                tracing::warn!(page = name.as_str(), reason = reason.as_str(), "skipping page");
                skipped.push(SkippedPage {
                    name: name.clone(),
                    reason,
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let outcomes = aligner.align_pages(pages);

    let mut page_reports = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(aligned) => {
                let display = display_streams
                    .iter()
                    .find(|(name, _)| *name == outcome.name)
                    .map(|(_, d)| d.as_slice())
                    .unwrap_or(&[]);
                page_reports.push(page_report(
                    &outcome.name,
                    &aligned,
                    display,
                    args.keep_spurious,
                ));
            }
            Err(err) => skipped.push(SkippedPage {
                name: outcome.name,
                reason: err.to_string(),
            }),
        }
    }

    let report = Report {
        schema_version: 1,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            translation_dict: args.translation_dict.to_string_lossy().to_string(),
            similarity_dict: args.similarity_dict.to_string_lossy().to_string(),
            confidence_threshold: args.confidence_threshold,
            page_count: page_reports.len(),
        },
        pages: page_reports,
        skipped,
    };

    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    std::fs::write(&args.output, json).map_err(|e| {
        tracing::error!(path = %args.output.display(), error = %e, "failed to write report");
        e.to_string()
    })?;
    tracing::info!(
        path = %args.output.display(),
        pages = report.meta.page_count,
        skipped = report.skipped.len(),
        "report written"
    );
    Ok(())
}

/// Page stems are detection JSON file names without the extension.
fn discover_pages(pages_dir: &Path) -> Result<Vec<String>, String> {
    let entries = std::fs::read_dir(pages_dir)
        .map_err(|e| format!("cannot list {}: {e}", pages_dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| e.to_string())?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Load one page's boxes plus its reference streams. The comparison stream
/// comes from `<page>_word.txt`; the display stream from `<page>_text.txt`
/// with punctuation-only tokens merged, falling back to the comparison
/// stream when the text file is absent.
fn load_page(args: &Args, name: &str) -> Result<(Page, Vec<String>), String> {
    let boxes = read_page_boxes(
        &args.pages.join(format!("{name}.json")),
        name,
        args.confidence_threshold,
    )
    .map_err(|e| e.to_string())?;

    let reference_words = read_reference_words(&args.reference.join(format!("{name}_word.txt")))
        .map_err(|e| e.to_string())?;

    let text_path = args.reference.join(format!("{name}_text.txt"));
    let display = if text_path.exists() {
        merge_punctuation(&read_reference_words(&text_path).map_err(|e| e.to_string())?)
    } else {
        reference_words.clone()
    };

    Ok((
        Page {
            name: name.to_string(),
            boxes,
            reference_words,
        },
        display,
    ))
}

fn page_report(
    name: &str,
    aligned: &PageAlignment,
    display: &[String],
    keep_spurious: bool,
) -> PageReport {
    let stream = flatten_boxes(&aligned.boxes);
    let glyph_count = stream.len();
    let reference_word_count = aligned
        .result
        .edges
        .iter()
        .filter(|e| e.reference_index().is_some())
        .count();

    let mut boxes = Vec::new();
    for box_alignment in &aligned.box_alignments {
        if box_alignment.spurious && !keep_spurious {
            continue;
        }
        let detected = &aligned.boxes[box_alignment.box_index];

        let ocr_units = box_alignment
            .edges
            .iter()
            .map(|edge| UnitReport {
                text: edge
                    .ocr_index()
                    .map(|i| stream[i].glyph.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                class: ocr_render_class(edge),
            })
            .collect();
        let reference_units = box_alignment
            .edges
            .iter()
            .map(|edge| UnitReport {
                text: edge
                    .reference_index()
                    .and_then(|i| display.get(i).cloned())
                    .unwrap_or_else(|| "-".to_string()),
                class: reference_render_class(edge),
            })
            .collect();

        boxes.push(BoxReport {
            id: format!("{name}.{:03}", box_alignment.box_index + 1),
            points: detected.points.iter().map(|p| [p.x, p.y]).collect(),
            spurious: box_alignment.spurious,
            ocr: ocr_units,
            reference: reference_units,
        });
    }

    PageReport {
        name: name.to_string(),
        cost: aligned.result.cost,
        glyph_count,
        reference_word_count,
        boxes,
    }
}
