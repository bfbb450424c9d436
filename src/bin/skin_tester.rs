use anyhow::{Context, bail};
use skin_vision::core_modules::utils::image_helper::image_helper;
use skin_vision::pipeline::{AnalysisMode, FrameAnalysis, PipelineConfig, Report, SkinPipeline};
use std::env;
use tracing::info;

const USAGE: &str = "Usage: skin_tester <input_image> <output_png> \
[--mode skin|character] [--threshold PCT] [--config config.json] [--report report.json]";

struct Args {
    input_path: String,
    output_path: String,
    mode: AnalysisMode,
    threshold: Option<f64>,
    config_path: Option<String>,
    report_path: Option<String>,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        return Ok(None);
    }

    let mut parsed = Args {
        input_path: args[0].clone(),
        output_path: args[1].clone(),
        mode: AnalysisMode::Skin,
        threshold: None,
        config_path: None,
        report_path: None,
    };

    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        let value = rest
            .next()
            .with_context(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--mode" => {
                parsed.mode = match value.as_str() {
                    "skin" => AnalysisMode::Skin,
                    "character" => AnalysisMode::Character,
                    other => bail!("unknown mode '{other}'"),
                }
            }
            "--threshold" => {
                parsed.threshold = Some(value.parse().context("threshold must be a number")?)
            }
            "--config" => parsed.config_path = Some(value.clone()),
            "--report" => parsed.report_path = Some(value.clone()),
            other => bail!("unknown flag '{other}'"),
        }
    }

    Ok(Some(parsed))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // --- 1. Argument Parsing & Setup ---
    let Some(args) = parse_args()? else {
        println!("{USAGE}");
        return Ok(());
    };

    let mut config = match &args.config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.binarize_threshold = threshold;
    }
    let pipeline = SkinPipeline::new(config)?;

    // --- 2. Image Input ---
    let mut buffer = image_helper::load(&args.input_path)?;
    info!(
        "loaded {} ({}x{})",
        args.input_path,
        buffer.width(),
        buffer.height()
    );

    // --- 3. Analysis ---
    let analysis = pipeline.analyze(&mut buffer, args.mode)?;
    match &analysis {
        FrameAnalysis::Skin(report) => info!("skin report: {:?}", summarize_skin(report)),
        FrameAnalysis::Character(report) => info!("character report: {:?}", report),
    }

    // --- 4. Output ---
    image_helper::save(&args.output_path, &buffer)?;
    if let Some(report_path) = &args.report_path {
        let json = serde_json::to_string_pretty(&analysis)?;
        std::fs::write(report_path, json)
            .with_context(|| format!("failed to write report to {report_path}"))?;
    }

    info!("annotated image written to {}", args.output_path);
    Ok(())
}

/// (top-left, bottom-right, size) per cluster, without the member lists.
fn summarize_skin(report: &Report) -> Vec<((u32, u32), (u32, u32), usize)> {
    match report {
        Report::NoSkinDetected => Vec::new(),
        Report::SkinDetected(data) => data
            .clusters
            .iter()
            .map(|c| {
                (
                    (c.top_left.x, c.top_left.y),
                    (c.bottom_right.x, c.bottom_right.y),
                    c.size(),
                )
            })
            .collect(),
    }
}
