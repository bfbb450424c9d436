// THEORY:
// The `pipeline` module is the top-level API of the engine. It wraps the core
// modules behind two questions a caller can ask of a buffer:
//
// - "Where is the skin?": classify, cluster, and (optionally) annotate, then
//   report the retained clusters.
// - "Where is the character?": binarize, measure the ink boundary, and
//   (optionally) frame it with a border.
//
// Every buffer is analyzed on its own; the pipeline keeps no state between calls
// beyond its configuration.

use crate::core_modules::binarizer::binarizer;
use crate::core_modules::boundary_extractor::{CharacterBoundary, extract_boundary};
use crate::core_modules::cluster_engine::cluster_engine::{
    self, ClusterSettings, MIN_PIXELS_PER_CLUSTER, RevisitPolicy,
};
use crate::core_modules::overlay::draw_border;
use crate::core_modules::palette::palette::Marker;
use crate::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
use crate::core_modules::skin_classifier::SkinClassifier;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::cluster::{Cluster, Point};

pub const DEFAULT_BINARIZE_THRESHOLD: f64 = 50.0;

/// Configuration for the SkinPipeline. Missing fields fall back to defaults when
/// deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fills with this many members or fewer are not reported as clusters.
    pub min_cluster_size: usize,
    pub revisit_policy: RevisitPolicy,
    /// Paint markers into the buffer. When false, the buffer is only read
    /// (skin mode) or only binarized (character mode).
    pub annotate: bool,
    /// Binarization threshold as a percentage, 0..=100.
    pub binarize_threshold: f64,
    /// Batch pipeline concurrency. 0 means one worker per logical CPU.
    pub worker_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: MIN_PIXELS_PER_CLUSTER,
            revisit_policy: RevisitPolicy::default(),
            annotate: true,
            binarize_threshold: DEFAULT_BINARIZE_THRESHOLD,
            worker_count: 0,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VisionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| VisionError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        binarizer::byte_threshold(self.binarize_threshold)
            .map_err(|e| VisionError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn cluster_settings(&self) -> ClusterSettings {
        ClusterSettings {
            min_cluster_size: self.min_cluster_size,
            revisit_policy: self.revisit_policy,
        }
    }

    /// The effective batch concurrency.
    pub fn workers(&self) -> usize {
        if self.worker_count == 0 {
            num_cpus::get()
        } else {
            self.worker_count
        }
    }
}

/// Which analysis to run on a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Skin,
    Character,
}

/// The detailed data package for a buffer that contains skin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkinData {
    pub clusters: Vec<Cluster>,
    /// Pixels the classifier accepted, clustered or not.
    pub positive_pixels: usize,
    /// Fills that ended at or below the minimum cluster size.
    pub discarded_fills: usize,
}

/// The outcome of skin detection for a single buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Report {
    NoSkinDetected,
    SkinDetected(SkinData),
}

/// The outcome of character extraction for a single buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CharacterReport {
    NoInkFound,
    CharacterFound(CharacterBoundary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "report", rename_all = "snake_case")]
pub enum FrameAnalysis {
    Skin(Report),
    Character(CharacterReport),
}

/// The main, top-level struct for the analysis engine.
#[derive(Debug, Clone)]
pub struct SkinPipeline {
    config: PipelineConfig,
    classifier: SkinClassifier,
}

impl SkinPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            classifier: SkinClassifier,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn skin_detected(&self, buffer: &mut PixelBuffer) -> Result<bool> {
        let report = self.detect_skin(buffer)?;
        Ok(matches!(report, Report::SkinDetected(_)))
    }

    pub fn detect_skin(&self, buffer: &mut PixelBuffer) -> Result<Report> {
        // Stage 1: Classification & Clustering
        let scan =
            cluster_engine::find_clusters(buffer, &self.classifier, &self.config.cluster_settings());

        // Stage 2: Annotation
        if self.config.annotate {
            cluster_engine::render(buffer, &scan)?;
        }

        info!(
            "skin detection on {}x{} buffer: {} clusters",
            buffer.width(),
            buffer.height(),
            scan.clusters.len()
        );

        if scan.clusters.is_empty() {
            return Ok(Report::NoSkinDetected);
        }
        Ok(Report::SkinDetected(SkinData {
            positive_pixels: scan.mask.positive_count(),
            discarded_fills: scan.discarded,
            clusters: scan.clusters,
        }))
    }

    pub fn extract_character(&self, buffer: &mut PixelBuffer) -> Result<CharacterReport> {
        // Stage 1: Binarization
        binarizer::threshold(buffer, self.config.binarize_threshold)?;

        // Stage 2: Boundary
        let Some(boundary) = extract_boundary(buffer) else {
            debug!("no ink found after binarizing at {}%", self.config.binarize_threshold);
            return Ok(CharacterReport::NoInkFound);
        };

        // Stage 3: Border
        if self.config.annotate {
            if let Err(err) = draw_border(buffer, &boundary, Marker::Border.color()) {
                warn!("character touches the buffer edge, border skipped: {err}");
            }
        }

        info!(
            "character found at ({}, {})-({}, {})",
            boundary.top_left.x, boundary.top_left.y, boundary.bottom_right.x, boundary.bottom_right.y
        );
        Ok(CharacterReport::CharacterFound(boundary))
    }

    pub fn analyze(&self, buffer: &mut PixelBuffer, mode: AnalysisMode) -> Result<FrameAnalysis> {
        match mode {
            AnalysisMode::Skin => self.detect_skin(buffer).map(FrameAnalysis::Skin),
            AnalysisMode::Character => self.extract_character(buffer).map(FrameAnalysis::Character),
        }
    }
}
