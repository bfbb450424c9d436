// THEORY:
// The batch pipeline runs the synchronous engine over many independent buffers at
// once. Analysis itself stays single-threaded per buffer: every buffer is moved
// into exactly one blocking task, analyzed there, and handed back together with
// its report. Concurrency exists only *between* buffers.
//
// A semaphore caps how many buffers are in flight. Results are returned in
// submission order regardless of which worker finishes first.

use crate::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
use crate::error::{Result, VisionError};
use crate::pipeline::{AnalysisMode, FrameAnalysis, PipelineConfig, SkinPipeline};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// One analyzed buffer, returned to its owner.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// Position of the buffer in the submitted batch.
    pub frame_id: u64,
    /// The buffer after analysis, including any annotation.
    pub buffer: PixelBuffer,
    pub analysis: FrameAnalysis,
}

pub struct BatchPipeline {
    pipeline: Arc<SkinPipeline>,
    mode: AnalysisMode,
    limiter: Arc<Semaphore>,
    worker_count: usize,
}

impl BatchPipeline {
    pub fn new(config: PipelineConfig, mode: AnalysisMode) -> Result<Self> {
        let worker_count = config.workers();
        let pipeline = SkinPipeline::new(config)?;
        Ok(Self {
            pipeline: Arc::new(pipeline),
            mode,
            limiter: Arc::new(Semaphore::new(worker_count)),
            worker_count,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Analyzes one buffer on the blocking thread pool.
    pub async fn process_frame(&self, frame_id: u64, buffer: PixelBuffer) -> Result<FrameResult> {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|e| VisionError::Worker(e.to_string()))?;
        let pipeline = Arc::clone(&self.pipeline);
        let mode = self.mode;

        let result = tokio::task::spawn_blocking(move || -> Result<FrameResult> {
            let _permit = permit;
            let mut buffer = buffer;
            let analysis = pipeline.analyze(&mut buffer, mode)?;
            Ok(FrameResult {
                frame_id,
                buffer,
                analysis,
            })
        })
        .await
        .map_err(|e| VisionError::Worker(format!("frame {frame_id}: {e}")))?;

        debug!("frame {} finished", frame_id);
        result
    }

    /// Analyzes every buffer, at most `worker_count` at a time. The i-th result
    /// belongs to the i-th buffer.
    pub async fn process_frames(&self, buffers: Vec<PixelBuffer>) -> Vec<Result<FrameResult>> {
        let total = buffers.len();
        let tasks = buffers
            .into_iter()
            .enumerate()
            .map(|(i, buffer)| self.process_frame(i as u64, buffer));
        let results = join_all(tasks).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "batch of {} frames done on {} workers ({} failed)",
            total, self.worker_count, failed
        );
        results
    }
}
