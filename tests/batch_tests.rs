use skin_vision::batch_pipeline::BatchPipeline;
use skin_vision::core_modules::cluster_engine::cluster_engine::RevisitPolicy;
use skin_vision::core_modules::pixel_buffer::pixel_buffer::PixelBuffer;
use skin_vision::pipeline::{AnalysisMode, CharacterReport, FrameAnalysis, PipelineConfig, Report};

fn frame_with_square(side: u32) -> PixelBuffer {
    let mut buffer = PixelBuffer::filled(16, 16, [10, 10, 10, 255]).unwrap();
    for y in 0..side {
        for x in 0..side {
            buffer.set_pixel(x + 2, y + 2, &[200, 150, 120, 255]).unwrap();
        }
    }
    buffer
}

fn config(worker_count: usize) -> PipelineConfig {
    PipelineConfig {
        revisit_policy: RevisitPolicy::Skip,
        worker_count,
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn results_follow_submission_order() {
    let batch = BatchPipeline::new(config(2), AnalysisMode::Skin).unwrap();
    assert_eq!(batch.worker_count(), 2);

    let sides = [8, 3, 10, 0, 6];
    let frames = sides.iter().map(|&side| frame_with_square(side)).collect();
    let results = batch.process_frames(frames).await;
    assert_eq!(results.len(), sides.len());

    for (i, (result, side)) in results.into_iter().zip(sides).enumerate() {
        let frame = result.expect("frame analyzed");
        assert_eq!(frame.frame_id, i as u64);
        let expected_size = (side * side) as usize;
        match frame.analysis {
            FrameAnalysis::Skin(Report::SkinDetected(data)) => {
                assert!(expected_size > 25);
                assert_eq!(data.clusters[0].size(), expected_size);
            }
            FrameAnalysis::Skin(Report::NoSkinDetected) => assert!(expected_size <= 25),
            other => panic!("unexpected analysis {other:?}"),
        }
    }
}

#[tokio::test]
async fn buffers_come_back_annotated() {
    let batch = BatchPipeline::new(config(1), AnalysisMode::Skin).unwrap();
    let frame = batch.process_frame(7, frame_with_square(8)).await.unwrap();
    assert_eq!(frame.frame_id, 7);
    assert_eq!(frame.buffer.get_pixel(2, 2).unwrap(), [255, 0, 0, 255]);
    assert_eq!(frame.buffer.get_pixel(15, 15).unwrap(), [0, 0, 0, 255]);
}

#[tokio::test]
async fn character_mode_runs_per_frame() {
    let batch = BatchPipeline::new(config(0), AnalysisMode::Character).unwrap();
    assert!(batch.worker_count() >= 1);

    let blank = PixelBuffer::filled(8, 8, [255, 255, 255, 255]).unwrap();
    let mut inked = blank.clone();
    inked.set_pixel(3, 4, &[0, 0, 0]).unwrap();

    let results = batch.process_frames(vec![blank, inked]).await;
    assert!(matches!(
        results[0].as_ref().unwrap().analysis,
        FrameAnalysis::Character(CharacterReport::NoInkFound)
    ));
    assert!(matches!(
        results[1].as_ref().unwrap().analysis,
        FrameAnalysis::Character(CharacterReport::CharacterFound(_))
    ));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let bad = PipelineConfig {
        binarize_threshold: 250.0,
        ..PipelineConfig::default()
    };
    assert!(BatchPipeline::new(bad, AnalysisMode::Character).is_err());
}
