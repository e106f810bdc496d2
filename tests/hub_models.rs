//! Integration tests against real Hub checkpoints
//! Run with: cargo test --features integration

#![cfg(feature = "integration")]

use assertive_rewriter::controller::{Analyzer, Outcome};
use assertive_rewriter::provider::HubModelProvider;
use assertive_rewriter::text_classification::TextClassificationPipelineBuilder;

#[test]
fn sentiment_basic() -> anyhow::Result<()> {
    let pipeline = TextClassificationPipelineBuilder::default_sentiment().build()?;

    let output = pipeline.run("I love Rust!")?;
    assert_eq!(output.predictions.len(), 2);
    let top = output.top().expect("two labels");
    assert_eq!(top.label, "POSITIVE");
    assert!(top.score > 0.5 && top.score <= 1.0);
    Ok(())
}

#[test]
fn emotion_ranks_all_labels() -> anyhow::Result<()> {
    let pipeline = TextClassificationPipelineBuilder::english_emotion().build()?;
    assert_eq!(pipeline.labels().len(), 7);

    let output = pipeline.run("I am so angry about the delay")?;
    assert_eq!(output.predictions.len(), 7);
    assert_eq!(output.top().map(|p| p.label.as_str()), Some("anger"));

    let total: f32 = output.predictions.iter().map(|p| p.score).sum();
    assert!((total - 1.0).abs() < 1e-3);
    Ok(())
}

#[test]
fn end_to_end_rewrite() {
    let mut analyzer = Analyzer::new(HubModelProvider::default());

    match analyzer.analyze("I am thrilled about the results") {
        Outcome::Analyzed(report) => {
            assert_eq!(report.emotion.label, "joy");
            assert_eq!(report.transformed, "This is a great moment, and I appreciate it.");
            assert!(report.sentiment.is_some());
        }
        other => panic!("analysis failed: {other}"),
    }
}
