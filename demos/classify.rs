use assertive_rewriter::assertive::transform_to_assertive;
use assertive_rewriter::error::Result;
use assertive_rewriter::text_classification::TextClassificationPipelineBuilder;

fn main() -> Result<()> {
    println!("Building pipelines...");

    let sentiment = TextClassificationPipelineBuilder::default_sentiment().build()?;
    let emotion = TextClassificationPipelineBuilder::english_emotion().build()?;

    println!("Pipelines built successfully.");

    let texts = [
        "I am so angry about the delay",
        "I am thrilled about the results",
        "It is raining outside",
    ];

    for text in texts {
        let s = sentiment.run(text)?;
        let e = emotion.run(text)?;

        println!("\n=== {text} ===");
        if let Some(top) = s.top() {
            println!("Sentiment: {} (confidence: {:.4})", top.label, top.score);
        }
        println!("Emotions:");
        for p in e.predictions.iter().take(3) {
            println!("  {:<10} {:.4}", p.label, p.score);
        }
        if let Some(top) = e.top() {
            let label = top.label.to_lowercase();
            println!("Assertive: \"{}\"", transform_to_assertive(&label, text));
        }
        println!(
            "Completed in {:.2}ms",
            e.stats.total_time.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
