use common::{Config, Secrets};
use feedlens::llm::create_llm_provider;
use feedlens::llm::summarizer::{summarize_article, SummaryOutcome};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    dotenv::dotenv().ok();

    let config = Config::load_with_defaults(
        Some(Path::new("config.default.toml")),
        Some(Path::new("config.toml")),
    )
    .await?;
    let secrets = Secrets::from_env(&config)?;
    let provider = create_llm_provider(&config.llm, &secrets.llm_api_key);

    println!("\n{}", "=".repeat(60));
    println!("Testing Gemini summarization");
    println!("Model: {}", config.llm.model);
    println!("{}", "=".repeat(60));

    let test_article = r#"
Rust is a systems programming language that runs blazingly fast, prevents
segfaults, and guarantees thread safety. It accomplishes these goals through
a unique ownership system that enforces memory safety without requiring a
garbage collector.

The Rust compiler provides helpful error messages and suggestions, making it
easier to write correct code. The language has a growing ecosystem of libraries
called "crates" available through Cargo, Rust's package manager.

Many companies are adopting Rust for critical infrastructure. The language's
performance and safety guarantees make it ideal for operating systems, web
servers, and embedded systems.
    "#;

    println!("\n[Test 1] Summarizing article...");
    report(summarize_article(provider.as_ref(), Some(test_article)).await);

    // Below the length threshold: must not reach the provider
    let short_article = "Rust 1.70 was released today with new features.";
    println!("\n[Test 2] Summarizing short article...");
    report(summarize_article(provider.as_ref(), Some(short_article)).await);

    println!("\n{}", "=".repeat(60));
    println!("Tests completed");
    println!("{}", "=".repeat(60));
    Ok(())
}

fn report(outcome: SummaryOutcome) {
    match &outcome {
        SummaryOutcome::Generated(text) => println!("✓ Success!\n{}", text),
        SummaryOutcome::TooShort => println!("✓ Skipped: {}", outcome.display_text()),
        SummaryOutcome::Failed(_) => eprintln!("✗ Failed: {}", outcome.display_text()),
    }
}
