//! `solace turn` — process one message and print the reply.

use solace_config::AppConfig;
use solace_core::language::Language;

use super::build_pipeline;

pub async fn run(message: &str, user: &str, language: Option<&str>) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let (pipeline, sweeper) = build_pipeline(&config)?;

    let hint = language.and_then(Language::parse);
    let response = pipeline.submit_turn(user, message, &[], hint).await?;

    println!("{}", response.content);
    println!();
    println!(
        "[intent: {} | confidence: {:.2} | language: {}{}]",
        response.intent,
        response.confidence,
        response.language,
        match response.crisis_severity {
            Some(severity) => format!(" | CRISIS: {severity}"),
            None => String::new(),
        }
    );

    sweeper.abort();
    Ok(())
}
