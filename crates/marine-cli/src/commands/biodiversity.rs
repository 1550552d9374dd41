//! Biodiversity commands: eDNA analysis and species questions

use std::path::Path;

use anyhow::{bail, Result};
use marine_core::{BiodiversityController, ChatRole, Dispatch, MarineClient};
use tracing::warn;

use super::core::{print_json, read_upload};

pub async fn cmd_edna(
    client: &MarineClient,
    file: &Path,
    questions: &[String],
    json: bool,
) -> Result<()> {
    let controller = BiodiversityController::new(client.clone());
    controller.select_sequences(read_upload(file)?);

    let outcome = match controller.analyze().await {
        Dispatch::Completed(outcome) => outcome,
        Dispatch::Busy | Dispatch::NoInput => bail!("eDNA analysis was not started"),
    };

    for question in questions {
        if let Dispatch::NoInput = controller.ask(question).await {
            warn!(question = %question, "Species chat unavailable, question skipped");
        }
    }

    let state = controller.snapshot();
    if json {
        return print_json(&state);
    }

    let analysis = &outcome.value;
    let summary = analysis.summary();

    if let Some(species) = &state.alert {
        println!("🚨 Invasive species detected: {}", species);
        println!();
    }

    println!("🧬 eDNA analysis");
    println!("   ─────────────────────────────");
    println!("   Sequences matched: {}", summary.total);
    println!("   Mean confidence:   {}%", summary.mean_confidence);
    println!("   Invasive:          {}", summary.invasive);
    println!();
    for d in &analysis.detected_species {
        let confidence = d
            .confidence
            .map(|c| format!("{:.1}%", c))
            .unwrap_or_else(|| "-".to_string());
        let flag = if d.invasive { " ⚠️" } else { "" };
        println!(
            "   {:<20} {:<28} {:>7}{}",
            d.display_id(),
            d.species,
            confidence,
            flag
        );
    }

    if let Some(profile) = &analysis.analysis {
        println!();
        println!("🔬 {}", profile.name());
        if !profile.species_scientific.is_empty() && !profile.species_common.is_empty() {
            println!("   Scientific name: {}", profile.species_scientific);
        }
        if !profile.invasive_status.is_empty() {
            println!("   Status: {}", profile.invasive_status);
        }
        if !profile.ecological_role.is_empty() {
            println!("   Role: {}", profile.ecological_role);
        }
        if !profile.genetic_markers.is_empty() {
            println!("   Markers: {}", profile.genetic_markers.join(", "));
        }
        for fact in &profile.interesting_facts {
            println!("   • {}", fact);
        }
    }

    if outcome.is_synthetic() {
        println!();
        println!("⚠️  eDNA service unreachable; showing sample detections");
    }

    if !state.transcript.is_empty() {
        println!();
        println!("💬 Species chat");
        for message in state.transcript.messages() {
            let who = match message.role {
                ChatRole::User => "You",
                ChatRole::Assistant => "Assistant",
            };
            println!("   {}: {}", who, message.text);
        }
    } else if !questions.is_empty() && !state.chat_available() {
        println!();
        println!("   Species chat needs a species profile; questions were skipped");
    }
    Ok(())
}
