//! Fisheries commands: fish classification and overfishing monitoring

use std::path::Path;

use anyhow::{bail, Result};
use marine_core::{Dispatch, FisheriesController, MarineClient, RiskLevel};
use serde_json::json;

use super::core::{print_json, read_upload};

pub async fn cmd_classify(client: &MarineClient, image: &Path, json: bool) -> Result<()> {
    let controller = FisheriesController::new(client.clone());
    controller.select_image(read_upload(image)?);

    let outcome = match controller.classify().await {
        Dispatch::Completed(outcome) => outcome,
        Dispatch::Busy | Dispatch::NoInput => bail!("Classification was not started"),
    };
    let result = &outcome.value;

    if json {
        return print_json(&json!({
            "result": result,
            "source": outcome.source,
        }));
    }

    println!("🐟 {}", result.species);
    println!(
        "   Confidence: {} ({})",
        result.confidence,
        result.severity().as_str()
    );
    if !result.top_predictions.is_empty() {
        println!();
        println!("   Top predictions:");
        for p in &result.top_predictions {
            println!("     {:<28} {:>6.2}%", p.label, p.score);
        }
    }
    if !result.biological_notes.is_empty() {
        println!();
        println!("   📝 {}", result.biological_notes);
    }
    if let Some(data_source) = &result.data_source {
        println!("   Data source: {}", data_source);
    }

    println!();
    if outcome.is_synthetic() {
        println!("⚠️  Every classification endpoint failed; showing a sample result");
        for failure in &outcome.failures {
            println!("   {} → {}", failure.label, failure.error);
        }
    } else {
        println!("   Source: {}", outcome.source);
    }
    Ok(())
}

pub async fn cmd_overfishing(client: &MarineClient, csv: &Path, json: bool) -> Result<()> {
    let controller = FisheriesController::new(client.clone());
    controller.select_catch_csv(read_upload(csv)?);

    match controller.analyze_overfishing().await {
        Dispatch::Completed(Ok(_)) => {}
        Dispatch::Completed(Err(_)) => {
            let state = controller.snapshot();
            bail!(
                "{}",
                state.banner.message().unwrap_or("Overfishing analysis failed")
            );
        }
        Dispatch::Busy | Dispatch::NoInput => bail!("Overfishing analysis was not started"),
    }

    let Some(analysis) = controller.snapshot().overfishing else {
        bail!("Overfishing analysis returned no result");
    };
    let summary = analysis.summary();

    if json {
        return print_json(&json!({
            "analysis": analysis,
            "summary": summary,
        }));
    }

    let icon = match summary.risk {
        RiskLevel::High => "🔴",
        RiskLevel::Medium => "🟡",
        RiskLevel::Low => "🟢",
    };

    println!("📊 Overfishing Monitor");
    println!("   ─────────────────────────────");
    println!("   Current stock:     {:.2}", summary.current_stock);
    println!("   Current catch:     {:.2}", summary.current_catch);
    println!("   Threshold:         {:.2}", summary.current_threshold);
    println!(
        "   Catch vs stock:    {:.1}%",
        summary.catch_to_stock_pct
    );
    println!(
        "   Months overfished: {} of {} ({}%)",
        summary.overfishing_months, summary.total_months, summary.overfishing_rate
    );
    println!("   {} Risk: {}", icon, summary.risk);
    if summary.exceeds_threshold() {
        println!(
            "   ⚠️  Latest catch is {}% over the sustainable threshold",
            summary.threshold_excess
        );
    }

    if let Some(insights) = &analysis.insights {
        println!();
        if insights.is_overfishing {
            println!("🚨 Policy agent: overfishing detected");
        } else {
            println!("✅ Policy agent: catch within sustainable limits");
        }
        if let Some(pct) = insights.catch_percentage {
            println!("   Catch percentage: {:.1}%", pct);
        }
        if !insights.rag_text.is_empty() {
            println!("   {}", insights.rag_text);
        }
        if !insights.recommendations.is_empty() {
            println!();
            println!("   Recommendations:");
            for r in &insights.recommendations {
                println!("   • {}", r);
            }
        }
    }
    Ok(())
}
