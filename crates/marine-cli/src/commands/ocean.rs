//! Ocean commands: chlorophyll prediction and SST forecasting

use std::path::Path;

use anyhow::{bail, Result};
use marine_core::{Dispatch, MarineClient, OceanController};
use serde_json::json;

use super::core::{print_json, read_upload};

pub async fn cmd_chlorophyll(client: &MarineClient, csv: &Path, json: bool) -> Result<()> {
    let controller = OceanController::new(client.clone());
    controller.select_chlorophyll_csv(read_upload(csv)?);

    let prediction = match controller.predict_chlorophyll().await {
        Dispatch::Completed(Ok(prediction)) => prediction,
        Dispatch::Completed(Err(_)) => {
            let state = controller.snapshot();
            bail!(
                "{}",
                state
                    .chlorophyll_banner
                    .message()
                    .unwrap_or("Chlorophyll prediction failed")
            );
        }
        Dispatch::Busy | Dispatch::NoInput => bail!("Chlorophyll prediction was not started"),
    };

    if json {
        return print_json(&prediction);
    }

    println!("🌿 Chlorophyll prediction ({} samples)", prediction.samples());
    println!("   ─────────────────────────────");
    println!(
        "   {:>8} {:>9} {:>6} {:>10} {:>8}",
        "depth", "salinity", "pH", "predicted", "actual"
    );
    for i in 0..prediction.samples() {
        let actual = prediction
            .actual_chlorophyll
            .as_ref()
            .and_then(|a| a.get(i))
            .map(|v| format!("{:.3}", v))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>8.1} {:>9.2} {:>6.2} {:>10.3} {:>8}",
            prediction.depth.get(i).copied().unwrap_or_default(),
            prediction.salinity.get(i).copied().unwrap_or_default(),
            prediction.ph.get(i).copied().unwrap_or_default(),
            prediction
                .predicted_chlorophyll
                .get(i)
                .copied()
                .unwrap_or_default(),
            actual
        );
    }

    println!();
    if let Some(mean) = prediction.mean_predicted() {
        println!("   Mean predicted: {:.3} mg/m³", mean);
    }
    if let Some((shallow, deep)) = prediction.depth_range() {
        println!("   Depth range:    {:.1} – {:.1} m", shallow, deep);
    }
    if let Some(mae) = prediction.mean_absolute_error() {
        println!("   Mean abs error: {:.3}", mae);
    }
    Ok(())
}

pub async fn cmd_sst(
    client: &MarineClient,
    csv: Option<&Path>,
    hint: bool,
    json: bool,
) -> Result<()> {
    let controller = OceanController::new(client.clone());

    if hint {
        let message = match controller.load_sst_hint().await {
            Dispatch::Completed(outcome) => outcome?,
            Dispatch::Busy | Dispatch::NoInput => bail!("SST hint request was not started"),
        };
        if json {
            return print_json(&json!({ "message": message }));
        }
        println!("💡 {}", message);
        return Ok(());
    }

    let Some(csv) = csv else {
        bail!("An SST CSV file is required unless --hint is given");
    };
    controller.select_sst_csv(read_upload(csv)?);

    let forecast = match controller.forecast_sst().await {
        Dispatch::Completed(Ok(forecast)) => forecast,
        Dispatch::Completed(Err(_)) => {
            let state = controller.snapshot();
            bail!(
                "{}",
                state.sst_banner.message().unwrap_or("SST forecast failed")
            );
        }
        Dispatch::Busy | Dispatch::NoInput => bail!("SST forecast was not started"),
    };

    if json {
        return print_json(&forecast);
    }

    if forecast.is_empty() {
        println!("🌡️  The backend returned an empty forecast");
        return Ok(());
    }

    println!("🌡️  SST forecast ({} steps)", forecast.forecast.len());
    println!("   ─────────────────────────────");
    for point in &forecast.forecast {
        let day = point
            .date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| point.ds.clone());
        println!(
            "   {}  {:>6.2}°C  [{:.2} – {:.2}]",
            day, point.yhat, point.yhat_lower, point.yhat_upper
        );
    }
    println!();
    if let Some(mean) = forecast.mean_temperature() {
        println!("   Mean: {:.2}°C", mean);
    }
    if let Some((low, high)) = forecast.temperature_range() {
        println!("   Range: {:.2}°C – {:.2}°C", low, high);
    }
    Ok(())
}
