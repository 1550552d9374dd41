//! Overfishing monitor responses
//!
//! ```text
//! legacy: { "data": [stock, catch, threshold], "layout": {...} }
//! nested: { "visualization": { "data", "layout" } | "<json string>",
//!           "agent_analysis": { "is_overfishing", "catch_volume", "threshold",
//!                               "catch_percentage", "rag_insights", "recommendations" } }
//! ```
//!
//! Detection is by key presence only: `visualization` or `agent_analysis`
//! selects the nested decoder, anything else is read as legacy. This is
//! fragile if the backend ever adds either key to a legacy body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{number, number_slots, prose, reject_backend_error, text};
use crate::error::Result;

/// Series order in the chart payload
pub const STOCK_SERIES: usize = 0;
pub const CATCH_SERIES: usize = 1;
pub const THRESHOLD_SERIES: usize = 2;

/// One named numeric series; charting is left to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub x: Vec<String>,
    /// `None` marks a month without a number, so indices line up across series
    #[serde(default)]
    pub y: Vec<Option<f64>>,
}

/// Policy agent verdict attached to newer responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentInsights {
    pub is_overfishing: bool,
    pub catch_volume: Option<f64>,
    pub threshold: Option<f64>,
    pub catch_percentage: Option<f64>,
    pub rag_text: String,
    pub recommendations: Vec<String>,
}

/// Canonical overfishing result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverfishingAnalysis {
    pub series: Vec<Series>,
    /// Opaque chart layout, handed through untouched
    #[serde(default)]
    pub layout: Value,
    #[serde(default)]
    pub insights: Option<AgentInsights>,
}

impl OverfishingAnalysis {
    fn values(&self, index: usize) -> &[Option<f64>] {
        self.series
            .get(index)
            .map(|s| s.y.as_slice())
            .unwrap_or(&[])
    }

    pub fn stock(&self) -> &[Option<f64>] {
        self.values(STOCK_SERIES)
    }

    pub fn catch(&self) -> &[Option<f64>] {
        self.values(CATCH_SERIES)
    }

    pub fn threshold(&self) -> &[Option<f64>] {
        self.values(THRESHOLD_SERIES)
    }

    /// Headline statistics over the three series
    pub fn summary(&self) -> OverfishingSummary {
        OverfishingSummary::from_series(self.stock(), self.catch(), self.threshold())
    }
}

/// Overfishing risk derived from the share of overfished months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// `> 50` high, `> 30` medium, anything else low
    pub fn from_rate(rate: i64) -> Self {
        if rate > 50 {
            Self::High
        } else if rate > 30 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::High => "#FF6B6B",
            Self::Medium => "#F1C40F",
            Self::Low => "#2ECC71",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverfishingSummary {
    pub current_stock: f64,
    pub current_catch: f64,
    pub current_threshold: f64,
    pub overfishing_months: usize,
    pub healthy_months: usize,
    pub total_months: usize,
    /// Rounded percent of months over threshold
    pub overfishing_rate: i64,
    /// Rounded percent the latest catch exceeds the latest threshold by
    pub threshold_excess: i64,
    pub risk: RiskLevel,
    /// Latest catch as percent of latest stock, capped at 100
    pub catch_to_stock_pct: f64,
}

impl OverfishingSummary {
    pub fn from_series(
        stock: &[Option<f64>],
        catch: &[Option<f64>],
        threshold: &[Option<f64>],
    ) -> Self {
        let current_stock = latest(stock);
        let current_catch = latest(catch);
        let current_threshold = latest(threshold);

        // Every month counts toward the total; only months with both values can be overfished
        let overfishing_months = catch
            .iter()
            .enumerate()
            .filter(|(i, c)| match (c, threshold.get(*i).copied().flatten()) {
                (Some(c), Some(t)) => *c > t,
                _ => false,
            })
            .count();
        let total_months = catch.len();
        let overfishing_rate = if total_months > 0 {
            round_half_up(overfishing_months as f64 / total_months as f64 * 100.0)
        } else {
            0
        };
        let threshold_excess = if current_threshold > 0.0 {
            round_half_up((current_catch - current_threshold) / current_threshold * 100.0)
        } else {
            0
        };
        let catch_to_stock_pct = if current_stock > 0.0 {
            (current_catch * 100.0 / current_stock).min(100.0)
        } else {
            0.0
        };

        Self {
            current_stock,
            current_catch,
            current_threshold,
            overfishing_months,
            healthy_months: total_months - overfishing_months,
            total_months,
            overfishing_rate,
            threshold_excess,
            risk: RiskLevel::from_rate(overfishing_rate),
            catch_to_stock_pct,
        }
    }

    pub fn exceeds_threshold(&self) -> bool {
        self.threshold_excess > 0
    }
}

/// Value of the last month, zero when it is missing
fn latest(series: &[Option<f64>]) -> f64 {
    series.last().copied().flatten().unwrap_or(0.0)
}

fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

enum OverfishingShape<'a> {
    Legacy(&'a Map<String, Value>),
    Nested {
        visualization: Option<&'a Value>,
        agent: Option<&'a Value>,
    },
}

fn detect(obj: &Map<String, Value>) -> OverfishingShape<'_> {
    if obj.contains_key("visualization") || obj.contains_key("agent_analysis") {
        OverfishingShape::Nested {
            visualization: obj.get("visualization"),
            agent: obj.get("agent_analysis"),
        }
    } else {
        OverfishingShape::Legacy(obj)
    }
}

/// Reduce either overfishing shape to [`OverfishingAnalysis`].
///
/// Never fails on shape: missing pieces decode as empty. Only an explicit
/// `error` field is an error.
pub fn normalize_overfishing(body: &Value) -> Result<OverfishingAnalysis> {
    reject_backend_error(body)?;
    let empty = Map::new();
    let obj = body.as_object().unwrap_or(&empty);
    Ok(match detect(obj) {
        OverfishingShape::Legacy(obj) => decode_chart(obj),
        OverfishingShape::Nested {
            visualization,
            agent,
        } => decode_nested(visualization, agent),
    })
}

fn decode_chart(obj: &Map<String, Value>) -> OverfishingAnalysis {
    let series = obj
        .get("data")
        .and_then(Value::as_array)
        .map(|traces| traces.iter().map(decode_series).collect())
        .unwrap_or_default();
    OverfishingAnalysis {
        series,
        layout: obj.get("layout").cloned().unwrap_or(Value::Null),
        insights: None,
    }
}

fn decode_nested(visualization: Option<&Value>, agent: Option<&Value>) -> OverfishingAnalysis {
    // Some deployments double-encode the chart as a JSON string
    let chart = match visualization {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).unwrap_or(Value::Null),
        Some(other) => other.clone(),
        None => Value::Null,
    };
    let mut analysis = chart
        .as_object()
        .map(decode_chart)
        .unwrap_or_default();
    analysis.insights = agent.and_then(Value::as_object).map(decode_insights);
    analysis
}

fn decode_series(trace: &Value) -> Series {
    Series {
        name: text(trace.get("name")).unwrap_or_default(),
        x: trace
            .get("x")
            .and_then(Value::as_array)
            .map(|xs| {
                xs.iter()
                    .map(|x| match x {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        y: number_slots(trace.get("y")),
    }
}

fn decode_insights(agent: &Map<String, Value>) -> AgentInsights {
    let recommendations = match agent.get("recommendations") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| text(Some(item)))
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    };
    AgentInsights {
        is_overfishing: agent
            .get("is_overfishing")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        catch_volume: agent.get("catch_volume").and_then(number),
        threshold: agent.get("threshold").and_then(number),
        catch_percentage: agent.get("catch_percentage").and_then(number),
        rag_text: prose(agent.get("rag_insights")),
        recommendations,
    }
}
