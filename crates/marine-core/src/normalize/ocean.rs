//! Ocean sensor responses: chlorophyll prediction and SST forecasting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{number, number_series, reject_backend_error, text};
use crate::error::Result;

/// Per-row chlorophyll predictions, parallel to the uploaded readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChlorophyllPrediction {
    pub depth: Vec<f64>,
    pub salinity: Vec<f64>,
    pub ph: Vec<f64>,
    pub predicted_chlorophyll: Vec<f64>,
    /// Present when the upload carried a `chlorophyll` column
    #[serde(default)]
    pub actual_chlorophyll: Option<Vec<f64>>,
}

impl ChlorophyllPrediction {
    pub fn samples(&self) -> usize {
        self.depth.len()
    }

    pub fn mean_predicted(&self) -> Option<f64> {
        mean(&self.predicted_chlorophyll)
    }

    /// Shallowest and deepest reading
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        min_max(&self.depth)
    }

    /// Combined min/max of actual and predicted values, for an accuracy plot
    pub fn accuracy_range(&self) -> Option<(f64, f64)> {
        let actual = self.actual_chlorophyll.as_ref()?;
        let all: Vec<f64> = actual
            .iter()
            .chain(self.predicted_chlorophyll.iter())
            .copied()
            .collect();
        min_max(&all)
    }

    /// Mean absolute error against the uploaded actuals
    pub fn mean_absolute_error(&self) -> Option<f64> {
        let actual = self.actual_chlorophyll.as_ref()?;
        let errors: Vec<f64> = actual
            .iter()
            .zip(&self.predicted_chlorophyll)
            .map(|(a, p)| (a - p).abs())
            .collect();
        mean(&errors)
    }
}

/// One forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: String,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

impl ForecastPoint {
    /// Calendar date of the step; `ds` may carry a time component
    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.ds.get(..10).unwrap_or(&self.ds);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Ordered SST forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SstForecast {
    pub forecast: Vec<ForecastPoint>,
}

impl SstForecast {
    pub fn is_empty(&self) -> bool {
        self.forecast.is_empty()
    }

    pub fn mean_temperature(&self) -> Option<f64> {
        mean(&self.yhat())
    }

    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        min_max(&self.yhat())
    }

    fn yhat(&self) -> Vec<f64> {
        self.forecast.iter().map(|p| p.yhat).collect()
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Decode a `/predict/csv` body. Missing columns decode as empty.
pub fn normalize_chlorophyll(body: &Value) -> Result<ChlorophyllPrediction> {
    reject_backend_error(body)?;
    Ok(ChlorophyllPrediction {
        depth: number_series(body.get("depth")),
        salinity: number_series(body.get("salinity")),
        ph: number_series(body.get("ph")),
        predicted_chlorophyll: number_series(body.get("predicted_chlorophyll")),
        actual_chlorophyll: body
            .get("actual_chlorophyll")
            .filter(|v| v.is_array())
            .map(|v| number_series(Some(v))),
    })
}

/// Decode a `/predict/sst/csv` body. Points without a `ds` or `yhat` are skipped.
pub fn normalize_sst(body: &Value) -> Result<SstForecast> {
    reject_backend_error(body)?;
    let forecast = body
        .get("forecast")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter_map(Value::as_object)
                .filter_map(forecast_point)
                .collect()
        })
        .unwrap_or_default();
    Ok(SstForecast { forecast })
}

fn forecast_point(obj: &Map<String, Value>) -> Option<ForecastPoint> {
    let ds = text(obj.get("ds"))?;
    let yhat = obj.get("yhat").and_then(number)?;
    Some(ForecastPoint {
        ds,
        yhat,
        yhat_lower: obj.get("yhat_lower").and_then(number).unwrap_or(yhat),
        yhat_upper: obj.get("yhat_upper").and_then(number).unwrap_or(yhat),
    })
}

/// Instructions served by `GET /predict/sst`
pub fn normalize_upload_hint(body: &Value) -> Result<String> {
    reject_backend_error(body)?;
    Ok(text(body.get("message")).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_chlorophyll() {
        let body = json!({
            "depth": [5, 10, 20],
            "salinity": [35.1, 35.2, 35.4],
            "ph": [8.1, 8.0, 7.9],
            "predicted_chlorophyll": [0.5, 0.25, 0.75]
        });
        let prediction = normalize_chlorophyll(&body).unwrap();
        assert_eq!(prediction.samples(), 3);
        assert_eq!(prediction.mean_predicted(), Some(0.5));
        assert_eq!(prediction.depth_range(), Some((5.0, 20.0)));
        assert_eq!(prediction.actual_chlorophyll, None);
        assert_eq!(prediction.accuracy_range(), None);
        assert_eq!(prediction.mean_absolute_error(), None);
    }

    #[test]
    fn test_chlorophyll_with_actuals() {
        let body = json!({
            "depth": [5, 10],
            "salinity": [35.1, 35.2],
            "ph": [8.1, 8.0],
            "predicted_chlorophyll": [0.5, 1.0],
            "actual_chlorophyll": [0.75, 0.5]
        });
        let prediction = normalize_chlorophyll(&body).unwrap();
        assert_eq!(prediction.accuracy_range(), Some((0.5, 1.0)));
        assert_eq!(prediction.mean_absolute_error(), Some(0.375));
    }

    #[test]
    fn test_chlorophyll_error_field() {
        let body = json!({"error": "CSV must contain columns: {'depth', 'salinity', 'ph'}"});
        let err = normalize_chlorophyll(&body).unwrap_err();
        assert!(matches!(err, Error::Backend(ref m) if m.starts_with("CSV must contain")));
    }

    #[test]
    fn test_sst_forecast() {
        let body = json!({
            "forecast": [
                {"ds": "2024-01-01T00:00:00", "yhat": 27.5, "yhat_lower": 26.9, "yhat_upper": 28.1},
                {"ds": "2024-02-01", "yhat": 28.5, "yhat_lower": 27.8, "yhat_upper": 29.0},
                {"yhat": 30.0}
            ]
        });
        let forecast = normalize_sst(&body).unwrap();
        assert_eq!(forecast.forecast.len(), 2);
        assert_eq!(forecast.mean_temperature(), Some(28.0));
        assert_eq!(forecast.temperature_range(), Some((27.5, 28.5)));
        assert_eq!(
            forecast.forecast[0].date(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn test_sst_missing_bounds_default_to_yhat() {
        let forecast = normalize_sst(&json!({"forecast": [{"ds": "2024-03-01", "yhat": "29.25"}]}))
            .unwrap();
        let point = &forecast.forecast[0];
        assert_eq!(point.yhat, 29.25);
        assert_eq!(point.yhat_lower, 29.25);
        assert_eq!(point.yhat_upper, 29.25);
    }

    #[test]
    fn test_sst_empty() {
        let forecast = normalize_sst(&json!({})).unwrap();
        assert!(forecast.is_empty());
        assert_eq!(forecast.mean_temperature(), None);
    }

    #[test]
    fn test_upload_hint() {
        let hint = normalize_upload_hint(&json!({
            "message": "Upload SST CSV to /predict/sst/csv with columns: date,value"
        }))
        .unwrap();
        assert!(hint.contains("date,value"));
        assert_eq!(normalize_upload_hint(&json!({})).unwrap(), "");
    }
}
