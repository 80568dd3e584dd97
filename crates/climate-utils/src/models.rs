use anyhow::Context;
use climate_types::artifacts::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

pub fn save_model(model: &ModelDescriptor, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let payload = serde_json::to_vec_pretty(model)?;
    std::fs::write(path, payload)
        .with_context(|| format!("failed to write model {}", path.display()))?;
    Ok(())
}

/// Returns `None` when nothing has been saved at `path` yet.
pub fn load_model(path: &Path) -> anyhow::Result<Option<ModelDescriptor>> {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read model {}", path.display()))
        }
    };
    let model = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse model {}", path.display()))?;
    Ok(Some(model))
}

pub fn evaluate_model(predictions: &[f64], targets: &[f64]) -> anyhow::Result<RegressionMetrics> {
    if predictions.len() != targets.len() {
        anyhow::bail!(
            "prediction count {} does not match target count {}",
            predictions.len(),
            targets.len()
        );
    }
    if targets.is_empty() {
        return Ok(RegressionMetrics::default());
    }
    let n = targets.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    for (predicted, actual) in predictions.iter().zip(targets) {
        let err = predicted - actual;
        abs_sum += err.abs();
        sq_sum += err * err;
    }
    let mean = targets.iter().sum::<f64>() / n;
    let total = targets
        .iter()
        .map(|actual| (actual - mean).powi(2))
        .sum::<f64>();
    let r2 = if total == 0.0 { 0.0 } else { 1.0 - sq_sum / total };
    Ok(RegressionMetrics {
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        r2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_model() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("models").join("temperature.json");
        let model = ModelDescriptor::trained("transformer");
        save_model(&model, &path).expect("save");
        assert_eq!(load_model(&path).expect("load"), Some(model));
    }

    #[test]
    fn load_missing_model_is_none() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        assert_eq!(load_model(&dir.path().join("absent.json")).expect("load"), None);
    }

    #[test]
    fn evaluates_regression_error() {
        let metrics = evaluate_model(&[2.0, 4.0, 6.0], &[1.0, 4.0, 7.0]).expect("evaluate");
        assert!((metrics.mae - 2.0 / 3.0).abs() < 1e-9);
        assert!((metrics.rmse - (2.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((metrics.r2 - (1.0 - 2.0 / 18.0)).abs() < 1e-9);
    }

    #[test]
    fn empty_evaluation_is_zero_and_mismatch_errors() {
        assert_eq!(
            evaluate_model(&[], &[]).expect("evaluate"),
            RegressionMetrics::default()
        );
        assert!(evaluate_model(&[1.0], &[]).is_err());
    }
}
