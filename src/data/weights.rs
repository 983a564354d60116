use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::analysis::CompositeWeights;

/// Reads a JSON weight table; omitted components keep their default weight.
pub fn load_weights(path: &Path) -> Result<CompositeWeights> {
    let file = File::open(path).context(format!("Failed to open weights file: {}", path.display()))?;
    let weights: CompositeWeights = serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse weights file: {}", path.display()))?;

    let all = [
        weights.volatility,
        weights.volume,
        weights.momentum,
        weights.search,
        weights.psychology,
    ];
    if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
        bail!("Weights must be finite and non-negative: {:?}", weights);
    }
    if !weights.is_normalized() {
        log::warn!(
            "Weights in {} sum to {} instead of 1.0",
            path.display(),
            weights.total()
        );
    }
    Ok(weights)
}
