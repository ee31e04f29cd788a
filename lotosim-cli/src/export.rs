use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use lotosim_core::weighting::DistanceBands;
use lotosim_core::{GameConfig, SimulationPlan, SimulationResult};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Export<'a> {
    pub generated_at: String,
    pub game: &'a GameConfig,
    pub plan: &'a SimulationPlan,
    pub weighting: &'a DistanceBands,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub result: &'a SimulationResult,
}

impl<'a> Export<'a> {
    pub fn new(
        game: &'a GameConfig,
        plan: &'a SimulationPlan,
        weighting: &'a DistanceBands,
        seed: Option<u64>,
        result: &'a SimulationResult,
    ) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            game,
            plan,
            weighting,
            seed,
            result,
        }
    }
}

pub fn save_export(export: &Export, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(path, json)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!("Export JSON écrit dans {}", path.display());
    Ok(())
}
