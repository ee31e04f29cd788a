use anyhow::Result;
use async_trait::async_trait;

use crate::config::GameConfig;
use crate::result::SimulationResult;

/// Message substitué au rapport quand le générateur échoue.
pub const FALLBACK_REPORT: &str = "Impossible d'obtenir le rapport d'analyse, veuillez réessayer plus tard.";

/// Collaborateur externe qui transforme un résultat terminé en texte.
/// Le texte n'est ni analysé ni validé.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, result: &SimulationResult, config: &GameConfig) -> Result<String>;
}

/// Rapport ou message de repli. Une erreur du générateur n'affecte jamais
/// le résultat déjà calculé.
pub async fn report_or_fallback(
    generator: &dyn ReportGenerator,
    result: &SimulationResult,
    config: &GameConfig,
) -> String {
    match generator.generate(result, config).await {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Rapport {} indisponible : {:#}", generator.name(), e);
            FALLBACK_REPORT.to_string()
        }
    }
}
