use std::fmt::Write;

use anyhow::Result;
use async_trait::async_trait;

use lotosim_core::report::ReportGenerator;
use lotosim_core::result::{odd_even, spread};
use lotosim_core::{FrequencyTable, GameConfig, SimulationResult};

use crate::prompt::group_thousands;

const DISCLAIMER: &str =
    "Simulation à but ludique : les tirages réels sont indépendants et équiprobables.";

/// Résumé Markdown calculé hors ligne à partir du résultat.
#[derive(Debug, Clone)]
pub struct LocalReporter {
    /// Nombre de numéros chauds / froids listés.
    pub highlights: usize,
}

impl Default for LocalReporter {
    fn default() -> Self {
        Self { highlights: 5 }
    }
}

fn fmt_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| format!("{n:02}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl LocalReporter {
    fn pool_section(
        &self,
        out: &mut String,
        title: &str,
        picks: &[u32],
        table: &FrequencyTable,
        rate: impl Fn(u32) -> f64,
    ) -> std::fmt::Result {
        let (odd, even) = odd_even(picks);
        let hot: Vec<u32> = table
            .ranked()
            .into_iter()
            .take(self.highlights)
            .map(|(n, _)| n)
            .collect();
        let cold = table.bottom_n(self.highlights);
        let sum: u32 = picks.iter().sum();

        writeln!(out, "### {title}")?;
        writeln!(out)?;
        writeln!(out, "- Recommandation : **{}**", fmt_numbers(picks))?;
        writeln!(out, "- Impairs / pairs : {odd} / {even}")?;
        writeln!(out, "- Somme : {sum}, écart max-min : {}", spread(picks))?;
        writeln!(out, "- Plus fréquents : {}", fmt_numbers(&hot))?;
        writeln!(out, "- Moins fréquents : {}", fmt_numbers(&cold))?;
        if let Some(&top) = hot.first() {
            writeln!(out, "- Taux de sortie du n°{top:02} : {:.2} %", rate(top) * 100.0)?;
        }
        writeln!(out)
    }

    pub fn render(&self, result: &SimulationResult, config: &GameConfig) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "## Analyse locale : {}", config.name)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} essais en {} ms.",
            group_thousands(result.total_trials),
            result.time_taken_ms
        )?;
        writeln!(out)?;

        self.pool_section(
            &mut out,
            "Numéros principaux",
            &result.recommended,
            &result.frequencies,
            |n| result.hit_rate(n),
        )?;
        if let Some(special) = &result.recommended_special {
            self.pool_section(
                &mut out,
                "Numéros spéciaux",
                special,
                &result.special_frequencies,
                |n| result.special_frequencies.get(n) as f64 / result.total_trials.max(1) as f64,
            )?;
        }

        write!(out, "_{DISCLAIMER}_")?;
        Ok(out)
    }
}

#[async_trait]
impl ReportGenerator for LocalReporter {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, result: &SimulationResult, config: &GameConfig) -> Result<String> {
        self.render(result, config)
    }
}
