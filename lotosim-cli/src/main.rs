mod display;
mod export;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lotosim_core::config::load_game;
use lotosim_core::draw::MarkovSampler;
use lotosim_core::report::{FALLBACK_REPORT, ReportGenerator, report_or_fallback};
use lotosim_core::weighting::DistanceBands;
use lotosim_core::{CancellationToken, GameConfig, SimulationEngine, SimulationError, SimulationPlan};
use lotosim_report::{GeminiReporter, LocalReporter};

use crate::display::{display_draws, display_frequency_chart, display_games, display_report, display_result};
use crate::export::{Export, save_export};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Game {
    #[default]
    Ssq,
    Dlt,
    K8,
}

impl Game {
    fn key(self) -> &'static str {
        match self {
            Game::Ssq => "ssq",
            Game::Dlt => "dlt",
            Game::K8 => "k8",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ReportMode {
    #[default]
    None,
    Local,
    Gemini,
}

#[derive(Parser)]
#[command(name = "lotosim", about = "Simulateur Monte-Carlo / Markov de tirages de loterie")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les jeux prédéfinis
    Games,

    /// Lancer une simulation et afficher la recommandation
    Simulate {
        /// Jeu prédéfini
        #[arg(short, long, default_value = "ssq")]
        game: Game,

        /// Jeu personnalisé (JSON : name, mainRange, mainCount, specialRange, specialCount)
        #[arg(long)]
        game_file: Option<PathBuf>,

        /// Politique de pondération (JSON), bandes par défaut sinon
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Nombre d'essais
        #[arg(short, long, default_value = "1000000")]
        trials: u64,

        /// Taille des lots entre deux mises à jour de la progression
        #[arg(long, default_value = "50000")]
        chunk_size: u64,

        /// Répartir chaque lot sur plusieurs threads
        #[arg(long)]
        parallel: bool,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Nombre de numéros affichés dans les tableaux de fréquences
        #[arg(long, default_value = "10")]
        top: usize,

        /// Exporter le résultat en JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Rapport d'analyse après la simulation
        #[arg(short, long, default_value = "none")]
        report: ReportMode,

        /// Langue du rapport Gemini
        #[arg(long, default_value = "French")]
        language: String,
    },

    /// Générer quelques tirages pondérés isolés
    Draw {
        #[arg(short, long, default_value = "ssq")]
        game: Game,

        #[arg(long)]
        game_file: Option<PathBuf>,

        /// Nombre de tirages
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Games => {
            display_games(&GameConfig::presets());
            Ok(())
        }
        Command::Simulate {
            game,
            game_file,
            weights,
            trials,
            chunk_size,
            parallel,
            seed,
            top,
            json,
            report,
            language,
        } => {
            let config = resolve_game(game, game_file.as_deref())?;
            let plan = SimulationPlan {
                trials,
                chunk_size,
                parallel,
                ..SimulationPlan::default()
            };
            cmd_simulate(config, weights.as_deref(), plan, seed, top, json.as_deref(), report, &language).await
        }
        Command::Draw {
            game,
            game_file,
            count,
            seed,
        } => {
            let config = resolve_game(game, game_file.as_deref())?;
            cmd_draw(&config, count, seed)
        }
    }
}

fn resolve_game(game: Game, game_file: Option<&Path>) -> Result<GameConfig> {
    match game_file {
        Some(path) => load_game(path),
        None => Ok(GameConfig::preset(game.key())?),
    }
}

fn load_weights(path: &Path) -> Result<DistanceBands> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("JSON invalide dans {}", path.display()))
}

#[allow(clippy::too_many_arguments)]
async fn cmd_simulate(
    config: GameConfig,
    weights: Option<&Path>,
    plan: SimulationPlan,
    seed: Option<u64>,
    top: usize,
    json: Option<&Path>,
    report: ReportMode,
    language: &str,
) -> Result<()> {
    let policy = match weights {
        Some(path) => load_weights(path)?,
        None => DistanceBands::default(),
    };

    let token = CancellationToken::new();
    let mut engine = SimulationEngine::new(config.clone())?
        .with_plan(plan)
        .with_weighting(policy)
        .with_cancellation(token.clone());
    if let Some(s) = seed {
        engine = engine.with_seed(s);
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    println!(
        "Simulation {} : {} essais (lots de {})",
        engine.config().name,
        engine.plan().trials,
        engine.plan().chunk_size
    );

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}",
        )?
        .progress_chars("=> "),
    );

    let outcome = engine.run(|p| pb.set_position(p.round() as u64)).await;
    let result = match outcome {
        Ok(result) => {
            pb.finish_and_clear();
            result
        }
        Err(SimulationError::Cancelled { completed, total }) => {
            pb.abandon_with_message("annulée");
            bail!("Simulation interrompue ({completed}/{total} essais), aucun résultat produit");
        }
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    display_result(&config, &result, top);
    display_frequency_chart(&result.frequencies, &result.recommended);

    if let Some(path) = json {
        let export = Export::new(&config, &plan, &policy, seed, &result);
        save_export(&export, path)?;
        println!("\nRésultat exporté dans : {}", path.display());
    }

    if report != ReportMode::None {
        let text = match build_reporter(report, language) {
            Ok(generator) => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_message(format!("Rapport {}...", generator.name()));
                spinner.enable_steady_tick(std::time::Duration::from_millis(100));
                let text = report_or_fallback(generator.as_ref(), &result, &config).await;
                spinner.finish_and_clear();
                text
            }
            Err(e) => {
                log::warn!("Rapport indisponible : {e:#}");
                FALLBACK_REPORT.to_string()
            }
        };
        display_report(&text);
    }

    Ok(())
}

fn build_reporter(mode: ReportMode, language: &str) -> Result<Box<dyn ReportGenerator>> {
    match mode {
        ReportMode::Local => Ok(Box::new(LocalReporter::default())),
        ReportMode::Gemini => Ok(Box::new(GeminiReporter::from_env()?.with_language(language))),
        ReportMode::None => bail!("Aucun rapport demandé"),
    }
}

fn cmd_draw(config: &GameConfig, count: usize, seed: Option<u64>) -> Result<()> {
    config.validate()?;
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let policy = DistanceBands::default();
    let mut main = MarkovSampler::new(config.main, &policy)?;
    let mut special = config
        .special
        .map(|pool| MarkovSampler::new(pool, &policy))
        .transpose()?;

    let draws: Vec<(Vec<u32>, Option<Vec<u32>>)> = (0..count)
        .map(|_| {
            let m = main.draw(&mut rng).to_vec();
            let s = special.as_mut().map(|sampler| sampler.draw(&mut rng).to_vec());
            (m, s)
        })
        .collect();

    display_draws(config, &draws);
    Ok(())
}
