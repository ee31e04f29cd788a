use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::draw::MarkovSampler;
use crate::error::{ConfigError, SimulationError};
use crate::frequency::FrequencyTable;
use crate::result::SimulationResult;
use crate::weighting::{DistanceBands, TransitionWeight};

pub const DEFAULT_TRIALS: u64 = 1_000_000;
pub const DEFAULT_CHUNK_SIZE: u64 = 50_000;
pub const DEFAULT_SHARD_SIZE: u64 = 5_000;

/// Découpage d'un run : nombre d'essais, taille des lots entre deux points de
/// rendement, et taille des fragments en mode parallèle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationPlan {
    pub trials: u64,
    pub chunk_size: u64,
    pub shard_size: u64,
    pub parallel: bool,
}

impl Default for SimulationPlan {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            shard_size: DEFAULT_SHARD_SIZE,
            parallel: false,
        }
    }
}

impl SimulationPlan {
    pub fn with_trials(trials: u64) -> Self {
        Self {
            trials,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.trials == 0 {
            return Err(SimulationError::InvalidPlan("trials doit être > 0"));
        }
        if self.chunk_size == 0 {
            return Err(SimulationError::InvalidPlan("chunk_size doit être > 0"));
        }
        if self.parallel && self.shard_size == 0 {
            return Err(SimulationError::InvalidPlan("shard_size doit être > 0"));
        }
        Ok(())
    }
}

/// Drapeau d'annulation partagé, consulté entre deux lots.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Compteurs d'un run (ou d'un fragment de run en mode parallèle).
struct Tallies {
    main: FrequencyTable,
    special: FrequencyTable,
}

impl Tallies {
    fn new(config: &GameConfig) -> Self {
        Self {
            main: FrequencyTable::new(&config.main),
            special: config
                .special
                .as_ref()
                .map(FrequencyTable::new)
                .unwrap_or_default(),
        }
    }

    fn run_batch(
        &mut self,
        trials: u64,
        main: &mut MarkovSampler,
        mut special: Option<&mut MarkovSampler>,
        rng: &mut StdRng,
    ) {
        for _ in 0..trials {
            self.main.record(main.draw(rng));
            if let Some(sampler) = special.as_mut() {
                self.special.record(sampler.draw(rng));
            }
        }
    }

    fn merge(&mut self, other: &Tallies) {
        self.main.merge(&other.main);
        self.special.merge(&other.special);
    }
}

/// Moteur Monte-Carlo : exécute les essais par lots, rend la main à
/// l'ordonnanceur entre deux lots et réduit les fréquences en recommandation.
pub struct SimulationEngine {
    config: GameConfig,
    plan: SimulationPlan,
    policy: Arc<dyn TransitionWeight>,
    rng: StdRng,
    cancel: Option<CancellationToken>,
}

impl SimulationEngine {
    /// Valide la configuration avant tout essai.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            plan: SimulationPlan::default(),
            policy: Arc::new(DistanceBands::default()),
            rng: StdRng::from_rng(&mut rand::rng()),
            cancel: None,
        })
    }

    pub fn with_plan(mut self, plan: SimulationPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_weighting(mut self, policy: impl TransitionWeight + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn plan(&self) -> &SimulationPlan {
        &self.plan
    }

    /// Lance la simulation. `on_progress` reçoit un pourcentage dans `[0, 100]`
    /// après chaque lot ; la dernière valeur vaut exactement 100.
    pub async fn run<F>(&mut self, mut on_progress: F) -> Result<SimulationResult, SimulationError>
    where
        F: FnMut(f64),
    {
        self.plan.validate()?;

        let start = Instant::now();
        let total = self.plan.trials;
        log::info!(
            "Simulation {} : {} essais, lots de {}{}",
            self.config.name,
            total,
            self.plan.chunk_size,
            if self.plan.parallel { " (parallèle)" } else { "" },
        );

        let mut tallies = Tallies::new(&self.config);
        let mut main = MarkovSampler::new(self.config.main, self.policy.as_ref())?;
        let mut special = self
            .config
            .special
            .map(|pool| MarkovSampler::new(pool, self.policy.as_ref()))
            .transpose()?;

        let mut completed = 0u64;
        while completed < total {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                log::warn!("Simulation annulée après {completed}/{total} essais");
                return Err(SimulationError::Cancelled { completed, total });
            }

            let batch = self.plan.chunk_size.min(total - completed);
            if self.plan.parallel {
                let sharded = self.run_sharded(batch, &main, special.as_ref());
                tallies.merge(&sharded);
            } else {
                tallies.run_batch(batch, &mut main, special.as_mut(), &mut self.rng);
            }
            completed += batch;

            let pct = progress(completed, total);
            log::debug!("Lot terminé : {completed}/{total} ({pct:.1}%)");
            on_progress(pct);

            tokio::task::yield_now().await;
        }

        let recommended = tallies.main.top_n(self.config.main.count);
        let recommended_special = self
            .config
            .special
            .map(|pool| tallies.special.top_n(pool.count));
        let time_taken_ms = start.elapsed().as_millis() as u64;

        log::info!("Simulation terminée en {time_taken_ms} ms");

        Ok(SimulationResult {
            frequencies: tallies.main,
            special_frequencies: tallies.special,
            recommended,
            recommended_special,
            total_trials: total,
            time_taken_ms,
        })
    }

    /// Répartit un lot en fragments de taille fixe. Les graines sont tirées
    /// dans l'ordre des fragments avant l'exécution : le résultat ne dépend
    /// pas du nombre de threads.
    fn run_sharded(
        &mut self,
        batch: u64,
        main: &MarkovSampler,
        special: Option<&MarkovSampler>,
    ) -> Tallies {
        let shard_size = self.plan.shard_size;
        let mut shards = Vec::with_capacity(batch.div_ceil(shard_size) as usize);
        let mut remaining = batch;
        while remaining > 0 {
            let trials = shard_size.min(remaining);
            shards.push((trials, self.rng.random::<u64>()));
            remaining -= trials;
        }

        let config = &self.config;
        shards
            .par_iter()
            .map(|&(trials, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut main = main.clone();
                let mut special = special.cloned();
                let mut tallies = Tallies::new(config);
                tallies.run_batch(trials, &mut main, special.as_mut(), &mut rng);
                tallies
            })
            .reduce(
                || Tallies::new(config),
                |mut acc, shard| {
                    acc.merge(&shard);
                    acc
                },
            )
    }
}

fn progress(completed: u64, total: u64) -> f64 {
    (completed as f64 / total as f64 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::weighting::Uniform;

    fn small_plan(trials: u64, chunk_size: u64) -> SimulationPlan {
        SimulationPlan {
            trials,
            chunk_size,
            ..SimulationPlan::default()
        }
    }

    #[tokio::test]
    async fn test_ssq_small_run() {
        let mut engine = SimulationEngine::new(GameConfig::ssq())
            .unwrap()
            .with_plan(small_plan(1000, 250))
            .with_seed(42);
        let result = engine.run(|_| {}).await.unwrap();

        assert_eq!(result.recommended.len(), 6);
        assert_eq!(result.recommended_special.as_ref().map(Vec::len), Some(1));
        assert_eq!(result.total_trials, 1000);
        assert_eq!(result.frequencies.total(), 1000 * 6);
        assert_eq!(result.special_frequencies.total(), 1000);
        assert!(result.recommended.windows(2).all(|w| w[0] < w[1]));
        assert!(result.recommended.iter().all(|&n| (1..=33).contains(&n)));
        assert!(result.recommended_special.unwrap().iter().all(|&n| (1..=16).contains(&n)));
    }

    #[tokio::test]
    async fn test_single_pool_game() {
        let mut engine = SimulationEngine::new(GameConfig::k8())
            .unwrap()
            .with_plan(small_plan(500, 100))
            .with_seed(1);
        let result = engine.run(|_| {}).await.unwrap();

        assert!(result.recommended_special.is_none());
        assert!(result.special_frequencies.is_empty());
        assert_eq!(result.recommended.len(), 20);
        assert_eq!(result.frequencies.total(), 500 * 20);
        assert_eq!(result.frequencies.len(), 80);
    }

    #[test]
    fn test_count_exceeding_pool_fails_fast() {
        let config = GameConfig::new("invalide", PoolConfig::new(1, 5, 10), None);
        let err = SimulationEngine::new(config).err().unwrap();
        assert!(matches!(err, ConfigError::CountExceedsPool { count: 10, pool_size: 5, .. }));
    }

    #[tokio::test]
    async fn test_invalid_plan_runs_nothing() {
        let mut calls = 0;
        let mut engine = SimulationEngine::new(GameConfig::ssq())
            .unwrap()
            .with_plan(small_plan(0, 10));
        let err = engine.run(|_| calls += 1).await.unwrap_err();
        assert!(matches!(err, SimulationError::InvalidPlan(_)));
        assert_eq!(calls, 0);

        let mut engine = SimulationEngine::new(GameConfig::ssq())
            .unwrap()
            .with_plan(small_plan(10, 0));
        assert!(engine.run(|_| {}).await.is_err());
    }

    #[tokio::test]
    async fn test_progress_monotonic_and_complete() {
        let mut reported = Vec::new();
        let mut engine = SimulationEngine::new(GameConfig::dlt())
            .unwrap()
            .with_plan(small_plan(1000, 300))
            .with_seed(3);
        engine.run(|p| reported.push(p)).await.unwrap();

        assert_eq!(reported.len(), 4);
        assert!(reported.windows(2).all(|w| w[0] <= w[1]), "{:?}", reported);
        assert!(reported.iter().all(|&p| (0.0..=100.0).contains(&p)));
        assert_eq!(*reported.last().unwrap(), 100.0);
        assert!((reported[0] - 30.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_seeded_runs_replay() {
        let run = |seed| async move {
            let mut engine = SimulationEngine::new(GameConfig::ssq())
                .unwrap()
                .with_plan(small_plan(2000, 500))
                .with_seed(seed);
            engine.run(|_| {}).await.unwrap()
        };
        let a = run(77).await;
        let b = run(77).await;
        assert_eq!(a.frequencies, b.frequencies);
        assert_eq!(a.special_frequencies, b.special_frequencies);
        assert_eq!(a.recommended, b.recommended);
        assert_eq!(a.recommended_special, b.recommended_special);
    }

    #[tokio::test]
    async fn test_parallel_run_is_deterministic_and_complete() {
        let plan = SimulationPlan {
            trials: 3000,
            chunk_size: 1000,
            shard_size: 256,
            parallel: true,
        };
        let run = move || async move {
            let mut engine = SimulationEngine::new(GameConfig::dlt())
                .unwrap()
                .with_plan(plan)
                .with_seed(2024);
            engine.run(|_| {}).await.unwrap()
        };
        let a = run().await;
        let b = run().await;
        assert_eq!(a.frequencies.total(), 3000 * 5);
        assert_eq!(a.special_frequencies.total(), 3000 * 2);
        assert_eq!(a.frequencies, b.frequencies);
        assert_eq!(a.recommended, b.recommended);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let mut engine = SimulationEngine::new(GameConfig::ssq())
            .unwrap()
            .with_plan(small_plan(1000, 100))
            .with_cancellation(token);
        let err = engine.run(|_| {}).await.unwrap_err();
        assert!(matches!(err, SimulationError::Cancelled { completed: 0, total: 1000 }));
    }

    #[tokio::test]
    async fn test_cancel_at_chunk_boundary() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let mut engine = SimulationEngine::new(GameConfig::ssq())
            .unwrap()
            .with_plan(small_plan(1000, 100))
            .with_seed(9)
            .with_cancellation(token);
        let err = engine
            .run(move |p| {
                if p >= 30.0 {
                    trigger.cancel();
                }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::Cancelled { completed: 300, total: 1000 }));
    }

    #[tokio::test]
    async fn test_single_pick_frequencies_are_uniform() {
        let config = GameConfig::new("un", PoolConfig::new(1, 10, 1), None);
        let mut engine = SimulationEngine::new(config)
            .unwrap()
            .with_plan(small_plan(20_000, 5_000))
            .with_seed(8);
        let result = engine.run(|_| {}).await.unwrap();
        let expected = 2_000.0;
        for (n, count) in result.frequencies.iter() {
            let dev = (count as f64 - expected).abs() / expected;
            assert!(dev < 0.1, "numéro {n} : {count}");
        }
    }

    #[tokio::test]
    async fn test_custom_weighting() {
        let mut engine = SimulationEngine::new(GameConfig::dlt())
            .unwrap()
            .with_plan(small_plan(400, 400))
            .with_weighting(Uniform)
            .with_seed(5);
        let result = engine.run(|_| {}).await.unwrap();
        assert_eq!(result.frequencies.total(), 400 * 5);
        assert_eq!(result.recommended, result.frequencies.top_n(5));
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(progress(1000, 1000), 100.0);
        assert_eq!(progress(2000, 1000), 100.0);
        assert_eq!(progress(0, 1000), 0.0);
    }
}
