use thiserror::Error;

/// Configuration de jeu invalide. Détectée avant tout tirage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("plage {pool} invalide : [{min}, {max}] (min doit être < max)")]
    MalformedRange { pool: &'static str, min: u32, max: u32 },

    #[error("le nombre de numéros à tirer ({pool}) doit être positif")]
    ZeroCount { pool: &'static str },

    #[error("impossible de tirer {count} numéros distincts dans une plage de {pool_size} ({pool})")]
    CountExceedsPool {
        pool: &'static str,
        count: usize,
        pool_size: usize,
    },

    #[error("specialRange et specialCount doivent être fournis ensemble")]
    IncompleteSpecialPool,

    #[error("jeu inconnu : {0}")]
    UnknownPreset(String),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("plan de simulation invalide : {0}")]
    InvalidPlan(&'static str),

    #[error("simulation annulée après {completed}/{total} essais")]
    Cancelled { completed: u64, total: u64 },
}
