use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Une urne de numéros : plage inclusive `[min, max]` et nombre de numéros tirés.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub range: (u32, u32),
    pub count: usize,
}

impl PoolConfig {
    pub const fn new(min: u32, max: u32, count: usize) -> Self {
        Self {
            range: (min, max),
            count,
        }
    }

    pub fn min(&self) -> u32 {
        self.range.0
    }

    pub fn max(&self) -> u32 {
        self.range.1
    }

    /// Nombre de numéros dans la plage. Zéro si la plage est inversée.
    pub fn size(&self) -> usize {
        let (min, max) = self.range;
        if max < min {
            0
        } else {
            (max - min) as usize + 1
        }
    }

    pub fn contains(&self, n: u32) -> bool {
        n >= self.range.0 && n <= self.range.1
    }

    pub fn validate(&self, pool: &'static str) -> Result<(), ConfigError> {
        let (min, max) = self.range;
        if min >= max {
            return Err(ConfigError::MalformedRange { pool, min, max });
        }
        if self.count == 0 {
            return Err(ConfigError::ZeroCount { pool });
        }
        if self.count > self.size() {
            return Err(ConfigError::CountExceedsPool {
                pool,
                count: self.count,
                pool_size: self.size(),
            });
        }
        Ok(())
    }
}

/// Description immuable d'une variante de loterie.
///
/// Le format JSON reprend les champs `mainRange`, `mainCount`, `specialRange`
/// et `specialCount`. La désérialisation valide la configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig", into = "RawGameConfig")]
pub struct GameConfig {
    pub name: String,
    pub main: PoolConfig,
    pub special: Option<PoolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameConfig {
    name: String,
    main_range: (u32, u32),
    main_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_range: Option<(u32, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_count: Option<usize>,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGameConfig) -> Result<Self, Self::Error> {
        let special = match (raw.special_range, raw.special_count) {
            (Some((min, max)), Some(count)) => Some(PoolConfig::new(min, max, count)),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteSpecialPool),
        };
        let config = GameConfig {
            name: raw.name,
            main: PoolConfig::new(raw.main_range.0, raw.main_range.1, raw.main_count),
            special,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<GameConfig> for RawGameConfig {
    fn from(config: GameConfig) -> Self {
        RawGameConfig {
            name: config.name,
            main_range: config.main.range,
            main_count: config.main.count,
            special_range: config.special.map(|p| p.range),
            special_count: config.special.map(|p| p.count),
        }
    }
}

impl GameConfig {
    pub fn new(name: impl Into<String>, main: PoolConfig, special: Option<PoolConfig>) -> Self {
        Self {
            name: name.into(),
            main,
            special,
        }
    }

    /// Double Color Ball : 6 numéros parmi 1-33 + 1 parmi 1-16.
    pub fn ssq() -> Self {
        Self::new(
            "Double Color Ball",
            PoolConfig::new(1, 33, 6),
            Some(PoolConfig::new(1, 16, 1)),
        )
    }

    /// Super Lotto : 5 numéros parmi 1-35 + 2 parmi 1-12.
    pub fn dlt() -> Self {
        Self::new(
            "Super Lotto",
            PoolConfig::new(1, 35, 5),
            Some(PoolConfig::new(1, 12, 2)),
        )
    }

    /// Happy 8 : 20 numéros parmi 1-80, pas d'urne spéciale.
    pub fn k8() -> Self {
        Self::new("Happy 8", PoolConfig::new(1, 80, 20), None)
    }

    pub fn preset(key: &str) -> Result<Self, ConfigError> {
        match key.trim().to_lowercase().as_str() {
            "ssq" => Ok(Self::ssq()),
            "dlt" => Ok(Self::dlt()),
            "k8" => Ok(Self::k8()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    pub fn presets() -> Vec<(&'static str, GameConfig)> {
        vec![("ssq", Self::ssq()), ("dlt", Self::dlt()), ("k8", Self::k8())]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.main.validate("principale")?;
        if let Some(special) = &self.special {
            special.validate("spéciale")?;
        }
        Ok(())
    }
}

/// Charge un jeu personnalisé depuis un fichier JSON.
pub fn load_game(path: &Path) -> Result<GameConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&json)
        .with_context(|| format!("Configuration de jeu invalide dans {}", path.display()))?;
    Ok(config)
}
