use rand::{Rng, RngExt};

use crate::config::PoolConfig;
use crate::error::ConfigError;
use crate::weighting::TransitionWeight;

/// Générateur de tirages par marche pondérée séquentielle.
///
/// Chaque nouveau numéro est choisi avec une probabilité proportionnelle au
/// poids de sa distance au numéro précédent. Les tampons sont réutilisés d'un
/// tirage à l'autre ; aucune mémoire n'est conservée entre deux tirages.
#[derive(Debug, Clone)]
pub struct MarkovSampler {
    pool: PoolConfig,
    /// Poids indexé par distance (0..size), calculé une fois pour la politique.
    by_distance: Vec<f64>,
    weights: Vec<f64>,
    selected: Vec<bool>,
    picks: Vec<u32>,
}

impl MarkovSampler {
    /// Refuse une urne invalide, en particulier `count > size`.
    pub fn new(pool: PoolConfig, policy: &dyn TransitionWeight) -> Result<Self, ConfigError> {
        pool.validate("tirage")?;
        let size = pool.size();
        let by_distance = (0..size as u32)
            .map(|d| if d == 0 { 0.0 } else { policy.weight(d).max(0.0) })
            .collect();

        Ok(Self {
            pool,
            by_distance,
            weights: vec![0.0; size],
            selected: vec![false; size],
            picks: Vec::with_capacity(pool.count),
        })
    }

    /// Produit un tirage : `count` numéros distincts, triés par ordre croissant.
    pub fn draw(&mut self, rng: &mut impl Rng) -> &[u32] {
        let size = self.weights.len();
        let count = self.pool.count;
        let min = self.pool.min();

        self.picks.clear();
        self.selected.fill(false);

        let mut current = rng.random_range(0..size);
        self.selected[current] = true;
        self.picks.push(min + current as u32);

        while self.picks.len() < count {
            for (i, w) in self.weights.iter_mut().enumerate() {
                *w = if self.selected[i] {
                    0.0
                } else {
                    self.by_distance[i.abs_diff(current)]
                };
            }

            let next = pick_weighted(&self.weights, rng);
            if self.selected[next] {
                // Politique dégénérée (tous les poids restants nuls) : premier libre.
                match self.selected.iter().position(|s| !s) {
                    Some(free) => current = free,
                    None => break,
                }
            } else {
                current = next;
            }
            self.selected[current] = true;
            self.picks.push(min + current as u32);
        }

        self.picks.sort_unstable();
        &self.picks
    }
}

/// Tirage d'un index proportionnellement aux poids.
///
/// Valeur uniforme dans `[0, total)`, puis soustraction successive des poids
/// jusqu'à ce que le reste soit `<= 0`. Les poids nuls ne sont jamais choisis.
/// Si l'arrondi empêche d'atteindre le seuil, le dernier index de poids
/// positif est retenu ; si aucun poids n'est positif, le dernier index.
pub fn pick_weighted(weights: &[f64], rng: &mut impl Rng) -> usize {
    let last = weights.len().saturating_sub(1);
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return last;
    }

    let mut r = rng.random::<f64>() * total;
    let mut fallback = last;
    for (i, &w) in weights.iter().enumerate() {
        if !(w > 0.0) {
            continue;
        }
        fallback = i;
        r -= w;
        if r <= 0.0 {
            return i;
        }
    }
    fallback
}

/// Tirage isolé, sans réutilisation de tampons.
pub fn weighted_draw(
    pool: PoolConfig,
    policy: &dyn TransitionWeight,
    rng: &mut impl Rng,
) -> Result<Vec<u32>, ConfigError> {
    let mut sampler = MarkovSampler::new(pool, policy)?;
    Ok(sampler.draw(rng).to_vec())
}
