use serde::{Deserialize, Serialize};

/// Poids de transition d'un numéro candidat en fonction de sa distance au
/// numéro courant. Appelé uniquement pour les numéros non encore tirés
/// (`distance >= 1`) ; les numéros déjà tirés ont toujours un poids nul.
pub trait TransitionWeight: Send + Sync {
    fn weight(&self, distance: u32) -> f64;
}

/// Politique par bandes de distance.
///
/// Par défaut : distance 1-2 → 1, distance 3-12 → 5, sinon → 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceBands {
    pub near_max: u32,
    pub peak_min: u32,
    pub peak_max: u32,
    pub near_weight: f64,
    pub peak_weight: f64,
    pub far_weight: f64,
}

impl Default for DistanceBands {
    fn default() -> Self {
        Self {
            near_max: 2,
            peak_min: 3,
            peak_max: 12,
            near_weight: 1.0,
            peak_weight: 5.0,
            far_weight: 2.0,
        }
    }
}

impl TransitionWeight for DistanceBands {
    fn weight(&self, distance: u32) -> f64 {
        // Le pic est prioritaire si les bandes se chevauchent.
        if distance >= self.peak_min && distance <= self.peak_max {
            self.peak_weight
        } else if distance >= 1 && distance <= self.near_max {
            self.near_weight
        } else {
            self.far_weight
        }
    }
}

/// Marche uniforme : tous les candidats ont le même poids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Uniform;

impl TransitionWeight for Uniform {
    fn weight(&self, _distance: u32) -> f64 {
        1.0
    }
}

impl<F> TransitionWeight for F
where
    F: Fn(u32) -> f64 + Send + Sync,
{
    fn weight(&self, distance: u32) -> f64 {
        self(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let bands = DistanceBands::default();
        assert_eq!(bands.weight(1), 1.0);
        assert_eq!(bands.weight(2), 1.0);
        assert_eq!(bands.weight(3), 5.0);
        assert_eq!(bands.weight(7), 5.0);
        assert_eq!(bands.weight(12), 5.0);
        assert_eq!(bands.weight(13), 2.0);
        assert_eq!(bands.weight(79), 2.0);
    }

    #[test]
    fn test_closure_policy() {
        let policy = |d: u32| d as f64;
        assert_eq!(TransitionWeight::weight(&policy, 4), 4.0);
    }

    #[test]
    fn test_bundled_bands_match_default() {
        let bands: DistanceBands = serde_json::from_str(include_str!("../../assets/bands.json")).unwrap();
        assert_eq!(bands, DistanceBands::default());
    }

    #[test]
    fn test_bands_serde() {
        let json = r#"{"near_max":1,"peak_min":2,"peak_max":5,"near_weight":0.5,"peak_weight":3.0,"far_weight":1.0}"#;
        let bands: DistanceBands = serde_json::from_str(json).unwrap();
        assert_eq!(bands.weight(1), 0.5);
        assert_eq!(bands.weight(5), 3.0);
        assert_eq!(bands.weight(6), 1.0);
    }
}
