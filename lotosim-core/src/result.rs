use serde::Serialize;

use crate::frequency::FrequencyTable;

/// Résultat d'une simulation complète. Construit une seule fois en fin de run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub frequencies: FrequencyTable,
    pub special_frequencies: FrequencyTable,
    pub recommended: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_special: Option<Vec<u32>>,
    pub total_trials: u64,
    #[serde(rename = "timeTaken")]
    pub time_taken_ms: u64,
}

impl SimulationResult {
    /// Part des essais où `n` est sorti dans l'urne principale.
    pub fn hit_rate(&self, n: u32) -> f64 {
        if self.total_trials == 0 {
            return 0.0;
        }
        self.frequencies.get(n) as f64 / self.total_trials as f64
    }
}

/// Répartition (impairs, pairs).
pub fn odd_even(numbers: &[u32]) -> (usize, usize) {
    let odd = numbers.iter().filter(|&&n| n % 2 == 1).count();
    (odd, numbers.len() - odd)
}

/// Écart entre le plus grand et le plus petit numéro.
pub fn spread(numbers: &[u32]) -> u32 {
    match (numbers.iter().min(), numbers.iter().max()) {
        (Some(lo), Some(hi)) => hi - lo,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;

    #[test]
    fn test_odd_even() {
        assert_eq!(odd_even(&[1, 2, 3, 4, 5]), (3, 2));
        assert_eq!(odd_even(&[]), (0, 0));
    }

    #[test]
    fn test_spread() {
        assert_eq!(spread(&[3, 17, 9]), 14);
        assert_eq!(spread(&[8]), 0);
        assert_eq!(spread(&[]), 0);
    }

    #[test]
    fn test_json_field_names() {
        let mut freq = FrequencyTable::new(&PoolConfig::new(1, 3, 1));
        freq.record(&[2]);
        let result = SimulationResult {
            frequencies: freq,
            special_frequencies: FrequencyTable::empty(),
            recommended: vec![2],
            recommended_special: None,
            total_trials: 1,
            time_taken_ms: 0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["totalTrials"], 1);
        assert_eq!(json["timeTaken"], 0);
        assert_eq!(json["recommended"], serde_json::json!([2]));
        assert_eq!(json["specialFrequencies"], serde_json::json!({}));
        assert!(json.get("recommendedSpecial").is_none());
        assert!((result.hit_rate(2) - 1.0).abs() < 1e-12);
    }
}
