use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PoolConfig;

/// Nombre d'apparitions de chaque numéro d'une urne sur l'ensemble des essais.
///
/// Les compteurs couvrent toute la plage (zéro pour les numéros jamais tirés)
/// et ne font que croître pendant une simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<u32, u64>")]
pub struct FrequencyTable {
    min: u32,
    counts: Vec<u64>,
}

impl FrequencyTable {
    pub fn new(pool: &PoolConfig) -> Self {
        Self {
            min: pool.min(),
            counts: vec![0; pool.size()],
        }
    }

    /// Table vide, utilisée quand le jeu n'a pas d'urne spéciale.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn record(&mut self, numbers: &[u32]) {
        for &n in numbers {
            if let Some(c) = n
                .checked_sub(self.min)
                .and_then(|idx| self.counts.get_mut(idx as usize))
            {
                *c += 1;
            }
        }
    }

    pub fn get(&self, n: u32) -> u64 {
        n.checked_sub(self.min)
            .and_then(|idx| self.counts.get(idx as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Paires `(numéro, fréquence)` par numéro croissant.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.min + i as u32, c))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Additionne une autre table de la même plage.
    ///
    /// # Panics
    ///
    /// Si les deux tables non vides couvrent des plages différentes.
    pub fn merge(&mut self, other: &FrequencyTable) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        assert!(
            self.min == other.min && self.counts.len() == other.counts.len(),
            "fusion de tables incompatibles : {}..{} et {}..{}",
            self.min,
            self.min + self.counts.len() as u32 - 1,
            other.min,
            other.min + other.counts.len() as u32 - 1,
        );
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
    }

    /// Numéros triés par fréquence décroissante, égalités par numéro croissant.
    pub fn ranked(&self) -> Vec<(u32, u64)> {
        let mut ranked: Vec<(u32, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    /// Les `n` numéros les plus fréquents, rendus par ordre croissant.
    pub fn top_n(&self, n: usize) -> Vec<u32> {
        let mut top: Vec<u32> = self.ranked().into_iter().take(n).map(|(num, _)| num).collect();
        top.sort_unstable();
        top
    }

    /// Les `n` numéros les moins fréquents, égalités par numéro croissant.
    pub fn bottom_n(&self, n: usize) -> Vec<u32> {
        let mut ranked: Vec<(u32, u64)> = self.iter().collect();
        ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(n).map(|(num, _)| num).collect()
    }
}

impl From<FrequencyTable> for BTreeMap<u32, u64> {
    fn from(table: FrequencyTable) -> Self {
        table.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_from(pool: PoolConfig, draws: &[&[u32]]) -> FrequencyTable {
        let mut table = FrequencyTable::new(&pool);
        for d in draws {
            table.record(d);
        }
        table
    }

    #[test]
    fn test_record_and_get() {
        let table = table_from(PoolConfig::new(1, 10, 3), &[&[1, 2, 3], &[2, 3, 4], &[3, 9, 10]]);
        assert_eq!(table.get(3), 3);
        assert_eq!(table.get(2), 2);
        assert_eq!(table.get(5), 0);
        assert_eq!(table.get(0), 0);
        assert_eq!(table.get(11), 0);
        assert_eq!(table.total(), 9);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn test_out_of_range_ignored() {
        let table = table_from(PoolConfig::new(5, 9, 1), &[&[1, 5, 42]]);
        assert_eq!(table.total(), 1);
    }

    #[test]
    fn test_top_n_ascending_with_tie_break() {
        // 4 et 7 à égalité (2 chacun) : le plus petit numéro l'emporte.
        let table = table_from(
            PoolConfig::new(1, 10, 2),
            &[&[9, 4], &[9, 7], &[9, 4], &[7, 1]],
        );
        assert_eq!(table.top_n(2), vec![4, 9]);
        assert_eq!(table.top_n(3), vec![4, 7, 9]);
    }

    #[test]
    fn test_top_n_is_idempotent() {
        let table = table_from(PoolConfig::new(1, 20, 4), &[&[1, 5, 9, 13], &[5, 9, 14, 20], &[2, 5, 6, 7]]);
        let first = table.top_n(4);
        let second = table.top_n(4);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_top_n_on_fresh_table() {
        let table = FrequencyTable::new(&PoolConfig::new(1, 10, 3));
        assert_eq!(table.top_n(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_bottom_n() {
        let table = table_from(PoolConfig::new(1, 4, 1), &[&[1], &[1], &[2], &[4], &[4], &[4]]);
        assert_eq!(table.bottom_n(2), vec![3, 2]);
    }

    #[test]
    fn test_merge_is_additive_and_order_free() {
        let pool = PoolConfig::new(1, 6, 2);
        let a = table_from(pool, &[&[1, 2], &[2, 3]]);
        let b = table_from(pool, &[&[5, 6], &[2, 6]]);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.get(2), 3);
        assert_eq!(ab.total(), a.total() + b.total());

        let mut empty = FrequencyTable::empty();
        empty.merge(&a);
        assert_eq!(empty, a);
    }

    #[test]
    #[should_panic(expected = "fusion de tables incompatibles")]
    fn test_merge_rejects_other_range() {
        let mut a = table_from(PoolConfig::new(1, 6, 1), &[&[1]]);
        let b = table_from(PoolConfig::new(1, 8, 1), &[&[8]]);
        a.merge(&b);
    }

    #[test]
    fn test_serialize_as_number_map() {
        let table = table_from(PoolConfig::new(1, 3, 1), &[&[2], &[2], &[3]]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"1":0,"2":2,"3":1}"#);
        assert_eq!(serde_json::to_string(&FrequencyTable::empty()).unwrap(), "{}");
    }
}
