use std::collections::HashMap;
use std::hash::Hash;

use crate::record::Record;

/// Assigns dense ids `0..n` to distinct keys in first-seen order.
///
/// An id never changes once assigned. Separate mappers keep separate id
/// spaces, so ids only agree between two mappers fed the same key order.
#[derive(Debug, Clone)]
pub struct IdMapper<K> {
    ids: HashMap<K, usize>,
    keys: Vec<K>,
}

impl<K> Default for IdMapper<K> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            keys: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> IdMapper<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `key`, assigning the next one on first sight.
    pub fn lookup_or_assign(&mut self, key: &K) -> usize {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.keys.len();
        self.ids.insert(key.clone(), id);
        self.keys.push(key.clone());
        id
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.ids.get(key).copied()
    }

    /// Like [`IdMapper::get`] but yields `default` for an unseen key.
    pub fn id_or(&self, key: &K, default: usize) -> usize {
        self.get(key).unwrap_or(default)
    }

    pub fn key(&self, id: usize) -> Option<&K> {
        self.keys.get(id)
    }

    /// Keys in id order.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Forgets every assignment; the next new key gets id 0 again.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.keys.clear();
    }
}

/// Builds a user mapper over `records` in sequence order.
pub fn assign_from_sequence<'a, I>(records: I) -> IdMapper<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut mapper = IdMapper::new();
    for record in records {
        mapper.lookup_or_assign(&record.user);
    }
    mapper
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_first_occurrence() {
        let mut m = IdMapper::new();
        let ids: Vec<usize> = ["b", "a", "b", "c", "a", "c", "d"]
            .iter()
            .map(|k| m.lookup_or_assign(k))
            .collect();
        assert_eq!(ids, vec![0, 1, 0, 2, 1, 2, 3]);
        assert_eq!(m.size(), 4);
        assert_eq!(m.keys(), &["b", "a", "c", "d"]);
        assert_eq!(m.key(2), Some(&"c"));
    }

    #[test]
    fn unseen_keys_use_the_default() {
        let mut m = IdMapper::new();
        m.lookup_or_assign(&7u32);
        assert_eq!(m.get(&8), None);
        assert_eq!(m.id_or(&8, usize::MAX), usize::MAX);
        assert_eq!(m.id_or(&7, usize::MAX), 0);
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn reset_restarts_at_zero() {
        let mut m = IdMapper::new();
        m.lookup_or_assign(&"x".to_string());
        m.lookup_or_assign(&"y".to_string());
        m.reset();
        assert!(m.is_empty());
        assert_eq!(m.lookup_or_assign(&"y".to_string()), 0);
    }

    #[test]
    fn independent_mappers_do_not_share_ids() {
        let mut a = IdMapper::new();
        let mut b = IdMapper::new();
        a.lookup_or_assign(&"p");
        a.lookup_or_assign(&"q");
        b.lookup_or_assign(&"q");
        assert_eq!(a.get(&"q"), Some(1));
        assert_eq!(b.get(&"q"), Some(0));
    }

    #[test]
    fn assigns_users_in_record_order() {
        let records = vec![
            Record::new(1, "zed", "a"),
            Record::new(1, "amy", "b"),
            Record::new(2, "zed", "c"),
        ];
        let m = assign_from_sequence(&records);
        assert_eq!(m.keys(), &["zed".to_string(), "amy".to_string()]);
    }
}
