use super::SectionError;
use crate::domain::{PALETTE_SIZE, Section, SectionId};
use indexmap::IndexMap;
use nohash_hasher::BuildNoHashHasher;
use std::time::Duration;

/// Every section of the current session, in the order they were added.
pub struct SectionStore {
    sections: IndexMap<SectionId, Section, BuildNoHashHasher<SectionId>>,
    next_id: SectionId,
}

impl Default for SectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionStore {
    pub fn new() -> Self {
        SectionStore {
            sections: IndexMap::default(),
            next_id: 1,
        }
    }

    /// Validate and append a new section.
    ///
    /// The name is rejected when it is blank after trimming, the range when
    /// `start >= end`. The color cycles through the palette by the number of
    /// sections already stored.
    pub fn add_section(
        &mut self,
        name: &str,
        start: Duration,
        end: Duration,
    ) -> Result<&Section, SectionError> {
        if name.trim().is_empty() {
            return Err(SectionError::EmptyName);
        }
        if start >= end {
            return Err(SectionError::InvalidRange { start, end });
        }

        let id = self.next_id;
        self.next_id += 1;

        let color_index = self.sections.len() % PALETTE_SIZE;
        let section = Section::new(id, name.to_string(), start, end, color_index);

        tracing::debug!(id, name, ?start, ?end, color_index, "Section added");

        let (idx, _) = self.sections.insert_full(id, section);
        Ok(&self.sections[idx])
    }

    /// Remove a section, keeping the order of the rest. Absent ids are a
    /// no-op and return `None`.
    pub fn delete_section(&mut self, id: SectionId) -> Option<Section> {
        let removed = self.sections.shift_remove(&id);
        if removed.is_none() {
            tracing::debug!(id, "Delete ignored, no such section");
        }
        removed
    }

    pub fn get(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Drop every section. Ids keep counting so a stale id held by a
    /// front-end never resolves to a newer section.
    pub fn clear(&mut self) {
        self.sections.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn first_section_gets_first_color() {
        let mut store = SectionStore::new();
        store.add_section("Chorus", secs(10), secs(20)).unwrap();

        assert_eq!(store.len(), 1);
        let s = store.iter().next().unwrap();
        assert_eq!(s.name(), "Chorus");
        assert_eq!(s.start(), secs(10));
        assert_eq!(s.end(), secs(20));
        assert_eq!(s.color_index(), 0);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut store = SectionStore::new();
        let err = store.add_section("Bad", secs(20), secs(10)).unwrap_err();

        assert_eq!(
            err,
            SectionError::InvalidRange {
                start: secs(20),
                end: secs(10)
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut store = SectionStore::new();
        assert!(matches!(
            store.add_section("Zero", secs(5), secs(5)),
            Err(SectionError::InvalidRange { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut store = SectionStore::new();
        assert_eq!(
            store.add_section("", secs(0), secs(1)).unwrap_err(),
            SectionError::EmptyName
        );
        assert_eq!(
            store.add_section("  \t ", secs(0), secs(1)).unwrap_err(),
            SectionError::EmptyName
        );
        assert!(store.is_empty());
    }

    #[test]
    fn name_check_comes_before_range_check() {
        let mut store = SectionStore::new();
        assert_eq!(
            store.add_section(" ", secs(9), secs(1)).unwrap_err(),
            SectionError::EmptyName
        );
    }

    #[test]
    fn colors_cycle_through_palette() {
        let mut store = SectionStore::new();
        for n in 0..40u64 {
            let s = store.add_section(&format!("s{n}"), secs(n), secs(n + 1)).unwrap();
            assert_eq!(s.color_index(), n as usize % PALETTE_SIZE);
        }
    }

    #[test]
    fn delete_keeps_insertion_order() {
        let mut store = SectionStore::new();
        let a = store.add_section("a", secs(0), secs(1)).unwrap().id();
        let b = store.add_section("b", secs(1), secs(2)).unwrap().id();
        let c = store.add_section("c", secs(2), secs(3)).unwrap().id();

        assert_eq!(store.delete_section(b).map(|s| s.id()), Some(b));
        let order: Vec<_> = store.iter().map(|s| s.id()).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    fn deleting_absent_id_is_noop() {
        let mut store = SectionStore::new();
        store.add_section("a", secs(0), secs(1)).unwrap();
        assert!(store.delete_section(999).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_unique_after_clear() {
        let mut store = SectionStore::new();
        let first = store.add_section("a", secs(0), secs(1)).unwrap().id();
        store.clear();
        let second = store.add_section("a", secs(0), secs(1)).unwrap().id();

        assert_ne!(first, second);
        assert!(store.get(first).is_none());
        assert_eq!(store.get(second).unwrap().color_index(), 0);
    }
}
