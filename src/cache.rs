//! In-memory cache of the latest version of every table kind, keyed by natural identifier.
//!
//! Grounded on `DvbSiStorage`'s `m_nitMap`/`m_batMap`/`m_sdtMap`/`m_eitMap` in
//! `original_source/sistorage/include/dvbsistorage.h` and their `*Cache` query methods; the
//! version-guarded insertion rule is unchanged from there.

use std::collections::HashMap;

use crate::table::{is_eit_present_following, Bat, Eit, Nit, Sdt, Table};

#[derive(Debug, Default)]
pub struct Cache {
    nit_map: HashMap<u16, Nit>,
    bat_map: HashMap<u16, Bat>,
    sdt_map: HashMap<(u16, u16), Sdt>,
    eit_map: HashMap<(u16, u16, u16, bool), Eit>,
    preferred_network_id: u16,
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    pub fn preferred_network_id(&self) -> u16 {
        self.preferred_network_id
    }

    pub fn set_preferred_network_id(&mut self, id: u16) {
        self.preferred_network_id = id;
    }

    /// Routes a freshly built table into the matching map, subject to the version-guarded
    /// insertion rule: install if absent, ignore if the version already matches, replace
    /// wholesale if the version differs.
    pub fn insert(&mut self, table: &Table) {
        match table {
            Table::Nit(nit) => self.insert_nit(nit),
            Table::Bat(bat) => self.insert_bat(bat),
            Table::Sdt(sdt) => self.insert_sdt(sdt),
            Table::Eit(eit) => self.insert_eit(eit),
            Table::Tot(_) => {}
        }
    }

    fn insert_nit(&mut self, nit: &Nit) {
        if self.preferred_network_id != 0 && nit.network_id != self.preferred_network_id {
            return;
        }
        upsert_by_version(&mut self.nit_map, nit.network_id, nit, |t| t.header.version);
    }

    fn insert_bat(&mut self, bat: &Bat) {
        upsert_by_version(&mut self.bat_map, bat.bouquet_id, bat, |t| t.header.version);
    }

    fn insert_sdt(&mut self, sdt: &Sdt) {
        let key = (sdt.original_network_id, sdt.transport_stream_id);
        upsert_by_version(&mut self.sdt_map, key, sdt, |t| t.header.version);
    }

    fn insert_eit(&mut self, eit: &Eit) {
        let key = (
            eit.network_id,
            eit.transport_stream_id,
            eit.service_id,
            is_eit_present_following(eit.header.table_id),
        );
        upsert_by_version(&mut self.eit_map, key, eit, |t| t.header.version);
    }

    /// All transport streams announced by the NIT of `network_id`, or of the preferred network
    /// if `network_id == 0`.
    pub fn ts_list(&self, network_id: u16) -> Vec<&crate::table::TransportStream> {
        let key = if network_id == 0 {
            self.preferred_network_id
        } else {
            network_id
        };
        self.nit_map
            .get(&key)
            .map(|nit| nit.streams.iter().collect())
            .unwrap_or_default()
    }

    pub fn service_list(&self, original_network_id: u16, ts_id: u16) -> Vec<&crate::table::Service> {
        self.sdt_map
            .get(&(original_network_id, ts_id))
            .map(|sdt| sdt.services.iter().collect())
            .unwrap_or_default()
    }

    pub fn event_list(&self, network_id: u16, ts_id: u16, service_id: u16) -> Vec<&crate::table::Event> {
        self.eit_map
            .get(&(network_id, ts_id, service_id, true))
            .map(|eit| eit.events.iter().collect())
            .unwrap_or_default()
    }

    /// Presence checks for the scan controller's required-set waiter (§4.7.6): each mirrors one
    /// row of that section's key table.
    pub fn has_nit(&self, network_id: u16) -> bool {
        self.nit_map.contains_key(&network_id)
    }

    pub fn has_bat(&self, bouquet_id: u16) -> bool {
        self.bat_map.contains_key(&bouquet_id)
    }

    pub fn has_sdt(&self, original_network_id: u16, ts_id: u16) -> bool {
        self.sdt_map.contains_key(&(original_network_id, ts_id))
    }

    pub fn has_eit(&self, network_id: u16, ts_id: u16, service_id: u16, is_pf: bool) -> bool {
        self.eit_map
            .contains_key(&(network_id, ts_id, service_id, is_pf))
    }

    /// Clears every cache map. Used by `scan_home()` at the start of each scan pass.
    pub fn clear_all(&mut self) {
        self.nit_map.clear();
        self.bat_map.clear();
        self.sdt_map.clear();
        self.eit_map.clear();
    }

    /// Clears only the EIT map, used before a barker-TS schedule sweep (§4.7.5).
    pub fn clear_eit(&mut self) {
        self.eit_map.clear();
    }
}

fn upsert_by_version<K: std::hash::Hash + Eq, V: Clone>(
    map: &mut HashMap<K, V>,
    key: K,
    incoming: &V,
    version: impl Fn(&V) -> u8,
) {
    match map.get(&key) {
        Some(existing) if version(existing) == version(incoming) => {}
        _ => {
            map.insert(key, incoming.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Nit, TableHeader};

    fn nit(network_id: u16, version: u8) -> Nit {
        Nit {
            header: TableHeader {
                table_id: 0x40,
                extension_id: network_id,
                version,
                current: true,
            },
            network_id,
            descriptors: Vec::new(),
            streams: Vec::new(),
        }
    }

    #[test]
    fn installs_first_version() {
        let mut cache = Cache::new();
        cache.insert(&Table::Nit(nit(1, 0)));
        assert_eq!(cache.ts_list(1).len(), 0);
        assert!(cache.nit_map.contains_key(&1));
    }

    #[test]
    fn ignores_same_version_replay() {
        let mut cache = Cache::new();
        cache.insert(&Table::Nit(nit(1, 0)));
        cache.insert(&Table::Nit(nit(1, 0)));
        assert_eq!(cache.nit_map.len(), 1);
    }

    #[test]
    fn replaces_on_version_change() {
        let mut cache = Cache::new();
        cache.insert(&Table::Nit(nit(1, 0)));
        cache.insert(&Table::Nit(nit(1, 1)));
        assert_eq!(cache.nit_map[&1].header.version, 1);
    }

    #[test]
    fn preferred_network_id_filters_other_networks() {
        let mut cache = Cache::new();
        cache.set_preferred_network_id(5);
        cache.insert(&Table::Nit(nit(1, 0)));
        assert!(!cache.nit_map.contains_key(&1));
        cache.insert(&Table::Nit(nit(5, 0)));
        assert!(cache.nit_map.contains_key(&5));
    }

    #[test]
    fn has_nit_and_clear_all() {
        let mut cache = Cache::new();
        cache.insert(&Table::Nit(nit(1, 0)));
        assert!(cache.has_nit(1));
        assert!(!cache.has_nit(2));
        cache.clear_all();
        assert!(!cache.has_nit(1));
    }
}
