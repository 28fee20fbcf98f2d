//! Scan configuration, grounded on `DvbSiStorage::loadSettings` in
//! `original_source/sistorage/src/dvbsistorage.cpp`, which reads a fixed set of environment
//! variables and diffs them against the previously persisted `ScanSettings` snapshot. Modelled
//! here as a `SettingsSource` trait (rather than calling `std::env::var` directly) so tests can
//! supply a fake snapshot instead of touching the real process environment.

use std::collections::BTreeMap;

use crate::db::Store;
use crate::modulation::{CableModulation, Modulation};

/// A name→value lookup over configuration. A production embedder supplies
/// [`ProcessEnvSettingsSource`]; tests use [`MapSettingsSource`].
pub trait SettingsSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvSettingsSource;

impl SettingsSource for ProcessEnvSettingsSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory snapshot, for tests and for embedders with their own configuration store.
#[derive(Debug, Default, Clone)]
pub struct MapSettingsSource(pub BTreeMap<String, String>);

impl SettingsSource for MapSettingsSource {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// A resolved, typed carrier description: `(frequency_hz, modulation, symbol_rate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    pub frequency_hz: u32,
    pub modulation: Modulation,
    pub symbol_rate: u32,
}

/// All recognised scan configuration, per §4.8's key table.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub preferred_network_id: u16,
    pub bouquet_id_list: Vec<u16>,
    pub home: Carrier,
    pub barker: Option<Carrier>,
    pub barker_eit_timeout_s: u64,
    pub fast_scan_smart: bool,
    pub background_scan_interval_s: u64,
    pub db_filename: String,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            preferred_network_id: 0,
            bouquet_id_list: Vec::new(),
            home: Carrier {
                frequency_hz: 0,
                modulation: Modulation::Undefined,
                symbol_rate: 0,
            },
            barker: None,
            barker_eit_timeout_s: 60,
            fast_scan_smart: false,
            background_scan_interval_s: 3600,
            db_filename: "/var/lib/dvbsi/store.db".to_string(),
        }
    }
}

fn parse_u16(v: &str) -> Option<u16> {
    v.trim().parse().ok()
}

fn parse_u32(v: &str) -> Option<u32> {
    v.trim().parse().ok()
}

fn parse_modulation(v: &str) -> Option<Modulation> {
    parse_u32(v).map(|n| CableModulation::from_wire(n as u8).to_modulation())
}

fn parse_bool(v: &str) -> bool {
    v.trim().eq_ignore_ascii_case("TRUE")
}

fn parse_bouquet_list(v: &str) -> Vec<u16> {
    v.split(',').filter_map(|s| parse_u16(s.trim())).collect()
}

fn parse_carrier(
    source: &dyn SettingsSource,
    freq_key: &str,
    mod_key: &str,
    sym_key: &str,
) -> Option<Carrier> {
    let frequency_hz = source.get(freq_key).as_deref().and_then(parse_u32)?;
    let modulation = source.get(mod_key).as_deref().and_then(parse_modulation)?;
    let symbol_rate = source.get(sym_key).as_deref().and_then(parse_u32)?;
    Some(Carrier {
        frequency_hz,
        modulation,
        symbol_rate,
    })
}

/// Reads every recognised key from `source`, falling back to [`Settings::default`] for keys
/// that are absent (the home carrier stays zeroed if unset, which `scan_home` treats as "not
/// configured").
pub fn read_settings(source: &dyn SettingsSource) -> Settings {
    let mut settings = Settings::default();

    if let Some(id) = source.get("PREFERRED_NETWORK_ID").as_deref().and_then(parse_u16) {
        settings.preferred_network_id = id;
    }
    if let Some(list) = source.get("BOUQUET_ID_LIST").as_deref().map(parse_bouquet_list) {
        settings.bouquet_id_list = list;
    }
    if let Some(home) = parse_carrier(
        source,
        "HOME_TS_FREQUENCY",
        "HOME_TS_MODULATION",
        "HOME_TS_SYMBOL_RATE",
    ) {
        settings.home = home;
    }
    settings.barker = parse_carrier(
        source,
        "BARKER_TS_FREQUENCY",
        "BARKER_TS_MODULATION",
        "BARKER_TS_SYMBOL_RATE",
    );
    if let Some(t) = source.get("BARKER_EIT_TIMEOUT").as_deref().and_then(|v| v.trim().parse().ok()) {
        settings.barker_eit_timeout_s = t;
    }
    if let Some(v) = source.get("FAST_SCAN_SMART").as_deref().map(parse_bool) {
        settings.fast_scan_smart = v;
    }
    if let Some(t) = source
        .get("BACKGROUND_SCAN_INTERVAL")
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
    {
        settings.background_scan_interval_s = t;
    }
    if let Some(path) = source.get("DB_FILENAME") {
        settings.db_filename = path;
    }

    settings
}

/// Serialises `settings` to `(variable, value)` pairs, matching the columns of the
/// `ScanSettings` table.
fn to_pairs(settings: &Settings) -> Vec<(&'static str, String)> {
    vec![
        ("PREFERRED_NETWORK_ID", settings.preferred_network_id.to_string()),
        (
            "BOUQUET_ID_LIST",
            settings
                .bouquet_id_list
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
        ("HOME_TS_FREQUENCY", settings.home.frequency_hz.to_string()),
        (
            "HOME_TS_MODULATION",
            settings.home.modulation.to_cable_wire().to_string(),
        ),
        ("HOME_TS_SYMBOL_RATE", settings.home.symbol_rate.to_string()),
        (
            "BARKER_TS_FREQUENCY",
            settings.barker.map(|c| c.frequency_hz).unwrap_or(0).to_string(),
        ),
        (
            "BARKER_TS_MODULATION",
            settings
                .barker
                .map(|c| c.modulation.to_cable_wire())
                .unwrap_or(0)
                .to_string(),
        ),
        (
            "BARKER_TS_SYMBOL_RATE",
            settings.barker.map(|c| c.symbol_rate).unwrap_or(0).to_string(),
        ),
        (
            "BARKER_EIT_TIMEOUT",
            settings.barker_eit_timeout_s.to_string(),
        ),
        ("FAST_SCAN_SMART", settings.fast_scan_smart.to_string()),
        (
            "BACKGROUND_SCAN_INTERVAL",
            settings.background_scan_interval_s.to_string(),
        ),
        ("DB_FILENAME", settings.db_filename.clone()),
    ]
}

/// Reads settings from `source`, compares every key against the snapshot persisted in the
/// store's `ScanSettings` table, and persists the new snapshot. Returns `(settings, changed)`;
/// the caller (storage controller bootstrap) drops and recreates the schema when `changed` is
/// true.
pub fn load_settings(source: &dyn SettingsSource, store: &mut Store) -> anyhow::Result<(Settings, bool)> {
    let settings = read_settings(source);
    let mut changed = false;
    for (key, value) in to_pairs(&settings) {
        let previous = store.get_setting(key)?;
        if previous.as_deref() != Some(value.as_str()) {
            changed = true;
        }
        store.set_setting(key, &value)?;
    }
    Ok((settings, changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> MapSettingsSource {
        MapSettingsSource(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_when_unset() {
        let settings = read_settings(&MapSettingsSource::default());
        assert_eq!(settings.preferred_network_id, 0);
        assert!(settings.barker.is_none());
        assert_eq!(settings.background_scan_interval_s, 3600);
    }

    #[test]
    fn reads_home_carrier() {
        let src = source(&[
            ("HOME_TS_FREQUENCY", "474000000"),
            ("HOME_TS_MODULATION", "5"),
            ("HOME_TS_SYMBOL_RATE", "6875000"),
        ]);
        let settings = read_settings(&src);
        assert_eq!(settings.home.frequency_hz, 474_000_000);
        assert_eq!(settings.home.modulation, Modulation::Qam256);
        assert_eq!(settings.home.symbol_rate, 6_875_000);
    }

    #[test]
    fn parses_bouquet_list_and_bool() {
        let src = source(&[("BOUQUET_ID_LIST", "1,2, 3"), ("FAST_SCAN_SMART", "true")]);
        let settings = read_settings(&src);
        assert_eq!(settings.bouquet_id_list, vec![1, 2, 3]);
        assert!(settings.fast_scan_smart);
    }

    #[test]
    fn load_settings_detects_change_and_persists() {
        let mut store = Store::open_in_memory().unwrap();
        let src1 = source(&[("PREFERRED_NETWORK_ID", "7")]);
        let (_, changed1) = load_settings(&src1, &mut store).unwrap();
        assert!(changed1);

        let (_, changed2) = load_settings(&src1, &mut store).unwrap();
        assert!(!changed2);

        let src2 = source(&[("PREFERRED_NETWORK_ID", "8")]);
        let (_, changed3) = load_settings(&src2, &mut store).unwrap();
        assert!(changed3);
    }

    #[test]
    fn load_settings_detects_home_modulation_only_change() {
        let mut store = Store::open_in_memory().unwrap();
        let src1 = source(&[
            ("HOME_TS_FREQUENCY", "474000000"),
            ("HOME_TS_MODULATION", "5"),
            ("HOME_TS_SYMBOL_RATE", "6875000"),
        ]);
        let (_, changed1) = load_settings(&src1, &mut store).unwrap();
        assert!(changed1);

        let src2 = source(&[
            ("HOME_TS_FREQUENCY", "474000000"),
            ("HOME_TS_MODULATION", "3"),
            ("HOME_TS_SYMBOL_RATE", "6875000"),
        ]);
        let (_, changed2) = load_settings(&src2, &mut store).unwrap();
        assert!(changed2, "a modulation-only change must still be detected");
    }

    #[test]
    fn load_settings_detects_barker_only_change() {
        let mut store = Store::open_in_memory().unwrap();
        let src1 = source(&[
            ("BARKER_TS_FREQUENCY", "490000000"),
            ("BARKER_TS_MODULATION", "5"),
            ("BARKER_TS_SYMBOL_RATE", "6875000"),
        ]);
        let (_, changed1) = load_settings(&src1, &mut store).unwrap();
        assert!(changed1);

        let (_, changed2) = load_settings(&src1, &mut store).unwrap();
        assert!(!changed2);

        let src2 = source(&[
            ("BARKER_TS_FREQUENCY", "498000000"),
            ("BARKER_TS_MODULATION", "5"),
            ("BARKER_TS_SYMBOL_RATE", "6875000"),
        ]);
        let (_, changed3) = load_settings(&src2, &mut store).unwrap();
        assert!(changed3, "a barker-only change must still be detected");
    }
}
