//! Two-phase acquisition scheduler, grounded on `DvbSiStorage`'s scan worker in
//! `original_source/sistorage/src/dvbsistorage.cpp` (`startScan`/`stopScan`, `scanHome`/
//! `scanFast`/`scanBackground`, `checkTables`) and on `hiroshiyui-epgrab/src/scan.rs`'s choice of
//! a plain OS thread over an async runtime for a bounded, occasional state machine.
//!
//! The worker owns the tuner for its entire lifetime (one scan worker thread, per §5's
//! concurrency model); `start_scan` moves it into the spawned thread and `stop_scan` joins it
//! back out. Clock updates on TDT/TOT are not this module's concern — they happen at the point
//! the storage controller's demux sink observes a `Tot` table, regardless of scan phase.

pub mod settings;

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::warn;

use crate::cache::Cache;
use crate::db::Store;
use crate::modulation::CableModulation;
use crate::tuner::Tuner;
use settings::Settings;

/// The scan state machine's states, per §4.7.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Stopped,
    Starting,
    InProgressFast,
    InProgressBkgd,
    Completed,
    Failed,
}

const NIT_BAT_TIMEOUT_S: u64 = 15;
const SDT_TIMEOUT_S: u64 = 5;
const SDT_OTHER_TIMEOUT_S: u64 = 15;
const EIT_PF_TIMEOUT_S: u64 = 5;
const EIT_SCHED_TIMEOUT_S: u64 = 15;
const FAST_RETRY_WAIT_S: u64 = 30;
const STOP_POLL_S: u64 = 3;

/// One row of the required-set waiter's key table (§4.7.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Nit(u16),
    Bat(u16),
    Sdt(u16, u16),
    Eit {
        network_id: u16,
        ts_id: u16,
        service_id: u16,
        is_pf: bool,
    },
}

impl Requirement {
    fn satisfied(&self, cache: &Cache) -> bool {
        match *self {
            Requirement::Nit(id) => cache.has_nit(id),
            Requirement::Bat(id) => cache.has_bat(id),
            Requirement::Sdt(onid, tsid) => cache.has_sdt(onid, tsid),
            Requirement::Eit {
                network_id,
                ts_id,
                service_id,
                is_pf,
            } => cache.has_eit(network_id, ts_id, service_id, is_pf),
        }
    }
}

/// A cooperative stop flag plus condition variable, used both to end the 1-second polling sleeps
/// in `check_tables` and the inter-phase waits in the worker loop.
struct StopSignal {
    stopped: Mutex<bool>,
    cv: std::sync::Condvar,
}

impl StopSignal {
    fn new() -> StopSignal {
        StopSignal {
            stopped: Mutex::new(false),
            cv: std::sync::Condvar::new(),
        }
    }

    fn reset(&self) {
        *self.stopped.lock().unwrap() = false;
    }

    fn request(&self) {
        *self.stopped.lock().unwrap() = true;
        self.cv.notify_all();
    }

    fn requested(&self) -> bool {
        *self.stopped.lock().unwrap()
    }

    /// Sleeps up to `dur`, waking early if a stop was requested. Returns `true` if stopped.
    fn wait_timeout(&self, dur: Duration) -> bool {
        let guard = self.stopped.lock().unwrap();
        let (guard, _) = self.cv.wait_timeout_while(guard, dur, |stopped| !*stopped).unwrap();
        *guard
    }
}

/// §4.7.6: polls `cache` once a second until every requirement is satisfied or `timeout_s`
/// elapses. `timeout_s == 0` is a one-shot probe: check once, don't wait.
fn check_tables(cache: &Mutex<Cache>, required: &[Requirement], timeout_s: u64, stop: &StopSignal) -> bool {
    let all_satisfied = || {
        let guard = cache.lock().unwrap();
        required.iter().all(|r| r.satisfied(&guard))
    };

    if all_satisfied() {
        return true;
    }
    if timeout_s == 0 {
        return false;
    }

    let deadline = Instant::now() + Duration::from_secs(timeout_s);
    loop {
        if stop.wait_timeout(Duration::from_secs(1)) {
            return false;
        }
        if all_satisfied() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
    }
}

fn to_modulation(wire: u8) -> crate::modulation::Modulation {
    CableModulation::from_wire(wire).to_modulation()
}

/// §4.7.4: clears the caches, tunes to the configured home carrier, waits for the preferred
/// NIT and every configured BAT, then for each target TS waits for its SDT. Never retunes; a
/// per-TS SDT timeout is logged and skipped rather than aborting the whole pass. Only the
/// combined NIT/BAT wait can fail the pass outright.
fn scan_home<T: Tuner>(
    cache: &Mutex<Cache>,
    store: &Mutex<Store>,
    tuner: &mut T,
    settings: &Settings,
    stop: &StopSignal,
) -> anyhow::Result<()> {
    cache.lock().unwrap().clear_all();
    tuner.tune(
        settings.home.frequency_hz,
        settings.home.modulation,
        settings.home.symbol_rate,
    )?;

    let mut required = vec![Requirement::Nit(settings.preferred_network_id)];
    required.extend(settings.bouquet_id_list.iter().map(|id| Requirement::Bat(*id)));
    if !check_tables(cache, &required, NIT_BAT_TIMEOUT_S, stop) {
        anyhow::bail!("scan_home: NIT/BAT required set not observed within {NIT_BAT_TIMEOUT_S}s");
    }

    let ts_rows = store.lock().unwrap().ts_list(settings.preferred_network_id)?;
    let targets: Vec<_> = if settings.fast_scan_smart {
        ts_rows
    } else {
        ts_rows.into_iter().take(1).collect()
    };

    let sdt_timeout = if settings.fast_scan_smart {
        SDT_OTHER_TIMEOUT_S
    } else {
        SDT_TIMEOUT_S
    };
    for ts in &targets {
        let req = [Requirement::Sdt(ts.original_network_id, ts.transport_id)];
        if !check_tables(cache, &req, sdt_timeout, stop) {
            warn!(
                "scan_home: SDT wait timed out for ts {}/{}",
                ts.original_network_id, ts.transport_id
            );
        }
    }
    Ok(())
}

/// §4.7.4's `scan_fast`: after `scan_home`, requires SDT + EIT present/following for every
/// service of every TS in the NIT. In smart mode, a TS whose full required set is already cached
/// is left untuned.
fn scan_fast<T: Tuner>(
    cache: &Mutex<Cache>,
    store: &Mutex<Store>,
    tuner: &mut T,
    settings: &Settings,
    stop: &StopSignal,
) -> anyhow::Result<()> {
    scan_home(cache, store, tuner, settings, stop)?;
    let ts_rows = store.lock().unwrap().ts_list(settings.preferred_network_id)?;

    for ts in &ts_rows {
        if stop.requested() {
            return Ok(());
        }
        let sdt_req = [Requirement::Sdt(ts.original_network_id, ts.transport_id)];

        if settings.fast_scan_smart {
            let mut probe_required = sdt_req.to_vec();
            if check_tables(cache, &sdt_req, 0, stop) {
                let svc_ids: Vec<u16> = cache
                    .lock()
                    .unwrap()
                    .service_list(ts.original_network_id, ts.transport_id)
                    .iter()
                    .map(|s| s.service_id)
                    .collect();
                probe_required.extend(svc_ids.iter().map(|sid| Requirement::Eit {
                    network_id: ts.original_network_id,
                    ts_id: ts.transport_id,
                    service_id: *sid,
                    is_pf: true,
                }));
            }
            if check_tables(cache, &probe_required, 0, stop) {
                continue;
            }
        }

        tuner.tune(ts.frequency, to_modulation(ts.modulation), ts.symbol_rate)?;
        if check_tables(cache, &sdt_req, SDT_TIMEOUT_S, stop) {
            let svc_ids: Vec<u16> = cache
                .lock()
                .unwrap()
                .service_list(ts.original_network_id, ts.transport_id)
                .iter()
                .map(|s| s.service_id)
                .collect();
            let eit_req: Vec<Requirement> = svc_ids
                .iter()
                .map(|sid| Requirement::Eit {
                    network_id: ts.original_network_id,
                    ts_id: ts.transport_id,
                    service_id: *sid,
                    is_pf: true,
                })
                .collect();
            if !eit_req.is_empty() {
                check_tables(cache, &eit_req, EIT_PF_TIMEOUT_S, stop);
            }
        } else {
            warn!(
                "scan_fast: SDT wait timed out for ts {}/{}",
                ts.original_network_id, ts.transport_id
            );
        }
        tuner.untune()?;
    }
    Ok(())
}

/// §4.7.5: after `scan_home`, visits every TS including the home one, requiring SDT then EIT
/// present/following for each service, then (off the barker frequency) the full EIT schedule set.
/// If a barker TS is configured, makes a final pass collecting the accumulated schedule set for
/// every service on the network from that one frequency.
fn scan_background<T: Tuner>(
    cache: &Mutex<Cache>,
    store: &Mutex<Store>,
    tuner: &mut T,
    settings: &Settings,
    stop: &StopSignal,
) -> anyhow::Result<()> {
    scan_home(cache, store, tuner, settings, stop)?;
    let ts_rows = store.lock().unwrap().ts_list(settings.preferred_network_id)?;

    for ts in &ts_rows {
        if stop.requested() {
            return Ok(());
        }
        tuner.tune(ts.frequency, to_modulation(ts.modulation), ts.symbol_rate)?;

        let sdt_req = [Requirement::Sdt(ts.original_network_id, ts.transport_id)];
        if check_tables(cache, &sdt_req, SDT_TIMEOUT_S, stop) {
            let svc_ids: Vec<u16> = cache
                .lock()
                .unwrap()
                .service_list(ts.original_network_id, ts.transport_id)
                .iter()
                .map(|s| s.service_id)
                .collect();

            let pf_req: Vec<Requirement> = svc_ids
                .iter()
                .map(|sid| Requirement::Eit {
                    network_id: ts.original_network_id,
                    ts_id: ts.transport_id,
                    service_id: *sid,
                    is_pf: true,
                })
                .collect();
            if !pf_req.is_empty() {
                check_tables(cache, &pf_req, EIT_PF_TIMEOUT_S, stop);
            }

            let is_barker = settings
                .barker
                .map(|b| b.frequency_hz == ts.frequency)
                .unwrap_or(false);
            if !is_barker {
                let sched_req: Vec<Requirement> = svc_ids
                    .iter()
                    .map(|sid| Requirement::Eit {
                        network_id: ts.original_network_id,
                        ts_id: ts.transport_id,
                        service_id: *sid,
                        is_pf: false,
                    })
                    .collect();
                if !sched_req.is_empty() {
                    check_tables(cache, &sched_req, EIT_SCHED_TIMEOUT_S, stop);
                }
            }
        } else {
            warn!(
                "scan_background: SDT wait timed out for ts {}/{}",
                ts.original_network_id, ts.transport_id
            );
        }
        tuner.untune()?;
    }

    if let Some(barker) = settings.barker {
        cache.lock().unwrap().clear_eit();
        tuner.tune(barker.frequency_hz, barker.modulation, barker.symbol_rate)?;

        let mut all_req = Vec::new();
        for ts in &ts_rows {
            let svc_ids: Vec<u16> = store
                .lock()
                .unwrap()
                .service_list(ts.original_network_id, ts.transport_id)?
                .iter()
                .map(|s| s.service_id)
                .collect();
            all_req.extend(svc_ids.iter().map(|sid| Requirement::Eit {
                network_id: ts.original_network_id,
                ts_id: ts.transport_id,
                service_id: *sid,
                is_pf: false,
            }));
        }
        check_tables(cache, &all_req, settings.barker_eit_timeout_s, stop);
        tuner.untune()?;
    }
    Ok(())
}

/// Owns the scan state machine and the single worker thread. `Arc`-shared with whatever wires up
/// the demultiplexer, so the same `cache`/`store` the scan worker populates are also readable by
/// the public query surface while a scan is in progress.
pub struct ScanController {
    cache: Arc<Mutex<Cache>>,
    store: Arc<Mutex<Store>>,
    state: Arc<Mutex<ScanState>>,
    stop: Arc<StopSignal>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ScanController {
    pub fn new(cache: Arc<Mutex<Cache>>, store: Arc<Mutex<Store>>) -> ScanController {
        ScanController {
            cache,
            store,
            state: Arc::new(Mutex::new(ScanState::Stopped)),
            stop: Arc::new(StopSignal::new()),
            worker: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock().unwrap()
    }

    /// Fails if a scan is already running. Spawns the worker thread, which owns `tuner` for its
    /// entire lifetime across both the fast and background phases.
    pub fn start_scan<T>(&self, fast: bool, mut tuner: T, settings: Settings) -> anyhow::Result<()>
    where
        T: Tuner + Send + 'static,
    {
        {
            let mut state = self.state.lock().unwrap();
            if *state != ScanState::Stopped {
                anyhow::bail!("scan already running");
            }
            *state = ScanState::Starting;
        }
        self.stop.reset();

        let cache = Arc::clone(&self.cache);
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        let stop = Arc::clone(&self.stop);
        let mut fast_remaining = fast;

        let handle = thread::spawn(move || {
            loop {
                if fast_remaining {
                    *state.lock().unwrap() = ScanState::InProgressFast;
                    match scan_fast(&cache, &store, &mut tuner, &settings, &stop) {
                        Ok(()) => fast_remaining = false,
                        Err(e) => {
                            warn!("fast scan failed: {e}");
                            *state.lock().unwrap() = ScanState::Failed;
                            if stop.wait_timeout(Duration::from_secs(FAST_RETRY_WAIT_S)) {
                                break;
                            }
                            continue;
                        }
                    }
                }

                *state.lock().unwrap() = ScanState::InProgressBkgd;
                match scan_background(&cache, &store, &mut tuner, &settings, &stop) {
                    Ok(()) => *state.lock().unwrap() = ScanState::Completed,
                    Err(e) => {
                        warn!("background scan failed: {e}");
                        *state.lock().unwrap() = ScanState::Failed;
                    }
                }

                if stop.wait_timeout(Duration::from_secs(settings.background_scan_interval_s)) {
                    break;
                }
            }
            *state.lock().unwrap() = ScanState::Stopped;
        });

        *self.worker.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Signals the worker and polls every 3s until it reports `STOPPED`, then joins it.
    pub fn stop_scan(&self) {
        self.stop.request();
        while self.state() != ScanState::Stopped {
            thread::sleep(Duration::from_secs(STOP_POLL_S));
        }
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
