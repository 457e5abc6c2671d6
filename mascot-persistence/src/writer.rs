//! Moves store I/O off the frame loop. The simulation hands snapshots to a
//! channel and returns immediately; a dedicated thread owns the repository.

use crate::error::PersistenceError;
use crate::repository::{MascotRepository, SaveOutcome};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, error, info, warn};
use mascot_simulation::{CollisionRecord, MascotRecord, Persistence};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

enum Command {
    Save(Vec<MascotRecord>),
    Load(Sender<Option<Vec<MascotRecord>>>),
    SaveCollision(CollisionRecord),
    LoadCollision(Sender<Option<CollisionRecord>>),
    Shutdown,
}

#[derive(Debug, Default)]
struct Counters {
    written: AtomicU64,
    degraded: AtomicU64,
    coalesced: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub degraded: u64,
    /// Snapshots superseded by a newer one before they were written.
    pub coalesced: u64,
    pub failed: u64,
}

pub struct BackgroundWriter {
    sender: Sender<Command>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl BackgroundWriter {
    pub fn spawn(repository: MascotRepository) -> Result<Self, PersistenceError> {
        let (sender, receiver) = unbounded();
        let counters = Arc::new(Counters::default());
        let thread_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("mascot-writer".to_string())
            .spawn(move || run(repository, receiver, thread_counters))?;
        info!("Background writer started");
        Ok(Self { sender, handle: Some(handle), counters })
    }

    /// A cheap sender-side handle for the simulation to save through.
    pub fn handle(&self) -> WriterHandle {
        WriterHandle { sender: self.sender.clone() }
    }

    pub fn stats(&self) -> WriterStats {
        WriterStats {
            written: self.counters.written.load(Ordering::Relaxed),
            degraded: self.counters.degraded.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Writes whatever is queued, then stops the thread. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if self.sender.send(Command::Shutdown).is_err() {
            warn!("Background writer already stopped");
        }
        if handle.join().is_err() {
            error!("Background writer panicked");
        }
        info!("Background writer stopped: {:?}", self.stats());
    }
}

/// Implements the simulation's persistence contract on top of the writer
/// thread. Saves never block; once the thread is gone they are refused.
#[derive(Clone)]
pub struct WriterHandle {
    sender: Sender<Command>,
}

impl Persistence for WriterHandle {
    fn save(&mut self, records: Vec<MascotRecord>) -> bool {
        match self.sender.send(Command::Save(records)) {
            Ok(()) => true,
            Err(_) => {
                warn!("Background writer is gone; dropping save");
                false
            }
        }
    }

    /// Blocks until the writer thread answers. Only used at start-up.
    fn load(&mut self) -> Option<Vec<MascotRecord>> {
        let (reply, answer) = bounded(1);
        self.sender.send(Command::Load(reply)).ok()?;
        answer.recv().ok().flatten()
    }

    fn save_collision(&mut self, settings: CollisionRecord) -> bool {
        match self.sender.send(Command::SaveCollision(settings)) {
            Ok(()) => true,
            Err(_) => {
                warn!("Background writer is gone; dropping collision settings");
                false
            }
        }
    }

    fn load_collision(&mut self) -> Option<CollisionRecord> {
        let (reply, answer) = bounded(1);
        self.sender.send(Command::LoadCollision(reply)).ok()?;
        answer.recv().ok().flatten()
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(mut repository: MascotRepository, receiver: Receiver<Command>, counters: Arc<Counters>) {
    while let Ok(first) = receiver.recv() {
        let mut latest = None;
        let mut latest_collision = None;
        let mut deferred = Vec::new();

        for command in std::iter::once(first).chain(receiver.try_iter()) {
            match command {
                Command::Save(records) => {
                    if latest.replace(records).is_some() {
                        counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Command::SaveCollision(settings) => latest_collision = Some(settings),
                other => deferred.push(other),
            }
        }

        if let Some(records) = latest {
            match repository.save(&records) {
                Ok(SaveOutcome::Full) => {
                    counters.written.fetch_add(1, Ordering::Relaxed);
                }
                Ok(SaveOutcome::Degraded { dropped }) => {
                    counters.written.fetch_add(1, Ordering::Relaxed);
                    counters.degraded.fetch_add(1, Ordering::Relaxed);
                    debug!("Degraded save dropped {} images", dropped);
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    warn!("Background save failed: {}", err);
                }
            }
        }

        if let Some(settings) = latest_collision {
            if let Err(err) = repository.save_collision(&settings) {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Saving collision settings failed: {}", err);
            }
        }

        for command in deferred {
            match command {
                Command::Load(reply) => {
                    let records = Persistence::load(&mut repository);
                    let _ = reply.send(records);
                }
                Command::LoadCollision(reply) => {
                    let settings = Persistence::load_collision(&mut repository);
                    let _ = reply.send(settings);
                }
                Command::Shutdown => return,
                Command::Save(_) | Command::SaveCollision(_) => {}
            }
        }
    }
}
