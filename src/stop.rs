//! src/stop.rs
//!
//! Coöperatieve annulering. Elke run krijgt een eigen atomische vlag die samen
//! met de deadline in een `StopSignal` aan alle workers wordt meegegeven. De
//! vlag wordt alleen op move-grenzen gelezen.
//!
//! `request_stop` is proces-breed: het zet de vlag van iedere run die op dat
//! moment in het register staat. Afgeronde runs zijn uitgeschreven en runs die
//! later starten beginnen met een schone vlag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

/// Register van lopende runs.
static ACTIVE_RUNS: Mutex<Vec<Weak<AtomicBool>>> = Mutex::new(Vec::new());

/// Aantal `should_stop`-aanroepen tussen twee klokmetingen.
const CLOCK_POLL_INTERVAL: u32 = 64;

/// Zet de stopvlag van alle lopende runs in dit proces. Idempotent.
pub fn request_stop() {
    let mut runs = match ACTIVE_RUNS.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    runs.retain(|weak| match weak.upgrade() {
        Some(flag) => {
            flag.store(true, Ordering::SeqCst);
            true
        }
        None => false,
    });
    log::info!("stop requested for {} active run(s)", runs.len());
}

/// Een deelbare stopvlag voor één solver.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vraagt de lopende run van deze solver om te stoppen. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Schrijft de vlag in het proces-brede register in zolang de guard leeft.
    ///
    /// Geneste inschrijvingen zijn toegestaan; alleen de buitenste schrijft bij
    /// drop weer uit.
    pub(crate) fn register(&self) -> Registration {
        let mut runs = match ACTIVE_RUNS.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        runs.retain(|weak| weak.strong_count() > 0);
        let me = Arc::as_ptr(&self.flag);
        let owner = !runs.iter().any(|weak| weak.as_ptr() == me);
        if owner {
            runs.push(Arc::downgrade(&self.flag));
        }
        Registration {
            flag: Arc::downgrade(&self.flag),
            owner,
        }
    }

    /// Of de vlag op dit moment in het register staat.
    pub(crate) fn is_registered(&self) -> bool {
        let runs = match ACTIVE_RUNS.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let me = Arc::as_ptr(&self.flag);
        runs.iter().any(|weak| weak.as_ptr() == me)
    }
}

/// Houdt een run ingeschreven; bij drop wordt hij uitgeschreven.
pub(crate) struct Registration {
    flag: Weak<AtomicBool>,
    owner: bool,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if !self.owner {
            return;
        }
        let mut runs = match ACTIVE_RUNS.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        runs.retain(|weak| weak.strong_count() > 0 && !Weak::ptr_eq(weak, &self.flag));
    }
}

/// Stopvlag plus deadline, zoals door workers gecontroleerd.
///
/// Elke worker houdt een eigen kopie zodat de klok-teller niet gedeeld wordt.
#[derive(Clone, Debug)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
    countdown: u32,
    expired: bool,
}

impl StopSignal {
    pub fn new(handle: &StopHandle, start: Instant, time_limit: f64) -> Self {
        // `Duration::from_secs_f64` paniekt bij overloop; heel grote limieten betekenen "geen deadline".
        let deadline = Duration::try_from_secs_f64(time_limit)
            .ok()
            .and_then(|d| start.checked_add(d));
        Self {
            flag: Arc::clone(&handle.flag),
            deadline,
            countdown: 0,
            expired: false,
        }
    }

    /// Een signaal dat alleen op de vlag reageert.
    pub fn unbounded(handle: &StopHandle) -> Self {
        Self {
            flag: Arc::clone(&handle.flag),
            deadline: None,
            countdown: 0,
            expired: false,
        }
    }

    /// Zelfde vlag, maar zonder deadline.
    pub fn without_deadline(&self) -> Self {
        Self {
            flag: Arc::clone(&self.flag),
            deadline: None,
            countdown: 0,
            expired: false,
        }
    }

    /// Goedkope controle voor op move-grenzen; leest de klok eens per
    /// `CLOCK_POLL_INTERVAL` aanroepen.
    #[inline]
    pub fn should_stop(&mut self) -> bool {
        if self.expired || self.flag.load(Ordering::Relaxed) {
            return true;
        }
        if self.countdown == 0 {
            self.countdown = CLOCK_POLL_INTERVAL;
            return self.check_now();
        }
        self.countdown -= 1;
        false
    }

    /// Leest de klok direct; voor rondegrenzen in de controller.
    pub fn check_now(&mut self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.expired = true;
            }
        }
        self.expired
    }

    /// Of de vlag (en niet de deadline) de oorzaak is.
    pub fn cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
