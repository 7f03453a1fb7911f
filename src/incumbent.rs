//! src/incumbent.rs
//!
//! De beste oplossing tot nu toe (`BestRecord`) en het enige synchronisatiepunt
//! waarlangs workers verbeteringen melden (`Incumbent`). Een atomisch gewicht
//! dient als snelle voorfilter; de echte vergelijking en de snapshot gebeuren
//! onder een mutex, zodat het zichtbare beste gewicht monotoon stijgt.

use crate::solution::Solution;
use bitvec::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Snapshot van de beste onafhankelijke verzameling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BestRecord {
    membership: BitVec,
    weight: u64,
    size: usize,
    /// Seconden sinds de start van de run waarop deze oplossing gevonden werd.
    time: f64,
}

impl BestRecord {
    /// De lege verzameling over `n` knopen, gevonden op t = 0.
    pub fn empty(n: usize) -> Self {
        Self {
            membership: bitvec![0; n],
            weight: 0,
            size: 0,
            time: 0.0,
        }
    }

    pub fn from_solution(sol: &Solution<'_>, time: f64) -> Self {
        Self {
            membership: sol.bitset().to_bitvec(),
            weight: sol.weight(),
            size: sol.size(),
            time,
        }
    }

    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Of `v` in de oplossing zit; `None` buiten bereik.
    pub fn contains(&self, v: usize) -> Option<bool> {
        self.membership.get(v).map(|bit| *bit)
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.membership.iter_ones()
    }
}

struct Inner {
    best: BestRecord,
    /// (tijd, gewicht) van elke verbetering, in volgorde van acceptatie.
    history: Vec<(f64, u64)>,
}

/// Gedeelde, thread-veilige houder van het beste record.
pub struct Incumbent {
    weight: AtomicU64,
    inner: Mutex<Inner>,
    start: Instant,
}

impl Incumbent {
    pub fn new(n: usize, start: Instant) -> Self {
        Self {
            weight: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                best: BestRecord::empty(n),
                history: Vec::new(),
            }),
            start,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Huidig beste gewicht, zonder te locken.
    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight.load(Ordering::Acquire)
    }

    /// Biedt `sol` aan; wordt alleen overgenomen als hij strikt zwaarder is.
    /// Bij gelijke stand blijft de eerder gevonden oplossing staan.
    pub fn offer(&self, sol: &Solution<'_>) -> bool {
        if sol.weight() <= self.weight() {
            return false;
        }
        let mut inner = self.lock();
        if sol.weight() <= inner.best.weight {
            return false;
        }
        debug_assert!(sol.is_independent());
        let time = self.start.elapsed().as_secs_f64();
        inner.best = BestRecord::from_solution(sol, time);
        inner.history.push((time, sol.weight()));
        self.weight.store(sol.weight(), Ordering::Release);
        log::debug!(
            "new best: weight {} size {} at {:.3}s",
            sol.weight(),
            sol.size(),
            time
        );
        true
    }

    pub fn snapshot(&self) -> BestRecord {
        self.lock().best.clone()
    }

    pub fn history(&self) -> Vec<(f64, u64)> {
        self.lock().history.clone()
    }

    /// Geeft het record en de geschiedenis terug aan het einde van een run.
    pub fn into_parts(self) -> (BestRecord, Vec<(f64, u64)>) {
        let inner = match self.inner.into_inner() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        (inner.best, inner.history)
    }
}
