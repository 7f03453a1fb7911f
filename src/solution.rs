//! src/solution.rs
//!
//! Representeert een kandidaat-oplossing: een subset van knopen `S` met
//! gecachte waarden voor het totaalgewicht en per knoop de *tightness*
//! (het aantal buren in `S`). Een knoop buiten `S` met tightness 0 kan zonder
//! conflict worden toegevoegd. Elke toevoeg- of verwijderoperatie kost O(deg(v)).
//!
//! Wijzigingen worden in een journaal bijgehouden zodat een perturbatie
//! goedkoop teruggedraaid kan worden (`checkpoint` / `rollback`).

use crate::graph::Graph;
use bitvec::prelude::*;

/// Positie in het journaal waarnaar teruggerold kan worden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Een veranderlijke onafhankelijke-verzameling kandidaat, gebonden aan een `Graph`.
#[derive(Clone, Debug)]
pub struct Solution<'g> {
    graph: &'g Graph,
    vertices: BitVec,
    tightness: Vec<u32>,
    weight: u64,
    size: usize,
    /// Geflipte knopen sinds de laatste `commit`.
    journal: Vec<u32>,
}

impl<'g> Solution<'g> {
    /*────────── Constructors ──────────*/

    /// Creëert een nieuwe, lege oplossing voor de gegeven graaf.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            vertices: bitvec![0; graph.n()],
            tightness: vec![0; graph.n()],
            weight: 0,
            size: 0,
            journal: Vec::new(),
        }
    }

    /*────────── Queries ──────────*/

    /// Totaalgewicht van de knopen in `S`.
    #[inline]
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Aantal knopen in `S`.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        self.vertices[v]
    }

    /// Aantal buren van `v` dat in `S` zit.
    #[inline]
    pub fn tightness(&self, v: usize) -> u32 {
        self.tightness[v]
    }

    #[inline]
    pub fn bitset(&self) -> &BitSlice {
        &self.vertices
    }

    #[inline]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Itereert over de knopen in `S` in oplopende volgorde.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices.iter_ones()
    }

    /// Controleert in O(n + m) dat geen twee knopen in `S` buren zijn.
    pub fn is_independent(&self) -> bool {
        self.vertices.iter_ones().all(|u| {
            self.graph
                .neighbours(u)
                .iter()
                .all(|&v| !self.vertices[v as usize])
        })
    }

    /// De enige buur van `v` in `S`, mits `v` precies één zulke buur heeft.
    pub fn solution_neighbour(&self, v: usize) -> Option<usize> {
        if self.tightness[v] != 1 {
            return None;
        }
        self.graph
            .neighbours(v)
            .iter()
            .map(|&u| u as usize)
            .find(|&u| self.vertices[u])
    }

    /*────────── Mutators ──────────*/

    /// Voegt knoop `v` toe. Negeert de operatie als `v` al aanwezig is.
    /// De aanroeper is verantwoordelijk voor onafhankelijkheid aan een move-grens.
    pub fn add(&mut self, v: usize) {
        if self.vertices[v] {
            return;
        }
        self.vertices.set(v, true);
        self.weight += self.graph.weight(v);
        self.size += 1;
        for &u in self.graph.neighbours(v) {
            self.tightness[u as usize] += 1;
        }
        self.journal.push(v as u32);
    }

    /// Verwijdert knoop `v`. Negeert de operatie als `v` niet aanwezig is.
    pub fn remove(&mut self, v: usize) {
        if !self.vertices[v] {
            return;
        }
        self.vertices.set(v, false);
        self.weight -= self.graph.weight(v);
        self.size -= 1;
        for &u in self.graph.neighbours(v) {
            self.tightness[u as usize] -= 1;
        }
        self.journal.push(v as u32);
    }

    #[inline]
    fn flip(&mut self, v: usize) {
        if self.vertices[v] {
            self.remove(v);
        } else {
            self.add(v);
        }
    }

    /// Markeert de huidige toestand als terugrolpunt.
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.journal.len())
    }

    /// Draait alle wijzigingen sinds `cp` terug, in omgekeerde volgorde.
    pub fn rollback(&mut self, cp: Checkpoint) {
        while self.journal.len() > cp.0 {
            let Some(v) = self.journal.pop() else { break };
            self.flip(v as usize);
            // `flip` heeft de terugdraai zelf weer gejournaliseerd.
            self.journal.pop();
        }
    }

    /// Leegt het journaal; eerdere checkpoints worden ongeldig.
    #[inline]
    pub fn commit(&mut self) {
        self.journal.clear();
    }

    /// Neemt het lidmaatschap van `other` over door alleen de verschillende knopen te flippen.
    /// Eerst worden knopen verwijderd, zodat de toestand tussendoor onafhankelijk blijft.
    pub fn assign_from(&mut self, other: &Solution<'_>) {
        debug_assert_eq!(self.vertices.len(), other.vertices.len());
        let diff: Vec<usize> = (0..self.vertices.len())
            .filter(|&v| self.vertices[v] != other.vertices[v])
            .collect();
        for &v in &diff {
            if self.vertices[v] {
                self.remove(v);
            }
        }
        for &v in &diff {
            if other.vertices[v] {
                self.add(v);
            }
        }
        self.commit();
    }
}
