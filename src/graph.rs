//! src/graph.rs
//!
//! Append-only opslag van een ongerichte, knoopgewogen graaf als adjacency-lijsten.
//! Knopen krijgen opeenvolgende ids `0..n` in volgorde van toevoegen. Voordat een
//! run start wordt de graaf bevroren: elke adjacency-lijst wordt gesorteerd en
//! ontdubbeld, waarna geen knopen of kanten meer toegevoegd kunnen worden.
//! Ondersteunt het parsen van het METIS-formaat.

use crate::error::{Result, SolverError};
use std::io::{BufRead, BufReader, Read};

/// Maximaal aantal knopen; ids worden intern als `u32` opgeslagen.
pub const MAX_VERTICES: usize = u32::MAX as usize;

/// Een ongerichte graaf met niet-negatieve knoopgewichten.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// `adj[v]` bevat de buren van `v`; na `freeze` gesorteerd en uniek.
    adj: Vec<Vec<u32>>,
    weights: Vec<u64>,
    /// Som van `weights`; past altijd in een `u64`.
    total: u64,
    /// Aantal unieke kanten, pas geldig na `freeze`.
    m: usize,
    frozen: bool,
}

impl Graph {
    /*────────── Constructors ──────────*/

    /// Creëert een lege graaf zonder knopen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bouwt en bevriest een graaf vanuit gewichten en een kantenlijst (0-gebaseerd).
    pub fn from_edge_list(weights: &[u64], edges: &[(usize, usize)]) -> Result<Self> {
        let mut g = Self::new();
        for &w in weights {
            g.add_vertex(w)?;
        }
        for &(u, v) in edges {
            g.add_edge(u, v)?;
        }
        g.freeze();
        Ok(g)
    }

    /// Parset het METIS-formaat vanuit een reader en geeft een bevroren graaf terug.
    ///
    /// De kopregel is `n m [fmt]`; bij `fmt` = `10` of `11` begint elke knoopregel
    /// met het knoopgewicht, bij `1` of `11` staat na elke buur een kantgewicht
    /// (dat genegeerd wordt). Buren zijn 1-gebaseerd; regels met `%` zijn commentaar.
    /// Zonder knoopgewichten krijgt elke knoop gewicht 1.
    pub fn parse_metis<R: Read>(reader: R) -> Result<Self> {
        let mut g = Self::new();
        let mut header: Option<(usize, bool, bool)> = None;
        let mut declared_m = 0usize;
        let mut vertex = 0usize;

        for (idx, line_result) in BufReader::new(reader).lines().enumerate() {
            let line_no = idx + 1;
            let line = line_result.map_err(|e| SolverError::Parse {
                line: line_no,
                msg: e.to_string(),
            })?;
            let line = line.trim();
            if line.starts_with('%') {
                continue;
            }

            let Some((n, vertex_weights, edge_weights)) = header else {
                if line.is_empty() {
                    continue;
                }
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 2 {
                    return Err(SolverError::Parse {
                        line: line_no,
                        msg: "header must contain at least 'n m'".into(),
                    });
                }
                let n = parse_token(parts[0], line_no)?;
                declared_m = parse_token(parts[1], line_no)?;
                let fmt = parts.get(2).copied().unwrap_or("0");
                let (vw, ew) = match fmt {
                    "0" | "00" | "000" => (false, false),
                    "1" | "01" | "001" => (false, true),
                    "10" | "010" => (true, false),
                    "11" | "011" => (true, true),
                    other => {
                        return Err(SolverError::Parse {
                            line: line_no,
                            msg: format!("unsupported fmt '{}'", other),
                        })
                    }
                };
                if n > MAX_VERTICES {
                    return Err(SolverError::CapacityExceeded { limit: MAX_VERTICES });
                }
                g.adj.reserve(n);
                g.weights.reserve(n);
                header = Some((n, vw, ew));
                continue;
            };

            if vertex >= n {
                if line.is_empty() {
                    continue;
                }
                return Err(SolverError::Parse {
                    line: line_no,
                    msg: format!("more than {} vertex lines", n),
                });
            }

            let mut tokens = line.split_whitespace();
            let weight = if vertex_weights {
                let tok = tokens.next().ok_or_else(|| SolverError::Parse {
                    line: line_no,
                    msg: "missing vertex weight".into(),
                })?;
                parse_token::<u64>(tok, line_no)?
            } else {
                1
            };
            let u = g.add_vertex(weight)?;
            debug_assert_eq!(u, vertex);

            // Buren mogen naar nog niet gelezen knopen wijzen, dus eerst verzamelen.
            while let Some(tok) = tokens.next() {
                let nb: usize = parse_token(tok, line_no)?;
                if nb == 0 || nb > n {
                    return Err(SolverError::Parse {
                        line: line_no,
                        msg: format!("neighbour {} out of bounds for n={}", nb, n),
                    });
                }
                if nb - 1 == u {
                    return Err(SolverError::Parse {
                        line: line_no,
                        msg: format!("self-loop on vertex {}", nb),
                    });
                }
                if edge_weights {
                    tokens.next().ok_or_else(|| SolverError::Parse {
                        line: line_no,
                        msg: "missing edge weight".into(),
                    })?;
                }
                g.adj[u].push((nb - 1) as u32);
            }
            vertex += 1;
        }

        let Some((n, _, _)) = header else {
            return Err(SolverError::Parse {
                line: 0,
                msg: "missing header line".into(),
            });
        };
        // Knopen zonder regel aan het einde zijn geïsoleerd.
        while g.n() < n {
            g.add_vertex(1)?;
        }

        // Maak de adjacency symmetrisch; `freeze` verwijdert de dubbelen.
        for u in 0..g.n() {
            for i in 0..g.adj[u].len() {
                let v = g.adj[u][i] as usize;
                g.adj[v].push(u as u32);
            }
        }
        g.freeze();
        if g.m != declared_m {
            log::warn!(
                "METIS header declares {} edges, found {} unique edges",
                declared_m,
                g.m
            );
        }
        Ok(g)
    }

    /*────────── Getters ──────────*/

    /// Geeft het aantal knopen terug.
    #[inline]
    pub fn n(&self) -> usize {
        self.adj.len()
    }

    /// Geeft het aantal unieke ongerichte kanten terug.
    ///
    /// Voor `freeze` wordt het aantal opgeslagen adjacency-paren geteld,
    /// inclusief eventuele dubbelen.
    pub fn m(&self) -> usize {
        if self.frozen {
            self.m
        } else {
            self.adj.iter().map(Vec::len).sum::<usize>() / 2
        }
    }

    /// Gewicht van knoop `v`.
    #[inline]
    pub fn weight(&self, v: usize) -> u64 {
        self.weights[v]
    }

    /// Graad van knoop `v`.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.adj[v].len()
    }

    /// Buren van knoop `v`.
    #[inline]
    pub fn neighbours(&self, v: usize) -> &[u32] {
        &self.adj[v]
    }

    /// Som van alle knoopgewichten; een triviale bovengrens.
    ///
    /// Omdat `add_vertex` deze som begrenst, kan het gewicht van geen enkele
    /// deelverzameling overlopen.
    #[inline]
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Of `u` en `v` buren zijn. Vereist een bevroren graaf (binair zoeken).
    pub fn is_adjacent(&self, u: usize, v: usize) -> bool {
        debug_assert!(self.frozen, "is_adjacent requires a frozen graph");
        let (a, b) = if self.adj[u].len() <= self.adj[v].len() {
            (u, v)
        } else {
            (v, u)
        };
        self.adj[a].binary_search(&(b as u32)).is_ok()
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /*────────── Mutators ──────────*/

    /// Voegt een knoop met gewicht `weight` toe en geeft zijn id terug.
    ///
    /// Geweigerd als de som van alle gewichten daarmee niet meer in een `u64` past.
    pub fn add_vertex(&mut self, weight: u64) -> Result<usize> {
        if self.frozen {
            return Err(SolverError::GraphFrozen);
        }
        if self.adj.len() >= MAX_VERTICES {
            return Err(SolverError::CapacityExceeded { limit: MAX_VERTICES });
        }
        let total = self
            .total
            .checked_add(weight)
            .ok_or(SolverError::WeightOverflow { weight, total: self.total })?;
        self.adj.push(Vec::new());
        self.weights.push(weight);
        self.total = total;
        Ok(self.adj.len() - 1)
    }

    /// Voegt een ongerichte kant `(u, v)` toe.
    ///
    /// Zelf-lussen worden geweigerd; dubbele kanten worden geaccepteerd en bij
    /// `freeze` samengevoegd. Bij een fout blijft de graaf ongewijzigd.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<()> {
        if self.frozen {
            return Err(SolverError::GraphFrozen);
        }
        let n = self.n();
        for x in [u, v] {
            if x >= n {
                return Err(SolverError::VertexOutOfRange { vertex: x, n });
            }
        }
        if u == v {
            return Err(SolverError::SelfLoop { vertex: u });
        }
        self.adj[u].push(v as u32);
        self.adj[v].push(u as u32);
        Ok(())
    }

    /// Sorteert en ontdubbelt alle adjacency-lijsten en sluit de graaf af.
    /// Idempotent.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        let mut half_edges = 0usize;
        for row in &mut self.adj {
            row.sort_unstable();
            row.dedup();
            half_edges += row.len();
        }
        self.m = half_edges / 2;
        self.frozen = true;
    }
}

fn parse_token<T>(tok: &str, line: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    tok.parse().map_err(|e: T::Err| SolverError::Parse {
        line,
        msg: format!("'{}': {}", tok, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut g = Graph::new();
        assert_eq!(g.add_vertex(5).unwrap(), 0);
        assert_eq!(g.add_vertex(0).unwrap(), 1);
        assert_eq!(g.add_vertex(7).unwrap(), 2);
        assert_eq!(g.n(), 3);
        assert_eq!(g.total_weight(), 12);
    }

    #[test]
    fn test_self_loop_is_rejected_without_side_effects() {
        let mut g = Graph::new();
        g.add_vertex(1).unwrap();
        assert_eq!(g.add_edge(0, 0), Err(SolverError::SelfLoop { vertex: 0 }));
        assert_eq!(g.degree(0), 0);
    }

    #[test]
    fn test_out_of_range_edge_is_rejected() {
        let mut g = Graph::new();
        g.add_vertex(1).unwrap();
        assert_eq!(
            g.add_edge(0, 3),
            Err(SolverError::VertexOutOfRange { vertex: 3, n: 1 })
        );
        assert_eq!(g.m(), 0);
    }

    #[test]
    fn test_duplicate_edges_collapse_on_freeze() {
        let mut g = Graph::new();
        for _ in 0..3 {
            g.add_vertex(1).unwrap();
        }
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 0).unwrap();
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 2).unwrap();
        g.freeze();
        assert_eq!(g.m(), 2);
        assert_eq!(g.neighbours(0), &[1]);
        assert_eq!(g.neighbours(1), &[0, 2]);
        assert!(g.is_adjacent(2, 1));
        assert!(!g.is_adjacent(0, 2));
    }

    #[test]
    fn test_weight_total_overflow_is_rejected() {
        let mut g = Graph::new();
        g.add_vertex(u64::MAX / 2 + 1).unwrap();
        assert_eq!(
            g.add_vertex(u64::MAX / 2 + 1),
            Err(SolverError::WeightOverflow {
                weight: u64::MAX / 2 + 1,
                total: u64::MAX / 2 + 1,
            })
        );
        assert_eq!(g.n(), 1);
        assert_eq!(g.total_weight(), u64::MAX / 2 + 1);
        // Tot precies `u64::MAX` is toegestaan.
        g.add_vertex(u64::MAX / 2).unwrap();
        assert_eq!(g.total_weight(), u64::MAX);
        assert!(Graph::from_edge_list(&[u64::MAX, 1], &[(0, 1)]).is_err());
    }

    #[test]
    fn test_frozen_graph_rejects_mutation() {
        let mut g = Graph::from_edge_list(&[1, 1], &[(0, 1)]).unwrap();
        assert_eq!(g.add_vertex(1), Err(SolverError::GraphFrozen));
        assert_eq!(g.add_edge(0, 1), Err(SolverError::GraphFrozen));
    }

    #[test]
    fn test_parse_weighted_metis() {
        let input = "% triangle-ish\n3 2 10\n10 2 3\n10 1\n20 1\n";
        let g = Graph::parse_metis(input.as_bytes()).unwrap();
        assert_eq!(g.n(), 3);
        assert_eq!(g.m(), 2);
        assert_eq!(g.weight(2), 20);
        assert!(g.is_adjacent(0, 2));
        assert!(!g.is_adjacent(1, 2));
    }

    #[test]
    fn test_parse_unweighted_metis_with_isolated_vertex() {
        let input = "4 1\n2\n1\n\n\n";
        let g = Graph::parse_metis(input.as_bytes()).unwrap();
        assert_eq!(g.n(), 4);
        assert_eq!(g.m(), 1);
        assert_eq!(g.weight(3), 1);
        assert_eq!(g.degree(3), 0);
    }

    #[test]
    fn test_parse_metis_rejects_bad_neighbour() {
        let input = "2 1\n3\n1\n";
        match Graph::parse_metis(input.as_bytes()) {
            Err(SolverError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
