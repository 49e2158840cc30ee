//! # Weighted Multi-Criteria Scoring
//!
//! Ranks a set of candidates (materials, parameter sets) by the sum of capped
//! sub-scores. The same scorer serves material selection and the
//! power/speed alternatives.
//!
//! ## Pipeline
//!
//! 1. **Constraints** are named predicates. A candidate failing any of them
//!    is excluded before scoring and listed in [`Ranking::excluded`] with the
//!    first constraint it failed.
//! 2. **Criteria** are named closures with a cap. Each sub-score is clamped
//!    to `0..=cap`, and the total to `0..=100`.
//! 3. **Ordering** is total descending, then the tie-break key ascending,
//!    then candidate id, so equal inputs always rank identically.
//!
//! An empty ranking is a normal outcome, not an error.
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::scoring::Scorer;
//!
//! struct Sheet { key: &'static str, cost: f64, strength: f64 }
//!
//! let sheets = vec![
//!     Sheet { key: "a", cost: 2.0, strength: 300.0 },
//!     Sheet { key: "b", cost: 9.0, strength: 500.0 },
//!     Sheet { key: "c", cost: 1.0, strength: 250.0 },
//! ];
//!
//! let ranking = Scorer::new(|s: &Sheet| s.key.to_string())
//!     .constraint("within_budget", |s| s.cost <= 5.0)
//!     .criterion("strength", 60.0, |s| s.strength / 500.0 * 60.0)
//!     .criterion("cost", 40.0, |s| 40.0 / s.cost)
//!     .tie_break(|s| s.cost)
//!     .score_and_rank(sheets);
//!
//! assert_eq!(ranking.ranked[0].id, "c");
//! assert_eq!(ranking.excluded[0].id, "b");
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Upper bound of every total score
pub const MAX_SCORE: f64 = 100.0;

type IdFn<'a, C> = Box<dyn Fn(&C) -> String + 'a>;
type Predicate<'a, C> = Box<dyn Fn(&C) -> bool + 'a>;
type ScoreFn<'a, C> = Box<dyn Fn(&C) -> f64 + 'a>;

struct Criterion<'a, C> {
    name: &'static str,
    cap: f64,
    score: ScoreFn<'a, C>,
}

/// Builder-configured scorer over candidates of type `C`
pub struct Scorer<'a, C> {
    id: IdFn<'a, C>,
    constraints: Vec<(&'static str, Predicate<'a, C>)>,
    criteria: Vec<Criterion<'a, C>>,
    tie_break: Option<ScoreFn<'a, C>>,
}

/// One capped sub-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub criterion: String,
    pub score: f64,
    pub cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate<C> {
    /// 1-based position
    pub rank: usize,
    pub id: String,
    pub candidate: C,
    pub total_score: f64,
    pub breakdown: Vec<SubScore>,
}

/// A candidate removed by a hard constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excluded {
    pub id: String,
    pub constraint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking<C> {
    pub ranked: Vec<RankedCandidate<C>>,
    pub excluded: Vec<Excluded>,
}

impl<C> Ranking<C> {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn top(&self) -> Option<&RankedCandidate<C>> {
        self.ranked.first()
    }
}

impl<'a, C> Scorer<'a, C> {
    /// New scorer; `id` names a candidate for ordering and reporting
    pub fn new(id: impl Fn(&C) -> String + 'a) -> Self {
        Scorer {
            id: Box::new(id),
            constraints: Vec::new(),
            criteria: Vec::new(),
            tie_break: None,
        }
    }

    /// Add a hard constraint (builder pattern)
    pub fn constraint(mut self, name: &'static str, predicate: impl Fn(&C) -> bool + 'a) -> Self {
        self.constraints.push((name, Box::new(predicate)));
        self
    }

    /// Add a capped criterion (builder pattern)
    pub fn criterion(mut self, name: &'static str, cap: f64, score: impl Fn(&C) -> f64 + 'a) -> Self {
        self.criteria.push(Criterion {
            name,
            cap,
            score: Box::new(score),
        });
        self
    }

    /// Secondary ordering key, ascending, applied to equal totals
    pub fn tie_break(mut self, key: impl Fn(&C) -> f64 + 'a) -> Self {
        self.tie_break = Some(Box::new(key));
        self
    }

    /// Score a single candidate, ignoring constraints
    pub fn score(&self, candidate: &C) -> (f64, Vec<SubScore>) {
        let breakdown: Vec<SubScore> = self
            .criteria
            .iter()
            .map(|c| SubScore {
                criterion: c.name.to_string(),
                score: clamp_score((c.score)(candidate), c.cap),
                cap: c.cap,
            })
            .collect();
        let total = clamp_score(breakdown.iter().map(|s| s.score).sum(), MAX_SCORE);
        (total, breakdown)
    }

    /// Filter, score and order the candidates
    pub fn score_and_rank(&self, candidates: Vec<C>) -> Ranking<C> {
        let mut excluded = Vec::new();
        let mut scored = Vec::new();

        for candidate in candidates {
            let id = (self.id)(&candidate);
            if let Some((name, _)) = self.constraints.iter().find(|(_, ok)| !ok(&candidate)) {
                excluded.push(Excluded {
                    id,
                    constraint: name.to_string(),
                });
                continue;
            }
            let (total_score, breakdown) = self.score(&candidate);
            let tie = self.tie_break.as_ref().map(|key| key(&candidate)).unwrap_or(0.0);
            scored.push((tie, RankedCandidate {
                rank: 0,
                id,
                candidate,
                total_score,
                breakdown,
            }));
        }

        scored.sort_by(|(tie_a, a), (tie_b, b)| {
            b.total_score
                .total_cmp(&a.total_score)
                .then_with(|| tie_a.partial_cmp(tie_b).unwrap_or(Ordering::Equal))
                .then_with(|| a.id.cmp(&b.id))
        });

        let ranked = scored
            .into_iter()
            .enumerate()
            .map(|(i, (_, mut entry))| {
                entry.rank = i + 1;
                entry
            })
            .collect();

        Ranking { ranked, excluded }
    }
}

/// Clamp into `0..=cap`; non-finite scores count as zero
fn clamp_score(raw: f64, cap: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, cap)
    } else {
        0.0
    }
}

/// A named alternative as reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateOption {
    pub key: String,
    pub name: String,
    /// Always within 0..=100
    pub score: f64,
    pub properties: BTreeMap<String, f64>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl CandidateOption {
    pub fn new(key: impl Into<String>, name: impl Into<String>, score: f64) -> Self {
        CandidateOption {
            key: key.into(),
            name: name.into(),
            score: clamp_score(score, MAX_SCORE),
            properties: BTreeMap::new(),
            pros: Vec::new(),
            cons: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: f64) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn with_pros(mut self, pros: &[&str]) -> Self {
        self.pros.extend(pros.iter().map(|p| p.to_string()));
        self
    }

    pub fn with_cons(mut self, cons: &[&str]) -> Self {
        self.cons.extend(cons.iter().map(|c| c.to_string()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        a: f64,
        b: f64,
        cost: f64,
    }

    fn item(id: &'static str, a: f64, b: f64, cost: f64) -> Item {
        Item { id, a, b, cost }
    }

    fn scorer<'a>() -> Scorer<'a, Item> {
        Scorer::new(|i: &Item| i.id.to_string())
            .criterion("a", 60.0, |i| i.a)
            .criterion("b", 60.0, |i| i.b)
            .tie_break(|i| i.cost)
    }

    #[test]
    fn test_sub_scores_are_capped() {
        let (total, breakdown) = scorer().score(&item("x", 500.0, -5.0, 1.0));
        assert_eq!(breakdown[0].score, 60.0);
        assert_eq!(breakdown[1].score, 0.0);
        assert_eq!(total, 60.0);
    }

    #[test]
    fn test_total_is_capped_at_100() {
        let (total, _) = scorer().score(&item("x", 60.0, 60.0, 1.0));
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_nan_counts_as_zero() {
        let (total, _) = scorer().score(&item("x", f64::NAN, 10.0, 1.0));
        assert_eq!(total, 10.0);
    }

    #[test]
    fn test_ordering_and_ties() {
        let ranking = scorer().score_and_rank(vec![
            item("b", 30.0, 10.0, 5.0),
            item("a", 30.0, 10.0, 5.0),
            item("c", 30.0, 10.0, 2.0),
            item("d", 50.0, 10.0, 9.0),
        ]);
        let order: Vec<&str> = ranking.ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["d", "c", "a", "b"]);
        assert_eq!(ranking.ranked[0].rank, 1);
        assert_eq!(ranking.ranked[3].rank, 4);
    }

    #[test]
    fn test_constraints_filter_before_scoring() {
        let ranking = scorer()
            .constraint("cheap", |i| i.cost <= 3.0)
            .constraint("strong", |i| i.a >= 10.0)
            .score_and_rank(vec![item("a", 50.0, 0.0, 9.0), item("b", 5.0, 0.0, 1.0), item("c", 20.0, 0.0, 1.0)]);

        assert_eq!(ranking.ranked.len(), 1);
        assert_eq!(ranking.ranked[0].id, "c");
        assert_eq!(
            ranking.excluded,
            vec![
                Excluded { id: "a".into(), constraint: "cheap".into() },
                Excluded { id: "b".into(), constraint: "strong".into() },
            ]
        );
    }

    #[test]
    fn test_empty_ranking_is_valid() {
        let ranking = scorer().constraint("never", |_| false).score_and_rank(vec![item("a", 1.0, 1.0, 1.0)]);
        assert!(ranking.is_empty());
        assert!(ranking.top().is_none());
    }

    #[test]
    fn test_candidate_option_score_clamped() {
        assert_eq!(CandidateOption::new("k", "K", 140.0).score, 100.0);
        assert_eq!(CandidateOption::new("k", "K", -3.0).score, 0.0);
    }
}
