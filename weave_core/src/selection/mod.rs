//! Candidate selection - which quest, if any, gets created this cycle.
//!
//! The selection runs in stages:
//! 1. **Resolve**: every offered template is turned into a candidate by
//!    solving its property graph
//! 2. **Score**: non-priority candidates get `rarity + repetition + creation`
//! 3. **Priority**: if any priority candidate exists, all of them are taken
//!    and scoring is ignored
//! 4. **Shuffle + sort**: candidates are shuffled, then stably sorted by score,
//!    so equal scores end up in random order
//! 5. **Draw**: a non-negative offset is drawn from a normal distribution
//!    over the score range, and the first candidate at or above
//!    `min_score + offset` wins

mod candidate;

pub use candidate::*;

use tracing::{debug, warn};
use weave_world::{WorldActionType, WorldModel};

use crate::config::SelectionConfig;
use crate::quest::QuestModel;
use crate::random::RandomSource;
use crate::template::QuestTemplate;

/// Scores and picks quest candidates.
pub struct CandidateSelector {
    config: SelectionConfig,
}

impl CandidateSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Create a selector with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SelectionConfig::default())
    }

    /// Resolve every template into a candidate, in the order given.
    pub fn build_candidates(
        &self,
        templates: Vec<Box<dyn QuestTemplate>>,
        world: &WorldModel,
        quests: &QuestModel,
        rs: &mut dyn RandomSource,
    ) -> Vec<QuestCandidate> {
        templates
            .into_iter()
            .filter_map(|template| QuestCandidate::resolve(template, world, quests, rs))
            .collect()
    }

    /// `rarity + quests of the same type + entities the candidate would create`.
    ///
    /// The quest type is the one the template's draft quest carries, which
    /// need not match the template key.
    pub fn score(candidate: &QuestCandidate, quests: &QuestModel) -> i64 {
        let repetition = quests.count_of_type(&candidate.quest_type) as i64;
        let creation = candidate
            .actions
            .iter()
            .filter(|a| a.action_type() == WorldActionType::Create)
            .count() as i64;
        candidate.template.rarity() + repetition + creation
    }

    /// The candidates to commit: every priority candidate if there is one,
    /// otherwise at most one scored candidate.
    pub fn select(
        &self,
        mut candidates: Vec<QuestCandidate>,
        quests: &QuestModel,
        rs: &mut dyn RandomSource,
    ) -> Vec<QuestCandidate> {
        let mut bounds: Option<(i64, i64)> = None;
        for candidate in candidates.iter_mut().filter(|c| !c.is_priority) {
            candidate.score = Self::score(candidate, quests);
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(candidate.score), max.max(candidate.score)),
                None => (candidate.score, candidate.score),
            });
        }

        if candidates.iter().any(|c| c.is_priority) {
            return candidates.into_iter().filter(|c| c.is_priority).collect();
        }
        let Some((min_score, max_score)) = bounds else {
            return Vec::new();
        };

        shuffle(&mut candidates, rs);
        candidates.sort_by_key(|c| c.score);

        let offset = self.draw_offset(max_score - min_score, rs);
        let threshold = min_score + offset;
        debug!(min_score, max_score, offset, "selection draw");

        candidates
            .into_iter()
            .find(|c| c.score >= threshold)
            .into_iter()
            .collect()
    }

    /// Rejection-sample a non-negative value from `bounded_normal(-range, range)`.
    fn draw_offset(&self, range: i64, rs: &mut dyn RandomSource) -> i64 {
        for _ in 0..self.config.max_selection_draws {
            let value = rs.bounded_normal(-range, range);
            if value >= 0 {
                return value;
            }
        }
        warn!(
            draws = self.config.max_selection_draws,
            "no non-negative selection draw, falling back to the best candidate"
        );
        0
    }
}

/// Uniform Fisher-Yates shuffle driven by the random source.
pub fn shuffle<T>(items: &mut [T], rs: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rs.uniform_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConstraintGraph;
    use crate::quest::{Quest, QuestProperties};
    use crate::random::RandomStream;
    use weave_world::WorldModelAction;

    struct Scored {
        key: String,
        quest_type: String,
        rarity: i64,
        priority: bool,
    }

    impl QuestTemplate for Scored {
        fn key(&self) -> &str {
            &self.key
        }

        fn rarity(&self) -> i64 {
            self.rarity
        }

        fn is_priority(&self) -> bool {
            self.priority
        }

        fn property_graph(
            &self,
            _world: &WorldModel,
            _quests: &QuestModel,
            _rs: &mut dyn RandomSource,
        ) -> ConstraintGraph<WorldModelAction> {
            ConstraintGraph::new()
        }

        fn to_quest(&self, _properties: &QuestProperties, _story: &str) -> Quest {
            Quest::new(self.quest_type.clone(), "t", "d")
        }
    }

    /// Random source with scripted answers.
    struct Scripted {
        normals: Vec<i64>,
        normal_calls: usize,
    }

    impl Scripted {
        fn new(normals: Vec<i64>) -> Self {
            Self { normals, normal_calls: 0 }
        }
    }

    impl RandomSource for Scripted {
        fn uniform_index(&mut self, n: usize) -> usize {
            n - 1
        }

        fn bounded_normal(&mut self, _min: i64, _max: i64) -> i64 {
            let value = self.normals.get(self.normal_calls).copied().unwrap_or(0);
            self.normal_calls += 1;
            value
        }
    }

    fn candidate(key: &str, rarity: i64, priority: bool) -> QuestCandidate {
        QuestCandidate::new(
            Box::new(Scored {
                key: key.to_string(),
                quest_type: key.to_string(),
                rarity,
                priority,
            }),
            QuestProperties::new(),
            Vec::new(),
        )
    }

    fn keys(selected: &[QuestCandidate]) -> Vec<&str> {
        selected.iter().map(|c| c.template.key()).collect()
    }

    #[test]
    fn test_no_candidates() {
        let selector = CandidateSelector::with_defaults();
        let selected = selector.select(Vec::new(), &QuestModel::new(), &mut RandomStream::new(0));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_zero_draw_picks_lowest_score() {
        let selector = CandidateSelector::with_defaults();
        let candidates = vec![candidate("three", 3, false), candidate("one", 1, false), candidate("two", 2, false)];
        let mut rs = Scripted::new(vec![0]);

        let selected = selector.select(candidates, &QuestModel::new(), &mut rs);

        assert_eq!(keys(&selected), vec!["one"]);
        assert_eq!(selected[0].score, 1);
    }

    #[test]
    fn test_negative_draws_are_rejected() {
        let selector = CandidateSelector::with_defaults();
        let candidates = vec![candidate("three", 3, false), candidate("one", 1, false), candidate("two", 2, false)];
        let mut rs = Scripted::new(vec![-2, -1, 1]);

        let selected = selector.select(candidates, &QuestModel::new(), &mut rs);

        assert_eq!(rs.normal_calls, 3);
        assert_eq!(keys(&selected), vec!["two"]);
    }

    #[test]
    fn test_draw_above_range_selects_nothing() {
        let selector = CandidateSelector::with_defaults();
        let candidates = vec![candidate("three", 3, false), candidate("one", 1, false)];
        let mut rs = Scripted::new(vec![5]);

        assert!(selector.select(candidates, &QuestModel::new(), &mut rs).is_empty());
    }

    #[test]
    fn test_priority_candidates_win() {
        let selector = CandidateSelector::with_defaults();
        let candidates = vec![
            candidate("scored-a", 0, false),
            candidate("urgent", 50, true),
            candidate("scored-b", 1, false),
        ];
        let mut rs = Scripted::new(Vec::new());

        let selected = selector.select(candidates, &QuestModel::new(), &mut rs);

        assert_eq!(keys(&selected), vec!["urgent"]);
        assert_eq!(rs.normal_calls, 0);
    }

    #[test]
    fn test_all_priority_candidates_are_taken() {
        let selector = CandidateSelector::with_defaults();
        let candidates = vec![candidate("a", 0, true), candidate("b", 0, true)];
        let selected = selector.select(candidates, &QuestModel::new(), &mut RandomStream::new(3));
        assert_eq!(keys(&selected), vec!["a", "b"]);
    }

    #[test]
    fn test_single_candidate_zero_range() {
        let selector = CandidateSelector::with_defaults();
        let selected = selector.select(vec![candidate("only", 4, false)], &QuestModel::new(), &mut RandomStream::new(8));
        assert_eq!(keys(&selected), vec!["only"]);
    }

    #[test]
    fn test_exhausted_draws_fall_back_to_best() {
        let selector = CandidateSelector::new(SelectionConfig { max_selection_draws: 2 });
        let candidates = vec![candidate("high", 5, false), candidate("low", 2, false)];
        let mut rs = Scripted::new(vec![-1, -1, -1]);

        let selected = selector.select(candidates, &QuestModel::new(), &mut rs);

        assert_eq!(rs.normal_calls, 2);
        assert_eq!(keys(&selected), vec!["low"]);
    }

    #[test]
    fn test_score_counts_repetition_and_creation() {
        let mut quests = QuestModel::new();
        quests.register_new(Quest::new("hunt", "t", "d"), &QuestProperties::new());
        quests.register_new(Quest::new("hunt", "t", "d"), &QuestProperties::new());
        quests.register_new(Quest::new("other", "t", "d"), &QuestProperties::new());

        let mut scored = candidate("hunt", 3, false);
        scored.actions = vec![
            WorldModelAction::create(weave_world::WorldEntity::new("Ship"), weave_world::MetaData::new()),
            WorldModelAction::create(weave_world::WorldEntity::new("Ship"), weave_world::MetaData::new()),
            WorldModelAction::keep(weave_world::EntityHandle::new(weave_world::WorldEntity::new("Agent"))),
        ];

        assert_eq!(CandidateSelector::score(&scored, &quests), 3 + 2 + 2);
    }

    #[test]
    fn test_repetition_counts_quest_type_not_key() {
        let mut quests = QuestModel::new();
        quests.register_new(Quest::new("bounty", "t", "d"), &QuestProperties::new());

        let renamed = QuestCandidate::new(
            Box::new(Scored {
                key: "bounty-v2".to_string(),
                quest_type: "bounty".to_string(),
                rarity: 1,
                priority: false,
            }),
            QuestProperties::new(),
            Vec::new(),
        );

        assert_eq!(renamed.quest_type, "bounty");
        assert_eq!(CandidateSelector::score(&renamed, &quests), 1 + 1);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let selector = CandidateSelector::with_defaults();
        let run = |seed| {
            let candidates: Vec<_> = (0..8).map(|i| candidate(&format!("c{}", i), i % 3, false)).collect();
            let selected = selector.select(candidates, &QuestModel::new(), &mut RandomStream::new(seed));
            selected.first().map(|c| c.template.key().to_string())
        };

        for seed in 0..10 {
            assert_eq!(run(seed), run(seed));
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut RandomStream::new(6));
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
