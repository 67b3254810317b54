//! Read-only problem bank.
//!
//! Problem content is supplied by the embedding application; the core only
//! needs ids (for posting) and answers (for grids).

use std::{collections::HashSet, fmt};

use bingo_proto::ProblemId;

use crate::error::BankError;

/// Problem category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// "What is 20% of 50?"
    Percentage,
    /// "Simplify 12:18."
    RatioSimplify,
    /// "Divide 40 in the ratio 3:5."
    RatioDivide,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Percentage => "percentage",
            Self::RatioSimplify => "ratio-simplify",
            Self::RatioDivide => "ratio-divide",
        };
        f.write_str(name)
    }
}

/// A single quiz problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    /// Identity within the bank.
    pub id: ProblemId,
    /// Text shown to students.
    pub question: String,
    /// Text placed on grids.
    pub answer: String,
    /// Category.
    pub topic: Topic,
}

impl Problem {
    /// Create a problem.
    pub fn new(
        id: ProblemId,
        question: impl Into<String>,
        answer: impl Into<String>,
        topic: Topic,
    ) -> Self {
        Self { id, question: question.into(), answer: answer.into(), topic }
    }
}

/// Fixed collection of problems, unique by id.
#[derive(Debug, Clone, Default)]
pub struct ProblemBank {
    problems: Vec<Problem>,
}

impl ProblemBank {
    /// Build a bank, rejecting duplicate ids.
    pub fn new(problems: Vec<Problem>) -> Result<Self, BankError> {
        let mut seen = HashSet::with_capacity(problems.len());
        for problem in &problems {
            if !seen.insert(problem.id) {
                return Err(BankError::DuplicateProblemId(problem.id));
            }
        }
        Ok(Self { problems })
    }

    /// Problem with the given id.
    pub fn get(&self, id: ProblemId) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    /// All problems in bank order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Number of problems.
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// True if the bank has no problems.
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Problems not yet posted, in bank order.
    pub fn unused<'a>(&'a self, history: &'a [ProblemId]) -> impl Iterator<Item = &'a Problem> {
        self.problems.iter().filter(move |p| !history.contains(&p.id))
    }

    /// Distinct answers in order of first appearance.
    pub fn distinct_answers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.problems
            .iter()
            .map(|p| p.answer.as_str())
            .filter(|answer| seen.insert(*answer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> ProblemBank {
        ProblemBank::new(vec![
            Problem::new(1, "10% of 50", "5", Topic::Percentage),
            Problem::new(2, "Simplify 2:4", "1:2", Topic::RatioSimplify),
            Problem::new(3, "50% of 10", "5", Topic::Percentage),
        ])
        .expect("ids are unique")
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = ProblemBank::new(vec![
            Problem::new(7, "a", "1", Topic::Percentage),
            Problem::new(7, "b", "2", Topic::Percentage),
        ]);
        assert_eq!(result.err(), Some(BankError::DuplicateProblemId(7)));
    }

    #[test]
    fn distinct_answers_keep_first_appearance() {
        assert_eq!(bank().distinct_answers(), vec!["5", "1:2"]);
    }

    #[test]
    fn unused_skips_history() {
        let bank = bank();
        let ids: Vec<_> = bank.unused(&[2]).map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn lookup_by_id() {
        let bank = bank();
        assert_eq!(bank.get(2).map(|p| p.answer.as_str()), Some("1:2"));
        assert!(bank.get(99).is_none());
    }
}
