//! Built-in demo problem bank.

use bingo_core::{BankError, Problem, ProblemBank, Topic};

/// `(question, answer, topic)` rows, ids assigned in order from 1.
const DEMO_PROBLEMS: &[(&str, &str, Topic)] = &[
    ("What is 10% of 50?", "5", Topic::Percentage),
    ("What is 25% of 80?", "20", Topic::Percentage),
    ("What is 50% of 18?", "9", Topic::Percentage),
    ("What is 20% of 35?", "7", Topic::Percentage),
    ("What is 75% of 16?", "12", Topic::Percentage),
    ("What is 30% of 40?", "12", Topic::Percentage),
    ("What is 15% of 60?", "9", Topic::Percentage),
    ("What is 40% of 75?", "30", Topic::Percentage),
    ("What is 5% of 300?", "15", Topic::Percentage),
    ("What is 60% of 45?", "27", Topic::Percentage),
    ("Simplify 12:18", "2:3", Topic::RatioSimplify),
    ("Simplify 15:25", "3:5", Topic::RatioSimplify),
    ("Simplify 8:20", "2:5", Topic::RatioSimplify),
    ("Simplify 21:28", "3:4", Topic::RatioSimplify),
    ("Simplify 36:24", "3:2", Topic::RatioSimplify),
    ("Simplify 14:35", "2:5", Topic::RatioSimplify),
    ("Simplify 45:60", "3:4", Topic::RatioSimplify),
    ("Simplify 16:40", "2:5", Topic::RatioSimplify),
    ("Divide 40 in the ratio 3:5", "15:25", Topic::RatioDivide),
    ("Divide 60 in the ratio 1:2", "20:40", Topic::RatioDivide),
    ("Divide 35 in the ratio 2:5", "10:25", Topic::RatioDivide),
    ("Divide 48 in the ratio 5:7", "20:28", Topic::RatioDivide),
    ("Divide 90 in the ratio 4:5", "40:50", Topic::RatioDivide),
    ("Divide 72 in the ratio 1:3", "18:54", Topic::RatioDivide),
    ("Divide 56 in the ratio 3:4", "24:32", Topic::RatioDivide),
    ("Divide 100 in the ratio 7:3", "70:30", Topic::RatioDivide),
];

/// Demo bank covering every topic. Some answers repeat across problems, as
/// they do in a real worksheet.
pub fn demo_bank() -> Result<ProblemBank, BankError> {
    let problems = DEMO_PROBLEMS
        .iter()
        .zip(1..)
        .map(|(&(question, answer, topic), id)| Problem::new(id, question, answer, topic))
        .collect();
    ProblemBank::new(problems)
}
