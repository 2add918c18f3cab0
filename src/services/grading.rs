// src/services/grading.rs

use std::collections::HashMap;

use crate::models::{
    answer::Answer,
    quiz::{QuestionType, Quiz},
};
use crate::services::gemini::{TheoryGrade, TheoryGradingItem};

/// A theory answer queued for remote grading, tagged with the index of its
/// question in the quiz so the grade can be reinserted at the right slot.
/// The tag exists because the grading batch is a filtered subset: position
/// in the batch and position in the quiz diverge as soon as the quiz mixes
/// question types.
#[derive(Debug, Clone)]
pub struct TheoryQueued {
    pub index: usize,
    pub item: TheoryGradingItem,
}

/// Outcome of the local grading pass.
#[derive(Debug)]
pub struct McqPass {
    /// One entry per question, in quiz order. Theory entries carry
    /// `is_correct = false` as a placeholder until their grades arrive.
    pub answers: Vec<Answer>,
    /// Score from multiple-choice matches only.
    pub score: u32,
    /// Theory answers awaiting remote grading, in quiz order.
    pub theory_queue: Vec<TheoryQueued>,
}

/// Local grading pass: one ordered sweep over the questions.
///
/// Multiple-choice answers are graded by exact, case-sensitive string
/// equality against the correct option. Theory answers are not graded here;
/// they are collected for the remote batch. Missing answers default to the
/// empty string.
pub fn grade_multiple_choice(quiz: &Quiz, collected: &HashMap<usize, String>) -> McqPass {
    let mut score = 0u32;
    let mut theory_queue = Vec::new();

    let answers = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected_answer = collected.get(&index).cloned().unwrap_or_default();
            let mut is_correct = false;

            match question.question_type {
                QuestionType::MultipleChoice => {
                    is_correct = selected_answer == question.correct_answer;
                    if is_correct {
                        score += 1;
                    }
                }
                QuestionType::Theory => {
                    theory_queue.push(TheoryQueued {
                        index,
                        item: TheoryGradingItem {
                            question_text: question.question_text.clone(),
                            ideal_answer: question.correct_answer.clone(),
                            user_answer: selected_answer.clone(),
                        },
                    });
                }
            }

            Answer {
                question_text: question.question_text.clone(),
                question_type: question.question_type,
                selected_answer,
                correct_answer: question.correct_answer.clone(),
                is_correct,
                feedback: None,
            }
        })
        .collect();

    McqPass {
        answers,
        score,
        theory_queue,
    }
}

/// Reinserts remote theory grades into the full answer array.
///
/// `grades[i]` belongs to `queue[i]`, whose `index` names the slot in
/// `answers` to patch. Returns the score earned by correct theory answers.
/// The client has already verified that `grades` and the request batch have
/// the same length.
pub fn apply_theory_grades(
    answers: &mut [Answer],
    queue: &[TheoryQueued],
    grades: &[TheoryGrade],
) -> u32 {
    let mut score = 0u32;

    for (queued, grade) in queue.iter().zip(grades) {
        let slot = &mut answers[queued.index];
        slot.is_correct = grade.is_correct;
        slot.feedback = Some(grade.feedback.clone());
        if grade.is_correct {
            score += 1;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::Question;

    fn mc_question(text: &str, options: [&str; 4], correct: &str) -> Question {
        Question {
            question_text: text.to_string(),
            question_type: QuestionType::MultipleChoice,
            options: Some(options.iter().map(|s| s.to_string()).collect()),
            correct_answer: correct.to_string(),
        }
    }

    fn theory_question(text: &str, ideal: &str) -> Question {
        Question {
            question_text: text.to_string(),
            question_type: QuestionType::Theory,
            options: None,
            correct_answer: ideal.to_string(),
        }
    }

    fn collected(entries: &[(usize, &str)]) -> HashMap<usize, String> {
        entries
            .iter()
            .map(|(i, v)| (*i, v.to_string()))
            .collect()
    }

    #[test]
    fn answers_preserve_quiz_order_and_length() {
        let quiz = Quiz {
            title: "Cells".to_string(),
            questions: vec![
                theory_question("T1", "ideal one"),
                mc_question("M1", ["A", "B", "C", "D"], "A"),
                theory_question("T2", "ideal two"),
                mc_question("M2", ["A", "B", "C", "D"], "B"),
            ],
        };
        let pass = grade_multiple_choice(
            &quiz,
            &collected(&[(0, "x"), (1, "A"), (2, "y"), (3, "C")]),
        );

        assert_eq!(pass.answers.len(), quiz.questions.len());
        for (answer, question) in pass.answers.iter().zip(&quiz.questions) {
            assert_eq!(answer.question_text, question.question_text);
        }
    }

    #[test]
    fn mcq_grading_is_exact_and_case_sensitive() {
        let quiz = Quiz {
            title: "Caps".to_string(),
            questions: vec![
                mc_question("M1", ["Paris", "paris", "PARIS", "Lyon"], "Paris"),
                mc_question("M2", ["Paris", "paris", "PARIS", "Lyon"], "Paris"),
            ],
        };
        let pass = grade_multiple_choice(&quiz, &collected(&[(0, "Paris"), (1, "paris")]));

        assert!(pass.answers[0].is_correct);
        assert!(!pass.answers[1].is_correct);
        assert_eq!(pass.score, 1);
    }

    #[test]
    fn missing_answer_defaults_to_empty_string() {
        let quiz = Quiz {
            title: "Gap".to_string(),
            questions: vec![mc_question("M1", ["A", "B", "C", "D"], "A")],
        };
        let pass = grade_multiple_choice(&quiz, &HashMap::new());

        assert_eq!(pass.answers[0].selected_answer, "");
        assert!(!pass.answers[0].is_correct);
        assert_eq!(pass.score, 0);
    }

    #[test]
    fn theory_entries_queue_with_original_index_and_placeholder() {
        let quiz = Quiz {
            title: "Mix".to_string(),
            questions: vec![
                mc_question("M1", ["A", "B", "C", "D"], "A"),
                theory_question("T1", "ideal one"),
                mc_question("M2", ["A", "B", "C", "D"], "B"),
                theory_question("T2", "ideal two"),
            ],
        };
        let pass = grade_multiple_choice(
            &quiz,
            &collected(&[(0, "A"), (1, "answer one"), (2, "B"), (3, "answer two")]),
        );

        let indices: Vec<usize> = pass.theory_queue.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(pass.theory_queue[0].item.user_answer, "answer one");
        assert_eq!(pass.theory_queue[1].item.ideal_answer, "ideal two");
        // Placeholders until the remote grades land.
        assert!(!pass.answers[1].is_correct);
        assert!(!pass.answers[3].is_correct);
    }

    #[test]
    fn theory_grades_land_at_original_index_not_batch_index() {
        let quiz = Quiz {
            title: "Mix".to_string(),
            questions: vec![
                mc_question("M1", ["A", "B", "C", "D"], "A"),
                theory_question("T1", "ideal one"),
                mc_question("M2", ["A", "B", "C", "D"], "B"),
                theory_question("T2", "ideal two"),
            ],
        };
        let mut pass = grade_multiple_choice(
            &quiz,
            &collected(&[(0, "A"), (1, "one"), (2, "B"), (3, "two")]),
        );

        let grades = vec![
            TheoryGrade {
                is_correct: false,
                feedback: "missed the point".to_string(),
            },
            TheoryGrade {
                is_correct: true,
                feedback: "well put".to_string(),
            },
        ];
        let delta = apply_theory_grades(&mut pass.answers, &pass.theory_queue, &grades);

        assert_eq!(delta, 1);
        assert!(!pass.answers[1].is_correct);
        assert_eq!(pass.answers[1].feedback.as_deref(), Some("missed the point"));
        assert!(pass.answers[3].is_correct);
        assert_eq!(pass.answers[3].feedback.as_deref(), Some("well put"));
        // Untouched multiple-choice slots stay graded as before.
        assert!(pass.answers[0].is_correct);
        assert!(pass.answers[2].is_correct);
    }

    #[test]
    fn two_mc_one_theory_scenario() {
        let quiz = Quiz {
            title: "Biology".to_string(),
            questions: vec![
                mc_question("Q1", ["A", "B", "C", "D"], "B"),
                mc_question("Q2", ["A", "B", "C", "D"], "A"),
                theory_question("Q3", "mitochondria produce energy"),
            ],
        };
        let mut pass = grade_multiple_choice(
            &quiz,
            &collected(&[
                (0, "B"),
                (1, "C"),
                (2, "the mitochondria makes energy for the cell"),
            ]),
        );
        assert_eq!(pass.score, 1);

        let grades = vec![TheoryGrade {
            is_correct: true,
            feedback: "close enough".to_string(),
        }];
        let total = pass.score + apply_theory_grades(&mut pass.answers, &pass.theory_queue, &grades);

        assert_eq!(total, 2);
        assert!(pass.answers[0].is_correct);
        assert!(!pass.answers[1].is_correct);
        assert!(pass.answers[2].is_correct);
        assert_eq!(pass.answers[2].feedback.as_deref(), Some("close enough"));
        assert!(total as usize <= quiz.questions.len());
    }
}
