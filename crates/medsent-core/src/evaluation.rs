//! Classification metrics for a labelled evaluation set.

use thiserror::Error;

use crate::sentiment::Sentiment;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("no samples to evaluate")]
    Empty,
    #[error("length mismatch: {truth} true labels, {predicted} predictions")]
    LengthMismatch { truth: usize, predicted: usize },
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub class: Sentiment,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Metrics over a binary evaluation set.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: f64,
    /// F1 of the positive class.
    pub f1: f64,
    /// `[negative, positive]`.
    pub per_class: [ClassMetrics; 2],
    /// Rows are true classes, columns predicted, both ordered negative, positive.
    pub confusion: [[usize; 2]; 2],
}

impl Evaluation {
    pub fn from_pairs(truth: &[Sentiment], predicted: &[Sentiment]) -> Result<Self, EvaluationError> {
        if truth.len() != predicted.len() {
            return Err(EvaluationError::LengthMismatch {
                truth: truth.len(),
                predicted: predicted.len(),
            });
        }
        if truth.is_empty() {
            return Err(EvaluationError::Empty);
        }

        let mut confusion = [[0usize; 2]; 2];
        for (t, p) in truth.iter().zip(predicted) {
            confusion[t.index()][p.index()] += 1;
        }

        let correct = confusion[0][0] + confusion[1][1];
        let per_class = [
            class_metrics(&confusion, Sentiment::Negative),
            class_metrics(&confusion, Sentiment::Positive),
        ];

        Ok(Self {
            samples: truth.len(),
            accuracy: correct as f64 / truth.len() as f64,
            f1: per_class[1].f1,
            per_class,
            confusion,
        })
    }
}

fn class_metrics(confusion: &[[usize; 2]; 2], class: Sentiment) -> ClassMetrics {
    let i = class.index();
    let tp = confusion[i][i];
    let predicted = confusion[0][i] + confusion[1][i];
    let support = confusion[i][0] + confusion[i][1];

    let precision = ratio(tp, predicted);
    let recall = ratio(tp, support);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        class,
        precision,
        recall,
        f1,
        support,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Sentiment::{Negative as N, Positive as P};

    #[test]
    fn perfect_predictions() {
        let truth = [P, N, P, N];
        let eval = Evaluation::from_pairs(&truth, &truth).unwrap();
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.f1, 1.0);
        assert_eq!(eval.confusion, [[2, 0], [0, 2]]);
    }

    #[test]
    fn mixed_predictions() {
        // truth:     P P P N N
        // predicted: P P N P N
        let truth = [P, P, P, N, N];
        let pred = [P, P, N, P, N];
        let eval = Evaluation::from_pairs(&truth, &pred).unwrap();

        assert_eq!(eval.samples, 5);
        assert!((eval.accuracy - 0.6).abs() < 1e-9);
        assert_eq!(eval.confusion, [[1, 1], [1, 2]]);

        let pos = eval.per_class[1];
        assert!((pos.precision - 2.0 / 3.0).abs() < 1e-9);
        assert!((pos.recall - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(pos.support, 3);

        let neg = eval.per_class[0];
        assert!((neg.precision - 0.5).abs() < 1e-9);
        assert!((neg.recall - 0.5).abs() < 1e-9);
        assert_eq!(neg.support, 2);
    }

    #[test]
    fn class_never_predicted_scores_zero() {
        let eval = Evaluation::from_pairs(&[P, N], &[N, N]).unwrap();
        assert_eq!(eval.per_class[1].precision, 0.0);
        assert_eq!(eval.f1, 0.0);
    }

    #[test]
    fn empty_and_mismatched_inputs_fail() {
        assert_eq!(Evaluation::from_pairs(&[], &[]), Err(EvaluationError::Empty));
        assert_eq!(
            Evaluation::from_pairs(&[P], &[P, N]),
            Err(EvaluationError::LengthMismatch {
                truth: 1,
                predicted: 2
            })
        );
    }
}
