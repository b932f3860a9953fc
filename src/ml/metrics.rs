//! Held-out evaluation: accuracy, per-class report and confusion matrix.
//!
//! Every table is indexed by the sorted union of the labels known to the
//! dataset, the labels in the truth and the labels in the predictions. A
//! class that is never predicted still gets its row and column (all zeros)
//! rather than silently disappearing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Label;

/// Fraction of positions where truth and prediction agree. Empty input scores 0.
pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn label_union(known: &[Label], y_true: &[Label], y_pred: &[Label]) -> Vec<Label> {
    let mut labels: Vec<Label> = known
        .iter()
        .chain(y_true)
        .chain(y_pred)
        .copied()
        .collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

/// Truth-by-prediction count table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Row and column order.
    labels: Vec<Label>,
    /// `matrix[i][j]` counts rows with truth `labels[i]` predicted as `labels[j]`.
    matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Cross-tabulate truth against predictions over the union of `known`,
    /// the truth labels and the predicted labels.
    pub fn new(y_true: &[Label], y_pred: &[Label], known: &[Label]) -> Self {
        let labels = label_union(known, y_true, y_pred);
        let mut matrix = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            // both are members of the union
            let i = labels.binary_search(t).unwrap_or_default();
            let j = labels.binary_search(p).unwrap_or_default();
            matrix[i][j] += 1;
        }
        ConfusionMatrix { labels, matrix }
    }

    /// Row/column labels, ascending.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The raw count table.
    pub fn matrix(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Count of rows with truth `actual` predicted as `predicted`.
    pub fn get(&self, actual: Label, predicted: Label) -> usize {
        match (
            self.labels.binary_search(&actual),
            self.labels.binary_search(&predicted),
        ) {
            (Ok(i), Ok(j)) => self.matrix[i][j],
            _ => 0,
        }
    }

    /// `(rows, columns)`; always square.
    pub fn shape(&self) -> (usize, usize) {
        (self.labels.len(), self.labels.len())
    }

    fn true_positives(&self, c: usize) -> usize {
        self.matrix[c][c]
    }

    fn support(&self, c: usize) -> usize {
        self.matrix[c].iter().sum()
    }

    fn predicted(&self, c: usize) -> usize {
        self.matrix.iter().map(|row| row[c]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .matrix
            .iter()
            .flatten()
            .map(|count| count.to_string().len())
            .chain(self.labels.iter().map(|l| l.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(4);

        write!(f, "{:>12}", "true\\pred")?;
        for label in &self.labels {
            write!(f, " {label:>width$}")?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "{label:>12}")?;
            for count in row {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Precision, recall, F1 and support for one class or one average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Weighted mean of each metric over classes; 0 when `denominator` is 0.
fn average<W: Fn(&ClassMetrics) -> f64>(
    classes: &[(Label, ClassMetrics)],
    weight: W,
    denominator: f64,
    support: usize,
) -> ClassMetrics {
    let mean = |value: fn(&ClassMetrics) -> f64| {
        if denominator == 0.0 {
            return 0.0;
        }
        classes
            .iter()
            .map(|(_, m)| weight(m) * value(m))
            .sum::<f64>()
            / denominator
    };
    ClassMetrics {
        precision: mean(|m| m.precision),
        recall: mean(|m| m.recall),
        f1: mean(|m| m.f1),
        support,
    }
}

/// Per-class precision/recall/F1 table with accuracy and averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<(Label, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build the report from a confusion matrix. Undefined ratios are 0.
    pub fn from_confusion(confusion: &ConfusionMatrix) -> Self {
        let classes: Vec<(Label, ClassMetrics)> = confusion
            .labels()
            .iter()
            .enumerate()
            .map(|(c, &label)| {
                let tp = confusion.true_positives(c);
                let precision = ratio(tp, confusion.predicted(c));
                let recall = ratio(tp, confusion.support(c));
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                (
                    label,
                    ClassMetrics {
                        precision,
                        recall,
                        f1,
                        support: confusion.support(c),
                    },
                )
            })
            .collect();

        let total: usize = classes.iter().map(|(_, m)| m.support).sum();
        let correct: usize = (0..classes.len()).map(|c| confusion.true_positives(c)).sum();
        let n_classes = classes.len().max(1) as f64;

        let macro_avg = average(&classes, |_| 1.0, n_classes, total);
        let weighted_avg = average(&classes, |m| m.support as f64, total as f64, total);

        ClassificationReport {
            accuracy: ratio(correct, total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics for one label, if it is part of the report.
    pub fn class(&self, label: Label) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, metrics)| metrics)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, m) in &self.classes {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Everything printed after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

impl EvaluationReport {
    /// Evaluate predictions against truth; `known` adds labels that must
    /// appear in the tables even if absent from both.
    pub fn new(y_true: &[Label], y_pred: &[Label], known: &[Label]) -> Self {
        let confusion = ConfusionMatrix::new(y_true, y_pred, known);
        let report = ClassificationReport::from_confusion(&confusion);
        EvaluationReport {
            accuracy: accuracy(y_true, y_pred),
            report,
            confusion,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model accuracy: {:.2}%", self.accuracy * 100.0)?;
        writeln!(f, "Classification Report:")?;
        write!(f, "{}", self.report)?;
        writeln!(f)?;
        writeln!(f, "Confusion Matrix:")?;
        write!(f, "{}", self.confusion)
    }
}
