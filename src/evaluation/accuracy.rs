//! Per-class forecast accuracy.
//!
//! For each true direction c, accuracy is the fraction of (window, market)
//! cells labeled c that the forecaster also predicted as c. A direction that
//! never occurs has no accuracy.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{Direction, LabelVector};
use crate::forecast::{ForecastError, Forecaster};
use crate::windowing::LabeledWindows;

/// Hits and support for one true direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    /// Cells whose true label is this direction.
    pub support: usize,
    /// Of those, cells predicted correctly.
    pub correct: usize,
}

impl ClassCounts {
    pub fn accuracy(&self) -> Option<f64> {
        if self.support == 0 {
            None
        } else {
            Some(self.correct as f64 / self.support as f64)
        }
    }
}

/// Accuracy of one direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassAccuracy {
    pub direction: Direction,
    pub support: usize,
    pub correct: usize,
    pub accuracy: Option<f64>,
}

/// Forecast accuracy over a set of labeled windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub forecaster: String,
    pub window_size: usize,
    pub windows: usize,
    pub markets: usize,
    pub up: ClassCounts,
    pub flat: ClassCounts,
    pub down: ClassCounts,
}

impl AccuracyReport {
    pub fn counts(&self, direction: Direction) -> ClassCounts {
        match direction {
            Direction::Up => self.up,
            Direction::Flat => self.flat,
            Direction::Down => self.down,
        }
    }

    fn counts_mut(&mut self, direction: Direction) -> &mut ClassCounts {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Flat => &mut self.flat,
            Direction::Down => &mut self.down,
        }
    }

    /// Accuracy for a true direction, `None` if it never occurs.
    pub fn accuracy(&self, direction: Direction) -> Option<f64> {
        self.counts(direction).accuracy()
    }

    /// Fraction of all cells predicted correctly.
    pub fn overall_accuracy(&self) -> Option<f64> {
        let (correct, support) = Direction::ALL.iter().fold((0, 0), |(c, s), d| {
            let counts = self.counts(*d);
            (c + counts.correct, s + counts.support)
        });
        ClassCounts { support, correct }.accuracy()
    }

    /// Per-direction breakdown in +1, -1, 0 order.
    pub fn by_class(&self) -> Vec<ClassAccuracy> {
        Direction::ALL
            .iter()
            .map(|d| {
                let counts = self.counts(*d);
                ClassAccuracy {
                    direction: *d,
                    support: counts.support,
                    correct: counts.correct,
                    accuracy: counts.accuracy(),
                }
            })
            .collect()
    }

    /// One line per direction, prefixed with the name of the data set.
    pub fn summary(&self, dataset: &str) -> String {
        Direction::ALL
            .iter()
            .map(|d| {
                format!(
                    "{} accuracy for prediction {}: {}",
                    dataset,
                    d.as_str(),
                    format_accuracy(self.accuracy(*d))
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(a) => format!("{:.4}", a),
        None => "nan".to_string(),
    }
}

/// Forecast every window and score the predictions against its label.
pub fn evaluate<F>(
    forecaster: &F,
    data: &LabeledWindows<'_>,
) -> Result<AccuracyReport, ForecastError>
where
    F: Forecaster + ?Sized,
{
    let predictions: Vec<LabelVector> = data
        .windows
        .par_iter()
        .map(|window| forecaster.forecast(window))
        .collect::<Result<Vec<_>, ForecastError>>()?;

    debug!("Computed {} forecasts", predictions.len());

    let report = score(forecaster.name(), data, &predictions)?;

    info!(
        "{}: {} windows, overall accuracy {}",
        report.forecaster,
        report.windows,
        format_accuracy(report.overall_accuracy())
    );

    Ok(report)
}

/// Score precomputed predictions, index-aligned with `data.labels`.
pub fn score(
    forecaster: &str,
    data: &LabeledWindows<'_>,
    predictions: &[LabelVector],
) -> Result<AccuracyReport, ForecastError> {
    let mut report = AccuracyReport {
        forecaster: forecaster.to_string(),
        window_size: data.window_size,
        windows: data.len(),
        markets: data.num_markets(),
        up: ClassCounts::default(),
        flat: ClassCounts::default(),
        down: ClassCounts::default(),
    };

    for (truth, predicted) in data.labels.iter().zip(predictions) {
        if truth.len() != predicted.len() {
            return Err(ForecastError::MarketMismatch {
                expected: truth.len(),
                found: predicted.len(),
            });
        }
        for (actual, guess) in truth.iter().zip(predicted.iter()) {
            let counts = report.counts_mut(actual);
            counts.support += 1;
            if actual == guess {
                counts.correct += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Observations;
    use crate::forecast::{ConstantGuess, ConstantGuessConfig};
    use crate::windowing::{window_and_label, Window};

    fn observations() -> Observations {
        Observations::from_rows(vec![
            vec![0.5, -0.5],
            vec![1.0, 0.0],
            vec![-1.0, 0.0],
            vec![0.0, 2.0],
            vec![2.0, -1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_class_counts_accuracy() {
        assert_eq!(ClassCounts::default().accuracy(), None);
        let counts = ClassCounts {
            support: 4,
            correct: 1,
        };
        assert_eq!(counts.accuracy(), Some(0.25));
    }

    #[test]
    fn test_flat_guess_scores_only_flat_cells() {
        let obs = observations();
        let labeled = window_and_label(&obs, 1).unwrap();
        // Labels (rows 1..5): [+1, 0], [-1, 0], [0, +1], [+1, -1]
        let mut forecaster = ConstantGuess::default();
        forecaster.train(&labeled).unwrap();

        let report = evaluate(&forecaster, &labeled).unwrap();

        assert_eq!(report.windows, 4);
        assert_eq!(report.markets, 2);
        assert_eq!(report.up, ClassCounts { support: 3, correct: 0 });
        assert_eq!(report.down, ClassCounts { support: 2, correct: 0 });
        assert_eq!(report.flat, ClassCounts { support: 3, correct: 3 });
        assert_eq!(report.accuracy(Direction::Flat), Some(1.0));
        assert_eq!(report.accuracy(Direction::Up), Some(0.0));
        assert_eq!(report.overall_accuracy(), Some(3.0 / 8.0));
    }

    #[test]
    fn test_up_guess() {
        let obs = observations();
        let labeled = window_and_label(&obs, 2).unwrap();
        // Labels (rows 2..5): [-1, 0], [0, +1], [+1, -1]
        let mut forecaster = ConstantGuess::new(ConstantGuessConfig {
            guess: Direction::Up,
        });
        forecaster.train(&labeled).unwrap();

        let report = evaluate(&forecaster, &labeled).unwrap();
        assert_eq!(report.accuracy(Direction::Up), Some(1.0));
        assert_eq!(report.accuracy(Direction::Down), Some(0.0));
        assert_eq!(report.accuracy(Direction::Flat), Some(0.0));
    }

    #[test]
    fn test_missing_class_has_no_accuracy() {
        let obs = Observations::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let labeled = window_and_label(&obs, 1).unwrap();
        let mut forecaster = ConstantGuess::default();
        forecaster.train(&labeled).unwrap();

        let report = evaluate(&forecaster, &labeled).unwrap();
        assert_eq!(report.accuracy(Direction::Down), None);
        assert_eq!(report.accuracy(Direction::Flat), None);
        assert!(report.summary("Training").contains("prediction -1: nan"));
    }

    #[test]
    fn test_untrained_forecaster_propagates() {
        let obs = observations();
        let labeled = window_and_label(&obs, 1).unwrap();
        let forecaster = ConstantGuess::default();
        assert!(matches!(
            evaluate(&forecaster, &labeled),
            Err(ForecastError::NotTrained(_))
        ));
    }

    #[test]
    fn test_score_rejects_wrong_prediction_width() {
        let obs = observations();
        let labeled = window_and_label(&obs, 3).unwrap();
        let predictions = vec![LabelVector::uniform(Direction::Up, 1); labeled.len()];
        assert_eq!(
            score("manual", &labeled, &predictions).unwrap_err(),
            ForecastError::MarketMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_summary_lines() {
        let obs = observations();
        let labeled = window_and_label(&obs, 1).unwrap();
        let predictions: Vec<LabelVector> = labeled
            .windows
            .iter()
            .map(|w: &Window<'_>| LabelVector::from_changes(w.last_row().unwrap()))
            .collect();

        let report = score("persistence", &labeled, &predictions).unwrap();
        let summary = report.summary("Training");
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Training accuracy for prediction +1: "));
        assert!(lines[1].starts_with("Training accuracy for prediction -1: "));
        assert!(lines[2].starts_with("Training accuracy for prediction 0: "));
        assert_eq!(report.by_class().len(), 3);
    }

    #[test]
    fn test_report_serializes() {
        let obs = observations();
        let labeled = window_and_label(&obs, 1).unwrap();
        let mut forecaster = ConstantGuess::default();
        forecaster.train(&labeled).unwrap();
        let report = evaluate(&forecaster, &labeled).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"forecaster\":\"constant-guess\""));
        let back: AccuracyReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.flat, report.flat);
    }

    #[test]
    fn test_loaded_file_end_to_end() {
        use crate::data::ObservationLoader;

        let csv = "\
d0,0.1,-0.1,0,0.2
d1,0.2,0,0.3,-0.4
bad,row
d2,-0.5,0.1,0,0
d3,0,0.2,-0.1,0.3
";
        let loaded = ObservationLoader::default()
            .load_from_reader(csv.as_bytes())
            .unwrap();
        assert_eq!(loaded.skipped_rows, 1);

        let labeled = window_and_label(&loaded.observations, 2).unwrap();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled.labels[0].to_i8(), vec![-1, 1, 0, 0]);
        assert_eq!(labeled.labels[1].to_i8(), vec![0, 1, -1, 1]);

        let mut forecaster = ConstantGuess::default();
        forecaster.train(&labeled).unwrap();
        let report = evaluate(&forecaster, &labeled).unwrap();

        assert_eq!(report.flat, ClassCounts { support: 3, correct: 3 });
        assert_eq!(report.up, ClassCounts { support: 3, correct: 0 });
        assert_eq!(report.down, ClassCounts { support: 2, correct: 0 });
    }
}
