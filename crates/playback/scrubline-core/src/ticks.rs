//! Tick labels along the scrubber.

use serde::{Deserialize, Serialize};

/// Ticks sampled from a mapper when no cap is configured.
pub const DEFAULT_MAPPED_TICKS: usize = 5;

/// One labelled position supplied by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    pub fraction: f64,
    pub label: String,
}

/// Source of tick labels: a fixed table or a `fraction -> label` mapping.
pub enum TickLabels {
    Table(Vec<TickMark>),
    Mapper(Box<dyn Fn(f64) -> String>),
}

impl TickLabels {
    pub fn mapper(f: impl Fn(f64) -> String + 'static) -> Self {
        Self::Mapper(Box::new(f))
    }
}

impl std::fmt::Debug for TickLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table(marks) => f.debug_tuple("Table").field(marks).finish(),
            Self::Mapper(_) => f.write_str("Mapper(..)"),
        }
    }
}

/// A tick ready for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub fraction: f64,
    pub label: String,
    /// Playback has reached or passed this tick.
    pub reached: bool,
}

#[derive(Debug)]
pub struct TickRenderer {
    labels: TickLabels,
    max_ticks: Option<usize>,
}

impl TickRenderer {
    pub fn new(labels: TickLabels, max_ticks: Option<usize>) -> Self {
        Self { labels, max_ticks }
    }

    pub fn set_max_ticks(&mut self, max_ticks: Option<usize>) {
        self.max_ticks = max_ticks;
    }

    pub fn layout(&self, current: f64) -> Vec<Tick> {
        let positions: Vec<(f64, String)> = match &self.labels {
            TickLabels::Table(marks) => {
                let mut sorted: Vec<(f64, String)> = marks
                    .iter()
                    .filter(|m| m.fraction.is_finite())
                    .map(|m| (m.fraction.clamp(0.0, 1.0), m.label.clone()))
                    .collect();
                sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
                match self.max_ticks {
                    Some(cap) if cap < sorted.len() => thin(sorted, cap),
                    _ => sorted,
                }
            }
            TickLabels::Mapper(f) => {
                let count = self.max_ticks.unwrap_or(DEFAULT_MAPPED_TICKS).max(2);
                (0..count)
                    .map(|i| {
                        let fraction = i as f64 / (count - 1) as f64;
                        (fraction, f(fraction))
                    })
                    .collect()
            }
        };
        positions
            .into_iter()
            .map(|(fraction, label)| Tick {
                fraction,
                label,
                reached: fraction <= current + f64::EPSILON,
            })
            .collect()
    }
}

/// Keep `cap` evenly spread entries, always including both ends when cap >= 2.
fn thin(sorted: Vec<(f64, String)>, cap: usize) -> Vec<(f64, String)> {
    if cap <= 1 {
        return sorted.into_iter().take(cap).collect();
    }
    let last = sorted.len() - 1;
    let keep: Vec<usize> = (0..cap)
        .map(|i| ((i * last) as f64 / (cap - 1) as f64).round() as usize)
        .collect();
    sorted
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, entry)| entry)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(points: &[(f64, &str)]) -> TickLabels {
        TickLabels::Table(
            points
                .iter()
                .map(|(fraction, label)| TickMark {
                    fraction: *fraction,
                    label: label.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn table_is_sorted_and_marks_reached() {
        let renderer = TickRenderer::new(marks(&[(1.0, "end"), (0.0, "start"), (0.5, "mid")]), None);
        let ticks = renderer.layout(0.5);
        let labels: Vec<&str> = ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["start", "mid", "end"]);
        assert_eq!(
            ticks.iter().map(|t| t.reached).collect::<Vec<_>>(),
            [true, true, false]
        );
    }

    #[test]
    fn table_is_thinned_to_cap_keeping_ends() {
        let table = marks(&[
            (0.0, "a"),
            (0.2, "b"),
            (0.4, "c"),
            (0.6, "d"),
            (0.8, "e"),
            (1.0, "f"),
        ]);
        let renderer = TickRenderer::new(table, Some(3));
        let labels: Vec<String> = renderer.layout(0.0).into_iter().map(|t| t.label).collect();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.first().map(String::as_str), Some("a"));
        assert_eq!(labels.last().map(String::as_str), Some("f"));
    }

    #[test]
    fn mapper_samples_even_fractions() {
        let renderer = TickRenderer::new(
            TickLabels::mapper(|f| format!("{:.0}s", f * 10.0)),
            Some(3),
        );
        let ticks = renderer.layout(0.0);
        assert_eq!(
            ticks.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
            ["0s", "5s", "10s"]
        );
        assert!(ticks[0].reached && !ticks[1].reached);
    }

    #[test]
    fn mapper_defaults_to_five_ticks() {
        let renderer = TickRenderer::new(TickLabels::mapper(|f| f.to_string()), None);
        assert_eq!(renderer.layout(1.0).len(), DEFAULT_MAPPED_TICKS);
    }
}
