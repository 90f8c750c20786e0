use std::fmt;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Level – named bands, right-open except the top band
// ---------------------------------------------------------------------------

/// Named maturity band of a digital transformation index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Leading,
    Good,
    Moderate,
    Starting,
    NeedsImprovement,
}

impl Level {
    /// Bands from highest to lowest.
    pub const ALL: [Level; 5] = [
        Level::Leading,
        Level::Good,
        Level::Moderate,
        Level::Starting,
        Level::NeedsImprovement,
    ];

    /// `NaN` fails every comparison and lands in the lowest band.
    pub fn classify(dt_index: f64) -> Level {
        if dt_index >= 80.0 {
            Level::Leading
        } else if dt_index >= 60.0 {
            Level::Good
        } else if dt_index >= 40.0 {
            Level::Moderate
        } else if dt_index >= 20.0 {
            Level::Starting
        } else {
            Level::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Leading => "Leading (80-100)",
            Level::Good => "Good (60-79)",
            Level::Moderate => "Moderate (40-59)",
            Level::Starting => "Starting (20-39)",
            Level::NeedsImprovement => "Needs improvement (<20)",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Records per band, most populated first (ties keep band order).
/// Bands with no records are omitted.
pub fn level_counts(dataset: &Dataset) -> Vec<(Level, usize)> {
    let mut counts = [0usize; 5];
    for rec in &dataset.records {
        counts[Level::classify(rec.dt_index) as usize] += 1;
    }
    let mut out: Vec<(Level, usize)> = Level::ALL
        .into_iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

// ---------------------------------------------------------------------------
// IndexInterval – equal-width bins, left-open except the bottom bin
// ---------------------------------------------------------------------------

/// Equal-width interval of the 0–100 range used by the distribution chart.
/// Kept apart from [`Level`]: the boundaries coincide but the edges belong
/// to the other side (`20.0` is `[0,20]` here but `Starting` there).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexInterval {
    /// `[0, 20]`
    UpTo20,
    /// `(20, 40]`
    UpTo40,
    /// `(40, 60]`
    UpTo60,
    /// `(60, 80]`
    UpTo80,
    /// `(80, 100]`
    UpTo100,
}

impl IndexInterval {
    pub const ALL: [IndexInterval; 5] = [
        IndexInterval::UpTo20,
        IndexInterval::UpTo40,
        IndexInterval::UpTo60,
        IndexInterval::UpTo80,
        IndexInterval::UpTo100,
    ];

    /// `None` for values outside `[0, 100]` and for `NaN`.
    pub fn bin(dt_index: f64) -> Option<IndexInterval> {
        if !(0.0..=100.0).contains(&dt_index) {
            return None;
        }
        Some(if dt_index <= 20.0 {
            IndexInterval::UpTo20
        } else if dt_index <= 40.0 {
            IndexInterval::UpTo40
        } else if dt_index <= 60.0 {
            IndexInterval::UpTo60
        } else if dt_index <= 80.0 {
            IndexInterval::UpTo80
        } else {
            IndexInterval::UpTo100
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            IndexInterval::UpTo20 => "[0, 20]",
            IndexInterval::UpTo40 => "(20, 40]",
            IndexInterval::UpTo60 => "(40, 60]",
            IndexInterval::UpTo80 => "(60, 80]",
            IndexInterval::UpTo100 => "(80, 100]",
        }
    }
}

impl fmt::Display for IndexInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Records per interval in interval order, empty intervals included.
pub fn interval_counts(dataset: &Dataset) -> Vec<(IndexInterval, usize)> {
    let mut counts = [0usize; 5];
    for rec in &dataset.records {
        if let Some(bin) = IndexInterval::bin(rec.dt_index) {
            counts[bin as usize] += 1;
        }
    }
    IndexInterval::ALL.into_iter().zip(counts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    #[test]
    fn levels_partition_at_band_edges() {
        assert_eq!(Level::classify(100.0), Level::Leading);
        assert_eq!(Level::classify(80.0), Level::Leading);
        assert_eq!(Level::classify(79.999), Level::Good);
        assert_eq!(Level::classify(60.0), Level::Good);
        assert_eq!(Level::classify(59.999), Level::Moderate);
        assert_eq!(Level::classify(40.0), Level::Moderate);
        assert_eq!(Level::classify(39.999), Level::Starting);
        assert_eq!(Level::classify(20.0), Level::Starting);
        assert_eq!(Level::classify(19.999), Level::NeedsImprovement);
        assert_eq!(Level::classify(-5.0), Level::NeedsImprovement);
        assert_eq!(Level::classify(150.0), Level::Leading);
        assert_eq!(Level::classify(f64::NAN), Level::NeedsImprovement);
    }

    #[test]
    fn every_value_gets_exactly_one_level() {
        let mut x = -10.0;
        while x <= 110.0 {
            let hits = Level::ALL
                .iter()
                .filter(|l| Level::classify(x) == **l)
                .count();
            assert_eq!(hits, 1, "value {x}");
            x += 0.25;
        }
    }

    #[test]
    fn intervals_are_left_open_except_the_first() {
        assert_eq!(IndexInterval::bin(0.0), Some(IndexInterval::UpTo20));
        assert_eq!(IndexInterval::bin(20.0), Some(IndexInterval::UpTo20));
        assert_eq!(IndexInterval::bin(20.001), Some(IndexInterval::UpTo40));
        assert_eq!(IndexInterval::bin(80.0), Some(IndexInterval::UpTo80));
        assert_eq!(IndexInterval::bin(100.0), Some(IndexInterval::UpTo100));
        assert_eq!(IndexInterval::bin(-0.1), None);
        assert_eq!(IndexInterval::bin(100.1), None);
        assert_eq!(IndexInterval::bin(f64::NAN), None);
    }

    #[test]
    fn schemes_disagree_on_shared_edges() {
        assert_eq!(Level::classify(80.0), Level::Leading);
        assert_eq!(IndexInterval::bin(80.0), Some(IndexInterval::UpTo80));
    }

    #[test]
    fn counts_per_band_and_interval() {
        let ds = Dataset::from_records(vec![
            record("a", 2019, 85.0),
            record("b", 2019, 65.0),
            record("c", 2019, 70.0),
            record("d", 2019, 10.0),
            record("e", 2019, 120.0),
        ]);

        assert_eq!(
            level_counts(&ds),
            vec![
                (Level::Leading, 2),
                (Level::Good, 2),
                (Level::NeedsImprovement, 1),
            ]
        );

        let intervals = interval_counts(&ds);
        assert_eq!(intervals.len(), 5);
        assert_eq!(intervals[0], (IndexInterval::UpTo20, 1));
        assert_eq!(intervals[3], (IndexInterval::UpTo80, 2));
        assert_eq!(intervals[4], (IndexInterval::UpTo100, 1));
    }
}
