use crate::types::statistics::{AnnualStatistic, HourlySample};

/// Running sum for the year currently being accumulated.
#[derive(Debug, Clone, Copy)]
struct YearAccumulator {
    year: i32,
    sum: f64,
    count: u32,
}

impl YearAccumulator {
    fn start(sample: &HourlySample) -> Self {
        Self {
            year: sample.year(),
            sum: sample.speed,
            count: 1,
        }
    }

    fn add(&mut self, speed: f64) {
        self.sum += speed;
        self.count += 1;
    }

    fn finish(self, station_name: &str) -> AnnualStatistic {
        AnnualStatistic {
            station_name: station_name.to_string(),
            year: self.year,
            speed: self.sum / f64::from(self.count),
        }
    }
}

/// Reduces chronologically ordered samples to one average speed per calendar year.
///
/// Samples with a negative (unknown) speed are ignored. A year is assigned by each
/// sample's own timestamp, so an hour ending at `YYYY-01-01 00h` counts for `YYYY`.
/// Years without a single known speed produce no record.
pub fn aggregate(station_name: &str, samples: &[HourlySample]) -> Vec<AnnualStatistic> {
    let mut statistics = Vec::new();
    let mut current: Option<YearAccumulator> = None;

    for sample in samples.iter().filter(|s| !s.is_missing()) {
        match current.as_mut() {
            Some(acc) if acc.year == sample.year() => acc.add(sample.speed),
            Some(acc) => {
                statistics.push(acc.finish(station_name));
                current = Some(YearAccumulator::start(sample));
            }
            None => current = Some(YearAccumulator::start(sample)),
        }
    }

    if let Some(acc) = current {
        statistics.push(acc.finish(station_name));
    }
    statistics
}
