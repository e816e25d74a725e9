use serde::Serialize;

/// Counters collected over one pipeline run.
///
/// Holds no timestamps, so two runs over the same input produce equal stats.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub locality: String,

    // stops
    pub stops_total: usize,
    pub stops_retained: usize,

    // quays
    pub quays_seen: usize,
    pub quays_blank: usize,
    pub quays_out_of_use: usize,
    pub quays_emitted: usize,

    // absorbed field gaps
    pub missing_coordinates: usize,
    pub missing_bearing: usize,
}

impl RunStats {
    pub fn new(locality: &str) -> Self {
        RunStats {
            locality: locality.to_string(),
            ..Default::default()
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of emitted quays that received a WGS84 position.
    pub fn geocoded_pct(&self) -> f64 {
        Self::pct(
            self.quays_emitted - self.missing_coordinates,
            self.quays_emitted,
        )
    }

    /// Share of stops that matched the locality.
    pub fn retained_pct(&self) -> f64 {
        Self::pct(self.stops_retained, self.stops_total)
    }
}
