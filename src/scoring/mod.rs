// Weekly scoring: current-week aggregation, decay merge, per-genre ranking.

pub mod aggregate;
pub mod ranking;
