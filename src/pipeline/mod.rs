// Pipeline stages. `preprocess` turns collector files into a processed
// snapshot; `weekly` turns the snapshot and last week's ledger into this
// week's scores and rankings.

pub mod preprocess;
pub mod weekly;
