/// Editable control grids and their snapshots.
pub mod control;
