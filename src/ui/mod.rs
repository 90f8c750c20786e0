/// Rendering only: every figure shown here is computed in `state`.
pub mod charts;
pub mod panels;
pub mod tables;
