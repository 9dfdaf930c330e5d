pub mod graph;
pub mod transactions;
