pub mod astar;
pub mod error;
pub mod floyd_warshall;
pub mod floyd_warshall_optimized;
pub mod heuristic;
pub mod weight;

pub use astar::{AStar, NO_PARENT};
pub use error::{PathError, PathResult};
pub use floyd_warshall::FloydWarshall;
pub use floyd_warshall_optimized::{FloydWarshallOptimized, SolveConfig, INF};
pub use heuristic::{Heuristic, HeuristicFn};
pub use weight::Weight;
