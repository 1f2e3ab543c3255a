use common::position::Position;

/// Estimator signature for user-supplied heuristics.
pub type HeuristicFn = fn(Position, Position) -> f32;

/// Built-in cost estimators for the A* search. Admissibility is the
/// caller's responsibility: the search never re-opens closed nodes, so an
/// overestimating heuristic can return a suboptimal path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
    Octile,
    /// Degenerates the search to Dijkstra.
    Zero,
}

impl Heuristic {
    pub fn evaluate(self, a: Position, b: Position) -> f32 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        match self {
            Heuristic::Euclidean => (dx * dx + dy * dy).sqrt(),
            Heuristic::Manhattan => dx + dy,
            Heuristic::Chebyshev => dx.max(dy),
            Heuristic::Octile => {
                const DIAGONAL_EXTRA: f32 = std::f32::consts::SQRT_2 - 1.0;
                dx.max(dy) + DIAGONAL_EXTRA * dx.min(dy)
            }
            Heuristic::Zero => 0.0,
        }
    }
}
