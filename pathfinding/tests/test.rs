use common::position::Position;
use pathfinding::{
    AStar, FloydWarshall, FloydWarshallOptimized, Heuristic, PathError, SolveConfig, Weight,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn diamond_graph<W: Weight>(fw: &mut FloydWarshall<W>, five: W, three: W, two: W) {
    fw.resize(4);
    fw.clean();
    fw.add_edge(0, 1, five);
    fw.add_edge(1, 3, three);
    fw.add_edge(0, 2, two);
    fw.add_edge(2, 3, two);
    fw.generate();
}

#[test]
fn test_floyd_warshall_diamond() {
    let mut fw: FloydWarshall<u64> = FloydWarshall::new();
    diamond_graph(&mut fw, 5, 3, 2);

    assert_eq!(fw.dist(0, 3), Some(4));
    assert_eq!(fw.next_hop(0, 3), Some(2));
    assert_eq!(fw.dist(0, 1), Some(5));
    assert_eq!(fw.dist(3, 0), None);
    assert_eq!(fw.dist(0, 0), Some(0));

    let mut path = Vec::new();
    fw.set_path(&mut path, 0, 3).unwrap();
    assert_eq!(path, vec![0, 2, 3]);
}

#[test]
fn test_floyd_warshall_triangle_inequality() {
    let mut fw: FloydWarshall<u32> = FloydWarshall::new();
    let mut rng: StdRng = SeedableRng::seed_from_u64(61);
    let n = 24;
    fw.resize(n);
    fw.clean();
    for u in 0..n {
        for v in 0..n {
            if u != v && rng.gen_bool(0.2) {
                fw.add_edge(u, v, rng.gen_range(1..100));
            }
        }
    }
    fw.generate();

    for i in 0..n {
        assert_eq!(fw.dist(i, i), Some(0));
        for j in 0..n {
            let dij = fw.dist(i, j).unwrap_or(u32::MAX);
            for k in 0..n {
                let dik = fw.dist(i, k).unwrap_or(u32::MAX);
                let dkj = fw.dist(k, j).unwrap_or(u32::MAX);
                assert!(dij <= dik.saturating_add(dkj));
            }
        }
    }
}

#[test]
fn test_floyd_warshall_saturating_weights() {
    let mut fw: FloydWarshall<u8> = FloydWarshall::new();
    fw.resize(3);
    fw.clean();
    // 200 + 200 wraps in u8 without saturation.
    fw.add_edge(0, 1, 200);
    fw.add_edge(1, 2, 200);
    fw.generate();

    // The saturated sum equals the sentinel: still "no path".
    assert_eq!(fw.dist(0, 2), None);
    assert_eq!(fw.dist(0, 1), Some(200));
}

#[test]
fn test_floyd_warshall_out_of_range_edges_are_ignored() {
    let mut fw: FloydWarshall<u32> = FloydWarshall::new();
    fw.resize(2);
    fw.clean();
    fw.add_edge(0, 5, 1);
    fw.add_edge(7, 1, 1);
    fw.generate();
    assert_eq!(fw.dist(0, 1), None);
}

#[test]
fn test_floyd_warshall_reuse_after_clean() {
    let mut fw: FloydWarshall<u32> = FloydWarshall::new();
    diamond_graph(&mut fw, 5, 3, 2);
    assert_eq!(fw.dist(0, 3), Some(4));

    fw.clean();
    assert_eq!(fw.dist(0, 3), None);
    fw.add_edge(0, 3, 9);
    fw.generate();
    assert_eq!(fw.dist(0, 3), Some(9));
}

#[test]
fn test_floyd_warshall_mapping_and_path() {
    let mut fw: FloydWarshall<u32> = FloydWarshall::new();
    fw.resize(4);
    fw.clean();
    fw.add_edge_with_mapping(10, 20, 1).unwrap();
    fw.add_edge_with_mapping(20, 30, 1).unwrap();
    fw.add_edge_with_mapping(30, 40, 1).unwrap();
    fw.generate();

    assert_eq!(fw.dist_with_mapping(10, 40), Some(3));
    assert_eq!(fw.next_with_mapping(10, 40), Some(20));
    assert_eq!(fw.next_with_mapping(40, 10), None);

    let mut path = vec![99];
    fw.set_path_with_mapping(&mut path, 10, 40).unwrap();
    assert_eq!(path, vec![99, 10, 20, 30, 40]);

    // A failed reconstruction restores the buffer.
    let mut path = vec![99];
    assert_eq!(
        fw.set_path_with_mapping(&mut path, 40, 10),
        Err(PathError::PathNotFound { from: 40, to: 10 })
    );
    assert_eq!(path, vec![99]);

    // A fifth entity does not fit a four-vertex solver.
    assert_eq!(
        fw.add_edge_with_mapping(50, 60, 1),
        Err(PathError::SizeOverflow { size: 4 })
    );
}

#[test]
fn test_optimized_diamond_all_configs() {
    for (parallel, simd) in [(false, false), (false, true), (true, true)] {
        let mut fw = FloydWarshallOptimized::with_config(SolveConfig { parallel, simd });
        fw.resize(4);
        fw.clean();
        fw.add_edge(0, 1, 5);
        fw.add_edge(1, 3, 3);
        fw.add_edge(0, 2, 2);
        fw.add_edge(2, 3, 2);
        fw.generate();
        assert_eq!(fw.dist(0, 3), Some(4));
        assert_eq!(fw.next_hop(0, 3), Some(2));
    }
}

#[test]
fn test_optimized_path_reconstruction_with_mapping() {
    let mut fw = FloydWarshallOptimized::new();
    fw.resize(4);
    fw.clean();
    fw.add_edge_with_mapping(10, 20, 1).unwrap();
    fw.add_edge_with_mapping(20, 30, 1).unwrap();
    fw.add_edge_with_mapping(30, 40, 1).unwrap();
    fw.generate();

    let mut path = Vec::new();
    fw.set_path_with_mapping(&mut path, 10, 40).unwrap();
    assert_eq!(path, vec![10, 20, 30, 40]);
}

fn random_edges(n: usize, density: f64, seed: u64) -> Vec<(usize, usize, u32)> {
    let mut rng: StdRng = SeedableRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..n {
        for v in 0..n {
            if u != v && rng.gen_bool(density) {
                edges.push((u, v, rng.gen_range(1..1000)));
            }
        }
    }
    edges
}

fn assert_matrices_match(scalar: &FloydWarshall<u32>, optimized: &FloydWarshallOptimized, n: usize) {
    for u in 0..n {
        for v in 0..n {
            assert_eq!(scalar.dist(u, v), optimized.dist(u, v), "dist {} -> {}", u, v);
            assert_eq!(
                scalar.next_hop(u, v),
                optimized.next_hop(u, v),
                "next {} -> {}",
                u,
                v
            );
        }
    }
}

#[test]
fn test_optimized_simd_matches_scalar() {
    // Below the parallel threshold: exercises the single-thread SIMD path.
    let n = 33;
    let edges = random_edges(n, 0.15, 71);

    let mut scalar: FloydWarshall<u32> = FloydWarshall::new();
    scalar.resize(n);
    scalar.clean();
    let mut optimized = FloydWarshallOptimized::with_config(SolveConfig {
        parallel: false,
        simd: true,
    });
    optimized.resize(n);
    optimized.clean();

    for &(u, v, w) in &edges {
        scalar.add_edge(u, v, w);
        optimized.add_edge(u, v, w);
    }
    scalar.generate();
    optimized.generate();
    assert_matrices_match(&scalar, &optimized, n);
}

#[test]
fn test_optimized_parallel_matches_scalar() {
    // Above the parallel threshold: exercises the barrier solve.
    let n = 100;
    let edges = random_edges(n, 0.08, 72);

    let mut scalar: FloydWarshall<u32> = FloydWarshall::new();
    scalar.resize(n);
    scalar.clean();
    let mut optimized = FloydWarshallOptimized::new();
    optimized.resize(n);
    optimized.clean();

    for &(u, v, w) in &edges {
        scalar.add_edge(u, v, w);
        optimized.add_edge(u, v, w);
    }
    scalar.generate();
    optimized.generate();
    assert_matrices_match(&scalar, &optimized, n);
}

#[test]
fn test_astar_diamond_zero_heuristic() {
    let mut astar: AStar<u64> = AStar::new(4);
    astar.set_heuristic(Heuristic::Zero);
    astar.add_edge(0, 1, 5);
    astar.add_edge(1, 3, 3);
    astar.add_edge(0, 2, 2);
    astar.add_edge(2, 3, 2);

    let mut path = Vec::new();
    assert_eq!(astar.find_path(0, 3, &mut path), Some(4));
    assert_eq!(path, vec![0, 2, 3]);

    // Disconnected destination.
    let mut astar: AStar<u64> = AStar::new(4);
    astar.set_heuristic(Heuristic::Zero);
    astar.add_edge(0, 1, 5);
    let mut path = Vec::new();
    assert_eq!(astar.find_path(0, 3, &mut path), None);
    assert!(path.is_empty());
}

#[test]
fn test_astar_source_equals_dest() {
    let astar: AStar<u32> = AStar::new(4);
    let mut path = Vec::new();
    assert_eq!(astar.find_path(2, 2, &mut path), Some(0));
    assert_eq!(path, vec![2]);
}

#[test]
fn test_astar_out_of_range() {
    let mut astar: AStar<u32> = AStar::new(2);
    // Ignored edges: nothing to find.
    astar.add_edge(0, 9, 1);
    astar.add_edge(9, 1, 1);
    let mut path = Vec::new();
    assert_eq!(astar.find_path(0, 1, &mut path), None);
    assert_eq!(astar.find_path(0, 9, &mut path), None);
}

#[test]
fn test_astar_path_cost_equals_edge_sum() {
    let n = 40;
    let mut rng: StdRng = SeedableRng::seed_from_u64(83);
    let mut astar: AStar<u32> = AStar::new(n);
    astar.set_heuristic(Heuristic::Zero);
    let mut adjacency = vec![Vec::new(); n];
    for u in 0..n {
        for v in 0..n {
            if u != v && rng.gen_bool(0.15) {
                let w = rng.gen_range(1..50u32);
                astar.add_edge(u as u32, v as u32, w);
                adjacency[u].push((v as u32, w));
            }
        }
    }

    let mut path = Vec::new();
    for _ in 0..100 {
        let source = rng.gen_range(0..n as u32);
        let dest = rng.gen_range(0..n as u32);
        if let Some(cost) = astar.find_path(source, dest, &mut path) {
            assert_eq!(path.first(), Some(&source));
            assert_eq!(path.last(), Some(&dest));
            let mut sum = 0u32;
            for pair in path.windows(2) {
                let weight = adjacency[pair[0] as usize]
                    .iter()
                    .find(|(to, _)| *to == pair[1])
                    .map(|(_, w)| *w)
                    .expect("path uses a real edge");
                sum = sum.saturating_add(weight);
            }
            assert_eq!(sum, cost);
        } else {
            assert!(path.is_empty());
        }
    }
}

#[test]
fn test_astar_zero_heuristic_is_optimal() {
    // Dijkstra equivalence: costs must match the all-pairs solver.
    let n = 30;
    let edges = random_edges(n, 0.15, 91);

    let mut fw: FloydWarshall<u32> = FloydWarshall::new();
    fw.resize(n);
    fw.clean();
    let mut astar: AStar<u32> = AStar::new(n);
    astar.set_heuristic(Heuristic::Zero);
    for &(u, v, w) in &edges {
        fw.add_edge(u, v, w);
        astar.add_edge(u as u32, v as u32, w);
    }
    fw.generate();

    let mut path = Vec::new();
    for u in 0..n {
        for v in 0..n {
            let expected = if u == v { Some(0) } else { fw.dist(u, v) };
            let got = astar.find_path(u as u32, v as u32, &mut path);
            assert_eq!(got, expected, "{} -> {}", u, v);
        }
    }
}

#[test]
fn test_astar_euclidean_on_grid_is_optimal() {
    // Unit-cost 8x8 grid with true coordinates: euclidean is admissible.
    let side = 8u32;
    let n = (side * side) as usize;
    let mut astar: AStar<u32> = AStar::new(n);
    for y in 0..side {
        for x in 0..side {
            let node = y * side + x;
            astar
                .set_position(node, Position::new(x as f32, y as f32))
                .unwrap();
            if x + 1 < side {
                astar.add_edge(node, node + 1, 1);
                astar.add_edge(node + 1, node, 1);
            }
            if y + 1 < side {
                astar.add_edge(node, node + side, 1);
                astar.add_edge(node + side, node, 1);
            }
        }
    }

    let mut path = Vec::new();
    // Manhattan distance is the optimal cost on a 4-connected unit grid.
    assert_eq!(astar.find_path(0, side * side - 1, &mut path), Some(14));
    assert_eq!(path.first(), Some(&0));
    assert_eq!(path.last(), Some(&(side * side - 1)));
    assert_eq!(path.len(), 15);
}

#[test]
fn test_astar_entity_mapping() {
    let mut astar: AStar<u32> = AStar::new(4);
    astar.set_heuristic(Heuristic::Zero);
    astar.add_edge_with_mapping(100, 200, 5).unwrap();
    astar.add_edge_with_mapping(200, 400, 3).unwrap();
    astar.add_edge_with_mapping(100, 300, 2).unwrap();
    astar.add_edge_with_mapping(300, 400, 2).unwrap();
    astar
        .set_position_with_mapping(400, Position::new(10.0, 10.0))
        .unwrap();

    let mut path = Vec::new();
    assert_eq!(astar.find_path_with_mapping(100, 400, &mut path), Some(4));
    assert_eq!(path, vec![100, 300, 400]);

    assert_eq!(astar.find_path_with_mapping(100, 999, &mut path), None);
    assert_eq!(
        astar.add_edge_with_mapping(500, 600, 1),
        Err(PathError::SizeOverflow { size: 4 })
    );
}

#[test]
fn test_astar_custom_heuristic_overrides_and_clears() {
    fn bogus(_: Position, _: Position) -> f32 {
        1_000_000.0
    }

    let mut astar: AStar<u32> = AStar::new(3);
    astar.set_position(0, Position::new(0.0, 0.0)).unwrap();
    astar.set_position(1, Position::new(1.0, 0.0)).unwrap();
    astar.set_position(2, Position::new(2.0, 0.0)).unwrap();
    astar.add_edge(0, 1, 1);
    astar.add_edge(1, 2, 1);

    astar.set_custom_heuristic(bogus);
    let mut path = Vec::new();
    // Inadmissible but consistent ordering still finds the only path.
    assert_eq!(astar.find_path(0, 2, &mut path), Some(2));

    // Selecting a tag drops the custom function.
    astar.set_heuristic(Heuristic::Euclidean);
    assert_eq!(astar.find_path(0, 2, &mut path), Some(2));
    assert_eq!(path, vec![0, 1, 2]);
}

#[test]
fn test_heuristic_formulas() {
    let a = Position::new(0.0, 0.0);
    let b = Position::new(3.0, 4.0);

    assert!((Heuristic::Euclidean.evaluate(a, b) - 5.0).abs() < 1e-3);
    assert!((Heuristic::Manhattan.evaluate(a, b) - 7.0).abs() < 1e-3);
    assert!((Heuristic::Chebyshev.evaluate(a, b) - 4.0).abs() < 1e-3);
    assert_eq!(Heuristic::Zero.evaluate(a, b), 0.0);

    // Octile identity: max + (sqrt(2) - 1) * min.
    let expected = 4.0 + (std::f32::consts::SQRT_2 - 1.0) * 3.0;
    assert!((Heuristic::Octile.evaluate(a, b) - expected).abs() < 1e-3);
    assert!((Heuristic::Octile.evaluate(b, a) - expected).abs() < 1e-3);
}
