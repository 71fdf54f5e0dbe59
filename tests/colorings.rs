use chromasat::config::Config;
use chromasat::driver::{self, SolveReport};
use chromasat::graph::Graph;

fn k4() -> Graph {
    Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)])
}

fn c5() -> Graph {
    Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)])
}

fn k33() -> Graph {
    let mut edges = Vec::new();
    for u in 0..3 {
        for v in 3..6 {
            edges.push((u, v));
        }
    }
    Graph::from_edges(6, &edges)
}

fn petersen() -> Graph {
    let outer = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
    let spokes = [(0, 5), (1, 6), (2, 7), (3, 8), (4, 9)];
    let inner = [(5, 7), (7, 9), (9, 6), (6, 8), (8, 5)];
    let mut edges = Vec::new();
    edges.extend_from_slice(&outer);
    edges.extend_from_slice(&spokes);
    edges.extend_from_slice(&inner);
    Graph::from_edges(10, &edges)
}

/// The Mycielskian of C5: the Grotzsch graph, triangle-free with chi=4.
fn groetzsch() -> Graph {
    chromasat::bounds::mycielskian(&c5())
}

fn assert_solved(report: &SolveReport, graph: &Graph, expected_k: usize) {
    assert_eq!(report.chromatic_number, Some(expected_k), "unexpected chromatic number");
    let coloring = report.coloring.as_ref().expect("SAT report must carry a coloring");
    assert!(graph.is_proper_coloring(coloring));
    assert!(coloring.iter().all(|&c| c < expected_k));
}

fn every_preset(graph: &Graph, expected_k: usize) {
    for cfg in [
        Config::assignment(),
        Config::assignment_cardinality(),
        Config::partial_order(),
        Config::zykov_color(),
    ] {
        let report = driver::run(&cfg, graph).unwrap();
        assert_solved(&report, graph, expected_k);
    }
}

#[test]
fn k4_needs_exactly_four_colors() {
    every_preset(&k4(), 4);
}

#[test]
fn c5_needs_exactly_three_colors() {
    every_preset(&c5(), 3);
}

#[test]
fn k33_is_bipartite() {
    every_preset(&k33(), 2);
}

#[test]
fn petersen_graph_needs_exactly_three_colors() {
    every_preset(&petersen(), 3);
}

#[test]
fn groetzsch_graph_needs_exactly_four_colors() {
    every_preset(&groetzsch(), 4);
}

#[test]
fn disconnected_triangle_and_k5_takes_the_denser_components_number() {
    let mut edges = vec![(0, 1), (0, 2), (1, 2)];
    for u in 3..8 {
        for v in (u + 1)..8 {
            edges.push((u, v));
        }
    }
    let g = Graph::from_edges(8, &edges);
    every_preset(&g, 5);
}

#[test]
fn single_k_confirms_a_valid_budget_and_rejects_an_insufficient_one() {
    let g = k4();

    let mut too_few = Config::assignment();
    too_few.strategy = chromasat::config::Strategy::SingleK;
    too_few.num_colors = Some(3);
    let report = driver::run(&too_few, &g).unwrap();
    assert_eq!(report.chromatic_number, None);
    assert_eq!(report.exit_code(), 10);

    let mut enough = Config::assignment();
    enough.strategy = chromasat::config::Strategy::SingleK;
    enough.num_colors = Some(4);
    let report = driver::run(&enough, &g).unwrap();
    assert_solved(&report, &g, 4);
}

#[test]
fn top_down_and_bottom_up_agree_on_chromatic_number() {
    let g = petersen();
    let mut bottom_up = Config::assignment();
    bottom_up.strategy = chromasat::config::Strategy::BottomUp;
    let mut top_down = Config::assignment();
    top_down.strategy = chromasat::config::Strategy::TopDown;

    let a = driver::run(&bottom_up, &g).unwrap();
    let b = driver::run(&top_down, &g).unwrap();
    assert_eq!(a.chromatic_number, b.chromatic_number);
}

#[test]
fn lower_and_upper_bounds_bracket_the_chromatic_number() {
    let g = petersen();
    let report = driver::run(&Config::zykov_color(), &g).unwrap();
    let chi = report.chromatic_number.unwrap();
    assert!(report.lower_bound <= chi);
    assert!(chi <= report.upper_bound);
}

#[test]
fn empty_graph_needs_no_colors() {
    every_preset(&Graph::new(0), 0);
}

#[test]
fn single_vertex_needs_one_color() {
    every_preset(&Graph::new(1), 1);
}

#[test]
fn solving_the_same_instance_twice_gives_the_same_chromatic_number() {
    let g = groetzsch();
    let cfg = Config::zykov_color();
    let first = driver::run(&cfg, &g).unwrap();
    let second = driver::run(&cfg, &g).unwrap();
    assert_eq!(first.chromatic_number, second.chromatic_number);
}
