//! Builders for small synthetic skeletons and scoring fields.

use spine_detector::geometry::Point;
use spine_detector::graph::Graph;
use spine_detector::skeleton::{RawEdge, RawSkeleton};
use spine_detector::ScalarField;

/// Incremental raw-skeleton builder with auto-generated slab pixels.
#[derive(Default)]
pub struct SkeletonBuilder {
    raw: RawSkeleton,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-pixel vertex, returning its index.
    pub fn vertex(&mut self, x: i32, y: i32) -> usize {
        self.raw.vertices.push(vec![Point::new(x, y)]);
        self.raw.vertices.len() - 1
    }

    /// Connect two vertices with an edge whose slabs step pixel by pixel
    /// between them.
    pub fn edge(&mut self, a: usize, b: usize) -> &mut Self {
        let pa = self.raw.vertices[a][0];
        let pb = self.raw.vertices[b][0];
        self.raw.edges.push(RawEdge {
            v1: a,
            v2: b,
            slabs: slabs_between(pa, pb),
        });
        self
    }

    pub fn build(&self) -> Graph {
        Graph::from_raw(&self.raw).expect("synthetic skeleton is valid")
    }
}

fn slabs_between(a: Point, b: Point) -> Vec<Point> {
    let mut out = Vec::new();
    let (mut x, mut y) = (a.x, a.y);
    loop {
        x += (b.x - x).signum();
        y += (b.y - y).signum();
        if x == b.x && y == b.y {
            break;
        }
        out.push(Point::new(x, y));
    }
    out
}

/// Uniform-strength field with optional weak pixels, defined everywhere.
pub struct WeakSpotField {
    pub base: f32,
    pub weak: Vec<(Point, f32)>,
}

impl WeakSpotField {
    pub fn uniform() -> Self {
        Self {
            base: 1.0,
            weak: Vec::new(),
        }
    }

    pub fn weak_at(p: Point, value: f32) -> Self {
        Self {
            base: 1.0,
            weak: vec![(p, value)],
        }
    }

    pub fn with_weak(mut self, p: Point, value: f32) -> Self {
        self.weak.push((p, value));
        self
    }
}

impl ScalarField for WeakSpotField {
    fn score_at(&self, p: Point) -> f32 {
        self.weak
            .iter()
            .find(|(q, _)| *q == p)
            .map(|(_, v)| *v)
            .unwrap_or(self.base)
    }

    fn min_value(&self) -> f32 {
        self.weak
            .iter()
            .map(|(_, v)| *v)
            .fold(0.0_f32, f32::min)
    }

    fn max_value(&self) -> f32 {
        self.weak.iter().map(|(_, v)| *v).fold(self.base, f32::max)
    }
}

/// Straight horizontal chain of `n + 1` vertices (n edges), 10 px apart.
pub fn line_skeleton(n: usize) -> Graph {
    let mut b = SkeletonBuilder::new();
    let vs: Vec<usize> = (0..=n as i32).map(|i| b.vertex(i * 10, 0)).collect();
    for w in vs.windows(2) {
        b.edge(w[0], w[1]);
    }
    b.build()
}

/// Y-shaped skeleton: a degree-3 branch vertex at the origin and three
/// two-edge arms reaching east, north and west.
pub fn y_skeleton() -> Graph {
    let mut b = SkeletonBuilder::new();
    let center = b.vertex(0, 0);
    let east = [b.vertex(20, 0), b.vertex(40, 0)];
    let north = [b.vertex(0, 20), b.vertex(0, 40)];
    let west = [b.vertex(-20, 0), b.vertex(-40, 0)];
    b.edge(center, east[0]).edge(east[0], east[1]);
    b.edge(center, north[0]).edge(north[0], north[1]);
    b.edge(center, west[0]).edge(west[0], west[1]);
    b.build()
}
