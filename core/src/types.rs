use ndarray::Array2;

/// Board axis. Custom boards top out at 60 columns, so a byte is plenty.
pub type Coord = u8;

/// Cell and mine totals, `W * H` always fits.
pub type CellCount = u16;

/// `(x, y)` with `x` the column, matching the `Array2` index order the board uses.
pub type Coord2 = (Coord, Coord);

/// Conversion from board coordinates into an `ndarray` index.
pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        let (x, y) = self;
        [usize::from(x), usize::from(y)]
    }
}

/// Cell count of a `a` by `b` board.
pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount).saturating_mul(b as CellCount)
}

pub trait NeighborIterExt {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter;
}

impl<T> NeighborIterExt for Array2<T> {
    fn iter_neighbors(&self, index: Coord2) -> NeighborIter {
        let (x_end, y_end) = self.dim();
        let bounds = (
            Coord::try_from(x_end).unwrap_or(Coord::MAX),
            Coord::try_from(y_end).unwrap_or(Coord::MAX),
        );
        NeighborIter::new(index, bounds)
    }
}

/// Row-major ring around a cell, the order flood fill and chord visit neighbors in.
static RING: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn step(axis: Coord, delta: i8, end: Coord) -> Option<Coord> {
    axis.checked_add_signed(delta).filter(|&next| next < end)
}

/// Cells touching `center` that lie on the board, so 3 in a corner, 5 on an edge, 8 inside.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    ring: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            ring: RING.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (x, y) = self.center;
        let (x_end, y_end) = self.bounds;
        self.ring
            .by_ref()
            .find_map(|&(dx, dy)| Some((step(x, dx, x_end)?, step(y, dy, y_end)?)))
    }
}
