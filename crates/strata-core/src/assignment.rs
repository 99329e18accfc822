// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimum-cost perfect matching on a square integer cost matrix.
//!
//! Hungarian algorithm (Kuhn–Munkres) with row/column potentials, `O(n³)`.
//! Costs are integers, so every comparison is exact and the chosen matching
//! is reproducible across platforms.

/// Dense square matrix of non-negative matching costs, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostMatrix {
    size: usize,
    costs: Vec<u64>,
}

impl CostMatrix {
    /// Creates an `size × size` matrix filled with zeros.
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            costs: vec![0; size * size],
        }
    }

    /// Builds a matrix by evaluating `cost(row, col)` for every cell.
    pub fn from_fn(size: usize, mut cost: impl FnMut(usize, usize) -> u64) -> Self {
        let mut matrix = Self::zeros(size);
        for row in 0..size {
            for col in 0..size {
                matrix.costs[row * size + col] = cost(row, col);
            }
        }
        matrix
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of assigning `row` to `col`, or `None` when either index is
    /// `>= size()`.
    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        (row < self.size && col < self.size).then(|| self.at(row, col))
    }

    fn at(&self, row: usize, col: usize) -> u64 {
        self.costs[row * self.size + col]
    }
}

/// A perfect matching: row `i` is assigned column `columns()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    row_to_col: Vec<usize>,
    total_cost: u64,
}

impl Assignment {
    /// Column assigned to each row.
    pub fn columns(&self) -> &[usize] {
        &self.row_to_col
    }

    /// Column assigned to `row`, if the row exists.
    pub fn column_for(&self, row: usize) -> Option<usize> {
        self.row_to_col.get(row).copied()
    }

    /// Sum of the costs of the chosen cells.
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }
}

/// Solves the assignment problem for `matrix`, minimizing total cost.
///
/// Rows are inserted one at a time; each insertion grows a shortest
/// augmenting path over reduced costs `cost - u[row] - v[col]`, then flips it.
/// Ties between equal-cost matchings resolve to the lowest column index
/// reached first, which is deterministic for a given matrix.
pub fn solve_assignment(matrix: &CostMatrix) -> Assignment {
    let n = matrix.size();
    if n == 0 {
        return Assignment {
            row_to_col: Vec::new(),
            total_cost: 0,
        };
    }

    // 1-based with index 0 as the virtual source column.
    let cost = |row: usize, col: usize| to_signed(matrix.at(row - 1, col - 1));
    let mut u = vec![0_i64; n + 1];
    let mut v = vec![0_i64; n + 1];
    let mut owner = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col0 = 0;
        let mut min_slack = vec![i64::MAX; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = i64::MAX;
            let mut col1 = 0;
            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = cost(row0, col) - u[row0] - v[col];
                if reduced < min_slack[col] {
                    min_slack[col] = reduced;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }
            for col in 0..=n {
                if used[col] {
                    u[owner[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }
            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }

        loop {
            let col1 = way[col0];
            owner[col0] = owner[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0; n];
    for col in 1..=n {
        if owner[col] != 0 {
            row_to_col[owner[col] - 1] = col - 1;
        }
    }
    let total_cost = row_to_col
        .iter()
        .enumerate()
        .map(|(row, &col)| matrix.at(row, col))
        .sum();

    Assignment {
        row_to_col,
        total_cost,
    }
}

// Costs are symmetric-difference sizes, far below `i64::MAX / 4`; clamping
// keeps potential arithmetic from overflowing on pathological input.
fn to_signed(cost: u64) -> i64 {
    i64::try_from(cost).map_or(i64::MAX / 4, |c| c.min(i64::MAX / 4))
}
