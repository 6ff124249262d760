//! Sample-grid generators for synthetic rain fields.
//!
//! Generators create predictable, verifiable patterns so tests can assert
//! exact values after an import round trip.

/// Grid filled with one value.
pub fn uniform_grid(rows: usize, cols: usize, value: f64) -> Vec<f64> {
    vec![value; rows * cols]
}

/// Grid with predictable per-cell values.
///
/// Each cell is `row * 10 + col`, so `grid[row * cols + col]` is easy to
/// verify after a read.
pub fn gradient_grid(rows: usize, cols: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 10 + col) as f64);
        }
    }
    data
}

/// Gradient grid with every `nth` cell replaced by NaN, starting at cell 0.
///
/// Panics when `nth` is 0.
pub fn speckled_grid(rows: usize, cols: usize, nth: usize) -> Vec<f64> {
    assert!(nth > 0, "nth must be positive");
    let mut data = gradient_grid(rows, cols);
    for (idx, cell) in data.iter_mut().enumerate() {
        if idx % nth == 0 {
            *cell = f64::NAN;
        }
    }
    data
}
