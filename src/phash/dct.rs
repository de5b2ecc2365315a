//! 2-D Discrete Cosine Transform (type II) on a 32×32 block.
//!
//! Uses the orthonormal convention: coefficient 0 is scaled by `sqrt(1/N)`
//! and the rest by `sqrt(2/N)`, matching the transform the perceptual hash
//! was designed around. The cosine basis is computed once and reused.

use std::sync::OnceLock;

/// Side length of the transformed block.
pub const SIZE: usize = 32;

type Basis = [[f32; SIZE]; SIZE];

/// `basis[k][n] = alpha(k) * cos(pi * (2n + 1) * k / (2N))`
fn basis() -> &'static Basis {
    static BASIS: OnceLock<Basis> = OnceLock::new();
    BASIS.get_or_init(|| {
        let n = SIZE as f64;
        let mut table = [[0.0f32; SIZE]; SIZE];
        for (k, row) in table.iter_mut().enumerate() {
            let alpha = if k == 0 {
                (1.0 / n).sqrt()
            } else {
                (2.0 / n).sqrt()
            };
            for (j, cell) in row.iter_mut().enumerate() {
                let angle = std::f64::consts::PI * (2.0 * j as f64 + 1.0) * k as f64 / (2.0 * n);
                *cell = (alpha * angle.cos()) as f32;
            }
        }
        table
    })
}

/// Apply the forward 2-D DCT-II to a row-major 32×32 block.
#[must_use]
pub fn forward_2d(input: &[f32; SIZE * SIZE]) -> [f32; SIZE * SIZE] {
    let basis = basis();

    // Rows first, then columns; separability makes the 2-D transform two
    // passes of the 1-D transform.
    let mut rows = [0.0f32; SIZE * SIZE];
    for r in 0..SIZE {
        for k in 0..SIZE {
            let mut acc = 0.0f32;
            for j in 0..SIZE {
                acc += input[r * SIZE + j] * basis[k][j];
            }
            rows[r * SIZE + k] = acc;
        }
    }

    let mut out = [0.0f32; SIZE * SIZE];
    for c in 0..SIZE {
        for k in 0..SIZE {
            let mut acc = 0.0f32;
            for j in 0..SIZE {
                acc += rows[j * SIZE + c] * basis[k][j];
            }
            out[k * SIZE + c] = acc;
        }
    }

    out
}
