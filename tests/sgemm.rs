use approx::assert_relative_eq;
use itertools::iproduct;

use tilegemm::{sgemm, sgemm_with, GemmConfig, MatrixView, MatrixViewMut, MR, NR};

/// Naive i-j-k reference, accumulating like the engine does.
fn reference_gemm(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.;
            for l in 0..k {
                sum += a[i * k + l] * b[l * n + j];
            }
            c[i * n + j] += sum;
        }
    }
}

/// Deterministic pseudo-random fill in roughly [-1, 1).
fn fill(buf: &mut [f32], mut seed: u32) {
    for x in buf.iter_mut() {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        *x = (seed >> 8) as f32 / (1 << 23) as f32 - 1.;
    }
}

fn run_sgemm(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize, nt: usize) {
    let av = MatrixView::contiguous(a, m, k).unwrap();
    let bv = MatrixView::contiguous(b, k, n).unwrap();
    let cv = MatrixViewMut::contiguous(c, m, n).unwrap();
    sgemm(av, bv, cv, nt).unwrap();
}

fn compare_against_reference(m: usize, n: usize, k: usize, nt: usize) {
    let mut a = vec![0.; m * k];
    let mut b = vec![0.; k * n];
    fill(&mut a, 1 + (m * 31 + n * 7 + k) as u32);
    fill(&mut b, 2 + (m + n * 13 + k * 3) as u32);

    let mut c = vec![0.; m * n];
    let mut c_ref = vec![0.; m * n];
    run_sgemm(&a, &b, &mut c, m, n, k, nt);
    reference_gemm(&a, &b, &mut c_ref, m, n, k);

    for (&got, &want) in c.iter().zip(&c_ref) {
        assert_relative_eq!(got, want, max_relative = 1e-4, epsilon = 1e-5);
    }
}

// Sub-tile, exact-tile and multi-tile square problems, across thread
// counts that divide the row count unevenly.
#[test]
fn test_sgemm_against_reference_squares() {
    let sizes = [1, 7, 8, 15, 16, 63, 64, 65, 128, 257];
    for (&size, &nt) in iproduct!(sizes.iter(), [1usize, 2, 5, 8].iter()) {
        compare_against_reference(size, size, size, nt);
    }
}

#[test]
fn test_sgemm_against_reference_rectangular() {
    for &(m, n, k) in &[
        (1, 257, 16),
        (257, 1, 16),
        (16, 16, 257),
        (65, 128, 7),
        (128, 63, 65),
        (7, 8, 15),
    ] {
        for nt in [1, 2, 5, 8] {
            compare_against_reference(m, n, k, nt);
        }
    }
}

// Calling twice without zeroing C must double the product on top of
// the initial contents.
#[test]
fn test_accumulation_semantics() {
    let (m, n, k) = (33, 21, 17);
    let mut a = vec![0.; m * k];
    let mut b = vec![0.; k * n];
    fill(&mut a, 99);
    fill(&mut b, 100);

    let c0 = 0.5;
    let mut c = vec![c0; m * n];
    run_sgemm(&a, &b, &mut c, m, n, k, 2);
    run_sgemm(&a, &b, &mut c, m, n, k, 2);

    let mut product = vec![0.; m * n];
    reference_gemm(&a, &b, &mut product, m, n, k);
    for (&got, &p) in c.iter().zip(&product) {
        assert_relative_eq!(got, c0 + 2. * p, max_relative = 1e-4, epsilon = 1e-5);
    }
}

// Same problem, different partitioning: results agree within
// floating-point reassociation tolerance.
#[test]
fn test_thread_count_invariance() {
    let (m, n, k) = (100, 64, 48);
    let mut a = vec![0.; m * k];
    let mut b = vec![0.; k * n];
    fill(&mut a, 7);
    fill(&mut b, 8);

    let mut c1 = vec![0.; m * n];
    let mut c8 = vec![0.; m * n];
    run_sgemm(&a, &b, &mut c1, m, n, k, 1);
    run_sgemm(&a, &b, &mut c8, m, n, k, 8);

    for (&x, &y) in c1.iter().zip(&c8) {
        assert_relative_eq!(x, y, max_relative = 1e-4, epsilon = 1e-5);
    }
}

// M = MR-1, N = NR-1, K = KC+1 with a small KC: every boundary path
// runs, and every element of C is written exactly once. Integer-valued
// inputs make the comparison exact, so a double accumulation or a
// skipped element cannot hide in the tolerance.
#[test]
fn test_boundary_exactness() {
    let cfg = GemmConfig { mc: 16, kc: 8, nc: 16 };
    let (m, n, k) = (MR - 1, NR - 1, cfg.kc + 1);
    let a: Vec<f32> = (0..m * k).map(|x| (x % 11) as f32 - 5.).collect();
    let b: Vec<f32> = (0..k * n).map(|x| (x % 5) as f32 - 2.).collect();

    let mut c = vec![1.; m * n];
    let mut c_ref = vec![1.; m * n];

    let av = MatrixView::contiguous(&a, m, k).unwrap();
    let bv = MatrixView::contiguous(&b, k, n).unwrap();
    let cv = MatrixViewMut::contiguous(&mut c, m, n).unwrap();
    sgemm_with(&cfg, av, bv, cv, 1).unwrap();

    reference_gemm(&a, &b, &mut c_ref, m, n, k);
    // k is split 8 + 1 across two packed blocks; sums of the two
    // partial products stay exact for these small integers
    assert_eq!(c, c_ref);
}

// The concrete scenario from the design discussion: A times identity
// over two threads reproduces A.
#[test]
fn test_identity_two_threads() {
    let a = [1., 2., 3., 4., 5., 6., 7., 8., 9.];
    let b = [1., 0., 0., 0., 1., 0., 0., 0., 1.];
    let mut c = [0.; 9];
    run_sgemm(&a, &b, &mut c, 3, 3, 3, 2);
    assert_eq!(c, a);
}

// More workers than rows: trailing spans are empty, result unchanged.
#[test]
fn test_more_threads_than_rows() {
    compare_against_reference(3, 64, 64, 8);
    compare_against_reference(1, 16, 16, 5);
}

#[test]
fn test_custom_block_config_end_to_end() {
    let cfg = GemmConfig { mc: 24, kc: 16, nc: 32 };
    let (m, n, k) = (65, 65, 65);
    let mut a = vec![0.; m * k];
    let mut b = vec![0.; k * n];
    fill(&mut a, 3);
    fill(&mut b, 4);

    let mut c = vec![0.; m * n];
    let mut c_ref = vec![0.; m * n];
    let av = MatrixView::contiguous(&a, m, k).unwrap();
    let bv = MatrixView::contiguous(&b, k, n).unwrap();
    let cv = MatrixViewMut::contiguous(&mut c, m, n).unwrap();
    sgemm_with(&cfg, av, bv, cv, 4).unwrap();

    reference_gemm(&a, &b, &mut c_ref, m, n, k);
    for (&got, &want) in c.iter().zip(&c_ref) {
        assert_relative_eq!(got, want, max_relative = 1e-4, epsilon = 1e-5);
    }
}
