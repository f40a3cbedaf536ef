//! Square sgemm benchmarks: per iteration work is 2 m n k flops.

#[macro_use]
extern crate bencher;

use bencher::Bencher;

use tilegemm::{sgemm, MatrixView, MatrixViewMut};

fn bench_square(bench: &mut Bencher, size: usize, num_threads: usize) {
    let (m, n, k) = (size, size, size);
    let mut a = vec![0.; m * k];
    let b = vec![1.; k * n];
    let mut c = vec![0.; m * n];

    for (i, elt) in a.iter_mut().enumerate() {
        *elt = i as f32;
    }

    bench.iter(|| {
        let av = MatrixView::contiguous(&a, m, k).unwrap();
        let bv = MatrixView::contiguous(&b, k, n).unwrap();
        let cv = MatrixViewMut::contiguous(&mut c, m, n).unwrap();
        sgemm(av, bv, cv, num_threads).unwrap();
    });
}

fn mat_mul_128(bench: &mut Bencher) {
    bench_square(bench, 128, 1);
}

fn mat_mul_512(bench: &mut Bencher) {
    bench_square(bench, 512, 1);
}

fn mat_mul_512_t4(bench: &mut Bencher) {
    bench_square(bench, 512, 4);
}

fn mat_mul_1024_t4(bench: &mut Bencher) {
    bench_square(bench, 1024, 4);
}

benchmark_group!(
    benches,
    mat_mul_128,
    mat_mul_512,
    mat_mul_512_t4,
    mat_mul_1024_t4
);
benchmark_main!(benches);
