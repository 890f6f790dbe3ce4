use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strided_shapes::{copy_into, invert_into, mat_vec, BandMatrix, Matrix, Vector};

fn banded_mat_vec(c: &mut Criterion) {
    let n = 512;
    let mut rng = StdRng::seed_from_u64(7);
    let mut b = BandMatrix::<f64>::banded(n, n, 2, 3).unwrap();
    {
        let mut v = b.view_mut();
        for j in 0..n {
            for i in j.saturating_sub(3)..(j + 3).min(n) {
                if v.is_stored(i, j) {
                    v.set(i, j, rng.gen::<f64>() - 0.5);
                }
            }
        }
    }
    let x = Vector::from_fn(n, |_| rng.gen::<f64>());
    c.bench_function("banded_mat_vec_512", |bench| {
        bench.iter(|| black_box(mat_vec(1.0, &b.view(), &x.view())))
    });
}

fn strided_vs_contiguous_copy(c: &mut Criterion) {
    let n = 1 << 14;
    let src = Vector::from_fn(n, |i| i as f64);
    let mut dst = Vector::<f64>::zeros(n);
    c.bench_function("copy_contiguous", |bench| {
        bench.iter(|| copy_into(&src.view(), &mut dst.view_mut()))
    });
    c.bench_function("copy_reversed", |bench| {
        bench.iter(|| {
            let mut rev = dst.view_mut().reverse();
            copy_into(&src.view(), &mut rev)
        })
    });
}

fn triangular_inverse(c: &mut Criterion) {
    let n = 64;
    let m = Matrix::from_fn(n, n, |i, j| {
        if i >= j {
            1.0 + ((i * n + j) % 17) as f64 * 0.25
        } else {
            0.0
        }
    });
    c.bench_function("lower_triangular_inverse_64", |bench| {
        bench.iter(|| {
            let mut out = Matrix::<f64>::zeros(n, n);
            invert_into(&m.lower_triangle(), &mut out.lower_triangle_mut()).unwrap();
            black_box(out)
        })
    });
}

criterion_group!(
    benches,
    banded_mat_vec,
    strided_vs_contiguous_copy,
    triangular_inverse
);
criterion_main!(benches);
