use criterion::{criterion_group, criterion_main, Criterion};
use sigmakit::estimate::{SigmaParams, SrUkf, Ukf};
use sigmakit::{linalg, matrix, MatrixView, MatrixViewMut};

// ---------------------------------------------------------------------------
// Helpers: symmetric positive-definite inputs
// ---------------------------------------------------------------------------

fn entry(i: usize, j: usize) -> f64 {
    ((i + 1) * (j + 1)) as f64 + if i == j { 10.0 } else { 0.0 }
}

fn sigmakit_spd<const K: usize>() -> [f64; K] {
    let n = (K as f64).sqrt() as usize;
    let mut out = [0.0; K];
    for i in 0..n {
        for j in 0..n {
            out[i * n + j] = (0..n).map(|k| entry(i, k) * entry(j, k)).sum();
        }
    }
    out
}

fn nalgebra_spd_6() -> nalgebra::Matrix6<f64> {
    let a = nalgebra::Matrix6::from_fn(entry);
    a * a.transpose()
}

// ---------------------------------------------------------------------------
// Matrix multiply
// ---------------------------------------------------------------------------

fn matmul_6x6(c: &mut Criterion) {
    let mut g = c.benchmark_group("matmul_6x6");

    g.bench_function("sigmakit", |b| {
        let a: [f64; 36] = core::array::from_fn(|k| (k + 1) as f64);
        let m: [f64; 36] = core::array::from_fn(|k| (k / 6 + k % 6 + 1) as f64);
        let a = MatrixView::new(6, 6, &a).unwrap();
        let m = MatrixView::new(6, 6, &m).unwrap();
        let mut out = [0.0; 36];
        b.iter(|| {
            let mut r = MatrixViewMut::new(6, 6, &mut out).unwrap();
            matrix::multiply(std::hint::black_box(&a), std::hint::black_box(&m), &mut r).unwrap();
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra::Matrix6::from_fn(|i, j| (i * 6 + j + 1) as f64);
        let m = nalgebra::Matrix6::from_fn(|i, j| (i + j + 1) as f64);
        b.iter(|| std::hint::black_box(&a) * std::hint::black_box(&m))
    });

    g.finish();
}

// ---------------------------------------------------------------------------
// Cholesky
// ---------------------------------------------------------------------------

fn cholesky_6x6(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky_6x6");

    g.bench_function("sigmakit", |b| {
        let a = sigmakit_spd::<36>();
        let a = MatrixView::new(6, 6, &a).unwrap();
        let mut l = [0.0; 36];
        b.iter(|| {
            let mut lv = MatrixViewMut::new(6, 6, &mut l).unwrap();
            linalg::cholesky(std::hint::black_box(&a), &mut lv).unwrap();
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra_spd_6();
        b.iter(|| nalgebra::Cholesky::new(std::hint::black_box(a)).unwrap())
    });

    g.finish();
}

fn cholesky_update_6x6(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky_update_6x6");

    g.bench_function("sigmakit", |b| {
        let a = sigmakit_spd::<36>();
        let mut l0 = [0.0; 36];
        linalg::cholesky(
            &MatrixView::new(6, 6, &a).unwrap(),
            &mut MatrixViewMut::new(6, 6, &mut l0).unwrap(),
        )
        .unwrap();
        b.iter(|| {
            let mut l = l0;
            let mut v = [0.5, -0.25, 1.0, 0.0, 0.75, -1.0];
            let mut lv = MatrixViewMut::new(6, 6, &mut l).unwrap();
            linalg::cholesky_update(&mut lv, &mut v, linalg::Sign::Plus).unwrap();
            std::hint::black_box(l);
        })
    });

    g.bench_function("nalgebra", |b| {
        let chol = nalgebra::Cholesky::new(nalgebra_spd_6()).unwrap();
        let v = nalgebra::Vector6::new(0.5, -0.25, 1.0, 0.0, 0.75, -1.0);
        b.iter(|| {
            let mut c = chol.clone();
            c.rank_one_update(std::hint::black_box(&v), 1.0);
            c
        })
    });

    g.finish();
}

// ---------------------------------------------------------------------------
// Inverse
// ---------------------------------------------------------------------------

fn inverse_6x6(c: &mut Criterion) {
    let mut g = c.benchmark_group("inverse_6x6");

    g.bench_function("sigmakit_spd", |b| {
        let mut a = sigmakit_spd::<36>();
        let mut r = [0.0; 36];
        b.iter(|| {
            let mut av = MatrixViewMut::new(6, 6, &mut a).unwrap();
            let mut rv = MatrixViewMut::new(6, 6, &mut r).unwrap();
            linalg::inverse(&mut av, &mut rv).unwrap();
        })
    });

    g.bench_function("sigmakit_lu", |b| {
        let a = sigmakit_spd::<36>();
        let a = MatrixView::new(6, 6, &a).unwrap();
        let mut r = [0.0; 36];
        b.iter(|| {
            let mut rv = MatrixViewMut::new(6, 6, &mut r).unwrap();
            linalg::inverse_general(std::hint::black_box(&a), &mut rv).unwrap();
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra_spd_6();
        b.iter(|| std::hint::black_box(a).try_inverse().unwrap())
    });

    g.finish();
}

// ---------------------------------------------------------------------------
// QR
// ---------------------------------------------------------------------------

fn qr_6x6(c: &mut Criterion) {
    let mut g = c.benchmark_group("qr_6x6");

    g.bench_function("sigmakit", |b| {
        let a = sigmakit_spd::<36>();
        b.iter(|| {
            let mut m = std::hint::black_box(a);
            let mut mv = MatrixViewMut::new(6, 6, &mut m).unwrap();
            linalg::qr_triangularize(&mut mv).unwrap();
            m
        })
    });

    g.bench_function("nalgebra", |b| {
        let a = nalgebra_spd_6();
        b.iter(|| nalgebra::QR::new(std::hint::black_box(a)).r())
    });

    g.finish();
}

// ---------------------------------------------------------------------------
// Filter steps: 6-state constant velocity in 3D, position measured
// ---------------------------------------------------------------------------

const DT: f64 = 0.01;

const UNIT: SigmaParams<f64> = SigmaParams { alpha: 1.0, beta: 2.0, kappa: 0.0 };

fn cv(x: &[f64], next: &mut [f64]) {
    for i in 0..3 {
        next[i] = x[i] + DT * x[i + 3];
        next[i + 3] = x[i + 3];
    }
}

fn position(x: &[f64], z: &mut [f64]) {
    z.copy_from_slice(&x[..3]);
}

fn diag<const K: usize>(n: usize, v: f64) -> [f64; K] {
    let mut out = [0.0; K];
    for i in 0..n {
        out[i * n + i] = v;
    }
    out
}

fn filter_step(c: &mut Criterion) {
    let mut g = c.benchmark_group("filter_step_6x3");
    let q = diag::<36>(6, 1e-4);
    let r = diag::<9>(3, 0.01);
    let q = MatrixView::new(6, 6, &q).unwrap();
    let r = MatrixView::new(3, 3, &r).unwrap();
    let z = [1.0, -0.5, 0.25];

    g.bench_function("ukf", |b| {
        let mut f = Ukf::<f64, 6, 3>::with_params(&[0.0; 6], UNIT).unwrap();
        b.iter(|| {
            f.predict(cv, Some(&q)).unwrap();
            f.update(position, std::hint::black_box(&z), &r).unwrap();
        })
    });

    g.bench_function("srukf", |b| {
        let mut f = SrUkf::<f64, 6, 3>::with_params(&[0.0; 6], UNIT).unwrap();
        b.iter(|| {
            f.predict(cv, Some(&q)).unwrap();
            f.update(position, std::hint::black_box(&z), &r).unwrap();
        })
    });

    g.finish();
}

criterion_group!(
    benches,
    matmul_6x6,
    cholesky_6x6,
    cholesky_update_6x6,
    inverse_6x6,
    qr_6x6,
    filter_step,
);
criterion_main!(benches);
