use std::f64::consts::TAU;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stereostation::{
    find_coincidences, NormalSampler, DetectionStation, SectorHits, StationConfig,
};

fn make_hit_fixture(n: usize, seed: u64) -> Vec<[f64; 3]> {
    let cfg = StationConfig::default();
    let r_min = cfg.radii[0];
    let r_max = cfg.radii[cfg.radii.len() - 1];
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let r = rng.gen_range(r_min..r_max);
            let phi = rng.gen_range(0.0..TAU);
            [r * phi.cos(), r * phi.sin(), 0.0]
        })
        .collect()
}

fn bench_locate(c: &mut Criterion) {
    let station = DetectionStation::new(StationConfig::default()).expect("default config");
    let points = make_hit_fixture(1000, 7);

    c.bench_function("locate_sector_1000", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for p in &points {
                if station.locate_sector(black_box([p[0], p[1]])).is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });
}

fn bench_event(c: &mut Criterion) {
    let points = make_hit_fixture(200, 11);
    let mut station = DetectionStation::new(StationConfig::default()).expect("default config");
    let mut gauss = NormalSampler::new(StdRng::seed_from_u64(3));

    c.bench_function("digitize_reconstruct_200", |b| {
        b.iter(|| {
            for (label, p) in points.iter().enumerate() {
                station.digitize(*p, label as i32, true, &mut gauss);
            }
            black_box(station.reconstruct())
        })
    });
}

fn bench_coincidences(c: &mut Criterion) {
    let station = DetectionStation::new(StationConfig::default()).expect("default config");
    let sector = &station.sectors()[1];
    let frame = sector.frame();
    let mut rng = StdRng::seed_from_u64(5);
    let mut hits = SectorHits::default();
    for label in 0..40 {
        let xl = rng.gen_range(frame.r_min()..frame.r_max());
        let yl = rng.gen_range(-0.9..0.9) * xl * frame.half_width().tan();
        if let Some(uvw) = sector.project_uvw(frame.sector_to_lab([xl, yl])) {
            hits.push(uvw, label);
        }
    }

    c.bench_function("find_coincidences_40hits", |b| {
        b.iter(|| black_box(find_coincidences(1, black_box(sector), black_box(&hits)).len()))
    });
}

criterion_group!(hotpaths, bench_locate, bench_event, bench_coincidences);
criterion_main!(hotpaths);
