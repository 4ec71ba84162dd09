use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fs;
use sysnoise::{
    conversions::{evaluate_range, sensitivity_to_rms, t_sys_to_rms},
    load_telescope_noise, Mem, Precision, Settings, TelescopeModel,
};
use tempfile::tempdir;

const NUM_FREQS: usize = 16384;
const NUM_STATIONS: usize = 64;

fn ramp(precision: Precision, start: f64, end: f64) -> Mem {
    let mut values = Mem::with_precision(precision, 0);
    evaluate_range(&mut values, NUM_FREQS, start, end).unwrap();
    values
}

fn bench_sensitivity_to_rms(crt: &mut Criterion) {
    for precision in [Precision::Single, Precision::Double] {
        let sensitivity = ramp(precision, 1000.0, 2000.0);
        let mut rms = Mem::with_precision(precision, NUM_FREQS);
        crt.bench_function(
            format!("sensitivity_to_rms - {} {} freqs", precision, NUM_FREQS).as_str(),
            |bch| {
                bch.iter(|| {
                    sensitivity_to_rms(
                        black_box(&mut rms),
                        black_box(&sensitivity),
                        NUM_FREQS,
                        1e6,
                        1.0,
                    )
                    .unwrap();
                });
            },
        );
    }
}

fn bench_t_sys_to_rms(crt: &mut Criterion) {
    for precision in [Precision::Single, Precision::Double] {
        let t_sys = ramp(precision, 50.0, 500.0);
        let area = ramp(precision, 100.0, 400.0);
        let efficiency = ramp(precision, 0.5, 1.0);
        let mut rms = Mem::with_precision(precision, NUM_FREQS);
        crt.bench_function(
            format!("t_sys_to_rms - {} {} freqs", precision, NUM_FREQS).as_str(),
            |bch| {
                bch.iter(|| {
                    t_sys_to_rms(
                        black_box(&mut rms),
                        black_box(&t_sys),
                        black_box(&area),
                        black_box(&efficiency),
                        NUM_FREQS,
                        1e6,
                        1.0,
                    )
                    .unwrap();
                });
            },
        );
    }
}

fn bench_load_telescope_noise(crt: &mut Criterion) {
    let tmp_dir = tempdir().unwrap();
    let freqs: String = (0..256).map(|i| format!("{}\n", 100e6 + i as f64 * 1e5)).collect();
    let sensitivity: String = (0..256).map(|i| format!("{}\n", 1000 + i)).collect();
    fs::write(tmp_dir.path().join("noise_frequencies.txt"), freqs).unwrap();
    fs::write(tmp_dir.path().join("sensitivity.txt"), sensitivity).unwrap();
    for station_idx in 0..NUM_STATIONS {
        fs::create_dir(tmp_dir.path().join(format!("station{station_idx:03}"))).unwrap();
    }

    let mut settings = Settings::default();
    settings.telescope.input_directory = tmp_dir.path().to_path_buf();
    settings.interferometer.channel_bandwidth_hz = 1e6;
    settings.observation.length_seconds = 1.0;
    settings.interferometer.noise.enable = true;

    crt.bench_function(
        format!("load_telescope_noise - {} stations", NUM_STATIONS).as_str(),
        |bch| {
            bch.iter(|| {
                let mut telescope = TelescopeModel::new(Precision::Double);
                load_telescope_noise(&mut telescope, black_box(&settings)).unwrap();
                telescope
            });
        },
    );
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets =
        bench_sensitivity_to_rms,
        bench_t_sys_to_rms,
        bench_load_telescope_noise,
);
criterion_main!(benches);
