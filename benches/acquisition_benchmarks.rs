use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use egd_acquisition::acquisition::{samples_per_cycle, AcquisitionLayout};
use egd_acquisition::config::constants::keys;
use egd_acquisition::hal::simulator::{Pacing, SimulatorConfig, SimulatorLayer};
use egd_acquisition::{EgdAcquisition, GroupKind, MemoryParameters, NeuroFrame, SelectorRules};

const SAMPLE_RATES: &[u32] = &[256, 512, 1024, 2048];
const CHANNEL_COUNTS: &[usize] = &[8, 32, 64, 128];
const FRAMERATE: u32 = 16;

fn acquisition(rate: u32, channels: usize) -> EgdAcquisition {
    let layer = SimulatorLayer::new(SimulatorConfig {
        pacing: Pacing::Unpaced,
        sampling_rate_hz: rate,
        eeg_channels: channels,
        ..Default::default()
    });
    let params = MemoryParameters::new().with_string(keys::DEVARG, "gtec");
    EgdAcquisition::new(Box::new(layer), Box::new(params))
}

fn benchmark_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("setup");

    for &channels in CHANNEL_COUNTS {
        group.bench_with_input(BenchmarkId::new("discover_and_install", channels), &channels, |b, &channels| {
            let mut acq = acquisition(512, channels);
            acq.try_configure(NeuroFrame::new(), FRAMERATE).unwrap();
            acq.try_open().unwrap();

            b.iter(|| {
                acq.try_setup().unwrap();
                black_box(acq.layout());
            });
        });
    }

    group.finish();
}

fn benchmark_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for &rate in SAMPLE_RATES {
        for &channels in &[8usize, 64] {
            let spc = samples_per_cycle(rate, FRAMERATE).unwrap();
            group.throughput(Throughput::Elements((spc * channels) as u64));

            group.bench_with_input(
                BenchmarkId::new("one_cycle", format!("{}Hz_{}ch", rate, channels)),
                &(rate, channels),
                |b, &(rate, channels)| {
                    let mut acq = acquisition(rate, channels);
                    acq.try_configure(NeuroFrame::new(), FRAMERATE).unwrap();
                    acq.try_open().unwrap();
                    acq.try_setup().unwrap();
                    acq.try_start().unwrap();

                    b.iter(|| black_box(acq.try_get().unwrap()));
                },
            );
        }
    }

    group.finish();
}

fn benchmark_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    let mut frame = NeuroFrame::new();
    frame.reserve(GroupKind::Signal, 32, 64);
    frame.reserve(GroupKind::Auxiliary, 32, 8);
    frame.reserve(GroupKind::Trigger, 32, 1);

    group.bench_function("build", |b| {
        b.iter(|| black_box(AcquisitionLayout::build(black_box(&frame)).unwrap()));
    });

    let layout = AcquisitionLayout::build(&frame).unwrap();
    group.bench_function("arrange", |b| {
        b.iter(|| black_box(layout.arrange(&mut frame).unwrap().len()));
    });

    let rules = SelectorRules::default();
    group.bench_function("selector", |b| {
        b.iter(|| black_box(rules.build(black_box("eego"), black_box("|deviceid|EE-225"), black_box(1000))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_setup, benchmark_get, benchmark_layout);
criterion_main!(benches);
