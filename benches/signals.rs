//! Benchmarks for signal generation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricecall::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
  o: f64,
  h: f64,
  l: f64,
  c: f64,
  v: f64,
}

impl OHLCV for TestBar {
  fn open(&self) -> f64 {
    self.o
  }

  fn high(&self) -> f64 {
    self.h
  }

  fn low(&self) -> f64 {
    self.l
  }

  fn close(&self) -> f64 {
    self.c
  }

  fn volume(&self) -> f64 {
    self.v
  }
}

/// Generate realistic FX-scale bars
fn generate_bars(n: usize) -> Vec<TestBar> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 1.1000;

  for i in 0..n {
    let change = (((i * 7 + 13) % 100) as f64 / 50.0 - 1.0) * 0.0010; // Deterministic "random"
    let volatility = 0.0008 + ((i * 3) % 10) as f64 * 0.0001;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;
    let v = 1_000.0 + ((i * 11) % 17) as f64 * 100.0;

    bars.push(TestBar { o, h, l, c, v });
    price = c;
  }

  bars
}

fn bench_strategies(c: &mut Criterion) {
  let bars = generate_bars(500);
  let price = bars[bars.len() - 1].c;
  let generator = SignalGenerator::default();

  let mut group = c.benchmark_group("generate");

  for strategy in Strategy::ALL {
    group.bench_with_input(BenchmarkId::new("strategy", strategy.tag()), &strategy, |b, &s| {
      b.iter(|| {
        let _ = black_box(generator.generate(black_box(&bars), price, s, None));
      })
    });
  }

  group.finish();
}

fn bench_levels(c: &mut Criterion) {
  let mut group = c.benchmark_group("levels");

  for size in [100, 500, 1000, 5000].iter() {
    let bars = generate_bars(*size);
    let jitter = LevelDetector::with_defaults();
    let prominence = LevelDetector::with_defaults().with_strength(StrengthModel::Prominence);

    group.bench_with_input(BenchmarkId::new("jitter", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(jitter.detect(black_box(&bars)));
      })
    });
    group.bench_with_input(BenchmarkId::new("prominence", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(prominence.detect(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_watchlist(c: &mut Criterion) {
  let series: Vec<Vec<TestBar>> = (0..16).map(|i| generate_bars(300 + i * 10)).collect();
  let symbols: Vec<String> = (0..series.len()).map(|i| format!("SYM{i}")).collect();
  let generator = SignalGenerator::default();

  c.bench_function("scan_watchlist_16_instruments", |b| {
    b.iter(|| {
      let items: Vec<WatchlistItem<'_, TestBar>> = series
        .iter()
        .zip(&symbols)
        .map(|(bars, symbol)| WatchlistItem {
          symbol,
          bars,
          current_price: bars[bars.len() - 1].c,
          overrides: None,
        })
        .collect();
      let _ = black_box(scan_watchlist(&generator, Strategy::PriceAction, black_box(items)));
    })
  });
}

criterion_group!(benches, bench_strategies, bench_levels, bench_watchlist);

criterion_main!(benches);
