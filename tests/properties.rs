//! Property tests over arbitrary well-formed bar series.

use pricecall::prelude::{
    analyze_volume, compute_momentum, detect_consolidation, detect_levels, detect_patterns,
    detect_trend, generate_signal, Action, Candle, Consolidation, IndicatorOverride, Momentum,
    SignalGenerator, Trend, TrendReading, VolumeProfile, MAX_LEVEL_STRENGTH,
};
use pricecall::strategies::Strategy as TradeStrategy;
use proptest::prelude::*;

/// Random walk of valid candles starting between 0.5 and 2.0
fn arb_bars(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    (
        0.5f64..2.0,
        prop::collection::vec(
            (-0.01f64..0.01, 0.0f64..0.005, 0.0f64..0.005, 0.0f64..5_000.0),
            0..max_len,
        ),
    )
        .prop_map(|(start, steps)| {
            let mut prev = start;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (step, up, down, volume))| {
                    let open = prev;
                    let close = (open + step).max(0.01);
                    prev = close;
                    Candle::new(
                        i as i64,
                        open,
                        open.max(close) + up,
                        open.min(close) - down,
                        close,
                        volume,
                    )
                })
                .collect()
        })
}

fn arb_overrides() -> impl Strategy<Value = Option<IndicatorOverride>> {
    let recommendation = prop_oneof![
        Just(None),
        Just(Some("STRONG BUY".to_string())),
        Just(Some("SELL".to_string())),
        Just(Some("NEUTRAL".to_string())),
    ];
    prop::option::of(
        (
            prop::option::of(prop_oneof![Just(Trend::Bullish), Just(Trend::Bearish)]),
            prop::option::of(0.0f64..100.0),
            prop::option::of(0.5f64..2.0),
            recommendation,
        )
            .prop_map(|(trend, rsi, ma20, recommendation)| IndicatorOverride {
                trend,
                rsi,
                ma20,
                recommendation,
            }),
    )
}

fn arb_strategy() -> impl Strategy<Value = TradeStrategy> {
    prop::sample::select(TradeStrategy::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_rsi_stays_in_bounds(bars in arb_bars(60)) {
        let rsi = compute_momentum(&bars).rsi;
        prop_assert!((0.0..100.0).contains(&rsi), "rsi = {}", rsi);
    }

    #[test]
    fn prop_wait_iff_no_stop_and_target(
        bars in arb_bars(60),
        strategy in arb_strategy(),
        overrides in arb_overrides(),
    ) {
        let price = bars.last().map_or(1.0, |b| b.close);
        let signal = generate_signal(&bars, price, strategy, overrides.as_ref());

        prop_assert_eq!(signal.action == Action::Wait, signal.plan.is_none());
        prop_assert_eq!(signal.action == Action::Wait, signal.risk_reward == "N/A");
        prop_assert!(signal.confidence <= 100);
        if let Some(plan) = signal.plan {
            prop_assert!(plan.stop_loss.is_finite() && plan.take_profit.is_finite());
        }
    }

    #[test]
    fn prop_short_series_use_defaults(bars in arb_bars(9)) {
        prop_assert!(detect_levels(&bars, 3).is_empty());
        prop_assert_eq!(detect_trend(&bars), TrendReading::default());
        prop_assert_eq!(compute_momentum(&bars), Momentum::default());
        prop_assert_eq!(analyze_volume(&bars), VolumeProfile::default());
        prop_assert_eq!(detect_consolidation(&bars, 10), Consolidation::default());
        if bars.len() < 3 {
            prop_assert!(detect_patterns(&bars).is_empty());
        }
    }

    #[test]
    fn prop_generation_is_repeatable(
        bars in arb_bars(60),
        strategy in arb_strategy(),
    ) {
        let price = bars.last().map_or(1.0, |b| b.close);
        let generator = SignalGenerator::default();
        prop_assert_eq!(
            generator.generate(&bars, price, strategy, None),
            generator.generate(&bars, price, strategy, None)
        );
    }

    #[test]
    fn prop_levels_sorted_and_bounded(bars in arb_bars(80)) {
        let levels = detect_levels(&bars, 3);
        for side in [&levels.support, &levels.resistance] {
            prop_assert!(side.len() <= 3);
            prop_assert!(side.windows(2).all(|w| w[0].price <= w[1].price));
            prop_assert!(side.iter().all(|l| (70.0..=MAX_LEVEL_STRENGTH).contains(&l.strength)));
        }
    }
}
