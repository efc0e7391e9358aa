//! End-to-end evaluation on synthetic cross-sections.

use chrono::{Duration, NaiveDate};
use lncap_eval::{Observation, cumulative_ic, daily_stats, summarize};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const INSTRUMENTS: usize = 50;

fn synthetic_panel(seed: u64, dates: i64, loading: f64) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2009, 1, 23).unwrap();

    let mut panel = Vec::new();
    for d in 0..dates {
        let date = start + Duration::days(d);
        for i in 0..INSTRUMENTS {
            let factor: f64 = rng.gen_range(-2.0..2.0);
            let noise: f64 = rng.gen_range(-0.005..0.005);
            panel.push(Observation::new(
                date,
                format!("{:06}.SZ", i),
                factor,
                loading * factor + noise,
            ));
        }
    }
    panel
}

#[test]
fn test_strong_signal_is_detected() {
    let panel = synthetic_panel(1, 30, 0.01);
    let daily = daily_stats(&panel);
    assert_eq!(daily.len(), 30);
    assert!(daily.iter().all(|d| d.n == INSTRUMENTS));

    let summary = summarize(&daily);
    assert!(summary.ic_mean.unwrap() > 0.8);
    assert_eq!(summary.ic_gt_0_prob, Some(1.0));
    assert_eq!(summary.t_abs_gt_2_prob, Some(1.0));
    assert!(summary.ir.unwrap() > 1.0);

    let cum = cumulative_ic(&daily);
    assert!(cum.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_noise_has_no_information() {
    let panel = synthetic_panel(2, 200, 0.0);
    let summary = summarize(&daily_stats(&panel));

    assert!(summary.ic_mean.unwrap().abs() < 0.1);
    let share = summary.ic_gt_0_prob.unwrap();
    assert!(share > 0.3 && share < 0.7);
}

#[test]
fn test_negative_loading_flips_ic() {
    let panel = synthetic_panel(3, 20, -0.01);
    let summary = summarize(&daily_stats(&panel));
    assert!(summary.ic_mean.unwrap() < -0.8);
    assert_eq!(summary.ic_gt_0_prob, Some(0.0));
}
