use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use shrew_onecycle::{
    annealing_lr, decay_lr, warmup_lr, LrScheduler, OneCycleLR, ParamGroups, Phase,
    RateHolder, ScheduleConfig, ScheduleError, WarmupShape,
};

fn full_cycle_config() -> ScheduleConfig {
    ScheduleConfig::new(6, 8, 56, 100, 0.01, 0.001, 0.0001)
        .warmup_start_rate(0.0001)
        .warmup_shape(WarmupShape::Exponential)
}

fn run(config: ScheduleConfig, steps: u64) -> Vec<f64> {
    let mut sched = OneCycleLR::new(ParamGroups::single(1e-3), config).unwrap();
    (0..steps).map(|_| sched.advance()).collect()
}

fn assert_non_increasing(lrs: &[f64]) {
    for w in lrs.windows(2) {
        assert!(w[1] <= w[0], "{} > {}", w[1], w[0]);
    }
}

#[test]
fn test_full_cycle() {
    let config = full_cycle_config();
    let total = 6 + 8 + 56 + 100;
    let lrs = run(config.clone(), total + 30);
    assert_eq!(lrs.len(), 200);

    // Warmup: steps 0..=6, exponential from 1e-4 to 1e-2.
    for (t, &lr) in lrs[..=6].iter().enumerate() {
        let expected = warmup_lr(t as u64, 6, 0.0001, 0.01, WarmupShape::Exponential);
        assert_eq!(lr, expected);
    }
    assert_eq!(lrs[0], 0.0001);
    assert_eq!(lrs[6], 0.01);
    for w in lrs[..=6].windows(2) {
        assert!(w[1] >= w[0]);
    }

    // Idling: steps 7..=14 hold the peak.
    assert!(lrs[7..=14].iter().all(|&lr| lr == 0.01));

    // Annealing: steps 15..=70, cosine to the annealing floor.
    for step in 15..=70usize {
        let expected = annealing_lr(step as u64 - 14, 56, 0.01, 0.001);
        assert_eq!(lrs[step], expected);
    }
    assert_eq!(lrs[70], 0.001);
    assert_non_increasing(&lrs[14..=70]);

    // Decay: steps 71..=170, linear to the decay floor.
    for step in 71..=170usize {
        let expected = decay_lr(step as u64 - 70, 100, 0.001, 0.0001);
        assert_eq!(lrs[step], expected);
    }
    assert_non_increasing(&lrs[70..=170]);

    // The last 30 steps hold the decay floor.
    assert!(lrs[170..].iter().all(|&lr| lr == 0.0001));
    assert_eq!(lrs[170..].len(), 30);
}

#[test]
fn test_full_cycle_phases() {
    let mut sched = OneCycleLR::new(ParamGroups::single(1e-3), full_cycle_config()).unwrap();
    let mut seen = Vec::new();
    for _ in 0..200 {
        sched.advance();
        let phase = sched.phase().unwrap();
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
    }
    assert_eq!(
        seen,
        vec![
            Phase::Warmup,
            Phase::Idling,
            Phase::Annealing,
            Phase::Decay,
            Phase::Terminal
        ]
    );
}

#[test]
fn test_linear_warmup_scenario() {
    let config = ScheduleConfig::new(10, 0, 0, 0, 0.01, 0.01, 0.01)
        .warmup_start_rate(0.001)
        .warmup_shape(WarmupShape::Linear);
    let lrs = run(config, 11);
    assert_eq!(lrs[0], 0.001);
    assert_abs_diff_eq!(lrs[5], 0.0055, epsilon = 1e-8);
    assert_eq!(lrs[10], 0.01);
}

#[test]
fn test_exponential_warmup_scenario() {
    let config = ScheduleConfig::new(10, 0, 0, 0, 0.01, 0.01, 0.01).warmup_start_rate(0.001);
    let lrs = run(config, 11);
    assert_eq!(lrs[0], 0.001);
    assert_abs_diff_eq!(lrs[5], 0.00316227, epsilon = 1e-8);
    assert_eq!(lrs[10], 0.01);
}

#[test]
fn test_annealing_and_decay_scenarios() {
    // Zero-length warmup puts step 0 at the peak; annealing covers 1..=10.
    let config = ScheduleConfig::new(0, 0, 10, 0, 0.01, 0.001, 0.001);
    let lrs = run(config, 11);
    assert_eq!(lrs[0], 0.01);
    assert_abs_diff_eq!(lrs[5], 0.0055, epsilon = 1e-8);
    assert_eq!(lrs[10], 0.001);

    let config = ScheduleConfig::new(0, 0, 0, 10, 0.01, 0.01, 0.001);
    let lrs = run(config, 11);
    assert_eq!(lrs[0], 0.01);
    assert_abs_diff_eq!(lrs[5], 0.0055, epsilon = 1e-8);
    assert_eq!(lrs[10], 0.001);
}

// A step on a boundary is the last step of the phase ending there.
#[test]
fn test_boundary_steps_belong_to_earlier_phase() {
    let config = ScheduleConfig::new(3, 2, 4, 4, 0.02, 0.002, 0.0002)
        .warmup_start_rate(0.001)
        .warmup_shape(WarmupShape::Linear);
    let mut sched = OneCycleLR::new(ParamGroups::single(0.5), config).unwrap();
    let lrs: Vec<(Option<Phase>, f64)> = (0..15)
        .map(|_| {
            let lr = sched.advance();
            (sched.phase(), lr)
        })
        .collect();

    assert_eq!(lrs[3], (Some(Phase::Warmup), 0.02));
    assert_eq!(lrs[4], (Some(Phase::Idling), 0.02));
    assert_eq!(lrs[5], (Some(Phase::Idling), 0.02));
    assert_eq!(lrs[6].0, Some(Phase::Annealing));
    assert!(lrs[6].1 < 0.02);
    assert_eq!(lrs[9], (Some(Phase::Annealing), 0.002));
    assert_eq!(lrs[13], (Some(Phase::Decay), 0.0002));
    assert_eq!(lrs[14], (Some(Phase::Terminal), 0.0002));
}

#[test]
fn test_all_phases_zero_length() {
    let config = ScheduleConfig::new(0, 0, 0, 0, 0.01, 0.001, 0.0001);
    let lrs = run(config, 4);
    assert_eq!(lrs, vec![0.01, 0.0001, 0.0001, 0.0001]);
}

#[test]
fn test_construction_errors() {
    let bad = [
        ScheduleConfig::new(1, 1, 1, 1, 0.0, 0.001, 0.0001),
        ScheduleConfig::new(1, 1, 1, 1, 0.01, -0.001, 0.0001),
        ScheduleConfig::new(1, 1, 1, 1, 0.01, 0.001, f64::INFINITY),
        ScheduleConfig::new(1, 1, 1, 1, 0.01, 0.001, 0.0001).warmup_start_rate(0.0),
    ];
    for config in bad {
        let result = OneCycleLR::new(ParamGroups::single(0.1), config);
        assert!(matches!(
            result,
            Err(ScheduleError::InvalidConfiguration { .. })
        ));
    }
}

#[test]
fn test_config_from_json_drives_scheduler() {
    let json = r#"{
        "warmup_iters": 6,
        "idling_iters": 8,
        "annealing_iters": 56,
        "decay_iters": 100,
        "peak_rate": 0.01,
        "annealing_floor_rate": 0.001,
        "decay_floor_rate": 0.0001,
        "warmup_start_rate": 0.0001,
        "warmup_shape": "exponential"
    }"#;
    let config: ScheduleConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config, full_cycle_config());
    let sched = OneCycleLR::new(ParamGroups::single(1e-3), config.clone()).unwrap();
    assert_eq!(run(config, 200), sched.schedule(200));
}

// Malformed configs never reach a rate: the scheduler refuses them and so
// does deserialization.
#[test]
fn test_invalid_config_produces_no_rate() {
    let zero_start = ScheduleConfig::new(10, 0, 0, 0, 0.01, 0.01, 0.01).warmup_start_rate(0.0);
    let linear_zero_start = zero_start.clone().warmup_shape(WarmupShape::Linear);
    let negative_peak = ScheduleConfig::new(5, 0, 0, 0, -0.01, 0.001, 0.0001);
    for config in [zero_start, linear_zero_start, negative_peak] {
        assert!(OneCycleLR::new(ParamGroups::single(0.5), config.clone()).is_err());
        assert!(OneCycleLR::with_start_step(ParamGroups::single(0.5), config, 5).is_err());
    }

    let json = r#"{
        "warmup_iters": 5,
        "idling_iters": 0,
        "annealing_iters": 0,
        "decay_iters": 0,
        "peak_rate": -0.01,
        "annealing_floor_rate": 0.001,
        "decay_floor_rate": 0.0001
    }"#;
    assert!(serde_json::from_str::<ScheduleConfig>(json).is_err());
}

proptest! {
    #[test]
    fn prop_pass_through_and_idempotent_read(
        initial in prop::collection::vec(1e-6f64..1.0, 1..5),
        warmup in 0u64..40,
        idling in 0u64..40,
        annealing in 0u64..40,
        decay in 0u64..40,
        steps in 1u64..200
    ) {
        let config = ScheduleConfig::new(warmup, idling, annealing, decay, 0.01, 0.001, 0.0001);
        let mut sched = OneCycleLR::new(ParamGroups::new(initial.clone()), config).unwrap();
        prop_assert_eq!(sched.current_rate(), initial[0]);
        prop_assert_eq!(sched.current_rates(), initial.clone());

        for step in 0..steps {
            let expected = sched.rate_at(step);
            let lr = sched.advance();
            prop_assert_eq!(lr, expected);
            prop_assert_eq!(sched.current_rate(), sched.current_rate());
            prop_assert_eq!(sched.holder().learning_rates(), vec![lr; initial.len()]);
        }
    }

    #[test]
    fn prop_terminal_rate_holds(
        warmup in 0u64..40,
        idling in 0u64..40,
        annealing in 0u64..40,
        decay in 0u64..40,
        extra in 1u64..100
    ) {
        let config = ScheduleConfig::new(warmup, idling, annealing, decay, 0.01, 0.001, 0.0001)
            .warmup_shape(WarmupShape::Linear);
        let end = config.total_iters();
        let mut sched = OneCycleLR::with_start_step(ParamGroups::single(0.1), config, end).unwrap();
        for _ in 0..extra {
            prop_assert_eq!(sched.advance(), 0.0001);
            prop_assert_eq!(sched.phase(), Some(Phase::Terminal));
        }
    }
}
