// Print a full one-cycle schedule, one line per step.
//
//   RUST_LOG=debug cargo run --example schedule

use shrew_onecycle::{LrScheduler, OneCycleLR, ParamGroups, ScheduleConfig, WarmupShape};

const BAR_WIDTH: f64 = 60.0;

fn main() -> shrew_onecycle::Result<()> {
    env_logger::init();

    let config = ScheduleConfig::new(6, 8, 56, 100, 0.01, 0.001, 0.0001)
        .warmup_start_rate(0.0001)
        .warmup_shape(WarmupShape::Exponential);
    let peak = config.peak_rate();
    // Extra steps to show the terminal plateau.
    let steps = config.total_iters() + 30;

    let mut sched = OneCycleLR::new(ParamGroups::single(1e-3), config)?;
    let boundaries = sched.boundaries();
    for step in 0..steps {
        let lr = sched.advance();
        let phase = boundaries.phase_at(step);
        let bar = "#".repeat((lr / peak * BAR_WIDTH).round() as usize);
        println!("{step:4} {phase:<9} {lr:.6e} {bar}");
    }

    Ok(())
}
