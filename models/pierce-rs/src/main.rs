use std::process::ExitCode;

use log::{error, info};
use pierce::{PierceModel, SimulationConfig};
use pierce_mrp::{Environment, init_logging};

fn run(env: &Environment<SimulationConfig>) -> anyhow::Result<()> {
    let mut config = env.input.clone().unwrap_or_default();
    config.seed = env.seed;
    info!("replicate {} with seed {}", env.replicate, config.seed);

    let output = PierceModel::simulate(&config)?;

    env.write_table("series.csv", &output.series)?;
    env.write_table("r0_summary.csv", &output.r0_summary)?;
    env.write_table("r0_sensitivity.csv", &output.r0_sensitivity)?;
    env.write_table("exclusions.csv", &output.exclusions)?;
    Ok(())
}

fn main() -> ExitCode {
    let env = match Environment::<SimulationConfig>::load() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(env.log_level) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(&env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
