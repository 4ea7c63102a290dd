use std::process::ExitCode;

use anyhow::Context;
use env_logger::Env;
use pricecheck::{
    configuration::get_configuration,
    domain::verdict::ComparisonVerdict,
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    match run(&configuration).await {
        Ok(ComparisonVerdict::Pass { left, right }) => {
            log::info!(
                "PASS: {} ₹{} vs {} ₹{}",
                left.retailer,
                left.price,
                right.retailer,
                right.price
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(ComparisonVerdict::Fail(reason)) => {
            log::error!("FAIL: {}", reason);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            log::error!("FAIL: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
