/// Live monitoring from detector verdicts on stdin
use super::helpers::ConfigArgs;
use anyhow::Result;
use eyebreak_core::{EyeMonitor, LineFrameSource, LogSink, SystemClock};
use tokio::io::{stdin, BufReader};

pub async fn run_command(args: &ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    let frames = LineFrameSource::spawn(BufReader::new(stdin()));

    let mut monitor =
        EyeMonitor::from_config(&config, Box::new(SystemClock), Box::new(frames), LogSink)?;

    log::info!(
        "Reading eye verdicts from stdin at up to {} frames/s",
        config.frame_rate
    );
    monitor.run_with_signals().await?;

    let status = monitor.status(chrono::Utc::now());
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
