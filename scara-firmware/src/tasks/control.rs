//! Arm control task
//!
//! Runs the control loop forever: one non-blocking pass, then a yield so
//! the executor can service the rest of the firmware. Step timing comes
//! from how often this loop gets round, so nothing else should hold the
//! executor for long.

use defmt::*;
use embassy_futures::yield_now;
use embassy_time::{Delay, Duration, Instant};

use scara_core::ArmController;
use scara_drivers::StepDirDriver;
use scara_hal::UartTx;
use scara_hal_rp2040::{BufferedRx, BufferedTx, RpOutput};
use scara_protocol::MoveCommand;

/// Step/direction driver on two GPIO outputs
pub type AxisDriver = StepDirDriver<RpOutput<'static>, RpOutput<'static>, Delay>;

/// The arm as wired on this board
pub type Arm = ArmController<AxisDriver, AxisDriver>;

/// Period of the link statistics report
const STATS_INTERVAL: Duration = Duration::from_secs(60);

/// Control task - polls the command link and steps both joints
#[embassy_executor::task]
pub async fn control_task(mut arm: Arm, mut rx: BufferedRx, mut echo: Option<BufferedTx>) {
    info!("Control task started");

    let mut next_report = Instant::now() + STATS_INTERVAL;

    loop {
        let now = Instant::now();
        let now_us = now.as_micros();

        if now >= next_report {
            next_report = now + STATS_INTERVAL;
            debug!(
                "Link: {} rx errors={}, positions={}",
                arm.reader().stats(),
                rx.errors(),
                arm.positions()
            );
        }

        if let Some(cmd) = arm.tick(&mut rx, now_us) {
            debug!("Move: shoulder={} elbow={}", cmd.shoulder, cmd.elbow);
            if let Some(tx) = echo.as_mut() {
                send_echo(tx, &cmd);
            }
        }

        yield_now().await;
    }
}

/// Write the debug echo line for an accepted command
fn send_echo(tx: &mut BufferedTx, cmd: &MoveCommand) {
    match cmd.echo_line() {
        Ok(line) => {
            if let Err(e) = tx.write_blocking(line.as_bytes()) {
                warn!("Echo write failed: {:?}", e);
            }
        }
        Err(_) => warn!("Echo line too long"),
    }
}
