//! SCARA arm firmware
//!
//! Receives `M <shoulder> <elbow>` step targets over UART0 and drives the
//! two joint steppers to them with trapezoidal speed profiles.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Level;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use scara_core::ArmController;
use scara_drivers::{StepDirConfig, StepDirDriver};
use scara_hal::UartConfig;
use scara_hal_rp2040::uart::to_rp_config;
use scara_hal_rp2040::{BufferedRx, BufferedTx, RpOutput};

use crate::board::Board;
use crate::config::load_config;

mod board;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SCARA firmware starting...");

    let p = embassy_rp::init(Default::default());
    let board = Board::new(p);
    info!("Peripherals initialized");

    let config = load_config();

    // Command link, 8N1
    let uart_config = to_rp_config(&UartConfig::with_baudrate(config.serial.baud_rate));

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(board.uart, board.uart_tx, board.uart_rx, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", config.serial.baud_rate);

    Timer::after_millis(u64::from(config.startup_delay_ms)).await;

    let shoulder = StepDirDriver::new(
        RpOutput::new(board.shoulder_step, Level::Low),
        RpOutput::new(board.shoulder_dir, Level::Low),
        Delay,
        StepDirConfig::from(&config.shoulder),
    );
    let elbow = StepDirDriver::new(
        RpOutput::new(board.elbow_step, Level::Low),
        RpOutput::new(board.elbow_dir, Level::Low),
        Delay,
        StepDirConfig::from(&config.elbow),
    );

    let arm: tasks::Arm = ArmController::from_config(&config, shoulder, elbow);
    info!("Axes initialized");

    let echo = if config.serial.echo {
        info!("Debug echo enabled");
        Some(BufferedTx::new(tx))
    } else {
        None
    };

    spawner
        .spawn(tasks::control_task(arm, BufferedRx::new(rx), echo))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do
    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
