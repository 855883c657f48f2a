//! Board pin assignments
//!
//! Raspberry Pi Pico wiring:
//!
//! | Signal        | GPIO |
//! |---------------|------|
//! | UART0 TX      | 0    |
//! | UART0 RX      | 1    |
//! | Shoulder STEP | 2    |
//! | Shoulder DIR  | 3    |
//! | Elbow STEP    | 4    |
//! | Elbow DIR     | 5    |

use embassy_rp::peripherals::{PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, UART0};
use embassy_rp::{Peri, Peripherals};

/// Peripherals used by the arm, taken out of [`Peripherals`]
pub struct Board {
    pub uart: Peri<'static, UART0>,
    pub uart_tx: Peri<'static, PIN_0>,
    pub uart_rx: Peri<'static, PIN_1>,
    pub shoulder_step: Peri<'static, PIN_2>,
    pub shoulder_dir: Peri<'static, PIN_3>,
    pub elbow_step: Peri<'static, PIN_4>,
    pub elbow_dir: Peri<'static, PIN_5>,
}

impl Board {
    pub fn new(p: Peripherals) -> Self {
        Self {
            uart: p.UART0,
            uart_tx: p.PIN_0,
            uart_rx: p.PIN_1,
            shoulder_step: p.PIN_2,
            shoulder_dir: p.PIN_3,
            elbow_step: p.PIN_4,
            elbow_dir: p.PIN_5,
        }
    }
}
