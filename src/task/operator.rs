//! # Operator task
//! Runs the operator session on UART0. A session that fails on the line starts over with a fresh login,
//! a session that ends normally ends the task.
use crate::task::SharedClockCore;
use crate::{Irqs, OperatorUartResources};
use clock_terminal::config::TerminalConfig;
use clock_terminal::menu::{SessionEnd, Terminal};
use defmt::{error, info};
use embassy_rp::uart::{BufferedUart, Config};

#[embassy_executor::task]
pub async fn operator(
    r: OperatorUartResources,
    core: &'static SharedClockCore,
    config: TerminalConfig,
) {
    info!("operator task started");

    let mut uart_config = Config::default();
    uart_config.baudrate = config.uart_baud;

    let mut tx_buffer = [0; 256];
    let mut rx_buffer = [0; 64];

    let mut uart = BufferedUart::new(
        r.uart,
        Irqs,
        r.tx_pin,
        r.rx_pin,
        &mut tx_buffer,
        &mut rx_buffer,
        uart_config,
    );

    loop {
        let mut terminal = Terminal::new(&mut uart, core, &config);
        match terminal.run().await {
            Ok(SessionEnd::Locked) => {
                info!("operator locked out");
                return;
            }
            Ok(SessionEnd::ShutDown) => {
                info!("operator left, alarms keep running");
                return;
            }
            Err(e) => error!("operator session failed: {:?}", e),
        }
    }
}
