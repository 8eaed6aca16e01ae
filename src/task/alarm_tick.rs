//! # Alarm tick task
//! Compares the alarm slots against the RTC once per tick.
use crate::task::SharedClockCore;
use clock_terminal::config::TerminalConfig;
use defmt::{info, warn};
use embassy_time::{Duration, Ticker};

#[embassy_executor::task]
pub async fn alarm_tick(core: &'static SharedClockCore, config: TerminalConfig) {
    info!("alarm tick task started");
    let mut ticker = Ticker::every(Duration::from_millis(config.tick_ms));
    loop {
        ticker.next().await;
        let mut core = core.lock().await;
        if core.is_halted() {
            info!("terminal halted, alarm ticks stop");
            return;
        }
        match core.tick() {
            Ok(0) => {}
            Ok(sent) => info!("{} alarm notification(s) sent", sent),
            Err(e) => warn!("alarm tick skipped: {:?}", e),
        }
    }
}
