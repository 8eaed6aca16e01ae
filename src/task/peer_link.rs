//! # Peer link tasks
//! The frame transport on the board. [`SignalTransport`] hands a frame to the [`peer_link`] task, which
//! clocks it out over SPI and reports the end of the transfer to [`link_completion`]. That task runs the
//! completion action registered with the frame and owns the notify pin.
use crate::{PeerNotifyResources, PeerSpiResources};
use crate::task::SharedClockCore;
use clock_terminal::config::TerminalConfig;
use clock_terminal::notification::NotificationFrame;
use clock_terminal::peer_link::{FrameTransport, NotifyPulse};
use core::convert::Infallible;
use defmt::{Debug2Format, debug, info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Delay;

/// Frame waiting to be clocked out. The peer link lets only one frame in flight, so nothing is ever
/// overwritten here.
static OUTBOX: Signal<CriticalSectionRawMutex, NotificationFrame> = Signal::new();

/// The SPI transfer of the frame in flight finished
static TRANSFER_DONE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Frame transport that hands frames to the [`peer_link`] task.
pub struct SignalTransport;

impl FrameTransport for SignalTransport {
    type Error = Infallible;

    fn begin(&mut self, frame: &NotificationFrame) -> Result<(), Self::Error> {
        OUTBOX.signal(frame.clone());
        Ok(())
    }
}

/// Clocks frames out over SPI0, TX only with DMA.
#[embassy_executor::task]
pub async fn peer_link(r: PeerSpiResources, config: TerminalConfig) {
    info!("peer link task started");

    let mut spi_config = spi::Config::default();
    spi_config.frequency = config.spi_freq_hz;
    let mut spi = Spi::new_txonly(r.spi, r.clk_pin, r.mosi_pin, r.tx_dma_ch, spi_config);

    loop {
        let frame = OUTBOX.wait().await;
        if let Err(e) = spi.write(frame.as_bytes()).await {
            // the frame is lost, the link still has to be freed
            warn!("peer link write failed: {:?}", Debug2Format(&e));
        }
        TRANSFER_DONE.signal(());
    }
}

/// Runs the completion action of every finished transfer. The core is released before the pin pulses.
#[embassy_executor::task]
pub async fn link_completion(
    r: PeerNotifyResources,
    core: &'static SharedClockCore,
    config: TerminalConfig,
) {
    info!("link completion task started");
    // idle low, the pulse after an alarm frame tells the peer to look
    let mut pulse = NotifyPulse::new(Output::new(r.notify_pin, Level::Low), Delay, &config);
    loop {
        TRANSFER_DONE.wait().await;
        let event = core.lock().await.on_transfer_complete();
        debug!("transfer complete: {:?}", event);
        pulse.follow(event).await;
    }
}
