//! # Clock terminal firmware
//! RP2040 side of the terminal. Wires the operator UART, the SPI peer link, the notify pin and the RTC to
//! the control core in the library, then spawns the tasks that drive it.
// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![no_std]
#![no_main]

use crate::task::alarm_tick::alarm_tick;
use crate::task::operator::operator;
use crate::task::peer_link::{SignalTransport, link_completion, peer_link};
use crate::task::rtc_clock::RtcClock;
use crate::task::SharedClockCore;
use assign_resources::assign_resources;
use clock_terminal::clock_core::ClockCore;
use clock_terminal::config::TerminalConfig;
use clock_terminal::peer_link::PeerLink;
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::peripherals::UART0;
use embassy_rp::rtc::Rtc;
use embassy_rp::uart::BufferedInterruptHandler;
use embassy_rp::{Peri, bind_interrupts, peripherals};
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _}; // global logger and panic handler

mod task;

// group the peripherals into resources, each task gets the group it works with
assign_resources! {
    operator_uart: OperatorUartResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
    },
    peer_spi: PeerSpiResources {
        spi: SPI0,
        clk_pin: PIN_18,
        mosi_pin: PIN_19,
        tx_dma_ch: DMA_CH0,
    },
    peer_notify: PeerNotifyResources {
        notify_pin: PIN_6,
    },
    rtc: RtcResources {
        rtc_inst: RTC,
    },
}

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Clock, alarms and peer link, shared by all tasks
static CLOCK_CORE: StaticCell<SharedClockCore> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Program start");

    let p = embassy_rp::init(Default::default());
    let r = split_resources!(p);
    let config = TerminalConfig::default();
    info!("{:?}", config);

    info!("init rtc");
    let clock = RtcClock::new(Rtc::new(r.rtc.rtc_inst));

    info!("init peer link");
    let link = PeerLink::new(SignalTransport);
    let core: &'static SharedClockCore =
        CLOCK_CORE.init(Mutex::new(ClockCore::new(clock, link)));

    spawner.spawn(peer_link(r.peer_spi, config)).unwrap();
    spawner.spawn(link_completion(r.peer_notify, core, config)).unwrap();
    spawner.spawn(alarm_tick(core, config)).unwrap();
    spawner.spawn(operator(r.operator_uart, core, config)).unwrap();
}
