#![no_main]
#![no_std]
#![feature(type_alias_impl_trait)]

use core::sync::atomic::{AtomicUsize, Ordering};

use defmt::{debug, error, info, trace, warn, Debug2Format};
use defmt_brtt as _; // global logger
use panic_probe as _;
use quadrino_gps::{nmea::MAX_SENTENCE_LEN, DriverConfig, QuadrinoGps, Sentence};
use rtic_monotonics::{create_systick_token, systick::Systick};
use rtic_sync::{
    channel::{Receiver, Sender},
    make_channel,
};
use stm32_usbd::UsbBus;
use stm32l4xx_hal::{
    self as hal,
    gpio::{Alternate, OpenDrain, PA10, PA9},
    i2c::{self, I2c},
    pac,
    pac::I2C1,
    prelude::*,
    rcc::{ClockSecuritySystem, CrystalBypass},
};
use tinyvec::ArrayVec;
use usb_device::{
    device::{UsbDeviceBuilder, UsbVidPid},
    UsbError,
};
use usbd_serial::{SerialPort, USB_CLASS_CDC};

type GpsI2c = I2c<I2C1, (PA9<Alternate<OpenDrain, 4>>, PA10<Alternate<OpenDrain, 4>>)>;

const CONFIG: DriverConfig = DriverConfig::new();

const SENTENCE_QUEUE: usize = 4;
const USB_POLL_MS: u32 = 10;

static SENT_COUNTER: AtomicUsize = AtomicUsize::new(0);
static DROPPED_COUNTER: AtomicUsize = AtomicUsize::new(0);

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

static COUNT: AtomicUsize = AtomicUsize::new(0);
defmt::timestamp!("{=usize}", {
    // NOTE(no-CAS) `timestamps` runs with interrupts disabled
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});

#[rtic::app(
    device = stm32l4xx_hal::pac,
    dispatchers = [EXTI2, EXTI3],
)]
mod app {
    use super::*;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(cx: init::Context) -> (Shared, Local) {
        trace!("init enter");

        let mut flash = cx.device.FLASH.constrain();
        let mut rcc = cx.device.RCC.constrain();
        let mut pwr = cx.device.PWR.constrain(&mut rcc.apb1r1);
        let clocks = rcc
            .cfgr
            .lse(CrystalBypass::Disable, ClockSecuritySystem::Disable)
            .freeze(&mut flash.acr, &mut pwr);

        // Create SysTick monotonic for task scheduling
        Systick::start(cx.core.SYST, clocks.sysclk().raw(), create_systick_token!());

        let mut gpioa = cx.device.GPIOA.split(&mut rcc.ahb2);

        // Initialize I2C for GPS: PA9 = SCL, PA10 = SDA
        let mut scl = gpioa
            .pa9
            .into_alternate_open_drain(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrh);
        scl.internal_pull_up(&mut gpioa.pupdr, true);
        let mut sda = gpioa
            .pa10
            .into_alternate_open_drain(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrh);
        sda.internal_pull_up(&mut gpioa.pupdr, true);

        let i2c: GpsI2c = I2c::i2c1(
            cx.device.I2C1,
            (scl, sda),
            i2c::Config::new(100.kHz(), clocks),
            &mut rcc.apb1r1,
        );

        // Initialize USB Serial
        let dm = gpioa
            .pa11
            .into_alternate(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrh);
        let dp = gpioa
            .pa12
            .into_alternate(&mut gpioa.moder, &mut gpioa.otyper, &mut gpioa.afrh);

        // Turn on USB power
        unsafe {
            pac::Peripherals::steal()
                .PWR
                .cr2
                .modify(|_, w| w.usv().set_bit())
        };

        let usb = hal::usb::Peripheral {
            usb: cx.device.USB,
            pin_dm: dm,
            pin_dp: dp,
        };

        let (sentence_tx, sentence_rx) = make_channel!(Sentence, SENTENCE_QUEUE);

        // Spawn tasks
        usb_poll::spawn(usb, sentence_rx).map_err(|_| ()).unwrap();
        gps_task::spawn(i2c, sentence_tx).map_err(|_| ()).unwrap();

        info!("done initializing! {}", CONFIG);
        trace!("init exit");
        (Shared {}, Local {})
    }

    #[idle]
    fn idle(_: idle::Context) -> ! {
        trace!("idle enter");

        loop {
            // Only sleep in release mode, since the debugger doesn't interact with sleep very nicely
            #[cfg(debug_assertions)]
            cortex_m::asm::nop();
            #[cfg(not(debug_assertions))]
            cortex_m::asm::wfi();
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Periodic tasks //////////////////////////////////////////////////////////
    ////////////////////////////////////////////////////////////////////////////

    // Poll the GPS registers and queue NMEA sentences for the host
    #[task(priority = 2)]
    async fn gps_task(
        _cx: gps_task::Context,
        i2c: GpsI2c,
        mut sentences: Sender<'static, Sentence, SENTENCE_QUEUE>,
    ) {
        trace!("gps_task enter");

        let mut gps = QuadrinoGps::new(i2c, &CONFIG);
        loop {
            // Bus errors are not retried here, the next tick reads again
            match gps.poll_sentences() {
                Ok(rendered) => {
                    for sentence in rendered {
                        debug!("{}", sentence);
                        if sentences.try_send(sentence).is_err() {
                            DROPPED_COUNTER.fetch_add(1, Ordering::Relaxed);
                            warn!("sentence queue full, dropping sentence");
                        }
                    }
                }
                Err(e) => error!("GPS error: {}", Debug2Format(&e)),
            }

            Systick::delay(CONFIG.poll_interval_ms.millis()).await;
        }
    }

    // Poll USB; the CDC port plays the part of the tty
    #[task(priority = 1)]
    async fn usb_poll(
        _cx: usb_poll::Context,
        usb: hal::usb::Peripheral,
        mut sentences: Receiver<'static, Sentence, SENTENCE_QUEUE>,
    ) {
        trace!("usb_poll enter");

        let usb_bus = UsbBus::new(usb);

        let mut serial = SerialPort::new(&usb_bus);

        let mut usb_dev = UsbDeviceBuilder::new(&usb_bus, UsbVidPid(0x16c0, 0x27dd))
            .manufacturer("Flying Einstein")
            .product("Quadrino GPS")
            .serial_number("0001")
            .device_class(USB_CLASS_CDC)
            .build();

        let mut tx_buf = ArrayVec::<[u8; MAX_SENTENCE_LEN]>::new();
        let mut is_open = false;

        loop {
            Systick::delay(USB_POLL_MS.millis()).await;

            usb_dev.poll(&mut [&mut serial]);

            // We don't write back to the GPS, so whatever the host sends is
            // accepted and thrown away
            let mut discard = [0u8; 64];
            while let Ok(count) = serial.read(&mut discard) {
                if count == 0 {
                    break;
                }
                trace!("discarded {} bytes from host", count);
            }

            // Host asserts DTR while it has the port open
            let open = serial.dtr();
            if open != is_open {
                is_open = open;
                if open {
                    info!("serial port opened");
                } else {
                    info!(
                        "serial port closed after {} sentences, {} dropped",
                        SENT_COUNTER.load(Ordering::Relaxed),
                        DROPPED_COUNTER.load(Ordering::Relaxed),
                    );
                    tx_buf.clear();
                }
            }

            // Sentences are only taken whole, and thrown away while nobody listens
            while tx_buf.is_empty() {
                let Ok(sentence) = sentences.try_recv() else {
                    break;
                };
                if is_open {
                    tx_buf.extend_from_slice(sentence.as_bytes());
                    SENT_COUNTER.fetch_add(1, Ordering::Relaxed);
                } else {
                    DROPPED_COUNTER.fetch_add(1, Ordering::Relaxed);
                }
            }

            if tx_buf.is_empty() {
                continue;
            }

            match serial.write(&tx_buf) {
                Ok(count) => {
                    trace!("sent {} bytes to usb", count);
                    tx_buf.drain(0..count).for_each(|_| ());
                }
                Err(UsbError::WouldBlock) => (),
                Err(_) => error!("usb error"),
            }
        }
    }
}
