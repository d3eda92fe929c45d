//! EC Probe on RP2350 with USB Calibration Interface
//!
//! Composition demo: the conversion pipeline runs on a fixed one-second
//! tick, calibration commands arrive out-of-band over USB CDC and are
//! funneled to the task owning the engine, so calibration mutation and
//! slope recomputation never interleave with an update cycle.
//!
//! ```text
//!   AdcVoltageSource ─┐
//!   OnboardTempSource ┼─> ConversionPipeline ──> publish (defmt + last-value)
//!   CalibrationEngine ┘         ^ tick (1 s)
//!         ^
//!         └── CalCommand channel <── UsbCdcControl <── host shell
//! ```
//!
//! The calibration store here is in-memory; a deployment provides its own
//! flash- or NVS-backed `CalibrationStore` implementation.

#![no_std]
#![no_main]
#![allow(static_mut_refs)]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use defmt::{info, warn};
use static_cell::StaticCell;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_rp::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Instant, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config};
use {defmt_rtt as _, panic_probe as _};

use ec_probe_rp::adapters::{
    AdcVoltageSource, DefmtDiagnostics, MemorySlotStore, OnboardTempSource, UsbCdcControl,
};
use ec_probe_rp::cal_protocol::{CalCommand, CalResponse, ErrorCode};
use ec_probe_rp::engine::CalibrationEngine;
use ec_probe_rp::pipeline::ConversionPipeline;
use ec_probe_rp::ports::control::ControlPort;
use ec_probe_rp::ports::publish::PublishSink;

/// Fixed update period of the conversion pipeline
const UPDATE_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// Channels for Inter-Task Communication
// ============================================================================

/// Calibration commands from the USB handler to the probe task
static CMD_CHANNEL: Channel<CriticalSectionRawMutex, CalCommand, 4> = Channel::new();

/// Responses from the probe task back to the USB handler
static RESP_CHANNEL: Channel<CriticalSectionRawMutex, CalResponse, 4> = Channel::new();

// ============================================================================
// Last published reading (for the ReadEc command)
// ============================================================================

static HAS_READING: AtomicBool = AtomicBool::new(false);
static LAST_EC_MS_BITS: AtomicU32 = AtomicU32::new(0);
static LAST_VOLTAGE_BITS: AtomicU32 = AtomicU32::new(0);
static LAST_TEMPERATURE_BITS: AtomicU32 = AtomicU32::new(0);

// ============================================================================
// Interrupt Bindings
// ============================================================================

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
    USBCTRL_IRQ => UsbInterruptHandler<peripherals::USB>;
});

// ============================================================================
// Publish Sink
// ============================================================================

/// Publishes over RTT and keeps the last value for the control channel
struct ProbePublish;

impl PublishSink for ProbePublish {
    fn publish(&mut self, ec_ms: f32) {
        LAST_EC_MS_BITS.store(ec_ms.to_bits(), Ordering::Relaxed);
        HAS_READING.store(true, Ordering::Release);
        info!("EC: {} mS/cm", ec_ms);
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) {
    info!("=== EC Probe ===");

    let p = embassy_rp::init(Default::default());

    // Input adapters: probe voltage on GPIO26/ADC0, onboard temperature.
    // The single ADC block is shared between the two sources.
    static ADC: StaticCell<RefCell<Adc<'static, embassy_rp::adc::Blocking>>> = StaticCell::new();
    let adc = &*ADC.init(RefCell::new(Adc::new_blocking(p.ADC, AdcConfig::default())));

    let probe_channel = AdcChannel::new_pin(p.PIN_26, embassy_rp::gpio::Pull::None);
    let voltage_source = AdcVoltageSource::new(adc, probe_channel);

    let temp_channel = AdcChannel::new_temp_sensor(p.ADC_TEMP_SENSOR);
    let temperature_source = OnboardTempSource::new(adc, temp_channel);

    // Engine restored from the (demo, in-memory) calibration store
    let engine = CalibrationEngine::restore(MemorySlotStore::new(), DefmtDiagnostics);
    let pipeline = ConversionPipeline::new(
        voltage_source,
        temperature_source,
        ProbePublish,
        DefmtDiagnostics,
    );

    let usb_class = setup_usb(&spawner, p.USB);

    spawner.spawn(probe_task(engine, pipeline)).expect("probe task");

    control_handler(usb_class).await;
}

// ============================================================================
// USB Setup
// ============================================================================

fn setup_usb(
    spawner: &embassy_executor::Spawner,
    usb: embassy_rp::Peri<'static, peripherals::USB>,
) -> CdcAcmClass<'static, Driver<'static, peripherals::USB>> {
    let driver = Driver::new(usb, Irqs);

    let mut config = Config::new(0x2e8a, 0x000b);
    config.manufacturer = Some("Raspberry Pi");
    config.product = Some("EC Probe");
    config.serial_number = Some("EC0001");
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    static mut CONFIG_DESCRIPTOR: [u8; 256] = [0; 256];
    static mut BOS_DESCRIPTOR: [u8; 256] = [0; 256];
    static mut MSOS_DESCRIPTOR: [u8; 256] = [0; 256];
    static mut CONTROL_BUF: [u8; 64] = [0; 64];
    static mut STATE: State = State::new();

    let mut builder = unsafe {
        Builder::new(
            driver,
            config,
            &mut CONFIG_DESCRIPTOR,
            &mut BOS_DESCRIPTOR,
            &mut MSOS_DESCRIPTOR,
            &mut CONTROL_BUF,
        )
    };

    let class = unsafe { CdcAcmClass::new(&mut builder, &mut STATE, 64) };
    let usb = builder.build();

    // Separate task for reliable enumeration
    spawner.spawn(usb_device_task(usb)).expect("usb device task");

    class
}

#[embassy_executor::task]
async fn usb_device_task(
    mut usb: embassy_usb::UsbDevice<'static, Driver<'static, peripherals::USB>>,
) -> ! {
    info!("USB device task started");
    usb.run().await
}

// ============================================================================
// Probe Task (owns engine + pipeline)
// ============================================================================

type ProbeEngine = CalibrationEngine<MemorySlotStore, DefmtDiagnostics>;
type ProbePipeline = ConversionPipeline<
    AdcVoltageSource<'static>,
    OnboardTempSource<'static>,
    ProbePublish,
    DefmtDiagnostics,
>;

#[embassy_executor::task]
async fn probe_task(mut engine: ProbeEngine, mut pipeline: ProbePipeline) {
    info!("Probe task started");

    let mut next_cycle = Instant::now();

    loop {
        // Calibration commands take priority over the tick
        if let Ok(cmd) = CMD_CHANNEL.try_receive() {
            let response = process_command(&mut engine, cmd);
            RESP_CHANNEL.send(response).await;
            continue;
        }

        if Instant::now() >= next_cycle {
            if let Some((sample, _reading)) = pipeline.run_cycle(engine.calibration()) {
                LAST_VOLTAGE_BITS.store(sample.voltage_v.to_bits(), Ordering::Relaxed);
                LAST_TEMPERATURE_BITS.store(sample.temperature_c.to_bits(), Ordering::Relaxed);
            }
            next_cycle += UPDATE_PERIOD;
            continue;
        }

        Timer::after(Duration::from_millis(10)).await;
    }
}

fn process_command(engine: &mut ProbeEngine, cmd: CalCommand) -> CalResponse {
    match cmd {
        CalCommand::Status => {
            let cal = engine.calibration();
            CalResponse::Status {
                slope: cal.slope(),
                indicator: cal.indicator(),
                low_point_set: cal.low_point_set(),
                high_point_set: cal.high_point_set(),
                calibrated: cal.is_calibrated(),
            }
        }
        CalCommand::CalibrateLow { voltage } => {
            engine.calibrate_low(voltage);
            CalResponse::Ok
        }
        CalCommand::CalibrateHigh { voltage } => {
            engine.calibrate_high(voltage);
            CalResponse::Ok
        }
        CalCommand::ResetIndicator => {
            engine.reset_indicator();
            CalResponse::Ok
        }
        CalCommand::ReadEc => {
            if HAS_READING.load(Ordering::Acquire) {
                CalResponse::Reading {
                    ec_ms: f32::from_bits(LAST_EC_MS_BITS.load(Ordering::Relaxed)),
                    voltage_v: f32::from_bits(LAST_VOLTAGE_BITS.load(Ordering::Relaxed)),
                    temperature_c: f32::from_bits(LAST_TEMPERATURE_BITS.load(Ordering::Relaxed)),
                }
            } else {
                CalResponse::error(ErrorCode::NoReading)
            }
        }
    }
}

// ============================================================================
// Control Handler (uses ControlPort)
// ============================================================================

async fn control_handler(class: CdcAcmClass<'static, Driver<'static, peripherals::USB>>) {
    info!("Control handler started");

    let mut control = UsbCdcControl::new(class);

    loop {
        control.wait_connection().await;
        info!("USB connected");

        if let Err(e) = control.send_ready().await {
            warn!("Failed to send ready: {}", e);
            continue;
        }

        loop {
            match control.receive_command().await {
                Ok(Some(cmd)) => {
                    CMD_CHANNEL.send(cmd).await;
                    let response = RESP_CHANNEL.receive().await;

                    if let Err(e) = control.send_response(&response).await {
                        warn!("Failed to send response: {}", e);
                        break;
                    }
                }
                Ok(None) => {
                    break;
                }
                Err(e) => {
                    warn!("Command receive error: {}", e);
                    break;
                }
            }
        }

        info!("USB disconnected");
    }
}
