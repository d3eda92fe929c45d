//! EC Probe Host Shell
//!
//! This binary runs on your PC and provides an interactive shell to
//! calibrate and read the EC probe over USB.
//!
//! ## Usage
//!
//! ```bash
//! # List available serial ports
//! cargo run --bin ec_host -- --list-ports
//!
//! # Connect to device (auto-detects the Raspberry Pi VID)
//! cargo run --bin ec_host
//!
//! # Connect to specific port
//! cargo run --bin ec_host -- --port /dev/ttyACM0
//! ```
//!
//! ## Commands
//!
//! - `status` - Show calibration state (slope, indicator, points)
//! - `cal-low <volts>` - Record the 1413 µS/cm reference point
//! - `cal-high <volts>` - Record the 12.88 mS/cm reference point
//! - `reset` - Clear the calibrated indicator
//! - `read` - Show the most recently published EC value
//! - `help` - Show help
//! - `exit` - Exit shell
//!
//! ## Calibration procedure
//!
//! ```bash
//! # Immerse the probe in the 1413 µS/cm solution, note the voltage
//! # (status / read show it), then:
//! cal-low 0.512
//! # Rinse, immerse in the 12.88 mS/cm solution, then:
//! cal-high 1.986
//! status        # indicator should now be true
//! ```

use std::io::{self, Read, Write};
use std::time::Duration;

use ec_probe_rp::cal_protocol::{CalCommand, CalResponse};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.contains(&"--list-ports".to_string()) {
        list_ports();
        return Ok(());
    }

    let port_name = if let Some(idx) = args.iter().position(|a| a == "--port") {
        args.get(idx + 1).cloned()
    } else {
        find_probe_port()
    };

    let port_name = match port_name {
        Some(name) => name,
        None => {
            eprintln!("Error: No EC probe found");
            eprintln!("Use --list-ports to see available ports");
            eprintln!("Or specify port with --port <PORT>");
            return Err("No device found".into());
        }
    };

    print!("Connecting to {}...", port_name);
    io::stdout().flush()?;

    let mut port = serialport::new(&port_name, 115_200)
        .timeout(Duration::from_millis(2000))
        .flow_control(serialport::FlowControl::None)
        .open()?;

    println!(" opened!");

    // Set DTR (Data Terminal Ready) - the device waits for this
    port.write_data_terminal_ready(true)?;
    println!("Waiting for device ready...");

    // Wait for the ready response (COBS-encoded, ends with 0x00)
    let mut ready = false;
    let mut rx_buf = vec![0u8; 256];
    let mut rx_pos = 0;

    for _ in 0..10 {
        std::thread::sleep(Duration::from_millis(100));
        if let Ok(n) = port.read(&mut rx_buf[rx_pos..]) {
            if n > 0 {
                rx_pos += n;
                if rx_buf[..rx_pos].contains(&0x00) {
                    if let Ok(CalResponse::Ok) = postcard::from_bytes_cobs(&mut rx_buf) {
                        ready = true;
                        break;
                    }
                }
            }
        }
    }

    if !ready {
        println!("Warning: Did not receive ready signal from device");
        println!("Proceeding anyway...");
    } else {
        println!("Device ready!");
    }

    println!("\nEC Probe Calibration Shell");
    println!("Type 'help' for commands, 'exit' to quit\n");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "exit" || input == "quit" {
            break;
        }

        if input == "help" {
            print_help();
            continue;
        }

        match parse_command(input) {
            Ok(cmd) => {
                if let Err(e) = execute_command(&mut port, cmd) {
                    eprintln!("Error: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn list_ports() {
    println!("Available serial ports:");
    match serialport::available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                println!("  (none)");
            }
            for port in ports {
                print!("  {}", port.port_name);
                match &port.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        println!(" - USB (VID: 0x{:04x}, PID: 0x{:04x})", info.vid, info.pid);
                        if let Some(ref product) = info.product {
                            println!("      Product: {}", product);
                        }
                    }
                    other => println!(" - {:?}", other),
                }
            }
        }
        Err(e) => {
            eprintln!("Error listing ports: {}", e);
        }
    }
}

fn find_probe_port() -> Option<String> {
    let ports = serialport::available_ports().ok()?;

    for port in ports {
        if let serialport::SerialPortType::UsbPort(info) = &port.port_type {
            // Raspberry Pi vendor ID
            if info.vid == 0x2e8a {
                return Some(port.port_name);
            }
        }
    }

    None
}

fn parse_command(input: &str) -> Result<CalCommand, String> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts[0] {
        "status" | "info" => Ok(CalCommand::Status),

        "cal-low" | "low" => {
            let voltage = parse_voltage(&parts)?;
            Ok(CalCommand::CalibrateLow { voltage })
        }

        "cal-high" | "high" => {
            let voltage = parse_voltage(&parts)?;
            Ok(CalCommand::CalibrateHigh { voltage })
        }

        "reset" => Ok(CalCommand::ResetIndicator),

        "read" | "ec" => Ok(CalCommand::ReadEc),

        cmd => Err(format!("Unknown command: {}", cmd)),
    }
}

fn parse_voltage(parts: &[&str]) -> Result<f32, String> {
    if parts.len() < 2 {
        return Err(format!("Usage: {} <volts>", parts[0]));
    }
    parts[1]
        .parse::<f32>()
        .map_err(|_| format!("Invalid voltage '{}'", parts[1]))
}

fn execute_command(
    port: &mut Box<dyn serialport::SerialPort>,
    cmd: CalCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    // Serialize command with COBS encoding (includes 0x00 terminator)
    let cmd_bytes = postcard::to_stdvec_cobs(&cmd)?;

    port.write_all(&cmd_bytes)?;
    port.flush()?;

    // Receive COBS-encoded response (read until the 0x00 sentinel)
    let mut rx_buf = vec![];
    let mut byte = [0u8; 1];

    loop {
        match port.read(&mut byte) {
            Ok(1) => {
                rx_buf.push(byte[0]);
                if byte[0] == 0x00 {
                    break;
                }
                if rx_buf.len() > 4096 {
                    return Err("Response too large".into());
                }
            }
            Ok(_) => {
                if !rx_buf.is_empty() {
                    break;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                if !rx_buf.is_empty() {
                    break;
                }
                return Err("Timed out waiting for response".into());
            }
            Err(e) => {
                return Err(e.into());
            }
        }
    }

    let response: CalResponse = postcard::from_bytes_cobs(&mut rx_buf)?;
    display_response(&response);

    Ok(())
}

fn display_response(response: &CalResponse) {
    match response {
        CalResponse::Ok => {
            println!("OK");
        }

        CalResponse::Error { code } => {
            eprintln!("Device error: {:?}", code);
        }

        CalResponse::Status {
            slope,
            indicator,
            low_point_set,
            high_point_set,
            calibrated,
        } => {
            println!("\nCalibration Status:");
            println!("{:-<40}", "");
            println!("K-value (slope):    {:.2} uS/cm per V", slope);
            println!("Indicator:          {}", if *indicator { "set" } else { "clear" });
            println!("Low point (1413):   {}", point_state(*low_point_set));
            println!("High point (12880): {}", point_state(*high_point_set));
            println!("Calibrated output:  {}", if *calibrated { "ACTIVE" } else { "default map" });
            println!("{:-<40}", "");
        }

        CalResponse::Reading {
            ec_ms,
            voltage_v,
            temperature_c,
        } => {
            println!("\nLatest Reading:");
            println!("{:-<40}", "");
            println!("EC:           {:.3} mS/cm", ec_ms);
            println!("Probe:        {:.3} V", voltage_v);
            println!("Temperature:  {:.2} °C", temperature_c);
            println!("{:-<40}", "");
        }
    }
}

fn point_state(set: bool) -> &'static str {
    if set {
        "recorded"
    } else {
        "not recorded (this session)"
    }
}

fn print_help() {
    println!("Commands:");
    println!("  status             - Show calibration state");
    println!("  cal-low <volts>    - Record the 1413 uS/cm reference point");
    println!("  cal-high <volts>   - Record the 12.88 mS/cm reference point");
    println!("  reset              - Clear the calibrated indicator");
    println!("  read               - Show the most recent EC value");
    println!("  help               - Show this help");
    println!("  exit               - Exit shell");
    println!();
    println!("Typical two-point calibration:");
    println!("  read               - note the probe voltage in the low solution");
    println!("  cal-low 0.512");
    println!("  read               - note the probe voltage in the high solution");
    println!("  cal-high 1.986");
    println!("  status             - indicator should now be set");
}
