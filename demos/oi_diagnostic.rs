// Sensor diagnostic: READ-ONLY poll of every sensor packet
//
// Sends Start (passive mode, no motion) and queries each sensor once.
//
// Usage: cargo run --example oi_diagnostic -- [--port /dev/ttyUSB0] [--config robot.json]

use clap::Parser;
use create_oi_driver::config::DriverConfig;
use create_oi_driver::oi::RobotDriver;

#[derive(Parser, Debug)]
#[command(about = "Poll every sensor once (read-only)")]
struct Args {
    /// Serial port (overrides the config file)
    #[arg(long)]
    port: Option<String>,

    /// JSON driver config
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => DriverConfig::from_json_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    println!("Serial port: {} @ {} baud", config.port, config.baudrate);
    println!();

    println!("Step 1: Opening serial port...");
    let mut driver = match RobotDriver::connect(&config) {
        Ok(driver) => {
            println!("  ✓ Serial port opened successfully");
            driver
        }
        Err(e) => {
            println!("  ✗ Failed to open serial port: {}", e);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the port path is correct");
            println!("  - Verify the USB cable is connected and the robot is powered on");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: Entering passive mode...");
    driver.start()?;
    println!();

    println!("Step 3: Reading sensors...");
    let mut failures = 0;
    for reading in driver.read_all() {
        let name = format!("{:?}", reading.packet);
        if reading.is_failed() {
            failures += 1;
            println!("  ✗ {:<16} no reply", name);
        } else if let Some(bits) = reading.bit_string() {
            println!("  ✓ {:<16} {}", name, bits);
        } else {
            println!("  ✓ {:<16} {}", name, reading.value());
        }
    }
    println!();

    println!("Cliff detected: {}", driver.check_cliffs());
    if failures > 0 {
        println!("{} sensor(s) did not reply - is the robot in Open Interface mode?", failures);
    }

    driver.close();
    Ok(())
}
