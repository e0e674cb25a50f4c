// Drive test: short, slow motion sequence
//
// Usage: cargo run --example oi_drive_test -- [--port /dev/ttyUSB0]
//
// Safety features:
// - Explicit confirmation before any motion
// - Cliff check before moving
// - Zero-speed drive and Stop on exit

use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

use clap::Parser;
use create_oi_driver::config::DriverConfig;
use create_oi_driver::oi::{RobotDriver, SerialChannel};

#[derive(Parser, Debug)]
#[command(about = "Slow motion test (moves the robot)")]
struct Args {
    #[arg(long, default_value = create_oi_driver::config::DEFAULT_PORT)]
    port: String,

    /// Forward speed in cm/s
    #[arg(long, default_value_t = 5.0)]
    speed: f64,
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().eq_ignore_ascii_case("y")
}

fn stop_robot(driver: &mut RobotDriver<SerialChannel>) -> Result<(), Box<dyn std::error::Error>> {
    driver.halt()?;
    driver.stop()?;
    println!("  ✓ Robot stopped");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let config = DriverConfig::with_port(&args.port);

    println!("⚠  This tool WILL move the robot. Clear at least one meter around it.");
    println!("Serial port: {}", config.port);
    println!();

    if !confirm("Is the area around the robot clear?") {
        return Ok(());
    }

    let mut driver = RobotDriver::connect(&config)?;
    driver.start()?;
    driver.safe()?;
    driver.set_start_song()?;
    driver.set_warning_song()?;
    driver.play_start_song()?;
    sleep(Duration::from_millis(500));

    if driver.check_cliffs() {
        println!("  ✗ Cliff detected - aborting");
        driver.play_warning_song()?;
        return stop_robot(&mut driver);
    }

    println!("Step 1: Turn in place 90° counter-clockwise");
    if !confirm("Proceed?") {
        return stop_robot(&mut driver);
    }
    driver.go(0.0, 90.0)?;
    sleep(Duration::from_secs(1));
    driver.halt()?;
    println!("  Angle reading: {}", driver.read_angle().value());

    println!("Step 2: Straight line at {} cm/s for 1 s", args.speed);
    if !confirm("Proceed?") {
        return stop_robot(&mut driver);
    }
    driver.go(args.speed, 0.0)?;
    sleep(Duration::from_secs(1));
    driver.halt()?;
    println!("  Distance reading: {}", driver.read_distance().value());

    stop_robot(&mut driver)
}
