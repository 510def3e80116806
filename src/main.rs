//! TiltKeyer firmware entry point.
//!
//! 1. Bring up the board (fatal on any error)
//! 2. Start the log drain thread
//! 3. Run the transcription task at a fixed period, forever

#[cfg(target_os = "espidf")]
mod board;

#[cfg(target_os = "espidf")]
fn main() {
    use esp_idf_svc::hal::delay::FreeRtos;
    use tilt_morse_keyer::{rt_info, Config, Transcriber, FAULT_STATE, LOG_STREAM, SERIAL_RX};

    esp_idf_svc::sys::link_patches();
    println!("{}", env!("VERSION_STRING"));

    let config = Config::default();
    board::spawn_log_drain();

    let hw = match board::init(&config) {
        Ok(hw) => hw,
        Err(e) => {
            println!("[ERROR] {}", e);
            panic!("board init failed: {}", e);
        }
    };

    let mut keyer = Transcriber::new(config, hw, &SERIAL_RX, &LOG_STREAM, &FAULT_STATE);
    rt_info!(LOG_STREAM, board::now_us(), "ready, tick {} ms", config.run.tick_period_ms);

    let period_us = config.tick_period_us();
    loop {
        let start = board::now_us();
        keyer.tick(start);

        let elapsed = board::now_us() - start;
        let remaining_ms = ((period_us - elapsed).max(0) / 1000) as u32;
        FreeRtos::delay_ms(remaining_ms.max(1));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!(
        "{}: firmware image, build for an ESP-IDF target to run",
        env!("VERSION_STRING")
    );
}
