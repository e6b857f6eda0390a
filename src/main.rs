//! eeprom-console entry point.
//!
//! On ESP-IDF the console runs on a UART and the pages live in NVS. On any
//! other target the binary is a host simulator: stdin feeds the input queue,
//! stdout is the terminal and the medium is RAM (kept across `reset`).

use eeprom_console::InputQueue;

/// Bytes from the producer thread to the foreground loop.
static INPUT_QUEUE: InputQueue = InputQueue::new();

#[cfg(target_os = "espidf")]
fn main() {
    if let Err(e) = esp::run() {
        // The console never came up; stdout is the IDF default console
        println!("startup failed: {}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    host::run();
}

#[cfg(target_os = "espidf")]
mod esp {
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::{self as esp_idf_sys, EspError, ESP_FAIL};

    use eeprom_console::hal::{init_console_uart, pump_rx, EspBoard, NvsMedium, UartConfig, UartWriter};
    use eeprom_console::{App, ShellConfig, StoreLayout};

    use super::INPUT_QUEUE;

    /// Foreground loop period.
    const TICK_MS: u32 = 10;

    pub fn run() -> Result<(), EspError> {
        esp_idf_sys::link_patches();

        let peripherals = Peripherals::take()?;
        let partition = EspDefaultNvsPartition::take()?;
        let medium = NvsMedium::new(partition, StoreLayout::DEFAULT.total_pages)?;

        let uart_config = UartConfig::default();
        let (mut tx, rx) = init_console_uart(
            peripherals.uart0,
            peripherals.pins.gpio43,
            peripherals.pins.gpio44,
            &uart_config,
        )?;

        // Producer: the only context besides the foreground loop
        let timeout = uart_config.read_timeout_ticks;
        std::thread::Builder::new()
            .name("uart-rx".into())
            .stack_size(4096)
            .spawn(move || loop {
                pump_rx(&rx, &INPUT_QUEUE, timeout);
            })
            .map_err(|_| EspError::from_infallible::<ESP_FAIL>())?;

        let mut app = App::new(medium, EspBoard::new(), ShellConfig::DEFAULT);
        app.boot();

        loop {
            app.tick(&INPUT_QUEUE, &mut UartWriter::new(&mut tx));
            app.controller_mut().board_mut().restart_if_requested();
            FreeRtos::delay_ms(TICK_MS);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::fmt;
    use std::io::{self, Read, Write as _};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use eeprom_console::{App, HostBoard, MemoryMedium, ShellConfig};

    use super::INPUT_QUEUE;

    const TICK: Duration = Duration::from_millis(5);

    static INPUT_CLOSED: AtomicBool = AtomicBool::new(false);

    /// `fmt::Write` over stdout.
    struct Stdout(io::Stdout);

    impl fmt::Write for Stdout {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)
        }
    }

    pub fn run() {
        thread::spawn(|| {
            for byte in io::stdin().lock().bytes() {
                let Ok(byte) = byte else { break };
                // Pace the producer instead of losing pasted input
                while INPUT_QUEUE.len() >= INPUT_QUEUE.capacity() {
                    thread::sleep(TICK);
                }
                INPUT_QUEUE.push(byte);
            }
            INPUT_CLOSED.store(true, Ordering::Release);
        });

        let mut out = Stdout(io::stdout());
        let mut app = App::new(MemoryMedium::<64>::new(), HostBoard::new(), ShellConfig::DEFAULT);
        app.boot();

        loop {
            app.tick(&INPUT_QUEUE, &mut out);
            let _ = out.0.flush();

            if app.controller_mut().board_mut().take_reboot_request() {
                // Reboot in place: same medium, fresh RAM state
                let (medium, board) = app.into_parts();
                app = App::new(medium, board, ShellConfig::DEFAULT);
                app.boot();
                continue;
            }

            if INPUT_CLOSED.load(Ordering::Acquire) && INPUT_QUEUE.is_empty() {
                app.tick(&INPUT_QUEUE, &mut out);
                let _ = out.0.flush();
                break;
            }
            thread::sleep(TICK);
        }
    }
}
