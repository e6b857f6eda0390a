//! Controller commands: reboot, device info and the NVS/fault log surface.

use core::fmt::Write;

use super::error::{ConsoleError, EXIT_FAILURE, EXIT_SUCCESS};
use super::registry::{Call, CommandRegistry};
use crate::board::Board;
use crate::config::{find_param, ParamDescriptor, PARAMS, STORAGE_VERSION};
use crate::controller::{ControlError, Controller, Mode};
use crate::log_sink::{COLOR_GREEN, COLOR_RED, COLOR_RESET};
use crate::logging::LogCategory;
use crate::medium::Medium;
use crate::{log_info, log_warn};

pub const HELP_RESET: &str = "Reboot MCU";
pub const HELP_INFO: &str = "Get device info";
pub const HELP_DBG_REPORT: &str = "Report debugging info";
pub const HELP_NVS_SAVE: &str = "Save current non-volatile data into EEPROM";
pub const HELP_NVS_LOAD: &str = "Load non-volatile data from EEPROM";
pub const HELP_NVS_RESET: &str =
    "Reset NVS (erases the version page so the stored data reads as invalid, record pages are kept)";
pub const HELP_NVS_REPORT: &str = "Report NVS contents in human-readable format";
pub const HELP_NVS_TEST: &str = "Test NVS read-write and CRC calculation";
pub const HELP_NVS_DUMP: &str = "Hex dump of the RAM cache";
pub const HELP_ERR_STORE_REPORT: &str = "Print the contents of error memory";
pub const HELP_NVS_GET: &str = "Print one parameter: nvs_get <name>";
pub const HELP_NVS_SET: &str = "Change one parameter in RAM: nvs_set <name> <value> (nvs_save to persist)";

const DUMP_LINE: usize = 16;

/// Register every controller command.
pub fn register_commands<M, B, const N: usize>(
    registry: &mut CommandRegistry<Controller<M, B>, N>,
) -> Result<(), ConsoleError>
where
    M: Medium,
    B: Board,
{
    registry.register("reset", HELP_RESET, Some(reset::<M, B>))?;
    registry.register("info", HELP_INFO, Some(info::<M, B>))?;
    registry.register("dbg_report", HELP_DBG_REPORT, Some(dbg_report::<M, B>))?;
    registry.register("nvs_save", HELP_NVS_SAVE, Some(nvs_save::<M, B>))?;
    registry.register("nvs_load", HELP_NVS_LOAD, Some(nvs_load::<M, B>))?;
    registry.register("nvs_reset", HELP_NVS_RESET, Some(nvs_reset::<M, B>))?;
    registry.register("nvs_report", HELP_NVS_REPORT, Some(nvs_report::<M, B>))?;
    registry.register("nvs_test", HELP_NVS_TEST, Some(nvs_test::<M, B>))?;
    registry.register("nvs_dump", HELP_NVS_DUMP, Some(nvs_dump::<M, B>))?;
    registry.register("err_store_report", HELP_ERR_STORE_REPORT, Some(err_store_report::<M, B>))?;
    registry.register("nvs_get", HELP_NVS_GET, Some(nvs_get::<M, B>))?;
    registry.register("nvs_set", HELP_NVS_SET, Some(nvs_set::<M, B>))
}

/// Reject any argument. Returns `false` after printing the complaint.
fn no_args<C>(call: &Call<'_, C>, out: &mut dyn Write) -> bool {
    if call.args().is_empty() {
        return true;
    }
    let _ = write!(out, "Command \"{}\" takes no argument.\r\n", call.name());
    false
}

/// Print a controller failure and turn it into a status.
fn report(result: Result<(), ControlError>, done: &str, out: &mut dyn Write) -> u8 {
    match result {
        Ok(()) => {
            let _ = write!(out, "{}\r\n", done);
            EXIT_SUCCESS
        }
        Err(e) => {
            let _ = write!(out, "{}{}{}\r\n", COLOR_RED, e, COLOR_RESET);
            e.status()
        }
    }
}

pub fn reset<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    let _ = out.write_str("[END]: System Rebooting\r\n");
    log_info!(LogCategory::Shell, "reboot requested from shell");
    ctl.board_mut().request_reboot();
    EXIT_SUCCESS
}

pub fn info<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    let layout = ctl.store().layout();
    let _ = write!(out, "firmware: {}\r\n", ctl.board().firmware_info());
    let _ = write!(out, "storage version: {}\r\n", STORAGE_VERSION);
    let _ = write!(
        out,
        "layout: version page {}, data pages {}..{}, fault page {}, {} pages\r\n",
        layout.version_page,
        layout.data_start,
        layout.data_end(),
        layout.fault_page,
        layout.total_pages
    );
    EXIT_SUCCESS
}

pub fn dbg_report<M: Medium, B: Board>(
    ctl: &mut Controller<M, B>,
    call: &Call<'_, Controller<M, B>>,
    out: &mut dyn Write,
) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }

    let _ = ctl.board_mut().diagnostics(out);
    match ctl.mode() {
        Mode::Running => {
            let _ = write!(out, "mode: {}running{}\r\n", COLOR_GREEN, COLOR_RESET);
        }
        Mode::FailStop { reason } => {
            let _ = write!(out, "mode: {}fail-stop ({}){}\r\n", COLOR_RED, reason, COLOR_RESET);
        }
    }
    let _ = write!(out, "faults logged: {}\r\n", ctl.faults().count());

    match ctl.audit() {
        Ok(crc) => {
            let _ = write!(out, "EEPROM CRC: 0x{:08X}\r\n", crc);
            EXIT_SUCCESS
        }
        Err(e) => {
            let _ = write!(out, "EEPROM CRC: {}{}{}\r\n", COLOR_RED, e, COLOR_RESET);
            e.status()
        }
    }
}

pub fn nvs_save<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    report(ctl.save_config(), "NVS saved", out)
}

pub fn nvs_load<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    report(ctl.load_config(), "NVS loaded", out)
}

pub fn nvs_reset<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    report(ctl.reset_config(), "NVS version invalidated", out)
}

pub fn nvs_report<M: Medium, B: Board>(
    ctl: &mut Controller<M, B>,
    call: &Call<'_, Controller<M, B>>,
    out: &mut dyn Write,
) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }

    let store = ctl.store();
    let record = store.record();

    match store.stored_version() {
        Some(found) => {
            let _ = write!(out, "stored version: {} (expected {})\r\n", found, STORAGE_VERSION);
        }
        None => {
            let _ = write!(out, "stored version: not read (expected {})\r\n", STORAGE_VERSION);
        }
    }

    for (index, param) in PARAMS.iter().enumerate() {
        let _ = write!(out, "{:<28} = {}", param.name, record.get(index));
        if !param.unit.is_empty() {
            let _ = write!(out, " {}", param.unit);
        }
        let _ = out.write_str("\r\n");
    }

    let (color, state) = if record.is_sealed() {
        (COLOR_GREEN, "valid")
    } else {
        (COLOR_RED, "stale")
    };
    let _ = write!(
        out,
        "CRC: 0x{:08X} {}({}){}\r\n",
        record.stored_crc(),
        color,
        state,
        COLOR_RESET
    );
    EXIT_SUCCESS
}

pub fn nvs_test<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }

    let _ = out.write_str("offset   W    R\r\n");
    let mut differences = 0usize;
    let result = ctl.test_config(|offset, written, read| {
        differences += 1;
        let _ = write!(
            out,
            "{:06}   {:02X}   {}{:02X}{}\r\n",
            offset, written, COLOR_RED, read, COLOR_RESET
        );
    });

    if differences > 0 {
        log_warn!(LogCategory::Nvs, "self-test: {} bytes differ", differences);
    }
    report(result, "NVS test passed, store reset", out)
}

pub fn nvs_dump<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }
    hex_dump(ctl.store().record().as_bytes(), out);
    EXIT_SUCCESS
}

pub fn err_store_report<M: Medium, B: Board>(
    ctl: &mut Controller<M, B>,
    call: &Call<'_, Controller<M, B>>,
    out: &mut dyn Write,
) -> u8 {
    if !no_args(call, out) {
        return EXIT_FAILURE;
    }

    let faults = ctl.faults();
    if faults.is_empty() {
        let _ = out.write_str("error memory is empty\r\n");
        return EXIT_SUCCESS;
    }
    for (seq, entry) in faults.iter() {
        let _ = write!(out, "{}: {}\r\n", seq, entry);
    }
    let _ = write!(out, "{} faults recorded since the log was created\r\n", faults.count());
    EXIT_SUCCESS
}

pub fn nvs_get<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    let [name] = call.args() else {
        let _ = out.write_str("usage: nvs_get <name>\r\n");
        return ConsoleError::ArgumentCount.status();
    };
    let Some((index, param)) = lookup(name, out) else {
        return EXIT_FAILURE;
    };

    print_param(param, ctl.store().record().get(index), out);
    EXIT_SUCCESS
}

pub fn nvs_set<M: Medium, B: Board>(ctl: &mut Controller<M, B>, call: &Call<'_, Controller<M, B>>, out: &mut dyn Write) -> u8 {
    let [name, text] = call.args() else {
        let _ = out.write_str("usage: nvs_set <name> <value>\r\n");
        return ConsoleError::ArgumentCount.status();
    };
    if ctl.ensure_running().is_err() {
        let err = ConsoleError::FailStop;
        let _ = write!(out, "{}{}{}\r\n", COLOR_RED, err, COLOR_RESET);
        return err.status();
    }
    let Some((index, param)) = lookup(name, out) else {
        return EXIT_FAILURE;
    };

    let value = match param.kind.parse(text) {
        Ok(value) => value,
        Err(e) => {
            let err = ConsoleError::from(e);
            let _ = write!(out, "{}{}, expected {}{}\r\n", COLOR_RED, err, param.kind.range(), COLOR_RESET);
            return err.status();
        }
    };

    let record = ctl.store_mut().record_mut();
    record.set(index, value);
    record.seal();
    log_info!(LogCategory::Nvs, "{} set to {}", param.name, value);

    print_param(param, value, out);
    EXIT_SUCCESS
}

fn lookup(name: &str, out: &mut dyn Write) -> Option<(usize, &'static ParamDescriptor)> {
    let found = find_param(name);
    if found.is_none() {
        let _ = write!(out, "unknown parameter \"{}\"\r\n", name);
    }
    found
}

fn print_param(param: &ParamDescriptor, value: crate::config::ParamValue, out: &mut dyn Write) {
    let _ = write!(out, "{} = {}", param.name, value);
    if !param.unit.is_empty() {
        let _ = write!(out, " {}", param.unit);
    }
    let _ = write!(out, " {}\r\n", param.kind.range());
}

/// 16 bytes per line, offset first.
pub fn hex_dump(bytes: &[u8], out: &mut dyn Write) {
    for (line, chunk) in bytes.chunks(DUMP_LINE).enumerate() {
        let _ = write!(out, "{:04X}:", line * DUMP_LINE);
        for byte in chunk {
            let _ = write!(out, " {:02X}", byte);
        }
        let _ = out.write_str("\r\n");
    }
}
