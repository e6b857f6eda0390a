//! Parameter table.
//!
//! Every persisted parameter occupies one 32-bit little-endian word of the
//! record, at `index * 4`. Floats are stored as their IEEE-754 bit pattern,
//! flags and enumerations as small integers.

use core::fmt;

/// How a parameter word is interpreted and which values it accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    U32 { min: u32, max: u32 },
    F32 { min: f32, max: f32 },
    Bool,
    /// Integer selector in `0..=max`.
    Enum { max: u32 },
}

/// Decoded parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    U32(u32),
    F32(f32),
    Bool(bool),
}

/// Rejected parameter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("cannot parse value")]
    Parse,
    #[error("value out of range")]
    OutOfRange,
}

impl ParamValue {
    /// Raw record word.
    pub fn to_word(self) -> u32 {
        match self {
            ParamValue::U32(v) => v,
            ParamValue::F32(v) => v.to_bits(),
            ParamValue::Bool(v) => v as u32,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::U32(v) => write!(f, "{}", v),
            ParamValue::F32(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", *v as u8),
        }
    }
}

impl ParamKind {
    /// Interpret a raw record word.
    pub fn decode(&self, word: u32) -> ParamValue {
        match self {
            ParamKind::U32 { .. } | ParamKind::Enum { .. } => ParamValue::U32(word),
            ParamKind::F32 { .. } => ParamValue::F32(f32::from_bits(word)),
            ParamKind::Bool => ParamValue::Bool(word != 0),
        }
    }

    /// Parse console text into a value of this kind, range checked.
    pub fn parse(&self, text: &str) -> Result<ParamValue, ParamError> {
        match *self {
            ParamKind::U32 { min, max } => {
                let v = parse_u32(text)?;
                if v < min || v > max {
                    return Err(ParamError::OutOfRange);
                }
                Ok(ParamValue::U32(v))
            }
            ParamKind::Enum { max } => {
                let v = parse_u32(text)?;
                if v > max {
                    return Err(ParamError::OutOfRange);
                }
                Ok(ParamValue::U32(v))
            }
            ParamKind::F32 { min, max } => {
                let v: f32 = text.parse().map_err(|_| ParamError::Parse)?;
                if !v.is_finite() || v < min || v > max {
                    return Err(ParamError::OutOfRange);
                }
                Ok(ParamValue::F32(v))
            }
            ParamKind::Bool => match text {
                "1" | "true" | "on" => Ok(ParamValue::Bool(true)),
                "0" | "false" | "off" => Ok(ParamValue::Bool(false)),
                _ => Err(ParamError::Parse),
            },
        }
    }

    /// Human-readable range, for `nvs_get` output.
    pub fn range(&self) -> RangeDisplay {
        RangeDisplay(*self)
    }
}

/// Formats the accepted range of a kind.
pub struct RangeDisplay(ParamKind);

impl fmt::Display for RangeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ParamKind::U32 { min, max } => write!(f, "[{}..{}]", min, max),
            ParamKind::F32 { min, max } => write!(f, "[{}..{}]", min, max),
            ParamKind::Bool => f.write_str("[0|1]"),
            ParamKind::Enum { max } => write!(f, "[0..{}]", max),
        }
    }
}

fn parse_u32(text: &str) -> Result<u32, ParamError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| ParamError::Parse)
}

/// One persisted parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub unit: &'static str,
}

impl ParamDescriptor {
    const fn float(name: &'static str, unit: &'static str, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            kind: ParamKind::F32 { min, max },
            default: ParamValue::F32(default),
            unit,
        }
    }

    const fn uint(name: &'static str, unit: &'static str, min: u32, max: u32, default: u32) -> Self {
        Self {
            name,
            kind: ParamKind::U32 { min, max },
            default: ParamValue::U32(default),
            unit,
        }
    }

    const fn choice(name: &'static str, max: u32, default: u32) -> Self {
        Self {
            name,
            kind: ParamKind::Enum { max },
            default: ParamValue::U32(default),
            unit: "",
        }
    }

    const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            unit: "",
        }
    }
}

/// All persisted parameters, in record order.
///
/// Appending is safe; reordering or removing entries changes the record
/// layout and requires bumping `STORAGE_VERSION`.
pub const PARAMS: &[ParamDescriptor] = &[
    ParamDescriptor::choice("casement_config", 2, 0),
    ParamDescriptor::uint("motion_timeout", "us", 1_000_000, 600_000_000, 30_000_000),
    ParamDescriptor::uint("homing_timeout", "us", 1_000_000, 600_000_000, 90_000_000),
    ParamDescriptor::float("homing_speed_0", "m/s", 0.001, 1.0, 0.02),
    ParamDescriptor::float("homing_speed_1", "m/s", 0.001, 1.0, 0.02),
    ParamDescriptor::float("jog_speed_0", "m/s", 0.001, 2.0, 0.2),
    ParamDescriptor::float("jog_speed_1", "m/s", 0.001, 2.0, 0.2),
    ParamDescriptor::float("accel_0", "m/s2", 0.001, 5.0, 0.05),
    ParamDescriptor::float("accel_1", "m/s2", 0.001, 5.0, 0.05),
    ParamDescriptor::float("encoder_m_per_count_0", "m", 0.000_000_1, 0.01, 0.0001),
    ParamDescriptor::float("encoder_m_per_count_1", "m", 0.000_000_1, 0.01, 0.0001),
    ParamDescriptor::float("kp_0", "", 0.0, 100.0, 5.0),
    ParamDescriptor::float("ki_0", "", 0.0, 100.0, 0.1),
    ParamDescriptor::float("min_power_0", "", 0.0, 1.0, 0.1),
    ParamDescriptor::float("brake_scaling_0", "", 0.0, 10.0, 2.0),
    ParamDescriptor::float("kp_1", "", 0.0, 100.0, 5.0),
    ParamDescriptor::float("ki_1", "", 0.0, 100.0, 0.1),
    ParamDescriptor::float("min_power_1", "", 0.0, 1.0, 0.1),
    ParamDescriptor::float("brake_scaling_1", "", 0.0, 10.0, 2.0),
    ParamDescriptor::choice("main_dir_0", 1, 0),
    ParamDescriptor::choice("main_dir_1", 1, 0),
    ParamDescriptor::choice("encoder_dir_0", 1, 0),
    ParamDescriptor::choice("encoder_dir_1", 1, 0),
    ParamDescriptor::float("main_current_limit_0", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::float("main_current_limit_1", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::float("main_power_limit_0", "", 0.0, 1.0, 0.9),
    ParamDescriptor::float("main_power_limit_1", "", 0.0, 1.0, 0.9),
    ParamDescriptor::float("open_distance_0", "m", 0.0, 10.0, 1.0),
    ParamDescriptor::float("closed_distance_0", "m", 0.0, 10.0, 0.0),
    ParamDescriptor::float("partial_open_distance_0", "m", 0.0, 10.0, 0.5),
    ParamDescriptor::float("open_distance_1", "m", 0.0, 10.0, 1.0),
    ParamDescriptor::float("closed_distance_1", "m", 0.0, 10.0, 0.0),
    ParamDescriptor::float("partial_open_distance_1", "m", 0.0, 10.0, 0.5),
    ParamDescriptor::float("hard_brake_time", "s", 0.0, 10.0, 2.0),
    ParamDescriptor::float("position_precision", "m", 0.0, 1.0, 0.005),
    ParamDescriptor::float("velocity_precision", "m/s", 0.0, 1.0, 0.002),
    ParamDescriptor::float("aux_power_0", "", 0.0, 1.0, 0.5),
    ParamDescriptor::float("aux_power_1", "", 0.0, 1.0, 0.5),
    ParamDescriptor::float("aux_power_2", "", 0.0, 1.0, 0.5),
    ParamDescriptor::float("aux_power_3", "", 0.0, 1.0, 0.5),
    ParamDescriptor::choice("aux_dir_0", 1, 0),
    ParamDescriptor::choice("aux_dir_1", 1, 0),
    ParamDescriptor::choice("aux_dir_2", 1, 0),
    ParamDescriptor::choice("aux_dir_3", 1, 0),
    ParamDescriptor::float("aux_current_limit_0", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::float("aux_current_limit_1", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::float("aux_current_limit_2", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::float("aux_current_limit_3", "A", 0.0, 10.0, 2.0),
    ParamDescriptor::flag("seal_enabled", false),
    ParamDescriptor::float("vent_target_pressure", "bar", 0.0, 5.0, 0.05),
    ParamDescriptor::float("pump_max_pressure", "bar", 0.0, 5.0, 1.3),
    ParamDescriptor::float("pump_min_pressure", "bar", 0.0, 5.0, 1.1),
    ParamDescriptor::flag("steps_enabled", false),
    ParamDescriptor::flag("steps_dual", false),
    ParamDescriptor::uint("coproc_gpio_out_invert", "", 0, 0x3F, 0),
];

/// Number of persisted parameters.
pub const PARAM_COUNT: usize = PARAMS.len();

/// Look up a parameter by exact name.
pub fn find_param(name: &str) -> Option<(usize, &'static ParamDescriptor)> {
    PARAMS.iter().enumerate().find(|(_, p)| p.name == name)
}

/// Parameter names, in record order.
pub fn param_names() -> impl Iterator<Item = &'static str> + Clone {
    PARAMS.iter().map(|p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique() {
        for (i, a) in PARAMS.iter().enumerate() {
            for b in &PARAMS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_defaults_within_range() {
        for p in PARAMS {
            let text = match p.default {
                ParamValue::U32(v) => v,
                ParamValue::Bool(v) => v as u32,
                ParamValue::F32(_) => continue,
            };
            let mut buf = heapless::String::<16>::new();
            core::fmt::write(&mut buf, format_args!("{}", text)).unwrap();
            assert!(p.kind.parse(&buf).is_ok(), "{}", p.name);
        }
    }

    #[test]
    fn test_parse_ranges() {
        let kind = ParamKind::U32 { min: 10, max: 20 };
        assert_eq!(kind.parse("15"), Ok(ParamValue::U32(15)));
        assert_eq!(kind.parse("0x10"), Ok(ParamValue::U32(16)));
        assert_eq!(kind.parse("9"), Err(ParamError::OutOfRange));
        assert_eq!(kind.parse("abc"), Err(ParamError::Parse));

        let kind = ParamKind::F32 { min: 0.0, max: 1.0 };
        assert_eq!(kind.parse("0.25"), Ok(ParamValue::F32(0.25)));
        assert_eq!(kind.parse("1.5"), Err(ParamError::OutOfRange));
        assert_eq!(kind.parse("nan"), Err(ParamError::OutOfRange));

        assert_eq!(ParamKind::Bool.parse("on"), Ok(ParamValue::Bool(true)));
        assert_eq!(ParamKind::Bool.parse("2"), Err(ParamError::Parse));
        assert_eq!(ParamKind::Enum { max: 2 }.parse("3"), Err(ParamError::OutOfRange));
    }

    #[test]
    fn test_word_encoding() {
        assert_eq!(ParamValue::F32(1.0).to_word(), 0x3F80_0000);
        assert_eq!(ParamKind::F32 { min: 0.0, max: 2.0 }.decode(0x3F80_0000), ParamValue::F32(1.0));
        assert_eq!(ParamKind::Bool.decode(7), ParamValue::Bool(true));
    }

    #[test]
    fn test_find_param() {
        let (idx, p) = find_param("kp_0").unwrap();
        assert_eq!(p.name, "kp_0");
        assert_eq!(PARAMS[idx].name, "kp_0");
        assert!(find_param("kp_9").is_none());
    }
}
