//! Constants used across the S-Link transmitter.
//!
//! This module defines the protocol-wide pulse timings, command size limits
//! and the limits of the reference timer (ESP8266 `timer1`).
//!
//! The timings follow the Sony Control-A1 / S-Link conventions: the bus idles
//! high, the transmitter claims it with a long low sync pulse and then sends
//! every bit as a low pulse whose width is the bit value, separated by high
//! delimiter pulses.
//!
//! ## Key Concepts
//!
//! - **Marks**: low pulses. The sync mark announces a command, the one and
//!   zero marks carry data.
//! - **Delimiter**: the high gap following the sync mark and every bit mark.
//! - **Line ready**: how long the bus must stay idle before it may be claimed.
//! - **Loop timeout**: upper bound on the idle wait. The transmitter never hangs.
//!
//! The `_US` constants are microseconds. They are turned into timer ticks by
//! [`TimingConfig`](crate::timer::TimingConfig).

/// Width of the low sync pulse that claims the bus, in microseconds.
pub const SLINK_MARK_SYNC_US: u32 = 2_400;

/// Width of the low pulse encoding a `1` bit, in microseconds.
pub const SLINK_MARK_ONE_US: u32 = 1_200;

/// Width of the low pulse encoding a `0` bit, in microseconds.
pub const SLINK_MARK_ZERO_US: u32 = 600;

/// Width of the high delimiter following the sync mark and every bit, in microseconds.
pub const SLINK_MARK_DELIMITER_US: u32 = 600;

/// How long the bus must be continuously idle before it is claimed, in microseconds.
pub const SLINK_LINE_READY_US: u32 = 3_000;

/// Upper bound on the whole idle wait, in microseconds.
///
/// Once exceeded the transmitter proceeds as if the bus were idle.
pub const SLINK_LOOP_TIMEOUT_US: u32 = 10_000;

/// Delay between two idle polls, in microseconds.
pub const SLINK_LOOP_DELAY_US: u32 = 100;

/// Minimum number of fields in a command (device id and one command id).
pub const SLINK_MIN_FIELDS: usize = 2;

/// Maximum number of fields in a command (device id and up to three command ids).
pub const SLINK_MAX_FIELDS: usize = 4;

/// Bit cursor value at the start of every field. Fields are sent MSB first.
pub const SLINK_FIRST_BIT: u8 = 7;

/// Sentinel marking an absent optional command id in [`Command::from_raw`](crate::command::Command::from_raw).
///
/// Any negative value is treated as absent; this is the canonical one.
pub const SLINK_FIELD_ABSENT: i16 = -1;

/// Largest count the ESP8266 `timer1` can be loaded with (23 bits).
pub const ESP8266_MAX_TIMER_COUNT: u32 = 8_388_607;

/// `timer1` ticks per microsecond on an 80 MHz ESP8266 with `TIM_DIV1`.
pub const ESP8266_TICKS_PER_MICRO: u32 = 80;
