//! # slink
//!
//! A portable, no_std Rust transmitter for the Sony Control-A1 / S-Link
//! control bus, the single-wire link used by Sony CD changers, tape decks and
//! receivers to exchange remote-control commands.
//!
//! The transmitter is driven entirely by a single-shot hardware timer, so the
//! main loop is never blocked while a command is on the wire:
//! - `embedded-hal` traits for the bus line
//! - a small [`timer::OneShotTimer`] trait for the hardware timer
//! - interrupt-safe driver access with `critical-section`
//! - an optional blocking runner using `embedded_hal::delay::DelayNs`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` |
//! | `delay-loop`          | Blocking [`timer::run_until_done`] over `DelayNs` |
//! | `timer-isr` (default) | `critical_section` based global driver helpers and macros |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Protocol
//!
//! - The bus idles high. The transmitter waits until it has been idle for 3 ms
//!   (giving up after 10 ms) before claiming it
//! - A 2.4 ms low sync pulse starts every command
//! - Each bit is a low mark, 1.2 ms for `1` and 0.6 ms for `0`, followed by a
//!   0.6 ms high delimiter
//! - A command is a device id and one to three command ids, each sent MSB first
//!
//! ## Usage
//!
//! ```rust,ignore
//! use slink::{init_slink_driver, setup_slink_driver, send_slink_command, slink_timer_expired};
//!
//! init_slink_driver!(MyFlexPin, MyTimer1);
//!
//! fn main() {
//!     setup_slink_driver!(line, timer1).unwrap();
//!     send_slink_command!(0x90, 0x2E).unwrap(); // CD player: play
//! }
//!
//! #[interrupt]
//! fn TIMER1() {
//!     slink_timer_expired!();
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Only one command can be in flight per driver; sending while busy fails
//!   with [`error::SlinkError::Busy`]
//! - Timing precision is critical; keep the timer interrupt short and high priority
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod fmt;

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

pub mod command;
pub mod consts;
pub mod driver;
pub mod encoding;
pub mod error;
pub mod idle;
pub mod line;
pub mod sync;
pub mod timer;
