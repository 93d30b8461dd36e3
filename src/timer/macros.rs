/// Declares a static global `SLINK_DRIVER` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `SLINK_DRIVER` suitable for use in
/// interrupt-based environments, where both the main thread and the timer ISR
/// need to safely access the shared driver state.
///
/// # Arguments
/// - `$line`: The concrete type of the bus line (must implement `BusLine`)
/// - `$timer`: The concrete type of the timer (must implement `OneShotTimer`)
///
/// # Example
/// ```rust,ignore
/// init_slink_driver!(MyFlexPin, MyTimer1);
/// ```
#[macro_export]
macro_rules! init_slink_driver {
    ( $line:ty, $timer:ty ) => {
        pub static SLINK_DRIVER: $crate::timer::GlobalSlinkDriver<$line, $timer> =
            $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Initializes the global `SLINK_DRIVER` singleton with a new driver instance.
///
/// Evaluates to the `Result` of [`SlinkDriver::new`](crate::driver::SlinkDriver::new).
///
/// # Arguments
/// - `$line`: The bus line
/// - `$timer`: The single-shot timer
/// - `$timing`: Optional [`TimingConfig`](crate::timer::TimingConfig); defaults to
///   `TimingConfig::default()`
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_slink_driver!(line, timer1).unwrap();
/// }
/// ```
///
/// # Notes
/// - Requires `init_slink_driver!` to have been used earlier.
#[macro_export]
macro_rules! setup_slink_driver {
    ( $line:expr, $timer:expr ) => {
        $crate::setup_slink_driver!($line, $timer, $crate::timer::TimingConfig::default())
    };
    ( $line:expr, $timer:expr, $timing:expr ) => {
        $crate::timer::global_slink_driver_setup(&SLINK_DRIVER, $line, $timer, $timing)
    };
}

/// Starts sending a command through the global `SLINK_DRIVER`.
///
/// Accepts the same arguments as
/// [`SlinkDriver::send_command`](crate::driver::SlinkDriver::send_command) and
/// evaluates to its `Result`.
///
/// # Example
/// ```rust,ignore
/// send_slink_command!(0x90, 0x2E).unwrap();
/// send_slink_command!(0x90, 0x2E, 0x01).unwrap();
/// ```
#[macro_export]
macro_rules! send_slink_command {
    ( $device:expr, $cmd1:expr ) => {
        $crate::send_slink_command!(@send $device, $cmd1, None, None)
    };
    ( $device:expr, $cmd1:expr, $cmd2:expr ) => {
        $crate::send_slink_command!(@send $device, $cmd1, Some($cmd2), None)
    };
    ( $device:expr, $cmd1:expr, $cmd2:expr, $cmd3:expr ) => {
        $crate::send_slink_command!(@send $device, $cmd1, Some($cmd2), Some($cmd3))
    };
    ( @send $device:expr, $cmd1:expr, $cmd2:expr, $cmd3:expr ) => {
        $crate::command::Command::new($device, $cmd1, $cmd2, $cmd3)
            .map_err($crate::error::SlinkError::from)
            .and_then(|command| $crate::timer::global_slink_send(&SLINK_DRIVER, &command))
    };
}

/// Runs the next step of the global `SLINK_DRIVER` if it has been initialized.
///
/// This macro is intended to be invoked from the timer ISR each time the
/// single-shot countdown armed by the driver expires.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER1() {
///     slink_timer_expired!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `SLINK_DRIVER` was declared with `init_slink_driver!`
///   and initialized via `setup_slink_driver!`.
/// - Safe to call repeatedly; it does nothing if the driver hasn't been set up yet.
#[macro_export]
macro_rules! slink_timer_expired {
    () => {
        $crate::timer::global_slink_timer_expired(&SLINK_DRIVER)
    };
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use crate::driver::TxState;
    use crate::line::mock::MockLine;
    use crate::timer::TimingConfig;
    use crate::timer::mock::FakeTimer;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    init_slink_driver!(MockLine, FakeTimer);

    #[test]
    fn test_macros_drive_global_driver() {
        let line = MockLine::new(PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
        ]));
        setup_slink_driver!(line, FakeTimer::new(1), TimingConfig::from_ticks_per_micro(1))
            .unwrap();

        send_slink_command!(0x90, 0x2E).unwrap();
        critical_section::with(|cs| {
            let mut cell = SLINK_DRIVER.borrow(cs).borrow_mut();
            let driver = cell.as_mut().unwrap();
            assert!(driver.timer.fire());
        });
        slink_timer_expired!();

        critical_section::with(|cs| {
            let mut cell = SLINK_DRIVER.borrow(cs).borrow_mut();
            let driver = cell.as_mut().unwrap();
            assert_eq!(driver.state(), TxState::LineCheck);
            assert_eq!(driver.timer.history, vec![100, 100]);
            assert_eq!(driver.pending().fields(), &[0x90, 0x2E]);
            driver.line.done();
        });
    }
}
