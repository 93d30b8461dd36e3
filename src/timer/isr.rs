use crate::command::Command;
use crate::driver::SlinkDriver;
use crate::error::SlinkError;
use crate::line::BusLine;
use crate::timer::{OneShotTimer, TimingConfig};
use core::cell::RefCell;
use critical_section::Mutex;

/// A driver shared between the main context and the timer interrupt.
pub type GlobalSlinkDriver<L, T> = Mutex<RefCell<Option<SlinkDriver<L, T>>>>;

/// Used to initialize the global static `SlinkDriver` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use slink::timer::{global_slink_driver_init, GlobalSlinkDriver};
/// use some_hal::{FlexPin, Timer1};
///
/// static SLINK_DRIVER: GlobalSlinkDriver<FlexPin, Timer1> = global_slink_driver_init();
/// ```
pub const fn global_slink_driver_init<L: BusLine, T: OneShotTimer>() -> GlobalSlinkDriver<L, T> {
    Mutex::new(RefCell::new(None))
}

/// Creates the driver inside the global static (Initialize).
///
/// # Arguments
/// * The global static `SlinkDriver`
/// * The bus line
/// * The single-shot timer
/// * The pulse timing, in ticks of that timer
///
/// # Errors
/// Any error of [`SlinkDriver::new`]; the global is left empty.
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     global_slink_driver_setup(&SLINK_DRIVER, line, timer1, TimingConfig::default()).unwrap();
/// }
/// ```
pub fn global_slink_driver_setup<L: BusLine, T: OneShotTimer>(
    global_driver: &'static GlobalSlinkDriver<L, T>,
    line: L,
    timer: T,
    timing: TimingConfig,
) -> Result<(), SlinkError<L::Error>> {
    let driver = SlinkDriver::new(line, timer, timing)?;
    critical_section::with(|cs| {
        let _ = global_driver.borrow(cs).replace(Some(driver));
    });
    Ok(())
}

/// Starts sending a command through the global driver.
///
/// # Errors
/// - [`SlinkError::Uninitialized`] if [`global_slink_driver_setup`] has not run
/// - any error of [`SlinkDriver::send`]
pub fn global_slink_send<L: BusLine, T: OneShotTimer>(
    global_driver: &'static GlobalSlinkDriver<L, T>,
    command: &Command,
) -> Result<(), SlinkError<L::Error>> {
    critical_section::with(|cs| match global_driver.borrow(cs).borrow_mut().as_mut() {
        Some(driver) => driver.send(command),
        None => Err(SlinkError::Uninitialized),
    })
}

/// Runs the next transmission step from the timer interrupt.
///
/// Errors cannot be reported from interrupt context; the driver has already
/// aborted the transmission and counted it in `tx_failed`.
///
/// # Arguments
/// * The global static `SlinkDriver`
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIMER1() {
///     global_slink_timer_expired(&SLINK_DRIVER);
/// }
/// ```
pub fn global_slink_timer_expired<L: BusLine, T: OneShotTimer>(
    global_driver: &'static GlobalSlinkDriver<L, T>,
) {
    critical_section::with(|cs| {
        if let Some(driver) = global_driver.borrow(cs).borrow_mut().as_mut() {
            let _ = driver.on_timer_expired();
        }
    });
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::driver::TxState;
    use crate::line::mock::MockLine;
    use crate::timer::mock::FakeTimer;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};

    static UNINITIALIZED: GlobalSlinkDriver<MockLine, FakeTimer> = global_slink_driver_init();

    #[test]
    fn test_send_before_setup_is_rejected() {
        let command = Command::new(0x90, 0x00, None, None).unwrap();
        assert_eq!(
            global_slink_send(&UNINITIALIZED, &command),
            Err(SlinkError::Uninitialized)
        );
        global_slink_timer_expired(&UNINITIALIZED);
    }

    #[test]
    fn test_global_driver_first_step() {
        static DRIVER: GlobalSlinkDriver<MockLine, FakeTimer> = global_slink_driver_init();

        let line = MockLine::new(PinMock::new(&[PinTransaction::get(PinState::High)]));
        global_slink_driver_setup(&DRIVER, line, FakeTimer::new(1), TimingConfig::from_ticks_per_micro(1))
            .unwrap();

        let command = Command::new(0x90, 0x00, None, None).unwrap();
        global_slink_send(&DRIVER, &command).unwrap();
        assert_eq!(
            global_slink_send(&DRIVER, &command),
            Err(SlinkError::Busy)
        );

        critical_section::with(|cs| {
            let mut cell = DRIVER.borrow(cs).borrow_mut();
            let driver = cell.as_mut().unwrap();
            assert_eq!(driver.state(), TxState::LineCheck);
            assert_eq!(driver.timer.armed, Some(100));
            driver.line.done();
        });
    }
}
