//! Keypad scanning with repeat suppression.
//!
//! A press is reported exactly once. After an event the scanner stays latched
//! until the matrix and the backspace input both read released, so a held key
//! never turns into a stream of events.

use crate::config::Timing;
use crate::debounce::Debouncer;
use crate::hal::{Keypad, Sleep};
use crate::key::{KeyEvent, KeypadLayout, PHONE_PAD};
use crate::time::Millis;

/// One reading of every input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sample {
    Released,
    /// Something is held. Unmapped matrix positions read as `KeyEvent::None`.
    Pressed(KeyEvent),
}

/// Observer notified once per emitted key event.
pub trait Echo {
    fn echo(&mut self, event: KeyEvent);
}

/// Echo that does nothing.
pub struct NoEcho;

impl Echo for NoEcho {
    fn echo(&mut self, _event: KeyEvent) {}
}

impl<F: FnMut(KeyEvent)> Echo for F {
    fn echo(&mut self, event: KeyEvent) {
        self(event)
    }
}

pub struct KeyScanner<K, E = NoEcho> {
    keypad: K,
    layout: &'static KeypadLayout,
    echo: E,
    debouncer: Debouncer<Sample>,
    /// Set after an event until every input reads released.
    latched: bool,
}

impl<K: Keypad> KeyScanner<K> {
    /// Phone pad layout, no debounce filtering, no echo.
    pub fn new(keypad: K) -> Self {
        Self::with_layout(keypad, &PHONE_PAD, 1)
    }

    pub fn with_layout(keypad: K, layout: &'static KeypadLayout, debounce_threshold: u8) -> Self {
        Self {
            keypad,
            layout,
            echo: NoEcho,
            debouncer: Debouncer::new(Sample::Released, debounce_threshold),
            latched: false,
        }
    }
}

impl<K: Keypad, E: Echo> KeyScanner<K, E> {
    /// Attach an observer for emitted events (e.g. a segment readout).
    pub fn with_echo<E2: Echo>(self, echo: E2) -> KeyScanner<K, E2> {
        KeyScanner {
            keypad: self.keypad,
            layout: self.layout,
            echo,
            debouncer: self.debouncer,
            latched: self.latched,
        }
    }

    /// Read every input once, without filtering.
    ///
    /// Backspace wins when it is asserted together with a matrix key.
    pub fn sample(&mut self) -> Sample {
        let backspace = self.keypad.backspace_active();
        let position = self.keypad.scan_matrix();

        if backspace {
            return Sample::Pressed(KeyEvent::Backspace);
        }

        match position {
            None => Sample::Released,
            Some(pos) => Sample::Pressed(
                self.layout
                    .lookup(pos)
                    .map_or(KeyEvent::None, KeyEvent::Digit),
            ),
        }
    }

    /// Raw decode of the current inputs. Held keys repeat here; use
    /// [`poll`](Self::poll) for one event per press.
    pub fn scan(&mut self) -> KeyEvent {
        match self.sample() {
            Sample::Released => KeyEvent::None,
            Sample::Pressed(event) => event,
        }
    }

    /// Debounced, edge-triggered scan.
    ///
    /// Returns the event on the first stable scan of a press, then
    /// `KeyEvent::None` until every input has been released.
    pub fn poll(&mut self) -> KeyEvent {
        let raw = self.sample();
        match self.debouncer.update(raw) {
            Sample::Released => {
                self.latched = false;
                KeyEvent::None
            }
            Sample::Pressed(_) if self.latched => KeyEvent::None,
            Sample::Pressed(event) => {
                self.latched = true;
                if !event.is_none() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(?event, "key pressed");
                    self.echo.echo(event);
                }
                event
            }
        }
    }

    /// True while the last press has not been released.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Delay before the next release check: `scan_interval` while a release is
    /// being debounced, `release_poll` otherwise.
    pub fn release_interval(&self, timing: &Timing) -> Millis {
        if self.debouncer.is_settling() {
            timing.scan_interval
        } else {
            timing.release_poll
        }
    }

    /// Block until a key event arrives, sleeping `scan_interval` between scans.
    pub fn wait_press<S: Sleep>(&mut self, sleep: &mut S, timing: &Timing) -> KeyEvent {
        loop {
            let event = self.poll();
            if !event.is_none() {
                return event;
            }
            sleep.sleep(timing.scan_interval);
        }
    }

    /// Block until every input is released.
    ///
    /// Waits `settle_delay` first, then re-checks every `release_poll`. Once a
    /// release starts to register, the debounce streak runs at `scan_interval`.
    pub fn wait_release<S: Sleep>(&mut self, sleep: &mut S, timing: &Timing) {
        sleep.sleep(timing.settle_delay);
        loop {
            self.poll();
            if !self.latched {
                return;
            }
            sleep.sleep(self.release_interval(timing));
        }
    }

    pub fn echo_mut(&mut self) -> &mut E {
        &mut self.echo
    }
}
