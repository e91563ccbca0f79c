//! Threaded simulation of the device: an input task and a render task run
//! concurrently against a scripted keypad, exactly as on the board.
//!
//! The buffer is shared behind a [`Mutex`]; the dirty signal stays outside it
//! so the render task can poll without locking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use multitap_core::config::{LCD_COLS, LCD_ROWS};
use multitap_core::hal::{Clock, Display, Keypad, Readout, Sleep};
use multitap_core::segment::SegmentEcho;
use multitap_core::{
    DirtySignal, Frame, Instant, KeyEvent, KeyScanner, Millis, MultitapDecoder, Position,
    Renderer, TextBuffer, Timing, PHONE_PAD,
};

use crate::script::{self, Step};

type Buffer<'s> = TextBuffer<'s, LCD_ROWS, LCD_COLS>;

/// Wall-clock milliseconds since the simulation started.
struct HostClock(std::time::Instant);

impl Clock for HostClock {
    fn now(&self) -> Instant {
        Instant(self.0.elapsed().as_millis() as u32)
    }
}

struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Millis) {
        thread::sleep(Duration::from_millis(duration.0.into()));
    }
}

/// Keypad whose contacts are driven by the script player.
struct ScriptedKeypad<'a> {
    held: &'a Mutex<KeyEvent>,
}

impl ScriptedKeypad<'_> {
    fn held(&self) -> KeyEvent {
        *self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Keypad for ScriptedKeypad<'_> {
    fn scan_matrix(&mut self) -> Option<Position> {
        match self.held() {
            KeyEvent::Digit(digit) => PHONE_PAD.position_of(digit),
            _ => None,
        }
    }

    fn backspace_active(&mut self) -> bool {
        self.held() == KeyEvent::Backspace
    }
}

/// Shows the segment readout in the progress bar message.
struct ProgressReadout(ProgressBar);

impl Readout for ProgressReadout {
    fn show_digit(&mut self, pattern: u8) {
        self.0.set_message(format!("7seg {:#04x}", pattern));
    }
}

/// Prints each completed frame above the progress bar.
struct TerminalDisplay {
    rows: Vec<String>,
    pb: ProgressBar,
    clock: HostClock,
}

impl TerminalDisplay {
    fn present(&self) {
        let text = if self.rows.is_empty() {
            String::from("(empty)")
        } else {
            self.rows.join(" / ")
        };
        self.pb
            .println(format!("{:>6}ms  {}", self.clock.now().0, text));
    }
}

impl Display for TerminalDisplay {
    fn clear(&mut self) {
        self.rows.clear();
    }

    fn write_row(&mut self, _row: usize, text: &str) {
        self.rows.push(text.to_string());
    }
}

fn lock<'a, 's>(buffer: &'a Mutex<Buffer<'s>>) -> std::sync::MutexGuard<'a, Buffer<'s>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Play `steps` against the two tasks and return the final buffer contents.
pub fn run(steps: &[Step], timing: &Timing, gap: Millis) -> Result<Frame<LCD_ROWS, LCD_COLS>> {
    let dirty = DirtySignal::new();
    let buffer = Mutex::new(Buffer::new(&dirty));
    let held = Mutex::new(KeyEvent::None);
    let script_done = AtomicBool::new(false);
    let input_done = AtomicBool::new(false);
    let started = std::time::Instant::now();

    let pb = ProgressBar::new(steps.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} steps {msg}")?
            .progress_chars("=> "),
    );
    tracing::info!(
        steps = steps.len(),
        expected = %script::duration(steps, gap),
        "starting simulation"
    );

    thread::scope(|s| -> Result<()> {
        let input = s.spawn(|| {
            let keypad = ScriptedKeypad { held: &held };
            let mut scanner = KeyScanner::with_layout(keypad, &PHONE_PAD, timing.debounce_threshold)
                .with_echo(SegmentEcho(ProgressReadout(pb.clone())));
            let mut decoder = MultitapDecoder::with_keymap(&multitap_core::PHONE, timing.tap_timeout);
            let clock = HostClock(started);
            let mut sleep = ThreadSleep;

            while !script_done.load(Ordering::Acquire) {
                let event = scanner.poll();
                if event.is_none() {
                    sleep.sleep(timing.scan_interval);
                    continue;
                }
                if let Err(e) = decoder.enter(event, clock.now(), &mut *lock(&buffer)) {
                    tracing::warn!(?event, "key rejected: {}", e);
                }
                scanner.wait_release(&mut sleep, timing);
            }
            input_done.store(true, Ordering::Release);
        });

        let render = s.spawn(|| {
            let display = TerminalDisplay {
                rows: Vec::new(),
                pb: pb.clone(),
                clock: HostClock(started),
            };
            let mut renderer = Renderer::new(display);
            let mut sleep = ThreadSleep;

            loop {
                let finished = input_done.load(Ordering::Acquire);
                if renderer.try_render(&dirty, || lock(&buffer).snapshot()) {
                    renderer.display().present();
                } else if finished {
                    break;
                } else {
                    sleep.sleep(timing.render_poll);
                }
            }
            renderer.frames()
        });

        let mut sleep = ThreadSleep;
        for step in steps {
            match *step {
                Step::Press { key, hold } => {
                    *held.lock().unwrap_or_else(PoisonError::into_inner) = key;
                    sleep.sleep(hold);
                    *held.lock().unwrap_or_else(PoisonError::into_inner) = KeyEvent::None;
                    sleep.sleep(gap);
                }
                Step::Wait(ms) => sleep.sleep(ms),
            }
            pb.inc(1);
        }
        // Let the input task observe the final release
        sleep.sleep(timing.settle_delay + timing.release_poll);
        script_done.store(true, Ordering::Release);

        input.join().map_err(|_| anyhow!("input task panicked"))?;
        let frames = render.join().map_err(|_| anyhow!("render task panicked"))?;
        pb.finish_with_message(format!("{} frames", frames));
        Ok(())
    })?;

    let frame = lock(&buffer).snapshot();
    Ok(frame)
}

/// Draw `frame` inside an LCD-sized box.
pub fn lcd_box<const ROWS: usize, const COLS: usize>(frame: &Frame<ROWS, COLS>) -> String {
    let border = format!("+{}+", "-".repeat(COLS));
    let mut out = border.clone();
    for row in 0..ROWS {
        out.push_str(&format!("\n|{:<w$}|", frame.row(row), w = COLS));
    }
    out.push('\n');
    out.push_str(&border);
    out
}
