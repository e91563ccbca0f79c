mod decode;
mod script;
mod sim;
mod table;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use multitap_core::{Millis, Timing, PHONE, PHONE_PAD};
use std::fs;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multitap-cli")]
#[command(about = "Multi-tap keypad text entry: keymap viewer and host simulator")]
struct Cli {
    /// Log decoder transitions (-v) and redraws (-vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the keypad layout with the characters on each key
    Keys,
    /// Decode a key script on a virtual timeline and print the text
    Decode {
        /// Key script, or @path to read it from a file
        script: String,
        #[command(flatten)]
        timing: TimingArgs,
    },
    /// Run the input and render tasks on threads against a scripted keypad
    Simulate {
        /// Key script, or @path to read it from a file
        script: String,
        #[command(flatten)]
        timing: TimingArgs,
    },
}

#[derive(Args)]
struct TimingArgs {
    /// Multi-tap timeout in milliseconds
    #[arg(long, default_value_t = multitap_core::config::TAP_TIMEOUT.0)]
    tap_timeout: u32,
    /// Render task poll interval in milliseconds
    #[arg(long, default_value_t = multitap_core::config::RENDER_POLL.0)]
    render_poll: u32,
    /// Consecutive scans required to accept a key reading
    #[arg(long, default_value_t = multitap_core::config::DEBOUNCE_THRESHOLD)]
    debounce: u8,
    /// Pause between releasing a key and pressing the next, in milliseconds
    #[arg(long, default_value_t = script::DEFAULT_GAP.0)]
    gap: u32,
}

impl TimingArgs {
    fn timing(&self) -> Timing {
        Timing {
            tap_timeout: Millis(self.tap_timeout),
            render_poll: Millis(self.render_poll),
            debounce_threshold: self.debounce,
            ..Timing::DEFAULT
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Inline script text, or the contents of the file named after `@`.
fn load_script(arg: &str) -> Result<Vec<script::Step>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
        None => arg.to_string(),
    };
    script::parse(&text).context("parsing key script")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Keys => {
            print!("{}", table::keypad_table(&PHONE_PAD, &PHONE));
        }
        Command::Decode { script, timing } => {
            let steps = load_script(&script)?;
            let decoded = decode::replay(&steps, &timing.timing(), Millis(timing.gap));
            println!("{}", sim::lcd_box(&decoded.frame));
            if decoded.rejected > 0 {
                eprintln!("{} key press(es) rejected", decoded.rejected);
            }
        }
        Command::Simulate { script, timing } => {
            let steps = load_script(&script)?;
            let frame = sim::run(&steps, &timing.timing(), Millis(timing.gap))
                .context("running simulation")?;
            println!("{}", sim::lcd_box(&frame));
        }
    }

    Ok(())
}
