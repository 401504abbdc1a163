#![deny(warnings)]

//! Interactive terminal front-end for the factory simulation.
//!
//! Renders the monthly state table, reads commands from stdin, dispatches
//! them to the engine, and reports the final net worth once month 12 is
//! reached.

use anyhow::Result;
use sim_core::{validate_factory, ItemSlot, TransactionError};
use sim_econ::MarketRng;
use sim_runtime::Engine;
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Top-level menu commands.
///
/// `Display` is accepted input with no handler; the table re-renders at
/// the top of the next month pass anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Display,
    Purchase,
    Manufacture,
    Sell,
}

/// Outcome of a sub-menu selection prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Selection {
    Item(ItemSlot),
    Back,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut chars = line.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c.to_ascii_uppercase() {
        'O' => Some(Command::Display),
        'B' => Some(Command::Purchase),
        'M' => Some(Command::Manufacture),
        'S' => Some(Command::Sell),
        _ => None,
    }
}

fn parse_selection(line: &str) -> Option<Selection> {
    let mut chars = line.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match c.to_ascii_uppercase() {
        'Q' => Some(Selection::Back),
        '1'..='3' => ItemSlot::new(c as usize - '1' as usize).map(Selection::Item),
        _ => None,
    }
}

fn parse_quantity(line: &str) -> Option<u32> {
    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    line.parse().ok()
}

/// One interactive game session over arbitrary input/output streams.
struct Session<M: MarketRng, I: BufRead, O: Write> {
    engine: Engine<M>,
    input: I,
    out: O,
}

impl<M: MarketRng, I: BufRead, O: Write> Session<M, I, O> {
    fn new(engine: Engine<M>, input: I, out: O) -> Self {
        Self { engine, input, out }
    }

    /// Run the month loop to completion and report the final net worth.
    fn run(&mut self) -> io::Result<()> {
        while !self.engine.is_over() {
            self.render()?;
            match self.read_command()? {
                Command::Display => {}
                Command::Purchase => self.purchase_menu()?,
                Command::Manufacture => self.manufacture_menu()?,
                Command::Sell => self.sell_menu()?,
            }
            // Every top-level command consumes the month, `O` included.
            self.engine.advance_month();
        }
        writeln!(self.out, "Your net worth is ${}", self.engine.net_worth())
    }

    fn render(&mut self) -> io::Result<()> {
        let f = self.engine.factory();
        writeln!(self.out, "Item:  Materials: Product:")?;
        for slot in ItemSlot::ALL {
            let i = slot.index();
            writeln!(
                self.out,
                "{}{:7} ${}{:7} ${}",
                slot, f.resources[i], f.resource_cost[i], f.finished_products[i], f.product_value[i]
            )?;
        }
        writeln!(self.out, "Month {}, you have ${}", f.month, f.cash)?;
        writeln!(
            self.out,
            "Manufacturing costs are ${}/unit",
            f.manufacturing_cost
        )
    }

    /// Prompt until `parse` accepts a line. Malformed input re-prompts
    /// silently; EOF surfaces as `UnexpectedEof`.
    fn prompt<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Option<T>) -> io::Result<T> {
        loop {
            write!(self.out, "{prompt}")?;
            self.out.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input stream closed",
                ));
            }
            if let Some(value) = parse(line.trim()) {
                return Ok(value);
            }
        }
    }

    fn read_command(&mut self) -> io::Result<Command> {
        self.prompt("Transaction (O,B,M,S) ? ", parse_command)
    }

    fn read_selection(&mut self, what: &str) -> io::Result<Selection> {
        let text = format!("{what} (Q to return) ? ");
        self.prompt(&text, parse_selection)
    }

    fn purchase_menu(&mut self) -> io::Result<()> {
        loop {
            let slot = match self.read_selection("Which material to purchase")? {
                Selection::Back => return Ok(()),
                Selection::Item(slot) => slot,
            };
            let f = self.engine.factory();
            let ask = format!(
                "That costs ${}/unit, you have ${}. How many to purchase? ",
                f.resource_cost[slot.index()],
                f.cash
            );
            let quantity = self.prompt(&ask, parse_quantity)?;
            match self.engine.purchase(slot, quantity) {
                Ok(()) => {}
                Err(TransactionError::InsufficientFunds { needed, .. }) => writeln!(
                    self.out,
                    "Purchasing {quantity} units would cost {needed}, you have insufficient funds!"
                )?,
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
    }

    fn manufacture_menu(&mut self) -> io::Result<()> {
        loop {
            let slot = match self.read_selection("Which material to manufacture")? {
                Selection::Back => return Ok(()),
                Selection::Item(slot) => slot,
            };
            let f = self.engine.factory();
            let ask = format!(
                "Manufacturing costs ${}/unit, you have ${}. How many to manufacture? ",
                f.manufacturing_cost, f.cash
            );
            let quantity = self.prompt(&ask, parse_quantity)?;
            match self.engine.manufacture(slot, quantity) {
                Ok(()) => {}
                Err(TransactionError::InsufficientFunds { needed, .. }) => writeln!(
                    self.out,
                    "Manufacturing {quantity} units would cost {needed}, you have insufficient funds!"
                )?,
                Err(TransactionError::InsufficientMaterials { .. }) => writeln!(
                    self.out,
                    "You have insufficient materials to manufacture that much!"
                )?,
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
    }

    fn sell_menu(&mut self) -> io::Result<()> {
        loop {
            let slot = match self.read_selection("Which product to sell")? {
                Selection::Back => return Ok(()),
                Selection::Item(slot) => slot,
            };
            let f = self.engine.factory();
            let ask = format!(
                "You have {} units, of that product, they sell for ${}/unit. How many to sell? ",
                f.finished_products[slot.index()],
                f.product_value[slot.index()]
            );
            let quantity = self.prompt(&ask, parse_quantity)?;
            match self.engine.sell(slot, quantity) {
                Ok(()) => {}
                Err(TransactionError::InsufficientStock { .. }) => writeln!(
                    self.out,
                    "You have insufficient products to sell that much!"
                )?,
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
    }
}

fn parse_args() -> Option<u64> {
    let mut seed: Option<u64> = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => seed = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    seed
}

fn main() -> Result<()> {
    // Logging setup; default stays quiet so the game text is readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let seed = parse_args().unwrap_or_else(sim_econ::random_seed);
    info!(seed, git_sha = env!("GIT_SHA"), "starting factory session");

    let engine = Engine::from_seed(seed);
    validate_factory(engine.factory())?;

    let stdin = io::stdin();
    let mut session = Session::new(engine, stdin.lock(), io::stdout());
    session.run()?;
    Ok(())
}
