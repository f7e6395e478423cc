use crate::console::Console;
use crate::store::CardStore;
use crate::transfer::{export_file, import_file};
use anyhow::Result;
use chrono::Local;
use log::*;
use rand::Rng;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

pub const PROMPT: &str =
    "Input the action (add, remove, import, export, ask, exit, log, hardest card, reset stats):";
pub const FAREWELL: &str = "Bye bye!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Remove,
    Import,
    Export,
    Ask,
    Exit,
    Log,
    HardestCard,
    ResetStats,
}

impl Command {
    pub fn parse(keyword: &str) -> Option<Self> {
        let command = match keyword {
            "add" => Command::Add,
            "remove" => Command::Remove,
            "import" => Command::Import,
            "export" => Command::Export,
            "ask" => Command::Ask,
            "exit" => Command::Exit,
            "log" => Command::Log,
            "hardest card" => Command::HardestCard,
            "reset stats" => Command::ResetStats,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    /// `exit` was entered or the input ran out
    Exited,
}

/// read a line or leave the command with `State::Exited` at end of input
macro_rules! line_or_exit {
    ($read:expr) => {
        match $read? {
            Some(line) => line,
            None => return Ok(State::Exited),
        }
    };
}

pub struct Session<R, W, G> {
    store: CardStore,
    console: Console<R, W>,
    rng: G,
}

impl<R: BufRead, W: Write, G: Rng> Session<R, W, G> {
    pub fn new(input: R, output: W, rng: G) -> Self {
        Self::with_store(CardStore::new(), input, output, rng)
    }

    pub fn with_store(store: CardStore, input: R, output: W, rng: G) -> Self {
        Self {
            store,
            console: Console::new(input, output),
            rng,
        }
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    pub fn into_parts(self) -> (CardStore, Console<R, W>) {
        (self.store, self.console)
    }

    /// Command loop; returns after `exit` or end of input
    pub fn run(&mut self) -> Result<()> {
        while self.step()? == State::Idle {}
        self.console.say(FAREWELL)
    }

    pub fn step(&mut self) -> Result<State> {
        let keyword = line_or_exit!(self.console.ask(PROMPT));
        let Some(command) = Command::parse(&keyword) else {
            debug!("ignoring {keyword:?}");
            return Ok(State::Idle);
        };
        debug!("{command:?}");
        match command {
            Command::Add => self.add(),
            Command::Remove => self.remove(),
            Command::Import => {
                let file_name = line_or_exit!(self.console.ask("File name:"));
                self.import_path(Path::new(&file_name))?;
                Ok(State::Idle)
            }
            Command::Export => {
                let file_name = line_or_exit!(self.console.ask("File name:"));
                self.export_path(Path::new(&file_name))?;
                Ok(State::Idle)
            }
            Command::Ask => self.ask(),
            Command::Exit => Ok(State::Exited),
            Command::Log => self.log(),
            Command::HardestCard => {
                let hardest = self.store.hardest();
                self.console.say(hardest.to_string())?;
                Ok(State::Idle)
            }
            Command::ResetStats => {
                self.store.reset_stats();
                self.console.say("Card statistics have been reset.")?;
                Ok(State::Idle)
            }
        }
    }

    pub fn import_path(&mut self, path: &Path) -> Result<()> {
        match import_file(&mut self.store, path) {
            Ok(Some(report)) => {
                for skipped in &report.skipped {
                    self.console
                        .say(format!("Skipping line {}: {}", skipped.line, skipped.reason))?;
                }
                self.console
                    .say(format!("{} cards have been loaded.", report.loaded))
            }
            Ok(None) => self.console.say("File not found."),
            Err(e) => {
                error!("{e:#}");
                self.console.say(format!("{e:#}"))
            }
        }
    }

    pub fn export_path(&mut self, path: &Path) -> Result<()> {
        match export_file(&self.store, path) {
            Ok(n) => self.console.say(format!("{n} cards have been saved.")),
            Err(e) => {
                error!("{e:#}");
                self.console.say(format!("{e:#}"))
            }
        }
    }

    fn add(&mut self) -> Result<State> {
        let term = line_or_exit!(self.console.ask("The card:"));
        if self.store.contains_term(&term) {
            self.console
                .say(format!("The card \"{term}\" already exists."))?;
            return Ok(State::Idle);
        }
        let definition = line_or_exit!(self.console.ask("The definition of the card:"));
        match self.store.add(&term, &definition) {
            Ok(()) => self.console.say(format!(
                "The pair (\"{term}\":\"{definition}\") has been added."
            ))?,
            Err(e) => self.console.say(e.to_string())?,
        }
        Ok(State::Idle)
    }

    fn remove(&mut self) -> Result<State> {
        let term = line_or_exit!(self.console.ask("Which card?"));
        match self.store.remove(&term) {
            Ok(_) => self.console.say("The card has been removed.")?,
            Err(e) => self.console.say(e.to_string())?,
        }
        Ok(State::Idle)
    }

    fn ask(&mut self) -> Result<State> {
        let answer = line_or_exit!(self.console.ask("How many times to ask?"));
        let Ok(times) = answer.trim().parse::<usize>() else {
            self.console.say(format!("Invalid number \"{answer}\"."))?;
            return Ok(State::Idle);
        };
        for _ in 0..times {
            let Some(index) = self.store.pick(&mut self.rng) else {
                self.console.say("There are no cards to ask.")?;
                break;
            };
            let term = self.store.cards()[index].term.clone();
            let answer = line_or_exit!(self
                .console
                .ask(&format!("Print the definition of \"{term}\"")));
            let verdict = self.store.check_answer(index, &answer);
            if !verdict.is_correct() {
                self.store.record_failure(index);
            }
            self.console.say(verdict.to_string())?;
        }
        Ok(State::Idle)
    }

    fn log(&mut self) -> Result<State> {
        let file_name = line_or_exit!(self.console.ask("File name:"));
        let path = if file_name.is_empty() {
            default_log_path()
        } else {
            PathBuf::from(file_name)
        };
        match self.console.save_transcript(&path) {
            Ok(()) => {
                info!("transcript written to {:?}", path);
                self.console.say("The log has been saved.")?;
            }
            Err(e) => {
                error!("{e:#}");
                self.console.say(format!("{e:#}"))?;
            }
        }
        Ok(State::Idle)
    }
}

fn default_log_path() -> PathBuf {
    let local = Local::now();
    PathBuf::from(format!("flashcards-{}.log", local.format("%Y%m%dT%H%M%S")))
}
