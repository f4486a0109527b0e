//! Implements InputPort. Line-oriented stdin front-end.
//!
//! Each line is either a command (`add`, `remove`, `list`, `last`, `resync`, `help`) or, when
//! it starts with `{`, a provider callback payload forwarded to the ingestion channel.

use crate::domain::{DomainError, LatLng, Reminder, ReminderDraft};
use crate::ports::{InputPort, ProviderPayload};
use crate::usecases::ReminderStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
commands:
  add <lat> <lng> <radius-step> <message...>   radius = (step + 1) * 100 m
  remove <id>
  list | last | resync | help
  {json}                                       simulate a geofence callback";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Add(ReminderDraft),
    Remove(String),
    List,
    Last,
    Resync,
    Help,
    Callback(ProviderPayload),
}

/// Parse one input line. `Ok(None)` for blank lines; `Err` carries a usage message.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return Ok(Some(ConsoleCommand::Callback(ProviderPayload::from(line))));
    }

    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match verb {
        "add" => {
            let mut parts = rest.splitn(4, char::is_whitespace);
            let lat = parse_number::<f64>(parts.next(), "lat")?;
            let lng = parse_number::<f64>(parts.next(), "lng")?;
            let step = parse_number::<u32>(parts.next(), "radius-step")?;
            let message = parts.next().unwrap_or("").trim();
            ConsoleCommand::Add(
                ReminderDraft::new()
                    .with_location(LatLng::new(lat, lng))
                    .with_radius_progress(step)
                    .with_message(message),
            )
        }
        "remove" if !rest.is_empty() => ConsoleCommand::Remove(rest.to_string()),
        "remove" => return Err("usage: remove <id>".into()),
        "list" => ConsoleCommand::List,
        "last" => ConsoleCommand::Last,
        "resync" => ConsoleCommand::Resync,
        "help" => ConsoleCommand::Help,
        other => return Err(format!("unknown command '{}'; try 'help'", other)),
    };
    Ok(Some(command))
}

fn parse_number<T: std::str::FromStr>(field: Option<&str>, name: &str) -> Result<T, String> {
    field
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing <{}>", name))?
        .parse()
        .map_err(|_| format!("<{}> is not a number", name))
}

fn describe(reminder: &Reminder) -> String {
    format!(
        "{}  {}  {:.0} m  \"{}\"",
        reminder.id, reminder.location, reminder.radius, reminder.message
    )
}

/// Console adapter. Reads stdin until EOF.
pub struct ConsoleInputPort {
    store: Arc<ReminderStore>,
    callbacks: mpsc::Sender<ProviderPayload>,
}

impl ConsoleInputPort {
    pub fn new(store: Arc<ReminderStore>, callbacks: mpsc::Sender<ProviderPayload>) -> Self {
        Self { store, callbacks }
    }

    async fn execute(&self, command: ConsoleCommand) -> Result<(), DomainError> {
        match command {
            ConsoleCommand::Add(draft) => {
                let reminder = self.store.add(draft).await?;
                println!("added {}", describe(&reminder));
            }
            ConsoleCommand::Remove(id) => match self.store.remove(&id).await? {
                Some(_) => println!("removed {}", id),
                None => println!("no reminder {}", id),
            },
            ConsoleCommand::List => {
                let all = self.store.get_all().await;
                if all.is_empty() {
                    println!("no reminders");
                }
                for reminder in &all {
                    println!("{}", describe(reminder));
                }
            }
            ConsoleCommand::Last => match self.store.get_last().await {
                Some(reminder) => println!("{}", describe(&reminder)),
                None => println!("no reminders"),
            },
            ConsoleCommand::Resync => {
                let report = self.store.resync_watches().await;
                println!(
                    "resynced {} reminder(s), {} failed",
                    report.registered, report.failed
                );
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Callback(payload) => {
                if self.callbacks.send(payload).await.is_err() {
                    warn!("ingestion channel closed, dropping callback");
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for ConsoleInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DomainError::Input(format!("stdin: {}", e)))?
        {
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    println!("{}", usage);
                    continue;
                }
            };
            debug!(?command, "console command");
            // Store and provider errors are shown to the user, never fatal.
            if let Err(e) = self.execute(command).await {
                println!("error: {}", e);
            }
        }
        Ok(())
    }
}
