//! Async driver around [`FinderState`].
//!
//! One task owns the state. User intents and fetch completions are funnelled
//! to it over channels, and every change is published as a fresh
//! [`ViewSnapshot`] on a watch channel.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{
    controller::FinderState,
    directory::CountryDirectory,
    effect::Effect,
    model::{Country, CountryKey, CountryRef, ViewSnapshot, WeatherSnapshot},
    orchestrator::Resolution,
    provider::WeatherProvider,
};

enum Command {
    SetQuery(String, oneshot::Sender<ViewSnapshot>),
    SelectSingle(CountryRef, oneshot::Sender<ViewSnapshot>),
    SelectByName(String, oneshot::Sender<Option<ViewSnapshot>>),
}

enum Completion {
    Dataset(Result<Vec<Country>>),
    Weather { key: CountryKey, result: Result<WeatherSnapshot> },
}

/// Cloneable front door to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<ViewSnapshot>,
}

impl SessionHandle {
    pub async fn set_query(&self, text: impl Into<String>) -> Result<ViewSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SetQuery(text.into(), tx))?;
        rx.await.map_err(|_| closed())
    }

    pub async fn select_single(&self, country: CountryRef) -> Result<ViewSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SelectSingle(country, tx))?;
        rx.await.map_err(|_| closed())
    }

    /// Pick a country from the current subset by name, ignoring case.
    /// Returns `None` if no listed country has that name.
    pub async fn select_by_name(&self, name: impl Into<String>) -> Result<Option<ViewSnapshot>> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::SelectByName(name.into(), tx))?;
        rx.await.map_err(|_| closed())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the dataset is no longer loading and no weather fetch is
    /// pending for the current selection.
    pub async fn wait_until_settled(&self) -> Result<ViewSnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(ViewSnapshot::is_settled).await.map_err(|_| closed())?;
        Ok(snapshot.clone())
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| closed())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SetQuery(text, _) => f.debug_tuple("SetQuery").field(text).finish(),
            Command::SelectSingle(country, _) => {
                f.debug_tuple("SelectSingle").field(&country.common_name).finish()
            }
            Command::SelectByName(name, _) => f.debug_tuple("SelectByName").field(name).finish(),
        }
    }
}

fn closed() -> anyhow::Error {
    anyhow!("finder session has shut down")
}

pub struct Session {
    state: FinderState,
    weather: Arc<dyn WeatherProvider>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<ViewSnapshot>,
    published: u64,
}

impl Session {
    /// Spawn the session on the current runtime and start loading the dataset.
    ///
    /// The session stops once every [`SessionHandle`] is dropped. Fetches
    /// still in flight at that point run to completion and are ignored.
    pub fn start(
        directory: Arc<dyn CountryDirectory>,
        weather: Arc<dyn WeatherProvider>,
    ) -> SessionHandle {
        let state = FinderState::new();
        let initial = state.snapshot();
        let published = initial.revision;
        let (snapshots, snapshots_rx) = watch::channel(initial);
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let loader = completions_tx.clone();
        tokio::spawn(async move {
            tracing::info!(?directory, "loading country dataset");
            let result = directory.fetch_all().await;
            let _ = loader.send(Completion::Dataset(result));
        });

        let session = Session {
            state,
            weather,
            commands,
            completions_tx,
            completions,
            snapshots,
            published,
        };
        tokio::spawn(session.run());

        SessionHandle { commands: commands_tx, snapshots: snapshots_rx }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
            }
        }
        tracing::debug!("finder session stopped");
    }

    fn handle_command(&mut self, command: Command) {
        tracing::trace!(?command, "handling command");
        match command {
            Command::SetQuery(text, reply) => {
                let effects = self.state.set_query(text);
                self.run_effects(effects);
                let _ = reply.send(self.publish());
            }
            Command::SelectSingle(country, reply) => {
                let effects = self.state.select_single(country);
                self.run_effects(effects);
                let _ = reply.send(self.publish());
            }
            Command::SelectByName(name, reply) => {
                let wanted = name.to_lowercase();
                let found = self
                    .state
                    .subset()
                    .iter()
                    .find(|c| c.common_name.to_lowercase() == wanted)
                    .cloned();
                let snapshot = found.map(|country| {
                    let effects = self.state.select_single(country);
                    self.run_effects(effects);
                    self.publish()
                });
                let _ = reply.send(snapshot);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Dataset(result) => {
                let effects = self.state.dataset_loaded(result);
                self.run_effects(effects);
            }
            Completion::Weather { key, result } => {
                if self.state.weather_resolved(&key, result) == Resolution::Stale {
                    return;
                }
            }
        }
        self.publish();
    }

    /// Fire-and-forget: fetches are never aborted, stale results are
    /// filtered out when they come back.
    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchWeather { key, coordinates } => {
                    let weather = Arc::clone(&self.weather);
                    let done = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let result = weather.fetch_current(coordinates).await;
                        let _ = done.send(Completion::Weather { key, result });
                    });
                }
            }
        }
    }

    fn publish(&mut self) -> ViewSnapshot {
        let snapshot = self.state.snapshot();
        if snapshot.revision != self.published {
            self.published = snapshot.revision;
            self.snapshots.send_replace(snapshot.clone());
        }
        snapshot
    }
}
