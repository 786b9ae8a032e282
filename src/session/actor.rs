//! Асинхронный владелец сессии на базе tokio.
//!
//! Архитектура:
//!   1. `spawn_engine` запускает одну задачу, которая владеет `SessionStateMachine`
//!      и сцен-синком. Все изменения (ввод, отпускание, dismiss, таймер) приходят
//!      через один канал и применяются строго по очереди.
//!   2. При отпускании задача планирует таймер показа результата: отдельная
//!      задача спит `presentationDelayMs` и отправляет `Present { generation }`
//!      обратно в канал через слабый Sender.
//!   3. Новый захват, dismiss и reset отменяют таймер (`abort`); если он всё же
//!      успел сработать, машина отбросит устаревшее поколение сама.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{Result, TrainerError};
use crate::models::config::EngineConfig;
use crate::models::events::PointerEvent;
use crate::session::machine::{EngineSnapshot, PendingPresentation, SessionStateMachine};
use crate::session::sink::SceneSink;

const COMMAND_QUEUE_CAPACITY: usize = 8192;

#[derive(Debug)]
enum EngineCommand {
    Pointer(PointerEvent),
    RequestLock,
    RequestRelease,
    Dismiss,
    SetActive(bool),
    AssetsLoaded,
    Reset,
    Present { generation: u64 },
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown,
}

/// Cloneable front end of a running engine task.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub async fn pointer(&self, event: PointerEvent) -> Result<()> {
        self.send(EngineCommand::Pointer(event)).await
    }

    pub async fn request_lock(&self) -> Result<()> {
        self.send(EngineCommand::RequestLock).await
    }

    pub async fn request_release(&self) -> Result<()> {
        self.send(EngineCommand::RequestRelease).await
    }

    pub async fn dismiss(&self) -> Result<()> {
        self.send(EngineCommand::Dismiss).await
    }

    pub async fn set_active(&self, active: bool) -> Result<()> {
        self.send(EngineCommand::SetActive(active)).await
    }

    pub async fn assets_loaded(&self) -> Result<()> {
        self.send(EngineCommand::AssetsLoaded).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.send(EngineCommand::Reset).await
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| TrainerError::EngineClosed)
    }

    /// Stops the engine task; await its `JoinHandle` to get the machine back.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown).await
    }

    async fn send(&self, command: EngineCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| TrainerError::EngineClosed)
    }
}

/// Starts the engine task. Must be called from within a tokio runtime.
pub fn spawn_engine<S>(
    config: EngineConfig,
    sink: S,
) -> Result<(EngineHandle, JoinHandle<SessionStateMachine>)>
where
    S: SceneSink + Send + 'static,
{
    let machine = SessionStateMachine::new(config)?;
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let timer_tx = tx.downgrade();
    let task = tokio::spawn(run_engine(machine, sink, rx, timer_tx));
    Ok((EngineHandle { tx }, task))
}

async fn run_engine<S: SceneSink>(
    mut machine: SessionStateMachine,
    mut sink: S,
    mut rx: mpsc::Receiver<EngineCommand>,
    timer_tx: mpsc::WeakSender<EngineCommand>,
) -> SessionStateMachine {
    let mut timer = PresentationTimer::default();
    log::info!("engine: started");

    while let Some(command) = rx.recv().await {
        match command {
            EngineCommand::Pointer(event) => {
                let generation = machine.generation();
                if let Some(pending) = machine.handle_event(&event, &mut sink) {
                    timer.schedule(pending, timer_tx.clone());
                } else if machine.generation() != generation {
                    // A press opened a new session.
                    timer.cancel();
                }
            }
            EngineCommand::RequestLock => {
                if machine.request_lock(&mut sink) {
                    timer.cancel();
                }
            }
            EngineCommand::RequestRelease => {
                if let Some(pending) = machine.request_release(&mut sink) {
                    timer.schedule(pending, timer_tx.clone());
                }
            }
            EngineCommand::Dismiss => {
                timer.cancel();
                machine.dismiss(&mut sink);
            }
            EngineCommand::SetActive(active) => machine.set_active(active),
            EngineCommand::AssetsLoaded => machine.mark_assets_loaded(),
            EngineCommand::Reset => {
                timer.cancel();
                machine.reset(&mut sink);
            }
            EngineCommand::Present { generation } => {
                timer.finished(generation);
                machine.present(generation, &mut sink);
            }
            EngineCommand::Snapshot(reply) => {
                reply.send(machine.snapshot()).ok();
            }
            EngineCommand::Shutdown => break,
        }
    }

    timer.cancel();
    log::info!("engine: stopped generation={}", machine.generation());
    machine
}

/// One outstanding presentation delay at most.
#[derive(Debug, Default)]
struct PresentationTimer {
    task: Option<(u64, JoinHandle<()>)>,
}

impl PresentationTimer {
    fn schedule(&mut self, pending: PendingPresentation, tx: mpsc::WeakSender<EngineCommand>) {
        self.cancel();
        let generation = pending.generation;
        let task = tokio::spawn(async move {
            tokio::time::sleep(pending.delay).await;
            if let Some(tx) = tx.upgrade() {
                tx.send(EngineCommand::Present { generation }).await.ok();
            }
        });
        self.task = Some((generation, task));
    }

    fn cancel(&mut self) {
        if let Some((generation, task)) = self.task.take() {
            log::debug!("engine: cancel presentation generation={generation}");
            task.abort();
        }
    }

    fn finished(&mut self, generation: u64) {
        if matches!(self.task, Some((scheduled, _)) if scheduled == generation) {
            self.task = None;
        }
    }
}
