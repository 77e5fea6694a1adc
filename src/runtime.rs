// Dispatch loop with safety timer
// Each cycle drains every pending datagram in arrival order, re-checks the
// command timeout once, then yields to tokio until the next tick. If the
// controller stops sending, the car is stopped once per silence episode.

use std::error::Error;
use std::io;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::command::Vocabulary;
use crate::config::{
    COMMAND_TIMEOUT, LOOP_HZ, RECV_BUFFER_LEN, RuntimeArgs, TOPIC_HEALTH, TOPIC_RT_DRIVE,
};
use crate::governor::SpeedGovernor;
use crate::messages::{ActuatorCommand, MotionIntent, RuntimeHealth};
use crate::motor::{
    actuation_for, DriveOutput, PinBus, PinError, SerialPinBridge, SimulatedPins,
};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Mutable drive state owned by the dispatch loop
#[derive(Debug, Clone)]
pub struct DriveState {
    pub governor: SpeedGovernor,
    pub last_command: MotionIntent,
    pub last_command_at: Instant,
}

impl DriveState {
    pub fn new(now: Instant) -> Self {
        Self {
            governor: SpeedGovernor::new(),
            last_command: MotionIntent::Stop,
            last_command_at: now,
        }
    }

    pub fn base_speed(&self) -> u16 {
        self.governor.speed()
    }

    // both fields move together
    fn record(&mut self, intent: MotionIntent, now: Instant) {
        self.last_command = intent;
        self.last_command_at = now;
    }
}

/// Two-state watchdog over the time since the last accepted command
#[derive(Debug, Clone, Copy)]
pub struct SafetyTimer {
    window: Duration,
    health: RuntimeHealth,
}

impl Default for SafetyTimer {
    fn default() -> Self {
        Self::new(COMMAND_TIMEOUT)
    }
}

impl SafetyTimer {
    /// Starts stale until the first command
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            health: RuntimeHealth::CmdStale,
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// A command was accepted
    pub fn refresh(&mut self) {
        self.health = RuntimeHealth::Ok;
    }

    /// Returns true exactly once when the window elapses after a command
    pub fn poll(&mut self, last_command_at: Instant, now: Instant) -> bool {
        let age = now.saturating_duration_since(last_command_at);
        if self.health == RuntimeHealth::Ok && age > self.window {
            self.health = RuntimeHealth::CmdStale;
            return true;
        }
        false
    }
}

/// Command interpreter, speed governor and safety timer glued together.
/// Returns the actuation to issue, if any; performs no I/O.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    vocabulary: Vocabulary,
    state: DriveState,
    timer: SafetyTimer,
}

impl Dispatcher {
    pub fn new(vocabulary: Vocabulary, now: Instant) -> Self {
        Self::with_timer(vocabulary, SafetyTimer::default(), now)
    }

    pub fn with_timer(vocabulary: Vocabulary, timer: SafetyTimer, now: Instant) -> Self {
        Self {
            vocabulary,
            state: DriveState::new(now),
            timer,
        }
    }

    pub fn state(&self) -> &DriveState {
        &self.state
    }

    pub fn health(&self) -> RuntimeHealth {
        self.timer.health()
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Process one datagram payload
    pub fn on_datagram(&mut self, payload: &[u8], now: Instant) -> Option<ActuatorCommand> {
        let intent = self.vocabulary.decode(payload);
        if intent == MotionIntent::NoOp {
            debug!("Ignoring datagram {:?}", String::from_utf8_lossy(payload));
            return None;
        }

        match intent {
            MotionIntent::SpeedUp => {
                self.state.governor.increase();
            }
            MotionIntent::SpeedDown => {
                self.state.governor.decrease();
            }
            _ => {}
        }
        self.state.record(intent, now);
        self.timer.refresh();

        info!(
            "Command: {} | Speed: {}",
            symbol_text(payload),
            self.state.base_speed()
        );
        actuation_for(intent, self.state.base_speed())
    }

    /// Re-evaluate the safety timer; yields a forced stop at most once per silence
    pub fn check_timeout(&mut self, now: Instant) -> Option<ActuatorCommand> {
        if !self.timer.poll(self.state.last_command_at, now) {
            return None;
        }
        if self.state.last_command == MotionIntent::Stop {
            debug!("Command timeout while already stopped");
            return None;
        }
        let silence = now.saturating_duration_since(self.state.last_command_at);
        warn!("Command timeout ({:?} without a command), stopping", silence);
        // the forced stop keeps the original timestamp
        self.state.last_command = MotionIntent::Stop;
        Some(ActuatorCommand::stop())
    }
}

fn symbol_text(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).trim().to_string()
}

/// Dispatcher wired to a drive output
pub struct Runtime<P: PinBus> {
    dispatcher: Dispatcher,
    output: DriveOutput<P>,
}

impl<P: PinBus> Runtime<P> {
    pub fn new(vocabulary: Vocabulary, pins: P, now: Instant) -> Result<Self, PinError> {
        Ok(Self {
            dispatcher: Dispatcher::new(vocabulary, now),
            output: DriveOutput::new(pins)?,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn output(&self) -> &DriveOutput<P> {
        &self.output
    }

    /// Handle one inbound datagram. Empty payloads count as no command.
    pub fn on_datagram(&mut self, payload: &[u8], now: Instant) -> Result<(), PinError> {
        if payload.is_empty() {
            return Ok(());
        }
        if let Some(cmd) = self.dispatcher.on_datagram(payload, now) {
            self.output.apply(&cmd)?;
        }
        Ok(())
    }

    /// Once per loop iteration, after draining datagrams
    pub fn tick(&mut self, now: Instant) -> Result<(), PinError> {
        if let Some(cmd) = self.dispatcher.check_timeout(now) {
            self.output.apply(&cmd)?;
        }
        Ok(())
    }
}

/// Optional zenoh publishers for actuation and health
struct Telemetry {
    _session: zenoh::Session,
    actuation: zenoh::pubsub::Publisher<'static>,
    health: zenoh::pubsub::Publisher<'static>,
}

impl Telemetry {
    async fn open() -> Result<Self, BoxError> {
        info!("Opening Zenoh session...");
        let session = zenoh::open(zenoh::Config::default()).await?;
        let actuation = session.declare_publisher(TOPIC_RT_DRIVE).await?;
        let health = session.declare_publisher(TOPIC_HEALTH).await?;
        info!("Publishing to: {}, {}", TOPIC_RT_DRIVE, TOPIC_HEALTH);
        Ok(Self {
            _session: session,
            actuation,
            health,
        })
    }

    async fn publish(&self, actuation: &ActuatorCommand, health: RuntimeHealth) -> Result<(), BoxError> {
        self.actuation.put(serde_json::to_string(actuation)?).await?;
        self.health.put(serde_json::to_string(&health)?).await?;
        Ok(())
    }
}

/// Open the pin bus named on the command line
fn open_pins(args: &RuntimeArgs) -> Result<Box<dyn PinBus + Send>, BoxError> {
    match &args.bridge {
        Some(port) => Ok(Box::new(SerialPinBridge::open(port, args.baud)?)),
        None => {
            info!("No pin bridge configured, simulating pins");
            Ok(Box::new(SimulatedPins::new()))
        }
    }
}

/// Read every datagram currently queued on the socket, without waiting
fn drain<P: PinBus>(
    socket: &UdpSocket,
    buf: &mut [u8],
    runtime: &mut Runtime<P>,
) -> Result<(), BoxError> {
    loop {
        match socket.try_recv_from(buf) {
            Ok((len, peer)) => {
                debug!("{} bytes from {}", len, peer);
                runtime.on_datagram(&buf[..len], Instant::now())?;
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) => {
                // e.g. ICMP port unreachable surfacing on some platforms
                warn!("Receive failed: {}", e);
                return Ok(());
            }
        }
    }
}

pub async fn run(args: RuntimeArgs) -> Result<(), BoxError> {
    let pins = open_pins(&args)?;
    let mut runtime = Runtime::new(args.vocabulary, pins, Instant::now())?;

    let telemetry = if args.telemetry {
        Some(Telemetry::open().await?)
    } else {
        None
    };

    let socket = UdpSocket::bind(args.bind).await?;
    let mut buf = [0u8; RECV_BUFFER_LEN];

    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Runtime started: {}Hz loop, {}ms command timeout, {:?} vocabulary",
        LOOP_HZ,
        COMMAND_TIMEOUT.as_millis(),
        args.vocabulary
    );
    info!("Listening on UDP {}", socket.local_addr()?);

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }

        // 1. Drain all pending datagrams in arrival order
        drain(&socket, &mut buf, &mut runtime)?;

        // 2. Safety timer
        runtime.tick(Instant::now())?;

        // 3. Telemetry
        if let Some(telemetry) = &telemetry {
            telemetry
                .publish(&runtime.output().current(), runtime.dispatcher().health())
                .await?;
        }
    }

    // DriveOutput stops the motors when dropped
    Ok(())
}
