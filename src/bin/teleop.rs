// Keyboard teleop over UDP
// W/A/S/D or arrows drive, Q/E/Z/C pivot, Space stop, +/- speed, Esc quit
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tokio::net::UdpSocket;
use tracing::{info, warn};

use rc_drive_runtime::command::Vocabulary;
use rc_drive_runtime::config::UDP_PORT;
use rc_drive_runtime::messages::MotionIntent;

const SEND_PERIOD: Duration = Duration::from_millis(50); // 20 Hz
const INPUT_TIMEOUT_MS: u64 = 150; // Fall back to stop after this much time with no movement key

#[derive(Debug, Parser)]
#[command(name = "teleop", about = "Drive the car from the keyboard")]
struct Args {
    /// Address of the car
    #[arg(long, default_value_t = SocketAddr::from(([192, 168, 4, 1], UDP_PORT)))]
    target: SocketAddr,

    #[arg(long, value_enum, default_value_t = Vocabulary::Extended)]
    vocabulary: Vocabulary,
}

enum Key {
    Move(MotionIntent),
    Speed(MotionIntent),
    Quit,
}

fn classify(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
    let key = match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Esc => Key::Quit,
        KeyCode::Char('w') | KeyCode::Up => Key::Move(MotionIntent::Forward),
        KeyCode::Char('s') | KeyCode::Down => Key::Move(MotionIntent::Backward),
        KeyCode::Char('a') | KeyCode::Left => Key::Move(MotionIntent::TurnLeft),
        KeyCode::Char('d') | KeyCode::Right => Key::Move(MotionIntent::TurnRight),
        KeyCode::Char('q') => Key::Move(MotionIntent::PivotForwardLeft),
        KeyCode::Char('e') => Key::Move(MotionIntent::PivotForwardRight),
        KeyCode::Char('z') => Key::Move(MotionIntent::PivotBackwardLeft),
        KeyCode::Char('c') => Key::Move(MotionIntent::PivotBackwardRight),
        KeyCode::Char(' ') => Key::Move(MotionIntent::Stop),
        KeyCode::Char('+') | KeyCode::Char('=') => Key::Speed(MotionIntent::SpeedUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Key::Speed(MotionIntent::SpeedDown),
        _ => return None,
    };
    Some(key)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    info!("Sending to {} ({:?} vocabulary)", args.target, args.vocabulary);
    info!("Controls: WASD/arrows=drive, Q/E/Z/C=pivot, Space=stop, +/-=speed, Esc=quit");

    enable_raw_mode()?;
    let result = run_teleop(&socket, &args).await;
    disable_raw_mode()?;

    // Stop the car before exiting
    send(&socket, &args, MotionIntent::Stop).await?;
    result
}

async fn run_teleop(
    socket: &UdpSocket,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut intent = MotionIntent::Stop;
    let mut last_movement_input = Instant::now();
    let mut last_sent: Option<Instant> = None;

    loop {
        // Poll for key with 20ms timeout
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                let pressed = kind == KeyEventKind::Press || kind == KeyEventKind::Repeat;
                match classify(code, modifiers) {
                    Some(Key::Quit) if pressed => break,
                    Some(Key::Move(next)) if pressed => {
                        if args.vocabulary.symbol_for(next).is_some() {
                            if next != intent {
                                info!("{:?}", next);
                            }
                            intent = next;
                            last_movement_input = Instant::now();
                        } else {
                            warn!("{:?} not available in {:?} vocabulary", next, args.vocabulary);
                        }
                    }
                    Some(Key::Speed(change)) if pressed => {
                        send(socket, args, change).await?;
                        info!("{:?}", change);
                    }
                    _ => {}
                }
            }
        }

        // Terminals report no key release; fall back to stop when input goes quiet
        if last_movement_input.elapsed() > Duration::from_millis(INPUT_TIMEOUT_MS) {
            intent = MotionIntent::Stop;
        }

        // Always send at 20Hz so the car's safety timer stays fed
        if last_sent.is_none_or(|t| t.elapsed() >= SEND_PERIOD) {
            send(socket, args, intent).await?;
            last_sent = Some(Instant::now());
        }
    }

    Ok(())
}

async fn send(
    socket: &UdpSocket,
    args: &Args,
    intent: MotionIntent,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(symbol) = args.vocabulary.symbol_for(intent) {
        socket.send_to(&[symbol], args.target).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_c_quits_but_plain_c_pivots() {
        assert!(matches!(
            classify(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Key::Quit)
        ));
        assert!(matches!(
            classify(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(Key::Move(MotionIntent::PivotBackwardRight))
        ));
    }

    #[test]
    fn test_every_basic_move_key_has_a_symbol() {
        for code in [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right, KeyCode::Char(' ')] {
            match classify(code, KeyModifiers::NONE) {
                Some(Key::Move(intent)) => assert!(Vocabulary::Basic.symbol_for(intent).is_some()),
                _ => panic!("{code:?} is not a move key"),
            }
        }
    }
}
