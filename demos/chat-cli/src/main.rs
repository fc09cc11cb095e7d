//! Terminal chat client.
//!
//! ```text
//! chat-cli <room-id> <user-id> <username>
//! ```
//!
//! Lines typed on stdin are sent to the room. A few slash commands:
//!
//! - `/room <id>` switch to another room
//! - `/log` reprint every message received so far
//! - `/quit` leave

use roomwire::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Say(&'a str),
    Switch(&'a str),
    Log,
    Quit,
    Nothing,
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim();
    match line.split_once(' ') {
        Some(("/room", id)) if !id.trim().is_empty() => Input::Switch(id.trim()),
        _ => match line {
            "" => Input::Nothing,
            "/log" => Input::Log,
            "/quit" | "/exit" => Input::Quit,
            text => Input::Say(text),
        },
    }
}

fn print_message(msg: &ChatMessage) {
    if msg.system {
        println!("  * {}", msg.content);
    } else {
        println!("{}: {}", msg.username, msg.content);
    }
}

fn print_event(room: &RoomId, event: &RoomEvent) {
    match event {
        RoomEvent::Opened => eprintln!("[{room}] connected"),
        RoomEvent::Message(msg) => print_message(msg),
        RoomEvent::Reconnecting { attempt, delay } => eprintln!(
            "[{room}] connection lost, retry {attempt} in {}ms",
            delay.as_millis()
        ),
        RoomEvent::Unavailable { code } => match code {
            Some(code) => eprintln!("[{room}] room unavailable (close {code})"),
            None => eprintln!("[{room}] room unavailable"),
        },
        RoomEvent::RetriesExhausted { attempts } => eprintln!(
            "[{room}] gave up after {attempts} reconnect attempts, /room {room} to retry"
        ),
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    roomwire::init_tracing("warn");

    let mut args = std::env::args().skip(1);
    let (Some(room), Some(user_id), Some(username)) =
        (args.next(), args.next(), args.next())
    else {
        eprintln!("usage: chat-cli <room-id> <user-id> <username>");
        std::process::exit(2);
    };

    let client = RoomClient::builder()
        .config(ClientConfig::from_env()?)
        .build()?;
    let me = StaticIdentity::new(Identity::new(user_id, username));

    let mut room_id = RoomId::new(room);
    let mut watch = client.join(room_id.clone(), &me).await?;
    eprintln!("joining {room_id} at {}", client.config().base_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse(&line) {
                    Input::Say(text) => {
                        let open = watch.connection().is_some_and(RoomConnection::is_open);
                        if !open {
                            eprintln!("[{room_id}] not connected, message dropped");
                        }
                        watch.send(text);
                    }
                    Input::Switch(id) => {
                        room_id = RoomId::new(id);
                        if client.rewatch(&mut watch, room_id.clone(), &me).await? {
                            eprintln!("switched to {room_id}");
                        } else {
                            eprintln!("already in {room_id}");
                        }
                    }
                    Input::Log => watch.messages().iter().for_each(print_message),
                    Input::Quit => break,
                    Input::Nothing => {}
                }
            }
            Some(event) = watch.next_event() => {
                print_event(&room_id, &event);
            }
        }
    }

    watch.dispose();
    tracing::debug!("bye");
    Ok(())
}
