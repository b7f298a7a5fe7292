use futures_util::{SinkExt, StreamExt};
use shared::{ClientMessage, Move, ServerMessage};
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Headless relay client: joins the session, proposes a move a few times,
/// finalizes the round, and prints everything the server sends back.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:3001".to_string());
    let player_id = std::env::args()
        .nth(2)
        .unwrap_or_else(|| "test-client".to_string());

    println!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(&url).await?;
    let (mut sender, mut receiver) = ws_stream.split();
    println!("Connected");

    // Print every server frame as it arrives
    let reader = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(ServerMessage::Joined { message }) => {
                        println!("Joined: {}", message);
                    }
                    Ok(ServerMessage::Rejected { reason }) => {
                        println!("Join rejected: {}", reason);
                    }
                    Ok(ServerMessage::ProposedMove { mv, count }) => {
                        println!("Proposal update: {} has {} vote(s)", mv, count);
                    }
                    Ok(ServerMessage::UpdateBoard { mv }) => {
                        println!("Board update: {} was played", mv);
                    }
                    Err(e) => println!("Failed to decode server frame: {} ({})", e, text),
                },
                Ok(Message::Close(_)) => {
                    println!("Server closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    println!("Receive error: {}", e);
                    break;
                }
            }
        }
    });

    let join = ClientMessage::JoinGame {
        player_id: player_id.clone(),
    };
    println!("Joining as \"{}\"", player_id);
    sender
        .send(Message::Text(serde_json::to_string(&join)?))
        .await?;
    sleep(Duration::from_millis(250)).await;

    // Propose the same pawn push three times; the tally should climb to 3
    let mv = Move::new(0, 6, 0, 4);
    for _ in 0..3 {
        let propose = ClientMessage::ProposeMove { mv };
        println!("Proposing {}", mv);
        sender
            .send(Message::Text(serde_json::to_string(&propose)?))
            .await?;
        sleep(Duration::from_secs(1)).await;
    }

    // Finalize the round with the proposed move
    let finalize = ClientMessage::FinalizeMove { mv };
    println!("Finalizing round with {}", mv);
    sender
        .send(Message::Text(serde_json::to_string(&finalize)?))
        .await?;
    sleep(Duration::from_secs(1)).await;

    sender.send(Message::Close(None)).await?;
    let _ = reader.await;
    println!("Test client finished");

    Ok(())
}
