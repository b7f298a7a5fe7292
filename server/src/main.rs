use clap::Parser;
use server::coordinator::{Coordinator, SessionEvent};
use server::network::NetworkServer;
use tokio::sync::mpsc;

/// Main-method of the application.
/// Parses command-line arguments, then spawns the coordinator task and the
/// network accept loop.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, env = "PORT", default_value = "3001")]
        port: u16,
    }

    // Parse command line arguments
    let args = Args::parse();

    env_logger::init();

    // Shared event channel: all connection tasks feed one coordinator
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();

    let address = format!("{}:{}", args.host, args.port);
    let relay = NetworkServer::bind(&address).await?;

    // Spawn coordinator task
    let coordinator_handle = tokio::spawn(async move {
        Coordinator::new().run(event_rx).await;
    });

    // Spawn network accept loop
    let network_handle = tokio::spawn(async move {
        relay.run(event_tx).await;
    });

    // Handle shutdown gracefully
    tokio::select! {
        result = network_handle => {
            if let Err(e) = result {
                eprintln!("Network task panicked: {}", e);
            }
        }
        result = coordinator_handle => {
            if let Err(e) = result {
                eprintln!("Coordinator task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
