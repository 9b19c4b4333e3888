use std::path::PathBuf;
use std::process::Command;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bili_relay::client::{
    extract_bvid, pick_stream, wait_for_login, CredentialStore, LoginOutcome, RelayClient,
    POLL_PERIOD,
};
use bili_relay::lifecycle::{signals, Shutdown};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Log in, look up and play Bilibili videos through bili-relay", long_about = None)]
struct Cli {
    /// Base URL of the relay.
    #[arg(short, long, default_value = "http://localhost:8787")]
    proxy: String,

    /// Prefix the relay serves named routes under.
    #[arg(long, default_value = "/api")]
    prefix: String,

    /// Path the relay's open-relay endpoint is mounted on.
    #[arg(long, default_value = "/")]
    relay_path: String,

    /// File holding the login credential.
    #[arg(short, long, default_value = ".bili-relay-session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in by scanning a QR code with the mobile app
    Login {
        /// Log in again even when a credential is stored
        #[arg(long)]
        force: bool,
    },
    /// Show the logged-in account
    Whoami,
    /// Resolve a video to a relayed stream URL
    Play {
        /// BV id or video page URL
        video: String,
        /// Requested quality
        #[arg(long, default_value_t = 64)]
        qn: u32,
        /// Player to launch with the stream URL
        #[arg(long)]
        player: Option<String>,
    },
    /// Like a video
    Like {
        /// BV id or video page URL
        video: String,
    },
    /// Forget the stored credential
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = CredentialStore::new(cli.store.clone());
    let mut client = RelayClient::new(&cli.proxy, &cli.prefix)?
        .with_relay_path(&cli.relay_path)
        .with_credential(store.load()?);

    match cli.command {
        Commands::Login { force } => {
            if !force && store.load()?.is_some() {
                println!("Already logged in (use --force to log in again)");
                return Ok(());
            }

            let qr = client.generate_qrcode().await?;
            println!("Scan this URL as a QR code with the Bilibili app:");
            println!("{}", qr.url);

            let shutdown = Shutdown::new();
            signals::forward_to(shutdown.clone());

            let outcome = wait_for_login(&client, &qr.qrcode_key, POLL_PERIOD, shutdown.subscribe(), |status| {
                eprintln!("{}", status.describe());
            })
            .await?;

            match outcome {
                LoginOutcome::Success(credential) => {
                    store.save(&credential)?;
                    client.set_credential(credential);
                    let nav = client.nav().await?;
                    println!(
                        "Logged in as {}",
                        nav.uname.as_deref().unwrap_or("(unknown)")
                    );
                }
                LoginOutcome::Expired => {
                    eprintln!("QR code expired, run login again");
                    std::process::exit(1);
                }
                LoginOutcome::Cancelled => eprintln!("Login cancelled"),
            }
        }
        Commands::Whoami => {
            let nav = client.nav().await?;
            if nav.is_login {
                println!(
                    "{} (mid {})",
                    nav.uname.as_deref().unwrap_or("(unknown)"),
                    nav.mid.unwrap_or_default()
                );
            } else {
                println!("Not logged in");
            }
        }
        Commands::Play { video, qn, player } => {
            let bvid = extract_bvid(&video)?;
            let detail = client.video_detail(&bvid).await?;
            let play = client.play_url(&detail.bvid, detail.cid, qn).await?;
            let stream = client.relay_url(pick_stream(&play)?);

            println!("{} [{}]", detail.title, detail.bvid);
            println!("{}", stream);

            if let Some(player) = player {
                let status = Command::new(&player).arg(stream.as_str()).status()?;
                if !status.success() {
                    eprintln!("{} exited with {}", player, status);
                }
            }
        }
        Commands::Like { video } => {
            let bvid = extract_bvid(&video)?;
            client.like(&bvid).await?;
            println!("Liked {}", bvid);
        }
        Commands::Logout => {
            store.clear()?;
            println!("Logged out");
        }
    }

    Ok(())
}
