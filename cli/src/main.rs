//! Demo CLI for the SDCP driver core.
//!
//! Wires the Secure Core, Transport, Infrastructure, and Application
//! crates together over the in-memory mock transport so the full
//! Action FSM set can be exercised without a physical sensor attached.
//! This binary, not any library crate, is the one place in the
//! workspace allowed to install a global `tracing` subscriber.

use clap::{Parser, Subcommand};
use sdcp_application::{delete, enroll, identify, list, open, DeleteTarget, DeviceContext, IdentifyTarget, NullProgressSink};
use sdcp_core::claim::ClaimStore;
use sdcp_core::crypto::TrustAnchor;
use sdcp_infrastructure::{DeviceAdapter, DeviceVariant};
use sdcp_transport::mock::MockUsbPort;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// SDCP driver core demo: exercises the Action FSMs over a scripted
/// mock transport.
#[derive(Parser)]
#[command(name = "sdcp-cli")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory the Claim Store persists session material under.
    #[arg(long, default_value = "/tmp/sdcp-cli-state")]
    state_dir: std::path::PathBuf,

    /// Serial number used to key the Claim Store, and the mock
    /// device's reported identity.
    #[arg(long, default_value = "emulated-device")]
    serial: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run the Open action's init sequence against the mock device.
    Open,
    /// List the enrolled prints the mock device reports.
    List,
    /// Delete one enrolled print by its enrollment id (hex).
    Delete {
        /// Hex-encoded 32-byte enrollment id.
        enrollment_id: String,
    },
    /// Clear every enrolled print.
    Clear,
    /// Enroll a new print.
    Enroll,
    /// Identify the finger on the sensor against the whole gallery.
    Identify,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let port: Arc<dyn sdcp_transport::UsbPort> = Arc::new(MockUsbPort::new());
    let adapter = DeviceAdapter::illustrative_default();
    let variant = DeviceVariant::illustrative_default();
    let claim_store = ClaimStore::new(&cli.state_dir, &cli.serial);
    // The collaborator-provided SDCP model-root trust anchor is out of
    // scope here; an empty anchor only lets `Open`, `List`, `Delete`,
    // and `Clear` run against the mock transport (they never drive
    // `SDCP_CONNECT`, unlike `Enroll`/`Identify`).
    let trust_anchor = TrustAnchor {
        root_certificate_der: Vec::new(),
        expected_model: None,
    };

    let mut ctx = DeviceContext::new(port, adapter, variant, claim_store, trust_anchor);

    match cli.command {
        Command::Open => {
            let version = open::open(&ctx).await?;
            println!("firmware version: {}", version.0);
        }
        Command::List => {
            let prints = list::list(&ctx).await?;
            println!("{} enrolled print(s)", prints.len());
            for print in prints {
                println!("  {}", hex_string(&print.enrollment_id()));
            }
        }
        Command::Delete { enrollment_id } => {
            let id = parse_enrollment_id(&enrollment_id)?;
            delete::delete(&ctx, DeleteTarget::Single(id)).await?;
            println!("deleted {enrollment_id}");
        }
        Command::Clear => {
            delete::delete(&ctx, DeleteTarget::All).await?;
            println!("cleared all enrolled prints");
        }
        Command::Enroll => {
            let sink = NullProgressSink;
            let id = enroll::enroll(&mut ctx, &sink).await?;
            println!("enrolled {}", hex_string(&id));
        }
        Command::Identify => {
            let sink = NullProgressSink;
            match identify::identify(&mut ctx, IdentifyTarget::Gallery, &sink).await? {
                sdcp_application::IdentifyOutcome::Matched(id) => println!("matched {}", hex_string(&id)),
                sdcp_application::IdentifyOutcome::NotMatched => println!("no match"),
            }
        }
    }

    Ok(())
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn parse_enrollment_id(s: &str) -> Result<[u8; 32], BoxError> {
    let bytes = hex::decode(s)?;
    let id: [u8; 32] = bytes
        .try_into()
        .map_err(|_| "enrollment id must be exactly 32 bytes (64 hex characters)".to_string())?;
    Ok(id)
}
