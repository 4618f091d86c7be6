//! ofono-watch - Print the modems oFono knows about and optionally follow
//! their changes.

use std::{error::Error, path::PathBuf, pin::pin, sync::Arc};

use clap::Parser;
use futures::StreamExt;
use ofono_mirror::{
    BusKind, OfonoConfig,
    services::ofono::{Bus, Interface, ManagerEvent, Modem, ModemManager},
    tracing_config,
};
use tracing::{info, warn};

/// Inspect oFono modems through live mirrors
#[derive(Parser, Debug)]
#[command(name = "ofono-watch")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the session bus instead of the configured one
    #[arg(long)]
    session: bool,

    /// Keep running and print every change until interrupted
    #[arg(short, long)]
    follow: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tracing_config::init()?;

    let mut config = match &args.config {
        Some(path) => OfonoConfig::load(path)?,
        None => OfonoConfig::default(),
    };
    if args.session {
        config.bus = BusKind::Session;
    }

    let bus = Bus::connect(config).await?;
    let manager = ModemManager::connect(&bus).await?;
    let modems = manager.list().await?;

    if modems.is_empty() {
        println!("No modems");
    }

    for modem in &modems {
        print_modem(modem).await;
    }

    if !args.follow {
        return Ok(());
    }

    for modem in &modems {
        follow_modem(Arc::clone(modem));
    }

    let mut events = pin!(manager.event_hub().stream());
    loop {
        tokio::select! {
            Some(event) = events.next() => match event {
                ManagerEvent::ModemAdded(modem) => {
                    println!("+ {}", modem.path());
                    print_modem(&modem).await;
                    follow_modem(modem);
                }
                ManagerEvent::ModemRemoved(path) => println!("- {path}"),
                ManagerEvent::Diagnostic(diagnostic) => warn!(?diagnostic, "directory"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Ok(());
            }
        }
    }
}

async fn print_modem(modem: &Modem) {
    println!("{}", modem.path());
    println!("  type:       {}", modem.modem_type.get());
    println!("  powered:    {}", modem.powered.get());
    println!("  online:     {}", modem.online.get());
    if let Some(name) = modem.name.get() {
        println!("  name:       {name}");
    }
    if let Some(model) = modem.model.get() {
        println!("  model:      {model}");
    }
    println!("  interfaces: {}", modem.interfaces.get().join(", "));

    let capabilities = modem.capabilities();

    if capabilities.supports(Interface::NetworkRegistration) {
        match modem.network_registration().await {
            Ok(registration) => {
                print!("  network:    {}", registration.status.get());
                if let Some(name) = registration.name.get() {
                    print!(" {name}");
                }
                if let Some(strength) = registration.strength.get() {
                    print!(" ({strength}%)");
                }
                println!();
            }
            Err(err) => warn!(modem = %modem.path(), error = %err, "network registration"),
        }
    }

    if capabilities.supports(Interface::VoiceCallManager) {
        match modem.voice_call_manager() {
            Ok(manager) => match manager.get_calls().await {
                Ok(calls) => {
                    for call in calls {
                        println!(
                            "  call:       {} {} {}",
                            call.path(),
                            call.line_identification.get(),
                            call.state.get()
                        );
                    }
                }
                Err(err) => warn!(modem = %modem.path(), error = %err, "GetCalls"),
            },
            Err(err) => warn!(modem = %modem.path(), error = %err, "voice call manager"),
        }
    }
}

fn follow_modem(modem: Arc<Modem>) {
    tokio::spawn(async move {
        let mut events = pin!(modem.event_hub().stream());
        while let Some(event) = events.next().await {
            println!("{} {event:?}", modem.path());
        }
    });
}
