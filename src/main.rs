mod cli;

use crate::cli::{Cli, CommandAction, Commands, MapAction, PortAction, PresetAction, PushArgs};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, error, info};

use midi_configurator::AppConfig;
use midi_configurator::application::use_cases::{ConfiguratorServices, Repositories};
use midi_configurator::application::{Confirmer, DeleteOutcome, OfflineFallback};
use midi_configurator::debug::init_logging;
use midi_configurator::domain::command::CommandId;
use midi_configurator::domain::mapping::{ButtonColor, ButtonSlot};
use midi_configurator::domain::port::PortId;
use midi_configurator::domain::preset::PresetId;
use midi_configurator::infrastructure::{BackendClient, InMemoryBackend};
use midi_configurator::interfaces::render;
use midi_configurator::interfaces::{AutoConfirmer, ConsoleNotifier, PromptConfirmer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.app_config();

    // Initialize logging
    if let Err(e) = init_logging(&config.debug_config()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Dependency injection
    let (repos, backend_label) = if cli.demo {
        info!("Using in-process demo backend");
        let backend = InMemoryBackend::seeded(&OfflineFallback::sample());
        (Repositories::from_backend(Arc::new(backend)), "in-process demo".to_string())
    } else {
        let client = BackendClient::new(config.api_base_url.clone());
        let label = client.base_url().to_string();
        (Repositories::from_backend(Arc::new(client)), label)
    };
    let confirmer: Arc<dyn Confirmer> = if cli.yes {
        Arc::new(AutoConfirmer::new(true))
    } else {
        Arc::new(PromptConfirmer::new())
    };
    let notifier = Arc::new(ConsoleNotifier::new());
    let services = ConfiguratorServices::new(
        repos,
        notifier.clone(),
        confirmer,
        config.fallback(),
    );

    if let Err(e) = run(cli.command, &services, &config, &backend_label).await {
        // 原因は通知として表示済み
        if notifier.error_shown() {
            debug!("{:#}", e);
        } else {
            error!("{:#}", e);
            eprintln!("❌ {}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(
    command: Commands,
    services: &ConfiguratorServices,
    config: &AppConfig,
    backend_label: &str,
) -> anyhow::Result<()> {
    match command {
        Commands::Commands(action) => run_commands(action, services).await,
        Commands::Map(action) => run_map(action, services).await,
        Commands::Presets(action) => run_presets(action, services).await,
        Commands::Ports(action) => run_ports(action, services, config).await,
        Commands::Push(args) => run_push(args, services).await,
        Commands::Status => {
            services.bootstrap().await;
            println!("{}", services.backend.summary().await);
            Ok(())
        }
        Commands::Info => {
            println!("midi-configurator {}", env!("CARGO_PKG_VERSION"));
            println!("Built:   {}", env!("BUILD_TIMESTAMP"));
            println!("Backend: {}", backend_label);
            match services.backend.health().await {
                Ok(health) => match health.timestamp {
                    Some(timestamp) => println!("Health:  {} ({})", health.status, timestamp),
                    None => println!("Health:  {}", health.status),
                },
                Err(e) => println!("Health:  unreachable ({})", e),
            }
            Ok(())
        }
    }
}

async fn run_commands(action: CommandAction, services: &ConfiguratorServices) -> anyhow::Result<()> {
    match action {
        CommandAction::List => {
            services.commands.load().await.context("Could not list commands")?;
            let session = services.session.read().await;
            print!(
                "{}",
                render::commands(session.commands(), session.commands_from_fallback())
            );
        }
        CommandAction::Add { name, value } => {
            services
                .commands
                .create(&name, value)
                .await
                .context("Could not add command")?;
        }
        CommandAction::Edit { id, name, value } => {
            services
                .commands
                .update(CommandId::new(id), &name, value)
                .await
                .context("Could not edit command")?;
        }
        CommandAction::Delete { id } => {
            services.commands.load().await.context("Could not load commands")?;
            services.mappings.load().await.context("Could not load button mappings")?;
            let outcome = services
                .commands
                .delete(CommandId::new(id))
                .await
                .context("Could not delete command")?;
            match outcome {
                DeleteOutcome::Declined => println!("Cancelled"),
                DeleteOutcome::DeletedMappingsStale => {
                    anyhow::bail!("Command deleted, but the cleared buttons were not saved")
                }
                DeleteOutcome::Deleted => {}
            }
        }
    }
    Ok(())
}

async fn run_map(action: MapAction, services: &ConfiguratorServices) -> anyhow::Result<()> {
    if let MapAction::Palette = action {
        println!("{}", render::palette());
        return Ok(());
    }

    services.commands.load().await.context("Could not load commands")?;
    services.mappings.load().await.context("Could not load button mappings")?;

    match action {
        MapAction::Show | MapAction::Palette => {}
        MapAction::Set { button, command_id } => {
            let slot = ButtonSlot::new(button)?;
            let label = services
                .mappings
                .set_command(slot, Some(CommandId::new(command_id)))
                .await
                .context("Could not map button")?;
            info!(slot = slot.number(), %label, "Button mapped");
        }
        MapAction::Clear { button } => {
            let slot = ButtonSlot::new(button)?;
            services
                .mappings
                .set_command(slot, None)
                .await
                .context("Could not clear button")?;
        }
        MapAction::Color { button, color } => {
            let slot = ButtonSlot::new(button)?;
            let color = ButtonColor::parse(&color)?;
            services
                .mappings
                .set_color(slot, color)
                .await
                .context("Could not set button color")?;
        }
    }

    print!("{}", render::mappings(&*services.session.read().await));
    Ok(())
}

async fn run_presets(action: PresetAction, services: &ConfiguratorServices) -> anyhow::Result<()> {
    match action {
        PresetAction::List => {
            let presets = services.presets.list().await.context("Could not list presets")?;
            println!("{}", render::presets(&presets));
        }
        PresetAction::Save { name, description } => {
            services
                .presets
                .save(&name, description.as_deref())
                .await
                .context("Could not save preset")?;
        }
        PresetAction::Load { id } => {
            services.commands.load().await.context("Could not load commands")?;
            services
                .presets
                .load(PresetId::new(id))
                .await
                .context("Could not load preset")?;
            print!("{}", render::mappings(&*services.session.read().await));
        }
        PresetAction::Delete { id } => {
            services.presets.list().await.context("Could not list presets")?;
            let outcome = services
                .presets
                .delete(PresetId::new(id))
                .await
                .context("Could not delete preset")?;
            if outcome == DeleteOutcome::Declined {
                println!("Cancelled");
            }
        }
    }
    Ok(())
}

async fn run_ports(
    action: PortAction,
    services: &ConfiguratorServices,
    config: &AppConfig,
) -> anyhow::Result<()> {
    match action {
        PortAction::List => {
            services.ports.initial_load().await.context("Could not list ports")?;
            let session = services.session.read().await;
            println!("{}", render::ports(session.ports(), session.selected_port()));
        }
        PortAction::Test { port } => {
            let port = PortId::new(port)?;
            let state = services
                .test_port
                .execute(&port)
                .await
                .context("Could not test port")?;
            info!(port = %port, ready = state.is_ready(), "Port test finished");
        }
        PortAction::Watch { select } => {
            let initial = services
                .ports
                .initial_load()
                .await
                .context("Could not list ports")?;
            if let Some(port) = select {
                services.ports.select(PortId::new(port)?).await?;
            }
            {
                let session = services.session.read().await;
                println!("{}", render::ports(session.ports(), session.selected_port()));
            }

            if !services.start_polling(config.poll_interval, &initial) {
                anyhow::bail!("Backend unreachable, not watching offline sample ports");
            }
            let poller = services.poller(config.poll_interval);
            println!(
                "Watching ports every {}s. Press Ctrl-C to stop.",
                poller.interval().as_secs()
            );
            tokio::signal::ctrl_c()
                .await
                .context("Could not listen for Ctrl-C")?;
            poller.stop().await;
            info!("Port watch stopped");
        }
    }
    Ok(())
}

async fn run_push(args: PushArgs, services: &ConfiguratorServices) -> anyhow::Result<()> {
    services.bootstrap().await;
    if let Some(port) = args.port {
        services.ports.select(PortId::new(port)?).await?;
    }

    if args.dry_run {
        let config = services.push.preview().await;
        println!("{}", render::device_config(&config)?);
        return Ok(());
    }

    services
        .push
        .execute()
        .await
        .context("Could not send configuration")?;
    Ok(())
}
