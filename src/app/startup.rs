//! Application startup and command dispatch

use crate::app::cli::display::{health_line, plugin_table};
use crate::app::cli::{Args, Command, Settings};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::plugin::api::{Collaborators, ExecutionEngine, HttpProbe, PluginRegistry};
use crate::store::models::User;
use crate::store::traits::RuntimeConfiguration;
use crate::store::InMemoryStore;
use crate::tasks::{execute_module, run_plugin, EngineModuleRegistry};
use log::{debug, error, info};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

/// Parse arguments, load configuration, and run the requested command
pub async fn startup() -> ExitCode {
    let args = Args::parse_from_env();

    let mut settings = match Settings::load(args.config_file.as_deref()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    settings.apply_args(&args);

    let use_color = settings
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    if let Err(e) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format.as_deref(),
        settings.log_file.as_ref().and_then(|p| p.to_str()),
        use_color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }
    info!(
        "intelrun {} starting",
        crate::app::cli::args::long_version()
    );
    debug!("Settings: {:?}", settings);

    let store = match settings.load_state().await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log_error_with_context(&e, "Loading state file");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&args.command, &settings, store, use_color).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

async fn dispatch(
    command: &Command,
    settings: &Settings,
    store: Arc<InMemoryStore>,
    use_color: bool,
) -> Result<(), ExitCode> {
    let registry = PluginRegistry::from_inventory();
    let modules = EngineModuleRegistry::from_inventory();

    match command {
        Command::Plugins => {
            let infos: Vec<_> = registry.infos().cloned().collect();
            print!("{}", plugin_table(&infos, &modules.paths(), use_color));
            Ok(())
        }
        Command::Run {
            plugin,
            job,
            task_id,
            params,
        } => {
            let engine = build_engine(store, settings)?;
            let runtime: RuntimeConfiguration = params.iter().cloned().collect();
            let task_id = task_id.clone().unwrap_or_else(|| format!("cli-{}", job));

            let report = run_plugin(&engine, &registry, plugin, *job, &runtime, &task_id)
                .await
                .map_err(|e| {
                    log_error_with_context(&e, "Running plugin");
                    ExitCode::FAILURE
                })?;
            print_json(&report)
        }
        Command::Health {
            plugin,
            user,
            organization,
        } => {
            let engine = build_engine(store, settings)?;
            let instance = registry.create(plugin).map_err(|e| {
                log_error_with_context(&e, "Health check");
                ExitCode::FAILURE
            })?;
            let user = health_user(user.as_deref(), organization.as_deref());
            let status = engine
                .health_check(instance.as_ref(), &user)
                .await
                .map_err(|e| {
                    log_error_with_context(&e, "Health check");
                    ExitCode::FAILURE
                })?;
            println!("{}", health_line(plugin, status, use_color));
            Ok(())
        }
        Command::Aggregate { job, module } => {
            let data_model = execute_module(store.as_ref(), &modules, *job, module)
                .await
                .map_err(|e| {
                    log_error_with_context(&e, "Executing engine module");
                    ExitCode::FAILURE
                })?;
            print_json(&data_model)
        }
    }
}

/// The acting user of a health check; organization membership makes
/// organization-level parameters apply
fn health_user(username: Option<&str>, organization: Option<&str>) -> User {
    let user = User::new(username.unwrap_or("anonymous"));
    match organization {
        Some(organization) => user.in_organization(organization),
        None => user,
    }
}

fn build_engine(store: Arc<InMemoryStore>, settings: &Settings) -> Result<ExecutionEngine, ExitCode> {
    let probe = HttpProbe::new().map_err(|e| {
        error!("FATAL: could not build HTTP client: {}", e);
        ExitCode::FAILURE
    })?;
    Ok(ExecutionEngine::new(
        Collaborators::from_store(store, Arc::new(probe)),
        settings.engine_settings(),
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ExitCode> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| {
        error!("FATAL: could not serialize output: {}", e);
        ExitCode::FAILURE
    })?;
    println!("{}", rendered);
    Ok(())
}
