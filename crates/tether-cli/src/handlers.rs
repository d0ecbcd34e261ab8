//! Command handlers.

use crate::config::CliConfig;
use console::style;
use std::sync::Arc;
use tether_cache::FilesystemCacheStorage;
use tether_core::events::{EventOutcome, WorkerEvent};
use tether_core::ports::{Cache, CacheStorage, Network};
use tether_core::{CacheGeneration, Method, Request, RequestMode, Response};
use tether_edge::EdgeConfig;
use tether_worker::{ClientRegistry, HttpNetwork, OfflineNetwork, ServiceWorker, WorkerConfig};
use tracing::info;

/// Run the edge server.
pub async fn serve(config: &CliConfig, addr: Option<String>) -> anyhow::Result<()> {
    let bind_addr = addr.unwrap_or_else(|| config.bind_addr.clone());
    println!("{} Serving on http://{}", style("▶").cyan(), bind_addr);
    tether_edge::serve(EdgeConfig::new(bind_addr)).await?;
    Ok(())
}

fn storage(config: &CliConfig) -> anyhow::Result<Arc<FilesystemCacheStorage>> {
    Ok(Arc::new(FilesystemCacheStorage::new(config.cache_dir()?)))
}

fn network(offline: bool) -> Arc<dyn Network> {
    if offline {
        Arc::new(OfflineNetwork)
    } else {
        Arc::new(HttpNetwork::new())
    }
}

/// Install and activate the worker.
pub async fn install(config: &CliConfig, origin: Option<String>) -> anyhow::Result<()> {
    let worker_config = config.worker_config(origin.as_deref())?;
    let worker = ServiceWorker::new(
        worker_config.clone(),
        storage(config)?,
        network(false),
        Arc::new(ClientRegistry::new()),
    );

    let outcome = worker.handle(WorkerEvent::Install).await?;
    let state = outcome.state().unwrap_or_else(|| worker.state());
    println!(
        "{} Worker {} with cache {} ({} shell URLs)",
        style("✓").green(),
        state,
        style(&worker_config.cache_name).bold(),
        worker_config.precache.len()
    );
    Ok(())
}

/// Issue one request through the worker and print the result.
pub async fn fetch(
    config: &CliConfig,
    path: &str,
    method: &str,
    navigate: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let worker_config = config.worker_config(None)?;
    let worker = host_worker(config, worker_config.clone(), offline).await?;

    let mut request = Request::new(method.parse::<Method>()?, worker_config.resolve(path)?);
    if navigate {
        request = request.with_mode(RequestMode::Navigate);
    }

    let outcome = match worker.handle(WorkerEvent::Fetch(request)).await? {
        EventOutcome::Fetch(outcome) => outcome,
        other => anyhow::bail!("Unexpected outcome: {:?}", other),
    };

    println!(
        "{} {} {} via {} from {}",
        style(outcome.response.status).bold(),
        outcome.response.status_text,
        style(path).dim(),
        outcome.strategy,
        style(outcome.source).cyan()
    );
    print_body(&outcome.response);
    Ok(())
}

fn print_body(response: &Response) {
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        if let Ok(value) = response.json_body::<serde_json::Value>() {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                println!("{}", pretty);
                return;
            }
        }
    }
    println!("{}", response.text());
}

/// Resume the worker if its generation exists, otherwise install it first.
async fn host_worker(
    config: &CliConfig,
    worker_config: WorkerConfig,
    offline: bool,
) -> anyhow::Result<ServiceWorker> {
    let storage = storage(config)?;
    let clients = Arc::new(ClientRegistry::new());

    if storage.has(&worker_config.cache_name).await? {
        info!(cache = %worker_config.cache_name, "Resuming activated worker");
        return Ok(ServiceWorker::resumed(
            worker_config,
            storage,
            network(offline),
            clients,
        ));
    }

    info!(cache = %worker_config.cache_name, "No cache yet, installing worker");
    let worker = ServiceWorker::new(worker_config, storage, network(offline), clients);
    worker.handle(WorkerEvent::Install).await?;
    Ok(worker)
}

/// List cache generations and their entries.
pub async fn list_cache(config: &CliConfig) -> anyhow::Result<()> {
    let storage = storage(config)?;
    let generations = storage.keys().await?;
    if generations.is_empty() {
        println!("{} Cache store is empty", style("!").yellow());
        return Ok(());
    }

    for generation in generations {
        let marker = if generation == config.cache_name {
            style("*").green()
        } else {
            style(" ").dim()
        };
        let cache = storage.open(&generation).await?;
        let keys = cache.keys().await?;
        println!("{} {} ({} entries)", marker, style(&generation).bold(), keys.len());
        for key in keys {
            println!("    {}", key);
        }
    }
    Ok(())
}

/// Delete one or all cache generations.
pub async fn clear_cache(config: &CliConfig, generation: Option<String>) -> anyhow::Result<()> {
    let storage = storage(config)?;
    let targets = match generation {
        Some(name) => vec![CacheGeneration::new(name)?],
        None => storage.keys().await?,
    };

    for name in targets {
        if storage.delete(&name).await? {
            println!("{} Deleted {}", style("✓").green(), name);
        } else {
            println!("{} No cache named {}", style("!").yellow(), name);
        }
    }
    Ok(())
}

/// Show current configuration.
pub fn show_config(config: &CliConfig) -> anyhow::Result<()> {
    println!("{}", serde_yaml::to_string(config)?);
    println!("config file: {}", CliConfig::config_path()?.display());
    println!("cache dir:   {}", config.cache_dir()?.display());
    Ok(())
}

/// Set a configuration value and persist it.
pub fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = CliConfig::load().unwrap_or_default();
    config.set(key, value)?;
    config.save()?;
    println!("{} Set {} = {}", style("✓").green(), key, value);
    Ok(())
}
