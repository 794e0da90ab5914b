//! Network command implementations

use anyhow::Result;

use jc_core::api::NetworkConfig;

use super::EngineContext;
use crate::output::{format_networks, print_error};

pub async fn create(ctx: &EngineContext, config: NetworkConfig) -> Result<()> {
    let id = ctx.client.create_network(&config).await?;
    println!("{}", id);
    Ok(())
}

/// Remove each network, printing the id of every one removed
pub async fn remove(ctx: &EngineContext, networks: &[String]) -> Result<()> {
    let mut failed = 0;
    for network in networks {
        match ctx.client.remove_network(network).await {
            Ok(id) => println!("{}", id),
            Err(e) => {
                print_error(&format!("{}: {}", network, e));
                failed += 1;
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("failed to remove {} of {} networks", failed, networks.len());
    }
    Ok(())
}

pub async fn connect(ctx: &EngineContext, network: &str, container: &str) -> Result<()> {
    ctx.client.connect_network(network, container).await?;
    println!("{}", network);
    Ok(())
}

pub async fn disconnect(ctx: &EngineContext, network: &str, container: &str) -> Result<()> {
    ctx.client.disconnect_network(network, container).await?;
    println!("{}", network);
    Ok(())
}

pub async fn list(ctx: &EngineContext) -> Result<()> {
    let networks = ctx.client.list_networks().await?;
    println!("{}", format_networks(&networks));
    Ok(())
}
