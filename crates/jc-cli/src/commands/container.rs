//! Container command implementations

use anyhow::Result;

use jc_core::api::ContainerConfig;

use super::{session, EngineContext};
use crate::output::{format_containers, print_error};

/// Create a container from `image` and print its id
pub async fn create(ctx: &EngineContext, name: Option<&str>, config: ContainerConfig) -> Result<()> {
    let id = ctx.client.create_container(name, &config).await?;
    println!("{}", id);
    Ok(())
}

/// Remove each container, printing the id of every one removed
pub async fn remove(ctx: &EngineContext, containers: &[String]) -> Result<()> {
    let mut failed = 0;
    for container in containers {
        match ctx.client.remove_container(container).await {
            Ok(id) => println!("{}", id),
            Err(e) => {
                print_error(&format!("{}: {}", container, e));
                failed += 1;
            }
        }
    }
    finish(failed, containers.len(), "remove")
}

/// Start containers; with `attach`, stream the single container's console
pub async fn start(ctx: &EngineContext, attach: bool, containers: &[String]) -> Result<()> {
    if !attach {
        let mut failed = 0;
        for container in containers {
            match ctx.client.start_container(container).await {
                Ok(id) => println!("{}", id),
                Err(e) => {
                    print_error(&format!("{}: {}", container, e));
                    failed += 1;
                }
            }
        }
        return finish(failed, containers.len(), "start");
    }

    let [container] = containers else {
        anyhow::bail!("When attaching to STDOUT/STDERR only 1 container can be started");
    };

    let endpoint = ctx.client.url().container_attach(container);
    let client = &ctx.client;
    let trigger = async move {
        let result = client.start_container(container).await;
        if let Err(e) = &result {
            print_error(&e.to_string());
        }
        result
    };
    session::stream(ctx, endpoint.as_str(), trigger).await
}

/// Stop each container, printing the id of every one stopped
pub async fn stop(ctx: &EngineContext, containers: &[String]) -> Result<()> {
    let mut failed = 0;
    for container in containers {
        match ctx.client.stop_container(container).await {
            Ok(id) => println!("{}", id),
            Err(e) => {
                print_error(&format!("{}: {}", container, e));
                failed += 1;
            }
        }
    }
    finish(failed, containers.len(), "stop")
}

/// List containers
pub async fn list(ctx: &EngineContext, all: bool) -> Result<()> {
    let containers = ctx.client.list_containers(all).await?;
    println!("{}", format_containers(&containers, chrono::Utc::now()));
    Ok(())
}

fn finish(failed: usize, total: usize, verb: &str) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("failed to {} {} of {} containers", verb, failed, total);
    }
    Ok(())
}
