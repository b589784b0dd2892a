use block_cluster::block::types::NodeId;
use block_cluster::client::coordinator::{ClientCoordinator, create_test_file};
use block_cluster::config::ClusterConfig;
use block_cluster::directory::handlers::router as directory_router;
use block_cluster::directory::registry::NodeRegistry;
use block_cluster::directory::service::DirectoryService;
use block_cluster::storage::disk::DiskBlockStore;
use block_cluster::storage::handlers::router as storage_router;
use block_cluster::storage::node::StorageNode;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const USAGE: &str = "\
Usage:
  block_cluster directory [--bind <addr:port>]
  block_cluster storage --id <node-id> [--bind <addr:port>] [--dir <path>]
  block_cluster add <path>
  block_cluster read <file_name> <output_path>
  block_cluster ls
  block_cluster status
  block_cluster create-testfile <path> [--size <MB>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let config = ClusterConfig::from_env()?;
    let (positional, flags) = split_flags(&args[2..])?;

    match args[1].as_str() {
        "directory" => run_directory(&config, &flags).await,
        "storage" => run_storage(&config, &flags).await,
        "add" => {
            let path = positional.first().ok_or_else(|| usage_error("add needs a path"))?;
            let client = ClientCoordinator::from_config(&config)?;
            let plan = client.write_file(Path::new(path)).await?;
            println!(
                "Stored '{}' ({} bytes, {} blocks)",
                plan.file_name,
                plan.total_size,
                plan.blocks.len()
            );
            Ok(())
        }
        "read" => {
            let (name, output) = match positional.as_slice() {
                [name, output, ..] => (name, output),
                _ => return Err(usage_error("read needs a file name and an output path")),
            };
            let client = ClientCoordinator::from_config(&config)?;
            let size = client.read_file(name, Path::new(output)).await?;
            println!("Reassembled '{}' at {} ({} bytes)", name, output, size);
            Ok(())
        }
        "ls" => {
            let client = ClientCoordinator::from_config(&config)?;
            for name in client.list_files().await? {
                println!("{}", name);
            }
            Ok(())
        }
        "status" => {
            let client = ClientCoordinator::from_config(&config)?;
            let status = client.cluster_status(&config.storage_nodes).await;
            println!(
                "directory {} {}",
                config.directory_addr,
                health_label(status.directory_healthy)
            );
            for node in status.nodes {
                println!(
                    "{} {} {}",
                    node.node.id,
                    node.node.addr,
                    health_label(node.healthy)
                );
            }
            Ok(())
        }
        "create-testfile" => {
            let path = positional
                .first()
                .ok_or_else(|| usage_error("create-testfile needs a path"))?;
            let size_mb: u64 = match flag(&flags, "--size") {
                Some(size) => size.parse()?,
                None => 100,
            };
            create_test_file(Path::new(path), size_mb * 1024 * 1024).await?;
            Ok(())
        }
        other => Err(usage_error(&format!("unknown command: {}", other))),
    }
}

async fn run_directory(config: &ClusterConfig, flags: &[(String, String)]) -> anyhow::Result<()> {
    let bind_addr: SocketAddr = match flag(flags, "--bind") {
        Some(addr) => addr.parse()?,
        None => config.directory_addr,
    };

    let registry = NodeRegistry::new(config.storage_nodes.clone())?;
    for node in registry.nodes() {
        tracing::info!("  - storage node {} at {}", node.id, node.addr);
    }
    let service = DirectoryService::new(registry, config.block_size)?;

    tracing::info!("Directory listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, directory_router(service)).await?;
    Ok(())
}

async fn run_storage(config: &ClusterConfig, flags: &[(String, String)]) -> anyhow::Result<()> {
    let id = flag(flags, "--id").ok_or_else(|| usage_error("storage needs --id"))?;

    let bind_addr: SocketAddr = match (flag(flags, "--bind"), config.find_node(id)) {
        (Some(addr), _) => addr.parse()?,
        (None, Some(node)) => node.addr,
        (None, None) => {
            return Err(usage_error(&format!(
                "node {} is not in the configured registry, pass --bind",
                id
            )));
        }
    };
    let dir = match flag(flags, "--dir") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("storage_data").join(id),
    };

    let store = DiskBlockStore::open(dir).await?;
    let node = StorageNode::new(NodeId::new(id), Arc::new(store));

    tracing::info!("Storage node {} listening on {}", id, bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, storage_router(node)).await?;
    Ok(())
}

/// Separates `--flag value` pairs from positional arguments.
fn split_flags(args: &[String]) -> anyhow::Result<(Vec<String>, Vec<(String, String)>)> {
    let mut positional = Vec::new();
    let mut flags = Vec::new();

    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| usage_error(&format!("{} needs a value", args[i])))?;
            flags.push((args[i].clone(), value.clone()));
            i += 2;
        } else {
            positional.push(args[i].clone());
            i += 1;
        }
    }

    Ok((positional, flags))
}

fn flag<'a>(flags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    flags
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn usage_error(message: &str) -> anyhow::Error {
    anyhow::anyhow!("{}\n\n{}", message, USAGE)
}

fn health_label(healthy: bool) -> &'static str {
    if healthy { "healthy" } else { "unreachable" }
}
