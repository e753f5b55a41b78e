// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config, Resource};
use serde::de::DeserializeOwned;
use skupper_cert_manager::{
    cert_manager::Certificate as CmCertificate,
    client::KubeCertificateClient,
    constants::{METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PORT, TOKIO_WORKER_THREADS},
    crd::Certificate,
    informer::Informer,
    policy::IssuerPolicy,
    processor::EventProcessor,
    reconcilers::{CertManagerCertificateHandler, SkupperCertificateHandler},
    server,
};
use tracing::{debug, error, info, warn};

/// cert-manager delegate for Skupper certificates.
#[derive(Debug, Parser)]
#[command(name = "skupper-cert-manager", version, about)]
struct Args {
    /// Namespace to watch; empty watches every namespace
    #[arg(long, env = "WATCH_NAMESPACE", default_value = "")]
    namespace: String,

    /// Kubeconfig context to use instead of the inferred configuration
    #[arg(long, env = "KUBE_CONTEXT")]
    context: Option<String>,

    /// YAML file selecting issuers per namespace and CA
    #[arg(long, env = "ISSUER_POLICY")]
    issuer_policy: Option<PathBuf>,

    /// Port of the metrics and probe server
    #[arg(long, env = "METRICS_PORT", default_value_t = METRICS_SERVER_PORT)]
    metrics_port: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("skupper-cert-manager")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG, defaulting to INFO, and RUST_LOG_FORMAT=json for JSON output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(
        namespace = %args.namespace,
        context = ?args.context,
        issuer_policy = ?args.issuer_policy,
        "Starting Skupper cert-manager controller"
    );

    let policy = match &args.issuer_policy {
        Some(path) => IssuerPolicy::from_file(path)?,
        None => {
            debug!("No issuer policy configured, using root issuers only");
            IssuerPolicy::default()
        }
    };
    let policy = Arc::new(policy);

    debug!("Initializing Kubernetes client");
    let client = kube_client(args.context.as_deref()).await?;
    debug!("Kubernetes client initialized successfully");

    let certificate_client = Arc::new(KubeCertificateClient::new(client.clone()));

    let mut processor = EventProcessor::new();
    processor.add_handler(
        SkupperCertificateHandler::new(certificate_client.clone(), policy),
        Informer::new(scoped_api::<Certificate>(&client, &args.namespace)),
    );
    processor.add_handler(
        CertManagerCertificateHandler::new(certificate_client),
        Informer::new(scoped_api::<CmCertificate>(&client, &args.namespace)),
    );

    let bind_address: IpAddr = METRICS_SERVER_BIND_ADDRESS
        .parse()
        .context("invalid metrics bind address")?;
    let addr = SocketAddr::new(bind_address, args.metrics_port);
    let sync_status = processor.sync_status();
    tokio::spawn(async move {
        if let Err(e) = server::serve(addr, sync_status).await {
            error!(error = %e, "Metrics server failed");
        }
    });

    processor.start(shutdown_signal()).await;

    info!("Graceful shutdown completed successfully");
    Ok(())
}

/// Client from the named kubeconfig context, or the inferred configuration.
async fn kube_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..KubeConfigOptions::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("failed to load kubeconfig context {context}"))?
        }
        None => Config::infer()
            .await
            .context("failed to infer Kubernetes configuration")?,
    };
    Ok(Client::try_from(config)?)
}

/// Api over one namespace, or over every namespace when `namespace` is empty.
fn scoped_api<K>(client: &Client, namespace: &str) -> Api<K>
where
    K: Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + std::fmt::Debug,
{
    if namespace.is_empty() {
        Api::all(client.clone())
    } else {
        Api::namespaced(client.clone(), namespace)
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM (pod termination), initiating graceful shutdown"),
    }
}
