//! Status command - report the health of the Consul installation

use meshstat_kube::status::{self, StatusConfig};
use meshstat_kube::{ClusterAccess, DriverKind, KubeWorkloads, ReleaseRegistry};

use crate::StatusArgs;
use crate::display::TerminalReporter;
use crate::error::{CliError, Result};

/// Run the status command
pub fn run(args: &StatusArgs) -> Result<()> {
    if !args.extra.is_empty() {
        return Err(CliError::usage("status should have no non-flag arguments"));
    }

    let driver: DriverKind = args.storage_driver.parse().map_err(CliError::config)?;
    let access = ClusterAccess::new(args.kubeconfig.clone(), args.context.clone());

    // Every call is awaited in turn; one thread is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::internal(format!("starting async runtime: {}", e)))?;

    runtime.block_on(check(&access, driver))
}

async fn check(access: &ClusterAccess, driver: DriverKind) -> Result<()> {
    let client = access.connect().await.map_err(CliError::config)?;

    let registry = ReleaseRegistry::for_driver(driver, client.clone());
    tracing::debug!(driver = registry.driver_name(), "checking mesh status");
    let workloads = KubeWorkloads::new(client);
    let mut reporter = TerminalReporter::stdout();

    status::run(&StatusConfig::default(), &registry, &workloads, &mut reporter).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_positional_args_rejected() {
        let args = StatusArgs {
            extra: vec!["consul".to_string()],
            ..Default::default()
        };

        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Usage { .. }));
        assert_eq!(err.to_string(), "status should have no non-flag arguments");
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let args = StatusArgs {
            storage_driver: "sql".to_string(),
            ..Default::default()
        };

        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_missing_kubeconfig_is_config_error() {
        let args = StatusArgs {
            kubeconfig: Some(PathBuf::from("/nonexistent/meshstat/kubeconfig")),
            storage_driver: "secret".to_string(),
            ..Default::default()
        };

        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(!err.already_reported());
    }
}
