use crate::{
    error::{CoreError, Result},
    model::HostIdentity,
};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Source of the host facts that do not come from tool output
pub trait HostProbe: Send + Sync {
    fn identity(&self) -> Result<HostIdentity>;
}

/// Resolves host name, OS description and logical core count through sysinfo
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoHost;

impl SysinfoHost {
    pub fn new() -> Self {
        Self
    }
}

impl HostProbe for SysinfoHost {
    fn identity(&self) -> Result<HostIdentity> {
        let sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
        let cpu_core_count = sys.cpus().len();
        if cpu_core_count == 0 {
            return Err(CoreError::parse("CPU core count", "no CPUs reported"));
        }

        Ok(HostIdentity {
            host_name: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            os_description: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            cpu_core_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysinfo_reports_at_least_one_core() {
        let identity = SysinfoHost::new().identity().unwrap();
        assert!(identity.cpu_core_count >= 1);
        assert!(!identity.host_name.is_empty());
    }
}
