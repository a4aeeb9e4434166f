use spy_core::{Census, CensusAdapter, Result, SpyError};
use std::sync::Mutex;
use sysinfo::{ProcessesToUpdate, System};

/// Counts live OS processes grouped by executable name.
///
/// Threads are not counted; only processes proper.
pub struct ProcessCensus {
    sys: Mutex<System>,
}

impl ProcessCensus {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }
}

impl Default for ProcessCensus {
    fn default() -> Self {
        Self::new()
    }
}

impl CensusAdapter for ProcessCensus {
    fn name(&self) -> &str {
        "process"
    }

    fn census(&self) -> Result<Census> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|_| SpyError::Census("process table lock poisoned".into()))?;
        // `true` = forget processes that exited since the last refresh
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let census = group_by_name(&sys);
        if census.is_empty() {
            return Err(SpyError::Census("no processes visible".into()));
        }
        tracing::trace!(types = census.len(), total = census.total(), "process census");
        Ok(census)
    }
}

fn group_by_name(sys: &System) -> Census {
    Census::from_names(
        sys.processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .map(|p| p.name().to_string_lossy().into_owned()),
    )
}
