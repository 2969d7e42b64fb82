use crate::{
    error::{CoreError, Result},
    model::{OutputFormat, Snapshot, UsageMap},
};
use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

/// Receives the outcome of every tick
pub trait Reporter: Send + Sync {
    fn report(&self, snapshot: &Snapshot) -> Result<()>;

    fn report_failure(&self, error: &CoreError) -> Result<()>;
}

/// Build the reporter matching `format`
pub fn reporter_for<W>(format: OutputFormat, out: W) -> Box<dyn Reporter>
where
    W: Write + Send + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextReporter::new(out)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
    }
}

/// Human-readable block per snapshot, every number tagged with its unit
pub struct TextReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_usage<W: Write>(out: &mut W, title: &str, usage: &UsageMap) -> std::io::Result<()> {
    writeln!(out, "{title} (%):")?;
    for (label, percent) in usage {
        writeln!(out, "  {label}: {percent:.2}")?;
    }
    Ok(())
}

impl<W: Write + Send> Reporter for TextReporter<W> {
    fn report(&self, s: &Snapshot) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        writeln!(out, "Snapshot at {}", s.timestamp.to_rfc3339())?;
        writeln!(out, "System Name: {}", s.host_name)?;
        writeln!(out, "OS Version: {}", s.os_description)?;
        writeln!(out, "MAC Addresses:")?;
        for mac in &s.mac_addresses {
            writeln!(out, "  {mac}")?;
        }
        writeln!(out, "Disk Specs (bytes):")?;
        for (device, size) in &s.disk_specs {
            writeln!(out, "  {device}: {size}")?;
        }
        writeln!(out, "CPU: {}", s.cpu_model)?;
        writeln!(out, "CPU Cores: {}", s.cpu_core_count)?;
        writeln!(out, "Total Memory: {:.2} MiB", s.total_memory_mib)?;
        writeln!(out, "Total CPU Usage: {:.2} %", s.cpu_total_usage_percent)?;
        write_usage(&mut *out, "CPU Usage Per Core", &s.cpu_per_core_usage_percent)?;
        write_usage(&mut *out, "Disk Usage", &s.disk_usage_percent)?;
        writeln!(out, "Network Usage (KiB/s in / out):")?;
        for net in &s.network_usage {
            writeln!(
                out,
                "  {}: {:.2} / {:.2}",
                net.interface, net.kib_in_per_sec, net.kib_out_per_sec
            )?;
        }
        writeln!(out, "Remaining Memory: {:.2} MiB", s.remaining_memory_mib)?;
        writeln!(out, "System Uptime: {:.2} s", s.uptime_seconds)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    fn report_failure(&self, error: &CoreError) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(out, "Sample failed: {error}")?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Reporter for JsonReporter<W> {
    fn report(&self, snapshot: &Snapshot) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *out, snapshot)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    fn report_failure(&self, error: &CoreError) -> Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *out, &serde_json::json!({ "error": error.to_string() }))?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}
