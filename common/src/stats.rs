use comfy_table::Table;
use serde::{Deserialize, Serialize};
use sysinfo::{System, get_current_pid};

pub fn format_mem(bytes: u64) -> String {
    let mut size = bytes as f64;
    let units = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut unit = units[0];

    for next in &units[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }

    format!("{:.1} {}", size, unit)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub pid: String,
    pub hostname: String,
    pub proc_cpu: f32,
    pub proc_mem_bytes: u64,
    pub proc_uptime_secs: u64,
    pub host_cpu: f32,
    pub host_mem_used_bytes: u64,
    pub host_mem_total_bytes: u64,
    pub host_uptime_secs: u64,
    pub host_load_average: [f64; 3],
}

impl Stats {
    pub fn gather() -> Option<Self> {
        let mut sys = System::new_all();
        sys.refresh_all();

        let pid = get_current_pid().ok()?;
        let proc = sys.process(pid)?;

        let hostname = std::env::var("HOSTNAME")
            .ok()
            .or_else(System::host_name)
            .unwrap_or_else(|| "unknown".into());

        let load = System::load_average();

        Some(Self {
            pid: pid.to_string(),
            hostname,
            proc_cpu: proc.cpu_usage(),
            proc_mem_bytes: proc.memory(),
            proc_uptime_secs: proc.run_time(),
            host_cpu: sys.global_cpu_usage(),
            host_mem_used_bytes: sys.used_memory(),
            host_mem_total_bytes: sys.total_memory(),
            host_uptime_secs: System::uptime(),
            host_load_average: [load.one, load.five, load.fifteen],
        })
    }

    pub fn log_line(&self) -> String {
        let mut table = Table::new();

        table
            .set_header(vec!["Stat name", "value"])
            .add_row(vec!["Proc pid", &self.pid])
            .add_row(vec!["Proc CPU", format!("{:.1}%", self.proc_cpu).as_str()])
            .add_row(vec!["Proc RAM", format_mem(self.proc_mem_bytes).as_str()])
            .add_row(vec![
                "Proc uptime",
                format_duration(self.proc_uptime_secs).as_str(),
            ])
            .add_row(vec!["Host name", &self.hostname])
            .add_row(vec![
                "Host CPU",
                format!("{:.1}%", self.host_cpu).as_str(),
            ])
            .add_row(vec![
                "Host RAM",
                format!(
                    "{} / {}",
                    format_mem(self.host_mem_used_bytes),
                    format_mem(self.host_mem_total_bytes)
                )
                .as_str(),
            ])
            .add_row(vec![
                "Host load",
                format!(
                    "{} / {} / {}",
                    &self.host_load_average[0],
                    &self.host_load_average[1],
                    &self.host_load_average[2],
                )
                .as_str(),
            ])
            .add_row(vec![
                "Host uptime",
                &*format_duration(self.host_uptime_secs),
            ]);

        table.to_string()
    }
}

fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
