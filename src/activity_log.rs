use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only record of what happened on the card, one line per action.
pub struct ActivityLog {
    file: Mutex<std::fs::File>,
}

impl ActivityLog {
    pub fn new(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub fn log(&self, action: &str, details: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] [{}] {}\n", timestamp, action, details);

        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    pub fn log_spin(&self, number: usize, label: &str) {
        self.log("SPIN", &format!("#{} {}", number, label));
    }

    pub fn log_advice(&self, label: &str) {
        self.log("ADVICE", label);
    }

    pub fn log_discarded(&self, label: &str) {
        self.log("DISCARDED", &format!("late advice for '{}'", label));
    }

    pub fn log_clear(&self) {
        self.log("CLEAR", "history cleared");
    }

    pub fn log_error(&self, error: &str) {
        self.log("ERROR", error);
    }
}
