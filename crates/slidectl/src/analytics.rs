use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Receives a fire-and-forget event for every slide transition.
pub trait AnalyticsSink {
    fn slide_view(&mut self, index: usize);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideViewEvent {
    pub event: &'static str,
    pub category: &'static str,
    pub label: String,
    pub value: usize,
}

impl SlideViewEvent {
    pub fn new(index: usize) -> Self {
        let number = index + 1;
        Self {
            event: "slide_view",
            category: "Presentation",
            label: format!("Slide {number}"),
            value: number,
        }
    }
}

/// Logs each view through `tracing`.
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn slide_view(&mut self, index: usize) {
        tracing::info!(slide = index + 1, "Viewed slide: {}", index + 1);
    }
}

/// Appends one JSON object per view to a file.
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn write_event(&mut self, event: &SlideViewEvent) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl AnalyticsSink for JsonlSink {
    fn slide_view(&mut self, index: usize) {
        if let Err(e) = self.write_event(&SlideViewEvent::new(index)) {
            tracing::warn!("analytics write to {} failed: {e}", self.path.display());
        }
    }
}

/// Forwards every event to each of its sinks.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn AnalyticsSink>>,
}

impl FanoutSink {
    pub fn with(mut self, sink: impl AnalyticsSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl AnalyticsSink for FanoutSink {
    fn slide_view(&mut self, index: usize) {
        for sink in &mut self.sinks {
            sink.slide_view(index);
        }
    }
}

/// Build the sink stack: always log, and append to `log_file` when given.
/// A log file that cannot be opened is reported and skipped.
pub fn build(log_file: Option<&Path>) -> FanoutSink {
    let fanout = FanoutSink::default().with(LogSink);
    match log_file.map(JsonlSink::open) {
        Some(Ok(sink)) => fanout.with(sink),
        Some(Err(e)) => {
            tracing::warn!("analytics log disabled: {e}");
            fanout
        }
        None => fanout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<usize>>>);

    impl AnalyticsSink for Recorder {
        fn slide_view(&mut self, index: usize) {
            self.0.borrow_mut().push(index);
        }
    }

    #[test]
    fn test_event_is_one_based() {
        let event = SlideViewEvent::new(2);
        assert_eq!(event.label, "Slide 3");
        assert_eq!(event.value, 3);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"slide_view","category":"Presentation","label":"Slide 3","value":3}"#
        );
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Rc::new(RefCell::new(Vec::new()));
        let b = Rc::new(RefCell::new(Vec::new()));
        let mut sink = FanoutSink::default()
            .with(Recorder(a.clone()))
            .with(Recorder(b.clone()));
        sink.slide_view(1);
        sink.slide_view(4);
        assert_eq!(*a.borrow(), vec![1, 4]);
        assert_eq!(*b.borrow(), vec![1, 4]);
    }

    #[test]
    fn test_jsonl_sink_appends_lines() {
        let path = std::env::temp_dir().join(format!("slidectl-analytics-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut sink = JsonlSink::open(&path).unwrap();
            sink.slide_view(0);
            sink.slide_view(1);
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["label"], "Slide 2");
        assert_eq!(second["value"], 2);
        let _ = std::fs::remove_file(&path);
    }
}
