use lineprof::parser::parse_call_stack;
use lineprof::utils::LogDiagnostics;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

struct RecordingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for RecordingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: RecordingLogger = RecordingLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_module_frames_stay_below_info() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let frames = parse_call_stack(
        "nn.Module: Linear_0;/m.py(3): forward;nn.Module: ReLU_1",
        &LogDiagnostics,
    );
    assert_eq!(frames.len(), 1);

    let records = LOGGER.records.lock().unwrap();
    let skipped: Vec<&(Level, String)> = records
        .iter()
        .filter(|(_, message)| message.contains("nn.Module"))
        .collect();

    assert_eq!(skipped.len(), 2);
    assert!(skipped.iter().all(|(level, _)| *level == Level::Debug));
}
