// Logging unit tests
//
// Only one global subscriber can be installed per process, so these tests
// exercise directive construction and a scoped subscriber instead.

use sitepulse::config::{LogFormat, LoggingConfig};
use sitepulse::logging::default_directive;

#[test]
fn test_default_directive_uses_configured_level() {
    let config = LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Text,
    };
    assert_eq!(default_directive(&config, false), "warn");
}

#[test]
fn test_verbose_directive_raises_crate_level() {
    let config = LoggingConfig::default();
    let directive = default_directive(&config, true);
    assert!(directive.starts_with("info"));
    assert!(directive.contains("sitepulse=debug"));
}

#[test]
fn test_structured_fields_reach_scoped_subscriber() {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(page = "/pricing", events = 3, "Drained unified event queue");
    });

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(line["fields"]["page"], "/pricing");
    assert_eq!(line["fields"]["events"], 3);
}
