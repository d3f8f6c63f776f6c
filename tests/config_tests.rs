// Configuration tests - verify config parsing and validation

use eventloop::application::config::loader::ConfigLoader;
use eventloop::application::config::models::ClockKind;
use eventloop::EventLoop;
use std::io::Write;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_valid_config_file() {
    let file = write_config(
        r#"
[event_loop]
clock = "monotonic"

[logging]
filter = "eventloop=debug,info"

[console]
timer_presets_ms = [100, 200, 300]
heartbeat_ms = 500
"#,
    );

    let config = ConfigLoader::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.event_loop.clock, ClockKind::Monotonic);
    assert_eq!(config.console.timer_presets().len(), 3);
    assert_eq!(config.console.heartbeat(), Some(Duration::from_millis(500)));
}

#[test]
fn test_empty_config_file_uses_defaults() {
    let file = write_config("");
    let config = ConfigLoader::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.logging.filter, "info");
    assert_eq!(config.console.timer_presets_ms.len(), 5);
}

#[test]
fn test_malformed_toml() {
    let file = write_config("[event_loop\nclock = ");
    let err = ConfigLoader::load(file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML config"));
}

#[test]
fn test_invalid_values_rejected() {
    let result = ConfigLoader::load_from_str(
        r#"
[console]
timer_presets_ms = [100, 0, 300]
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_wall_clock_loop_from_config() {
    let config = ConfigLoader::load_from_str(
        r#"
[event_loop]
clock = "wall"
"#,
    )
    .unwrap();

    let mut event_loop = EventLoop::from_config(&config.event_loop);
    let id = event_loop.add_timer(Duration::from_secs(60), |_| {});
    let remaining = event_loop.remaining_ms(id).unwrap();
    assert!(remaining > 59_000 && remaining <= 60_000);
}

#[test]
fn test_config_path_from_command_line() {
    let file = write_config(
        r#"
[console]
timer_presets_ms = [250]
"#,
    );
    let args = vec![
        "eventloop-demo".to_string(),
        file.path().to_string_lossy().into_owned(),
    ];

    let config = ConfigLoader::from_args(args).unwrap();
    assert_eq!(config.console.timer_presets(), vec![Duration::from_millis(250)]);
}
