use tabula_layout::LayoutError;
use tabula_layout::telemetry::init_tracing;

#[test]
fn tracing_installs_once() {
    init_tracing("debug").expect("first subscriber installed");

    let second = init_tracing("info");
    assert!(matches!(second, Err(LayoutError::Logging(_))));
}
