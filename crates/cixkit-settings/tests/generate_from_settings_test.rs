use cixkit_camtools::{generate_drill_test, DrillTestError};
use cixkit_settings::{DrillTestSettings, GroupSettings, SelectionMode};
use tempfile::tempdir;

const TOOLING_XML: &str = r#"<Tooling>
    <Spindle Name="T7" Child="D5MM70"/>
    <Spindle Name="T8" Child="D5MM70"/>
    <Spindle Name="T10" Child="D8MM70"/>
    <Spindle Name="T2" Child="D12MM70"/>
</Tooling>"#;

#[test]
fn test_settings_file_drives_generation() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("drill.toml");
    std::fs::write(
        &settings_path,
        r#"
output_file = "custom_drill_test.cix"

[layout]
start_x = 50.0
start_y = 100.0
spacing_x = 40.0
spacing_y = 60.0

[machining]
drill_depth = 18.0
engraving_tool = "v90d3mm"

[naming]
auto_timestamp = false

[selection]
mode = "custom"

[[selection.groups]]
diameter = 5.0
spindles = [8, 7]

[[selection.groups]]
diameter = 12.0
spindles = [2]
"#,
    )
    .unwrap();

    let settings = DrillTestSettings::load_from_file(&settings_path).unwrap();
    let (config, request) = settings.freeze().unwrap();
    let output = generate_drill_test(TOOLING_XML, &request, &config).unwrap();

    assert_eq!(output.drill_blocks, 3);
    assert_eq!(output.engraving_blocks, 2);
    assert!(output.content.contains("\tPARAM,NAME=TNM,VALUE=\"V90D3MM\""));
    assert!(output.content.contains("\tPARAM,NAME=DP,VALUE=18.0"));
    assert!(output.content.find("\"T8\"").unwrap() < output.content.find("\"T7\"").unwrap());

    let out_path = dir.path().join(config.output_filename());
    std::fs::write(&out_path, &output.content).unwrap();
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.starts_with("BEGIN ID CID3"));
    assert!(written.ends_with('\n'));
}

#[test]
fn test_unknown_spindle_in_settings_is_refused() {
    let mut settings = DrillTestSettings::new();
    settings.selection.mode = SelectionMode::Custom;
    settings.selection.groups.push(GroupSettings {
        diameter: 8.0,
        spindles: vec![10, 11],
    });
    let (config, request) = settings.freeze().unwrap();

    let err = generate_drill_test(TOOLING_XML, &request, &config).unwrap_err();
    match err {
        DrillTestError::Validation(failure) => {
            assert_eq!(failure.to_string(), "Validation failed: Spindle 11 not found in XML");
        }
        other => panic!("unexpected error: {}", other),
    }
}
