use df_graph::{Direction, GraphBuilder};
use df_project::schema::*;
use df_project::{ProjectError, ValidationError, load_json, load_yaml, save_json, save_yaml};

fn sample() -> Application {
    let mut builder = GraphBuilder::new();
    let put = builder.create_node("put", "bin/put --rate 10").unwrap();
    let out = builder.add_port(put, "text", Direction::Out).unwrap();
    let get = builder.create_node("get", "bin/get").unwrap();
    builder.set_host(get, "node2").unwrap();
    let inp = builder.add_port(get, "text", Direction::In).unwrap();
    builder.add_port(get, "ack", Direction::Out).unwrap();
    builder.link(out, inp).unwrap();
    Application::from_builder("sample", &builder)
}

#[test]
fn roundtrip_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.yaml");
    let app = sample();

    save_yaml(&path, &app).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(app, loaded);

    let builder = loaded.to_builder().unwrap();
    assert_eq!(builder.port_by_name("get", "ack").map(|p| p.index()), Some(2));
}

#[test]
fn roundtrip_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.json");
    let app = sample();

    save_json(&path, &app).unwrap();
    assert_eq!(df_project::load(&path).unwrap(), app);
    assert_eq!(load_json(&path).unwrap(), app);
}

#[test]
fn save_refuses_invalid_application() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    let mut app = sample();
    app.links.push(LinkDef {
        from: "put.text".into(),
        to: "nowhere.text".into(),
    });

    assert!(matches!(
        save_yaml(&path, &app),
        Err(ProjectError::Validation(ValidationError::MissingReference { .. }))
    ));
    assert!(!path.exists());
}

#[test]
fn missing_fields_are_yaml_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "version: 1\nmodules:\n  - name: put\n").unwrap();
    assert!(matches!(load_yaml(&path), Err(ProjectError::Yaml(_))));
}

#[test]
fn duplicate_links_survive_loading_but_not_validation() {
    let mut app = sample();
    app.links.push(app.links[0].clone());
    let builder = app.to_builder().unwrap();
    assert_eq!(builder.links().len(), 2);
    assert!(builder.validate().is_err());
}
