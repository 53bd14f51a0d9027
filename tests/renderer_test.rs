use ironmaker::constants::DEFAULT_TEMPLATE_DIR;
use ironmaker::data::TemplateData;
use ironmaker::error::{Error, Result};
use ironmaker::formatter::CodeFormatter;
use ironmaker::renderer::{OutputKind, TemplateRenderer, Templates};
use serde_json::json;
use tempfile::TempDir;

fn template_root(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (name, contents) in files {
        let path = temp_dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    temp_dir
}

fn data(value: serde_json::Value) -> TemplateData {
    TemplateData::from_serialize(&value).unwrap()
}

#[test]
fn test_output_kind_from_name() {
    assert_eq!(OutputKind::from_name("app.js"), OutputKind::Code);
    assert_eq!(OutputKind::from_name("routes/base.mjs"), OutputKind::Code);
    assert_eq!(OutputKind::from_name("views/layout.hbs"), OutputKind::Text);
    assert_eq!(OutputKind::from_name(".env"), OutputKind::Text);
}

#[test]
fn test_code_outputs_quote_values() {
    let root = template_root(&[
        ("greet.js.j2", "const name = {{ name }};\nconst fragment = {{ code|safe }};\n"),
        ("greet.txt.j2", "Hello {{ name }}\n"),
    ]);
    let templates = Templates::new(root.path());
    let values = json!({ "name": "demo", "code": "require('x')" });

    let js = templates.load_with("greet.js", data(values.clone())).unwrap().render().unwrap();
    assert_eq!(js, "const name = \"demo\";\nconst fragment = require('x');\n");

    let text = templates.load_with("greet.txt", data(values)).unwrap().render().unwrap();
    assert_eq!(text, "Hello demo\n");
}

#[test]
fn test_code_outputs_render_sequences_as_literals() {
    let root = template_root(&[("list.js.j2", "const items = {{ items }};\n")]);
    let templates = Templates::new(root.path());

    let rendered = templates
        .load_with("list.js", data(json!({ "items": ["a", "b"] })))
        .unwrap()
        .render()
        .unwrap();
    assert!(rendered.starts_with("const items = ["));
    assert!(rendered.contains("\"a\""));
    assert!(rendered.contains("\"b\""));
}

#[test]
fn test_render_reflects_data_at_call_time() {
    let root = template_root(&[("note.txt.j2", "{{ greeting }}, {{ name }}!")]);
    let templates = Templates::new(root.path());

    let mut loaded = templates.load_with("note.txt", data(json!({ "greeting": "Hi" }))).unwrap();
    loaded.data.insert("name", "first");
    assert_eq!(loaded.render().unwrap(), "Hi, first!");

    loaded.data.insert("name", "second");
    assert_eq!(loaded.render().unwrap(), "Hi, second!");
}

#[test]
fn test_missing_template() {
    let root = template_root(&[]);
    let templates = Templates::new(root.path());

    match templates.load("routes/missing.js") {
        Err(Error::TemplateNotFound { name }) => assert_eq!(name, "routes/missing.js"),
        Err(other) => panic!("Expected TemplateNotFound, got {other}"),
        Ok(_) => panic!("Expected TemplateNotFound"),
    }
}

#[test]
fn test_template_name_cannot_leave_root() {
    let root = template_root(&[]);
    let templates = Templates::new(root.path());
    assert!(matches!(templates.load("../secret"), Err(Error::PathTraversal { .. })));
}

#[test]
fn test_syntax_error_is_reported() {
    let root = template_root(&[("bad.txt.j2", "{% if %}")]);
    let templates = Templates::new(root.path());
    let err = templates.load("bad.txt").unwrap().render().unwrap_err();
    assert!(matches!(err, Error::MinijinjaError(_)));
}

#[test]
fn test_malformed_code_output_is_rejected() {
    let root = template_root(&[("broken.js.j2", "function broken() {\n  return 1;\n")]);
    let templates = Templates::new(root.path());

    match templates.load("broken.js").unwrap().render() {
        Err(Error::RenderFormatError { template, .. }) => assert_eq!(template, "broken.js"),
        other => panic!("Expected RenderFormatError, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_code_output_is_formatted() {
    let root = template_root(&[(
        "app.js.j2",
        "const app = express();\n\n\n{% for use in uses %}\napp.use({{ use|safe }});\n{% endfor %}\nmodule.exports = {\n      app\n};",
    )]);
    let templates = Templates::new(root.path());

    let rendered = templates
        .load_with("app.js", data(json!({ "uses": ["logger('dev')", "cors({\norigin: true\n})"] })))
        .unwrap()
        .render()
        .unwrap();
    assert_eq!(
        rendered,
        "const app = express();\n\napp.use(logger('dev'));\napp.use(cors({\n  origin: true\n}));\nmodule.exports = {\n  app\n};\n"
    );
}

struct Upper;

impl CodeFormatter for Upper {
    fn format(&self, source: &str) -> std::result::Result<String, String> {
        Ok(source.to_uppercase())
    }
}

struct Echo;

impl TemplateRenderer for Echo {
    fn render(&self, name: &str, template: &str, _context: &serde_json::Value) -> Result<String> {
        Ok(format!("{name}:{template}"))
    }
}

#[test]
fn test_custom_renderer_and_formatter() {
    let root = template_root(&[("page.md.j2", "body"), ("app.js.j2", "{")]);
    let templates = Templates::with_renderer(root.path(), Box::new(Echo))
        .with_formatter("md", Box::new(Upper));

    assert_eq!(templates.load("page.md").unwrap().render().unwrap(), "PAGE.MD:BODY");
    // No formatter is registered for js on a custom renderer.
    assert_eq!(templates.load("app.js").unwrap().render().unwrap(), "app.js:{");
}

#[test]
fn test_bundled_server_template() {
    let templates = Templates::new(DEFAULT_TEMPLATE_DIR);
    let rendered = templates
        .load_with(
            "server.js",
            data(json!({ "name": "demo", "strict": true, "database": false })),
        )
        .unwrap()
        .render()
        .unwrap();

    assert!(rendered.starts_with("'use strict';\n\nrequire('dotenv').config();\n"));
    assert!(rendered.contains("const debug = require('debug')(\"demo:server\");"));
    assert!(!rendered.contains("mongoose"));
    assert!(rendered.ends_with("initiate();\n"));
}
