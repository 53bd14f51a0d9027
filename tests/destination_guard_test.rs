//! Runs in its own test binary because it changes the working directory.

use ironmaker::config::options_from_file;
use ironmaker::constants::DEFAULT_TEMPLATE_DIR;
use ironmaker::error::Error;
use ironmaker::generator::generate;
use ironmaker::options::Options;
use ironmaker::progress::NullSink;
use ironmaker::renderer::Templates;
use tempfile::TempDir;

#[test]
fn test_working_directory_is_never_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path().join("work");
    std::fs::create_dir(&work).unwrap();
    std::fs::write(work.join("precious.txt"), "keep").unwrap();
    std::env::set_current_dir(&work).unwrap();
    let templates = Templates::new(DEFAULT_TEMPLATE_DIR);

    // An answers file pointing at the working directory, with --force.
    let answers = temp_dir.path().join("answers.json");
    std::fs::write(&answers, r#"{"name": "demo", "directory": "."}"#).unwrap();
    let err = options_from_file(&answers, &work, true).unwrap_err();
    assert!(matches!(err, Error::ValidationError(_)));

    // Options built by hand still cannot replace the working directory or its parent.
    for directory in [work.join("."), work.clone(), temp_dir.path().to_path_buf()] {
        let mut options = Options::new("demo", directory);
        options.overwrite = Some(true);
        let err = generate(&options, &templates, &NullSink).unwrap_err();
        assert!(matches!(err, Error::ValidationError(_)));
    }

    assert_eq!(std::fs::read_to_string(work.join("precious.txt")).unwrap(), "keep");
    assert!(answers.exists());
}
