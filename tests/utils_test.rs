use std::cell::RefCell;
use std::path::{Path, PathBuf};

use ironmaker::error::Error;
use ironmaker::progress::{NullSink, ProgressSink};
use ironmaker::utils::{
    contains_working_directory, delete_directory_recursive, encloses, ensure_directory, ensure_inside, is_directory_empty,
    list_directory, normalize_path, read_file, relative_path, write_file,
};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSink {
    created: RefCell<Vec<PathBuf>>,
}

impl ProgressSink for RecordingSink {
    fn on_file_created(&self, path: &Path) {
        self.created.borrow_mut().push(path.to_path_buf());
    }
}

#[test]
fn test_relative_path() {
    assert_eq!(relative_path("./routes/base.js").unwrap(), PathBuf::from("routes/base.js"));
    assert_eq!(relative_path(".").unwrap(), PathBuf::new());
    assert!(matches!(relative_path("../outside"), Err(Error::PathTraversal { .. })));
    assert!(matches!(relative_path("views/../../outside"), Err(Error::PathTraversal { .. })));
    assert!(matches!(relative_path("/etc/passwd"), Err(Error::PathTraversal { .. })));
}

#[test]
fn test_ensure_directory_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("a/b/c");
    let sink = RecordingSink::default();

    assert!(ensure_directory(&target, &sink).unwrap());
    assert!(target.is_dir());
    assert!(!ensure_directory(&target, &sink).unwrap());

    // Reported once, with a trailing separator.
    let created = sink.created.borrow();
    assert_eq!(created.len(), 1);
    assert!(created[0].to_string_lossy().ends_with(std::path::MAIN_SEPARATOR));
}

#[cfg(unix)]
#[test]
fn test_ensure_directory_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("mode");
    ensure_directory(&target, &NullSink).unwrap();

    let mode = std::fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    // Subject to the umask, never wider than 0755.
    assert_eq!(mode & !0o755, 0);
    assert_ne!(mode & 0o700, 0);
}

#[cfg(unix)]
#[test]
fn test_write_file_modes() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let plain = temp_dir.path().join("nested/plain.txt");
    let script = temp_dir.path().join("script.js");

    write_file(&plain, "plain", false).unwrap();
    write_file(&script, "#!/usr/bin/env node\n", true).unwrap();

    assert_eq!(std::fs::read_to_string(&plain).unwrap(), "plain");
    let plain_mode = std::fs::metadata(&plain).unwrap().permissions().mode() & 0o777;
    assert_eq!(plain_mode & 0o111, 0);

    let script_mode = std::fs::metadata(&script).unwrap().permissions().mode() & 0o777;
    assert_eq!(script_mode, 0o755);
}

#[test]
fn test_write_file_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("file.txt");

    write_file(&path, "a longer first version", false).unwrap();
    write_file(&path, "second", false).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
}

#[test]
fn test_read_file_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let err = read_file(temp_dir.path(), "missing.txt").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_list_directory_and_emptiness() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    assert!(is_directory_empty(root).unwrap());
    assert!(is_directory_empty(root.join("missing")).unwrap());

    std::fs::write(root.join("b.txt"), "").unwrap();
    std::fs::write(root.join("a.txt"), "").unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();

    let names: Vec<String> = list_directory(root).unwrap().into_iter().collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    assert!(!is_directory_empty(root).unwrap());
}

#[test]
fn test_delete_directory_recursive() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("project");
    std::fs::create_dir_all(target.join("routes")).unwrap();
    std::fs::write(target.join("routes/base.js"), "").unwrap();

    assert!(delete_directory_recursive(&target).unwrap());
    assert!(!target.exists());
    assert!(!delete_directory_recursive(&target).unwrap());

    let file = temp_dir.path().join("single.txt");
    std::fs::write(&file, "").unwrap();
    assert!(delete_directory_recursive(&file).unwrap());
    assert!(!file.exists());
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("/work/."), PathBuf::from("/work"));
    assert_eq!(normalize_path("/work/a/../b/./c"), PathBuf::from("/work/b/c"));
    assert_eq!(normalize_path("/.."), PathBuf::from("/"));
    assert_eq!(normalize_path("../a"), PathBuf::from("../a"));
    assert_eq!(normalize_path("a/../.."), PathBuf::from(".."));
}

#[test]
fn test_encloses() {
    let cwd = Path::new("/home/user/work");
    assert!(encloses(".", cwd));
    assert!(encloses("/home/user/work/.", cwd));
    assert!(encloses("..", cwd));
    assert!(encloses("/", cwd));
    assert!(encloses("sub/..", cwd));
    assert!(!encloses("sub", cwd));
    assert!(!encloses("../other", cwd));
    assert!(!encloses("/home/user/workshop", cwd));
}

#[test]
fn test_ensure_inside() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");
    std::fs::create_dir_all(root.join("routes")).unwrap();

    assert!(ensure_inside(&root, root.join("routes/base.js")).is_ok());
    assert!(ensure_inside(&root, root.join("not/yet/created.js")).is_ok());
    assert!(matches!(
        ensure_inside(&root, temp_dir.path().join("outside.txt")),
        Err(Error::PathTraversal { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_contains_working_directory_through_symlink() {
    let temp_dir = TempDir::new().unwrap();
    let cwd = temp_dir.path().join("real/work");
    std::fs::create_dir_all(&cwd).unwrap();
    let alias = temp_dir.path().join("alias");
    std::os::unix::fs::symlink(temp_dir.path().join("real"), &alias).unwrap();

    assert!(!encloses(&alias, &cwd));
    assert!(contains_working_directory(&alias, &cwd));
    assert!(contains_working_directory(alias.join("work"), &cwd));
    assert!(!contains_working_directory(temp_dir.path().join("real/other"), &cwd));
}
