//! Runs in its own test binary because it changes the working directory.

use ironmaker::utils::delete_directory_recursive;
use tempfile::TempDir;

#[test]
fn test_protected_targets_are_never_deleted() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path().join("work");
    std::fs::create_dir_all(work.join("sub")).unwrap();
    std::fs::write(work.join("keep.txt"), "keep").unwrap();
    #[cfg(unix)]
    std::fs::create_dir(work.join("*")).unwrap();
    std::fs::create_dir(temp_dir.path().join("sibling")).unwrap();
    std::env::set_current_dir(&work).unwrap();

    assert!(!delete_directory_recursive(".").unwrap());
    assert!(!delete_directory_recursive("*").unwrap());
    assert!(!delete_directory_recursive("./").unwrap());
    assert!(!delete_directory_recursive("sub/..").unwrap());
    assert!(!delete_directory_recursive("..").unwrap());
    assert!(!delete_directory_recursive(work.join(".")).unwrap());
    assert!(!delete_directory_recursive(&work).unwrap());
    assert!(!delete_directory_recursive(temp_dir.path()).unwrap());

    assert!(work.join("keep.txt").exists());
    assert!(work.join("sub").is_dir());
    #[cfg(unix)]
    assert!(work.join("*").is_dir());

    // Anything outside the working directory's ancestry is still removable.
    assert!(delete_directory_recursive("../sibling").unwrap());
    assert!(!temp_dir.path().join("sibling").exists());
    assert!(delete_directory_recursive("sub").unwrap());
    assert!(!work.join("sub").exists());
}
