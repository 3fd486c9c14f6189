//! File operations on local paths. Remote paths share the same code above
//! the command layer, so these exercise the whole API without a server.

use remotelib::{DirOptions, Error, Path};
use tempfile::TempDir;

fn workspace() -> (TempDir, Path) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let path = Path::from(dir.path());
    (dir, path)
}

#[tokio::test]
async fn test_write_read_exists() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let file = &root / "notes.txt";

    assert!(!file.exists().await);
    assert!(!file.try_exists().await?);

    file.write_text("hello\nworld\n").await?;
    assert!(file.exists().await);
    assert_eq!(file.read_to_string().await?, "hello\nworld\n");

    file.write(b"\x00\x01binary").await?;
    assert_eq!(file.read().await?, b"\x00\x01binary");

    Ok(())
}

#[tokio::test]
async fn test_read_missing_is_not_found() {
    let (_dir, root) = workspace();
    let err = (&root / "missing").read_to_string().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_touch_creates_and_updates() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let file = &root / "touched";

    file.touch().await?;
    assert!(file.is_file().await?);
    assert_eq!(file.metadata().await?.len(), 0);

    file.write_text("keep").await?;
    file.touch().await?;
    assert_eq!(file.read_to_string().await?, "keep");

    Ok(())
}

#[tokio::test]
async fn test_mkdir_options() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let nested = &root / "a" / "b";

    let err = nested.create_dir().await.unwrap_err();
    assert!(err.is_not_found());

    nested.create_dir_all().await?;
    assert!(nested.is_dir().await?);

    let err = nested.create_dir().await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    nested
        .mkdir(DirOptions {
            parents: false,
            exist_ok: true,
        })
        .await?;

    let err = nested
        .mkdir(DirOptions {
            parents: true,
            exist_ok: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    let file = &root / "file";
    file.touch().await?;
    let err = file
        .mkdir(DirOptions {
            parents: false,
            exist_ok: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(_)));

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_and_types() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let target = &root / "target.txt";
    let link = &root / "link.txt";

    target.write_text("data").await?;
    link.symlink_to(target.as_std_path()).await?;

    assert!(link.is_symlink().await?);
    assert!(link.is_file().await?);
    assert!(!target.is_symlink().await?);
    assert!(!root.is_file().await?);
    assert!(!link.is_dir().await?);
    assert!(!(&root / "nothing").is_dir().await?);
    assert!(!(&root / "nothing").is_socket().await?);

    assert!(link.symlink_metadata().await?.is_symlink());
    assert_eq!(link.metadata().await?.len(), 4);
    assert_eq!(link.canonicalize().await?, target.canonicalize().await?);

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_set_permissions() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let file = &root / "script.sh";

    file.touch().await?;
    file.set_permissions(0o750).await?;
    assert_eq!(file.metadata().await?.permissions(), 0o750);

    Ok(())
}

#[tokio::test]
async fn test_remove() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let file = &root / "gone";
    let dir = &root / "empty";

    file.touch().await?;
    file.remove_file(false).await?;
    assert!(!file.exists().await);

    assert!(file.remove_file(false).await.unwrap_err().is_not_found());
    file.remove_file(true).await?;

    dir.create_dir().await?;
    dir.remove_dir().await?;
    assert!(!dir.exists().await);

    Ok(())
}

#[tokio::test]
async fn test_glob_and_read_dir() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    for name in ["b.rs", "a.rs", "c.txt"] {
        (&root / name).touch().await?;
    }
    (&root / "sub").create_dir().await?;
    (&root / "sub" / "d.rs").touch().await?;

    let found = root.glob("*.rs").await?;
    assert_eq!(found, [&root / "a.rs", &root / "b.rs"]);

    let found = root.glob("**/*.rs").await?;
    assert_eq!(found.len(), 3);
    assert!(found.contains(&(&root / "sub" / "d.rs")));

    assert!(root.glob("*.none").await?.is_empty());
    assert!(matches!(root.glob("[").await, Err(Error::InvalidPattern(_))));

    let entries = root.read_dir().await?;
    assert_eq!(
        entries,
        [&root / "a.rs", &root / "b.rs", &root / "c.txt", &root / "sub"]
    );

    Ok(())
}

#[tokio::test]
async fn test_rename_and_replace() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let from = &root / "from";
    let to = &root / "to";

    from.write_text("one").await?;
    to.write_text("two").await?;
    from.replace(&to).await?;

    assert!(!from.exists().await);
    assert_eq!(to.read_to_string().await?, "one");

    Ok(())
}

#[tokio::test]
async fn test_canonicalize_missing_keeps_path() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let missing = &root / "not" / "here";
    assert_eq!(missing.canonicalize().await?, missing);
    Ok(())
}

#[tokio::test]
async fn test_glob_under_directory_with_metacharacters() -> anyhow::Result<()> {
    let (_dir, root) = workspace();
    let logs = &root / "logs[2024]?";
    logs.create_dir().await?;
    (&logs / "x.log").touch().await?;
    (&logs / "y.txt").touch().await?;

    assert_eq!(logs.glob("*.log").await?, [&logs / "x.log"]);
    assert_eq!(logs.glob("**/*").await?.len(), 2);

    Ok(())
}
