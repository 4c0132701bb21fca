use std::fs;

use anyhow::Result;
use hostkit::{
    copy_file, env_to_json_string, file_exists, find_nonexistent_files, json_string_to_env,
    EnvError, FileError,
};
use serde_json::Value;

#[test]
fn nonexistent_files_preserve_input_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.txt").to_string_lossy().into_owned();
    let b = dir.path().join("b.txt").to_string_lossy().into_owned();
    let c = dir.path().join("c.txt").to_string_lossy().into_owned();
    fs::write(&b, "present")?;

    let missing = find_nonexistent_files(&[a.clone(), b, c.clone()]);
    assert_eq!(missing, vec![a, c]);
    Ok(())
}

#[test]
fn copy_makes_destination_visible() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("source.txt");
    let dst = dir.path().join("copy.txt");
    fs::write(&src, "payload\n")?;

    assert!(!file_exists(&dst));
    copy_file(&src, &dst, None)?;
    assert!(file_exists(&dst));
    assert_eq!(fs::read_to_string(&dst)?, "payload\n");
    Ok(())
}

#[test]
fn copy_into_missing_directory_needs_the_flag() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("source.txt");
    let dst = dir.path().join("nested").join("deeper").join("copy.txt");
    fs::write(&src, "payload")?;

    let err = copy_file(&src, &dst, Some(false)).unwrap_err();
    assert!(matches!(err, FileError::DestinationUnavailable(_)), "{err}");
    assert!(!file_exists(&dst));

    copy_file(&src, &dst, Some(true))?;
    assert_eq!(fs::read_to_string(&dst)?, "payload");
    Ok(())
}

#[test]
fn env_json_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let env = dir.path().join(".env");

    json_string_to_env(r#"{"A":"1","B":"2"}"#, &env)?;
    assert_eq!(fs::read_to_string(&env)?, "A=1\nB=2\n");

    let json: Value = serde_json::from_str(&env_to_json_string(&env)?)?;
    assert_eq!(json, serde_json::json!({"A": "1", "B": "2"}));
    Ok(())
}

#[test]
fn env_to_json_keeps_first_seen_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let env = dir.path().join(".env");
    fs::write(
        &env,
        "# database\nDB_URL=postgres://app@localhost/app?x=1\n\nZ=last\nA=first\nZ=again\n",
    )?;

    let json = env_to_json_string(&env)?;
    assert_eq!(
        json,
        r#"{"DB_URL":"postgres://app@localhost/app?x=1","Z":"again","A":"first"}"#
    );
    Ok(())
}

#[test]
fn json_to_env_stringifies_scalars() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let env = dir.path().join(".env");

    json_string_to_env(r#"{"PORT":8080,"DEBUG":false,"EMPTY":null}"#, &env)?;
    assert_eq!(fs::read_to_string(&env)?, "PORT=8080\nDEBUG=false\nEMPTY=\n");
    Ok(())
}

#[test]
fn rejected_json_leaves_existing_file_alone() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let env = dir.path().join(".env");
    fs::write(&env, "KEEP=me\n")?;

    let err = json_string_to_env(r#"{"A":"1","NESTED":{"x":1}}"#, &env).unwrap_err();
    assert!(matches!(err, EnvError::UnsupportedValue { .. }), "{err}");

    let err = json_string_to_env(r#"["not", "an", "object"]"#, &env).unwrap_err();
    assert!(matches!(err, EnvError::NotAnObject));

    let err = json_string_to_env(r#"{"BAD=KEY":"v"}"#, &env).unwrap_err();
    assert!(matches!(err, EnvError::InvalidKey(_)));

    let err = json_string_to_env(r##"{"#A":"1","B":"2"}"##, &env).unwrap_err();
    assert!(matches!(err, EnvError::InvalidKey(_)));

    assert_eq!(fs::read_to_string(&env)?, "KEEP=me\n");
    Ok(())
}

#[test]
fn missing_env_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = env_to_json_string(dir.path().join("absent.env")).unwrap_err();
    assert!(matches!(err, EnvError::Read { .. }));
}
