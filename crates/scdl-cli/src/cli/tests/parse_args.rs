use super::super::Cli;
use super::{parse, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_list() {
    match parse(&["scdl", "list", "https://soundcloud.com/a", "https://soundcloud.com/b"]) {
        CliCommand::List {
            urls,
            only_main_track,
        } => {
            assert_eq!(urls, vec!["https://soundcloud.com/a", "https://soundcloud.com/b"]);
            assert!(!only_main_track);
        }
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_download_defaults() {
    match parse(&["scdl", "download", "https://soundcloud.com/a"]) {
        CliCommand::Download {
            urls,
            dest,
            one_at_a_time,
            only_main_track,
            select,
        } => {
            assert_eq!(urls.len(), 1);
            assert!(dest.is_none());
            assert!(!one_at_a_time);
            assert!(!only_main_track);
            assert!(select.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_all_flags() {
    match parse(&[
        "scdl",
        "download",
        "--dest",
        "/tmp/SC tracks",
        "--one-at-a-time",
        "--only-main-track",
        "--select",
        "1,3-5",
        "https://soundcloud.com/a",
    ]) {
        CliCommand::Download {
            dest,
            one_at_a_time,
            only_main_track,
            select,
            ..
        } => {
            assert_eq!(dest, Some(PathBuf::from("/tmp/SC tracks")));
            assert!(one_at_a_time);
            assert!(only_main_track);
            assert_eq!(select.as_deref(), Some("1,3-5"));
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_short_dest() {
    match parse(&["scdl", "download", "-d", "out", "https://soundcloud.com/a"]) {
        CliCommand::Download { dest, .. } => assert_eq!(dest, Some(PathBuf::from("out"))),
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_requires_at_least_one_url() {
    assert!(Cli::try_parse_from(["scdl", "download"]).is_err());
    assert!(Cli::try_parse_from(["scdl", "list"]).is_err());
}
