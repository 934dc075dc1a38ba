use clap::Parser;

use super::*;

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::parse_from(args)
}

#[test]
fn defaults_apply_without_sources() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.backend.url.is_none());
    assert_eq!(settings.storage.bucket, "images");
    assert_eq!(settings.contact.rate_limit, Duration::seconds(60));
    assert_eq!(
        settings.contact.ledger_path,
        PathBuf::from(".folio/contact.json")
    );
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("https://file.example.co".to_string());
    raw.logging.level = Some("info".to_string());

    let args = parse(&[
        "folio",
        "--backend-url",
        "https://cli.example.co",
        "--log-level",
        "debug",
        "stats",
    ]);
    raw.apply_overrides(&args.overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.backend.url.as_ref().map(Url::as_str),
        Some("https://cli.example.co/")
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn global_flags_are_accepted_after_subcommand() {
    let args = parse(&["folio", "projects", "list", "--log-json", "true"]);
    assert_eq!(args.overrides.log_json, Some(true));
    assert!(matches!(
        args.command,
        Command::Projects(ProjectsArgs {
            action: ProjectsCmd::List
        })
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    raw.apply_overrides(&GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn rejects_non_http_backend_url() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("ftp://example.co".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid scheme");
    assert!(matches!(err, LoadError::Invalid { key: "backend.url", .. }));
}

#[test]
fn rejects_unknown_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn endpoint_requires_url_and_key() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("https://demo.example.co".to_string());
    let settings = Settings::from_raw(raw.clone()).expect("valid settings");
    assert!(matches!(
        settings.backend.endpoint(),
        Err(LoadError::Invalid {
            key: "backend.anon_key",
            ..
        })
    ));

    raw.backend.anon_key = Some("anon".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    let (url, key) = settings.backend.endpoint().expect("endpoint");
    assert_eq!(url.as_str(), "https://demo.example.co/");
    assert_eq!(key, "anon");
}

#[test]
fn zero_rate_limit_is_allowed() {
    let mut raw = RawSettings::default();
    raw.contact.rate_limit_seconds = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.contact.rate_limit, Duration::ZERO);
}

#[test]
fn parse_post_create_arguments() {
    let args = parse(&[
        "folio",
        "posts",
        "create",
        "--title",
        "Cómo crear plugins",
        "--content",
        "Hola",
        "--tags",
        "rust,cli",
        "--published",
        "yes",
    ]);

    match args.command {
        Command::Posts(PostsArgs {
            action: PostsCmd::Create(fields),
        }) => {
            assert_eq!(fields.title.as_deref(), Some("Cómo crear plugins"));
            assert_eq!(
                fields.tags,
                Some(vec!["rust".to_string(), "cli".to_string()])
            );
            assert_eq!(fields.published, Some(true));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}

#[test]
fn parse_upload_arguments() {
    let args = parse(&["folio", "upload", "projects", "./logo.png"]);
    match args.command {
        Command::Upload(upload) => {
            assert_eq!(upload.kind, AssetKindArg::Projects);
            assert_eq!(upload.file, PathBuf::from("./logo.png"));
        }
        other => panic!("wrong command parsed: {other:?}"),
    }
}
