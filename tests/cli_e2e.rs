//! End-to-end CLI tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn wstools() -> Command {
    Command::cargo_bin("wstools").expect("binary builds")
}

#[test]
fn test_export_url_with_format_prints_one_url() {
    wstools()
        .args([
            "export-url",
            "Lorem",
            "--format",
            "epub",
            "--base-url",
            "exportUrl",
            "--server-name",
            "ru.wikisource.org",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "exportUrl/?format=epub&lang=ru&page=Lorem",
        ));
}

#[test]
fn test_export_url_without_format_prints_sidebar_links() {
    let assert = wstools()
        .args([
            "export-url",
            "A Tale of Two Cities",
            "--base-url",
            "https://tool",
            "--server-name",
            "en.wikisource.org",
        ])
        .assert()
        .success();

    assert
        .stdout(predicate::str::contains("wikisource-download-epub"))
        .stdout(predicate::str::contains("format=epub-3"))
        .stdout(predicate::str::contains("format=mobi"))
        .stdout(predicate::str::contains("format=pdf-a4"))
        .stdout(predicate::str::contains("title=A_Tale_of_Two_Cities"));
}

#[test]
fn test_works_resolves_over_entity_file() {
    let mut entities = NamedTempFile::new().expect("temp file");
    write!(
        entities,
        r#"[
            {{
                "id": "Q1",
                "claims": {{
                    "P629": [
                        {{
                            "mainsnak": {{
                                "snaktype": "value",
                                "datavalue": {{
                                    "type": "wikibase-entityid",
                                    "value": {{ "id": "Q10" }}
                                }}
                            }},
                            "rank": "normal"
                        }}
                    ]
                }}
            }},
            {{ "id": "Q10" }}
        ]"#
    )
    .expect("write entities");

    wstools()
        .args(["-q", "works", "Q1", "--entities"])
        .arg(entities.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Q10"))
        .stdout(predicate::str::contains("usage\tstatement\tQ1\tP629"));
}

#[test]
fn test_works_with_unknown_item_prints_nothing() {
    let mut entities = NamedTempFile::new().expect("temp file");
    write!(entities, r#"[ {{ "id": "Q1" }} ]"#).expect("write entities");

    wstools()
        .args(["-q", "works", "Q404", "--entities"])
        .arg(entities.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_bad_item_id_is_rejected() {
    let mut entities = NamedTempFile::new().expect("temp file");
    write!(entities, "[]").expect("write entities");

    wstools()
        .args(["-q", "works", "X1", "--entities"])
        .arg(entities.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid item id"));
}

#[test]
fn test_sitelinks_outputs_grouped_sidebar() {
    let mut entities = NamedTempFile::new().expect("temp file");
    write!(
        entities,
        r#"[
            {{
                "id": "Q1",
                "claims": {{
                    "P629": [
                        {{
                            "mainsnak": {{
                                "snaktype": "value",
                                "datavalue": {{
                                    "type": "wikibase-entityid",
                                    "value": {{ "id": "Q10" }}
                                }}
                            }},
                            "rank": "normal"
                        }}
                    ]
                }}
            }},
            {{
                "id": "Q10",
                "sitelinks": {{
                    "enwiki": {{ "site": "enwiki", "title": "A Tale" }}
                }}
            }}
        ]"#
    )
    .expect("write entities");

    let mut sites = NamedTempFile::new().expect("temp file");
    write!(
        sites,
        r#"[
            {{
                "global_id": "enwiki",
                "group": "wikipedia",
                "language_code": "en",
                "page_url_template": "https://en.wikipedia.org/wiki/$1"
            }}
        ]"#
    )
    .expect("write sites");

    wstools()
        .args(["-q", "sitelinks", "Q1", "-a", "enwiki", "--entities"])
        .arg(entities.path())
        .arg("--sites")
        .arg(sites.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wikibase-otherprojects-wikipedia"))
        .stdout(predicate::str::contains(
            "https://en.wikipedia.org/wiki/A_Tale",
        ))
        .stdout(predicate::str::contains("usage\tsitelinks\tQ10"));
}

#[test]
fn test_missing_subcommand_shows_usage() {
    wstools()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_entities_file_fails_with_context() {
    wstools()
        .args(["-q", "works", "Q1", "--entities", "/nonexistent/entities.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
