//! End-to-end translation of a representative `mysqldump --compact` output.

use mysql2sqlite_core::{DialectTranslator, is_disallowed};

const DUMP: &str = r#"CREATE TABLE "customers" (
  "id" int(10) unsigned NOT NULL auto_increment,
  "name" varchar(64) character set utf8 collate utf8_bin NOT NULL,
  "updated_at" timestamp NOT NULL default CURRENT_TIMESTAMP on update CURRENT_TIMESTAMP,
  "tier" enum('free','pro','enterprise') NOT NULL default 'free',
  PRIMARY KEY  ("id"),
  UNIQUE KEY "uniq_name" ("name")
);
INSERT INTO "customers" ("id", "name", "tier", "updated_at") VALUES (1,'O\'Brien','pro','2024-01-01 00:00:00');
"#;

const EXPECTED: &str = r#"CREATE TABLE "customers" (
  "id" integer NOT NULL  primary key,
  "name" varchar(64)   NOT NULL,
  "updated_at" timestamp NOT NULL default CURRENT_TIMESTAMP ,
  "tier" varchar(255) NOT NULL default 'free'
);
INSERT INTO "customers" ("id", "name", "tier", "updated_at") VALUES (1,'O''Brien','pro','2024-01-01 00:00:00');
"#;

#[test]
fn translates_fixture_dump() {
    let doc = DialectTranslator::default().translate_bytes(DUMP.as_bytes());
    assert_eq!(doc.to_string_lossy(), EXPECTED);

    let stats = doc.stats();
    assert_eq!(stats.lines_read, 9);
    assert_eq!(stats.lines_dropped, 2);
    assert_eq!(stats.lines_kept, 7);
}

#[test]
fn fixture_output_has_one_create_and_one_balanced_insert() {
    let sql = DialectTranslator::default().translate_str(DUMP);

    assert_eq!(sql.matches("CREATE TABLE").count(), 1);
    assert!(!sql.contains("KEY"), "key declarations must be dropped");
    assert!(!sql.contains(",\n);"), "no dangling comma before `);`");

    let inserts: Vec<&str> = sql.lines().filter(|l| l.starts_with("INSERT")).collect();
    assert_eq!(inserts.len(), 1);
    let insert = inserts[0];
    assert!(insert.contains("'O''Brien'"));
    assert!(!insert.contains("\\'"));
    assert_eq!(insert.matches('\'').count() % 2, 0, "quotes must balance");
    assert_eq!(insert.matches('(').count(), insert.matches(')').count());
}

/// Values ending in a backslash, or mixing escaped backslashes and quotes.
const BACKSLASH_DUMP: &str = r#"INSERT INTO "files" ("id", "path") VALUES (1,'C:\\');
INSERT INTO "files" ("id", "path") VALUES (2,'a\\\'b');
INSERT INTO "files" ("id", "path") VALUES (3,'\\\\server\\share\\');
"#;

#[test]
fn backslash_terminated_values_keep_balanced_quotes() {
    let translator = DialectTranslator::default();
    let sql = translator.translate_str(BACKSLASH_DUMP);

    let inserts: Vec<&str> = sql.lines().collect();
    assert_eq!(
        inserts,
        vec![
            r#"INSERT INTO "files" ("id", "path") VALUES (1,'C:\\');"#,
            r#"INSERT INTO "files" ("id", "path") VALUES (2,'a\\''b');"#,
            r#"INSERT INTO "files" ("id", "path") VALUES (3,'\\\\server\\share\\');"#,
        ]
    );
    for insert in &inserts {
        assert_eq!(insert.matches('\'').count() % 2, 0, "quotes must balance: {insert}");
    }
    assert_eq!(translator.translate_str(&sql), sql);
}

#[test]
fn translated_output_survives_a_second_pass() {
    let translator = DialectTranslator::default();
    let once = translator.translate_str(DUMP);
    let twice = translator.translate_str(&once);
    assert_eq!(once, twice);
}

#[test]
fn no_translated_line_trips_the_filter() {
    let sql = DialectTranslator::default().translate_str(DUMP);
    for line in sql.lines() {
        assert!(!is_disallowed(line.as_bytes()), "{line}");
    }
}

#[test]
fn backtick_dump_translates_like_ansi_dump() {
    let backticked = DUMP.replace('"', "`");
    // The filter runs before the backtick rule, so only the data line is
    // expected to match here.
    let sql = DialectTranslator::default().translate_str(&backticked);
    assert!(sql.contains(
        r#"INSERT INTO "customers" ("id", "name", "tier", "updated_at") VALUES (1,'O''Brien','pro','2024-01-01 00:00:00');"#
    ));
}
