use melt_core::{CoreError, Database, DateVal};

fn parse_one(text: &str) -> Result<Database, CoreError> {
    let mut db = Database::new();
    db.parse_source("chars.txt", text)?;
    Ok(db)
}

fn expect_parse_error(text: &str) -> String {
    let err = parse_one(text).expect_err("source must be rejected");
    assert!(err.is_parse(), "expected a parse-class error, got {err:?}");
    let rendered = err.to_string();
    assert!(
        rendered.starts_with("chars.txt: line "),
        "diagnostic must name file and line: {rendered}"
    );
    rendered
}

#[test]
fn unterminated_record_is_fatal() {
    let msg = expect_parse_error("1 = {\n\tname=\"A\"\n");
    assert!(msg.contains("unexpected end of input"));
    assert!(msg.contains("character 1"));
}

#[test]
fn unterminated_history_entry_is_fatal() {
    let msg = expect_parse_error("1 = {\n\tname=\"A\"\n\t800.1.1 = {\n\t\teffect = {\n");
    assert!(msg.contains("unexpected end of input"));
}

#[test]
fn missing_culture_is_fatal_and_names_the_record_start() {
    let msg =
        expect_parse_error("# pad\n7 = {\n\tname=\"A\"\n\t1.1.1 = {\n\t\tbirth=yes\n\t}\n}\n");
    assert!(msg.contains("line 2"));
    assert!(msg.contains("character 7 has no culture defined"));
}

#[test]
fn missing_name_is_fatal() {
    let msg = expect_parse_error("7 = {\n\tculture=\"c\"\n\t1.1.1 = {\n\t\tbirth=yes\n\t}\n}\n");
    assert!(msg.contains("no given name defined"));
}

#[test]
fn missing_birth_date_is_fatal() {
    let msg = expect_parse_error("7 = {\n\tname=\"A\"\n\tculture=\"c\"\n}\n");
    assert!(msg.contains("no birth date defined"));
}

#[test]
fn two_birth_markers_in_one_entry_are_fatal() {
    let msg = expect_parse_error(
        "7 = {\n\tname=\"A\"\n\tculture=\"c\"\n\t1.1.1 = {\n\t\tbirth=yes\n\t\tbirth=yes\n\t}\n}\n",
    );
    assert!(msg.contains("multiple birth"));
}

#[test]
fn birth_markers_in_two_entries_are_allowed_and_the_last_wins() {
    let db = parse_one(concat!(
        "7 = {\n",
        "\tname=\"A\"\n",
        "\tculture=\"c\"\n",
        "\t1.1.1 = {\n",
        "\t\tbirth=yes\n",
        "\t}\n",
        "\t2.2.2 = {\n",
        "\t\tbirth=yes\n",
        "\t}\n",
        "}\n",
    ))
    .expect("per-entry markers are legal");
    let id = db.lookup(7).expect("record 7 indexed");
    assert_eq!(db.character(id).birth, DateVal::new(2, 2, 2));
}

#[test]
fn trailing_tokens_after_entry_close_are_fatal() {
    let msg = expect_parse_error(
        "7 = {\n\tname=\"A\"\n\tculture=\"c\"\n\t1.1.1 = {\n\t\tbirth=yes\n\t} stray\n}\n",
    );
    assert!(msg.contains("trailing tokens"));
}

#[test]
fn one_line_block_inside_a_record_is_fatal() {
    let msg = expect_parse_error("7 = {\n\tstats = { martial = 5 }\n}\n");
    assert!(msg.contains("line 2"));
    assert!(msg.contains("one-line block"));
}

#[test]
fn junk_after_multi_line_opener_is_fatal() {
    let msg = expect_parse_error("7 = {\n\t800.1.1 =\n\tname=\"A\"\n}\n");
    assert!(msg.contains("multi-line history entry opener"));
}

#[test]
fn unexpected_top_level_token_is_fatal() {
    let msg = expect_parse_error("add_character = yes\n");
    assert!(msg.contains("line 1"));
    assert!(msg.contains("unexpected token"));
}

#[test]
fn duplicate_record_id_in_one_file_names_the_second_occurrence() {
    let msg = expect_parse_error(concat!(
        "3 = {\n",
        "\tname=\"A\"\n",
        "\tculture=\"c\"\n",
        "\t1.1.1 = {\n",
        "\t\tbirth=yes\n",
        "\t}\n",
        "}\n",
        "3 = {\n",
        "\tname=\"B\"\n",
        "\tculture=\"c\"\n",
        "\t1.1.1 = {\n",
        "\t\tbirth=yes\n",
        "\t}\n",
        "}\n",
    ));
    assert!(msg.contains("line 8"));
    assert!(msg.contains("duplicate character id 3"));
}

#[test]
fn duplicate_record_id_across_files_names_the_second_file() {
    let record = "3 = {\n\tname=\"A\"\n\tculture=\"c\"\n\t1.1.1 = {\n\t\tbirth=yes\n\t}\n}\n";
    let mut db = Database::new();
    db.parse_source("first.txt", record).expect("first parses");
    let err = db
        .parse_source("second.txt", record)
        .expect_err("duplicate must be rejected");
    assert!(err.is_parse());
    let rendered = err.to_string();
    assert!(rendered.starts_with("second.txt: line 1"));
    assert!(rendered.contains("duplicate character id 3"));
}

#[test]
fn conflicting_filenames_are_rejected() {
    let mut db = Database::new();
    db.parse_source("same.txt", "# empty\n").expect("first parses");
    let err = db
        .parse_source("same.txt", "# empty\n")
        .expect_err("second must be rejected");
    assert!(err.is_parse());
    assert!(err.to_string().contains("conflicting filename 'same.txt'"));
}
