use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::NamedTempFile;

fn cmd() -> Command {
    Command::cargo_bin("kinfold").unwrap()
}

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const DUMP: &str = r#"[
    {"Id": 1, "Name": "Curie-1", "FirstName": "Pierre", "LastNameAtBirth": "Curie",
     "Gender": "Male", "BirthDate": "1859-05-15", "DeathDate": "1906-04-19",
     "Spouses": {"2": {"Id": 2, "marriage_date": "1895-07-26", "marriage_location": "Sceaux"}}},
    {"Id": 2, "Name": "Sklodowska-2", "FirstName": "Maria", "LastNameAtBirth": "Skłodowska",
     "LastNameCurrent": "Curie", "Gender": "Female", "BirthDate": "1867-11-07"},
    {"Id": 3, "Name": "Curie-3", "FirstName": "Irène", "LastNameAtBirth": "Curie",
     "Gender": "Female", "Father": 1, "Mother": 2, "BirthDate": "1897-09-12"},
    {"Id": 4, "Name": "Curie-4", "FirstName": "Ève", "LastNameAtBirth": "Curie",
     "Gender": "Female", "Father": 1, "Mother": 2, "BirthDate": "1904-12-06"}
]"#;

#[test]
fn build_from_dump() {
    let dump = json_file(DUMP);
    cmd()
        .arg("build")
        .arg(dump.path())
        .args(["--root", "Sklodowska-2", "--details"])
        .assert()
        .success()
        .stdout(contains("\"indis\""))
        .stdout(contains("\"id\":\"1_2\""))
        .stdout(contains("Curie-4"))
        .stdout(contains("Sceaux"));
}

#[test]
fn build_unknown_root_fails() {
    let dump = json_file(DUMP);
    cmd()
        .arg("build")
        .arg(dump.path())
        .args(["--root", "Nobody-9"])
        .assert()
        .failure()
        .stderr(contains("PROFILE_NOT_FOUND"));
}

#[test]
fn build_without_root_fails() {
    let dump = json_file(DUMP);
    cmd()
        .arg("build")
        .arg(dump.path())
        .assert()
        .failure()
        .stderr(contains("ID_NOT_PROVIDED"));
}

#[test]
fn age_description() {
    cmd()
        .args(["age", "ABT 1990", "2021"])
        .assert()
        .success()
        .stdout(contains("about 31 years"));
    cmd()
        .args(["age", "2021", "1990"])
        .assert()
        .success()
        .stdout(contains("indeterminate"));
}

#[test]
fn normalize_graph() {
    let graph = json_file(
        r#"{"indis": [
            {"id": "I1", "birth": {"date": {"year": 1902, "month": 8}}, "famc": "F1"},
            {"id": "I2", "birth": {"date": {"year": 1902, "month": 7}}, "famc": "F1"},
            {"id": "I3", "birth": {"date": {"year": 1901}}, "famc": "F1"}
        ],
        "fams": [{"id": "F1", "children": ["I1", "I2", "I3"]}]}"#,
    );
    cmd()
        .arg("normalize")
        .arg(graph.path())
        .assert()
        .success()
        .stdout(contains(r#""children":["I3","I2","I1"]"#));
}

#[test]
fn convert_records() {
    let records = json_file(
        r#"[
            {"pointer": "@I1@", "tag": "INDI", "tree": [
                {"level": 1, "tag": "NAME", "data": "John /Smith/"},
                {"level": 1, "tag": "FAMS", "data": "@F1@"}]},
            {"pointer": "@I2@", "tag": "INDI", "tree": [
                {"level": 1, "tag": "NAME", "data": "Tom /Smith/"},
                {"level": 1, "tag": "FAMC", "data": "@F1@"}]},
            {"pointer": "@F1@", "tag": "FAM", "tree": [
                {"level": 1, "tag": "HUSB", "data": "@I1@"},
                {"level": 1, "tag": "CHIL", "data": "@I2@"}]}
        ]"#,
    );
    cmd()
        .arg("convert")
        .arg(records.path())
        .assert()
        .success()
        .stdout(contains(r#""firstName":"Tom""#));

    let empty = json_file("[]");
    cmd()
        .arg("convert")
        .arg(empty.path())
        .assert()
        .failure()
        .stderr(contains("READ_FAILED"));
}
