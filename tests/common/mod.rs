#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An isolated data directory plus helpers to run the binary against it.
pub struct Sandbox {
    pub home: TempDir,
    pub docs: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create data dir"),
            docs: tempfile::tempdir().expect("create docs dir"),
        }
    }

    /// A sandbox whose speech engine is `command` (argv), reading text on stdin.
    pub fn with_command_engine(argv: &[&str]) -> Self {
        let sandbox = Self::new();
        let quoted: Vec<String> = argv.iter().map(|arg| format!("{arg:?}")).collect();
        sandbox.write_config(&format!("command: [{}]\n", quoted.join(", ")));
        sandbox
    }

    pub fn write_config(&self, yaml: &str) {
        fs::write(self.home.path().join("config.yaml"), yaml).expect("write config");
    }

    pub fn history_file(&self) -> PathBuf {
        self.home.path().join("history.jsonl")
    }

    pub fn write_doc(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.docs.path().join(name);
        fs::write(&path, contents).expect("write document");
        path
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.run_in(self.home.path(), args)
    }

    /// Run with `dir` as the working directory.
    pub fn run_in(&self, dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_voicereader"))
            .args(args)
            .current_dir(dir)
            .env("VOICEREADER_HOME", self.home.path())
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .output()
            .expect("run voicereader binary")
    }
}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout UTF-8")
}

pub fn parse_jsonl(stdout: &[u8]) -> Vec<serde_json::Value> {
    let text = String::from_utf8(stdout.to_vec()).expect("stdout UTF-8");
    text.lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .map(|line| serde_json::from_str(line).expect("parse JSON line"))
        .collect()
}

/// The refusal envelope printed on exit 2.
pub fn refusal(output: &Output) -> serde_json::Value {
    assert_eq!(output.status.code(), Some(2), "expected refusal exit code");
    parse_jsonl(&output.stdout)
        .into_iter()
        .find(|value| value["outcome"] == "REFUSAL")
        .expect("refusal envelope on stdout")
}

/// Write a PDF with one page per entry of `pages`.
pub fn write_text_pdf(path: &Path, pages: &[&str]) {
    let mut document = lopdf::Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page_text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![50.into(), 750.into()]),
                Operation::new("Tj", vec![Object::string_literal(*page_text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = document.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.save(path).expect("save pdf");
}

/// Write a workbook whose sheets hold inline-string cells (`None` = empty cell).
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<Option<&str>>>)]) {
    let mut zip = ZipWriter::new(File::create(path).expect("create xlsx"));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut overrides = String::new();
    let mut sheet_entries = String::new();
    let mut relationships = String::new();
    for (index, (name, _)) in sheets.iter().enumerate() {
        let n = index + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let mut parts: Vec<(String, String)> = vec![
        (
            "[Content_Types].xml".to_owned(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_owned(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_owned(),
        ),
        (
            "xl/workbook.xml".to_owned(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_owned(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
            ),
        ),
    ];

    for (index, (_, rows)) in sheets.iter().enumerate() {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (row_index, row) in rows.iter().enumerate() {
            let r = row_index + 1;
            xml.push_str(&format!(r#"<row r="{r}">"#));
            for (col_index, cell) in row.iter().enumerate() {
                if let Some(value) = cell {
                    let column = (b'A' + col_index as u8) as char;
                    xml.push_str(&format!(
                        r#"<c r="{column}{r}" t="inlineStr"><is><t>{value}</t></is></c>"#
                    ));
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        parts.push((format!("xl/worksheets/sheet{}.xml", index + 1), xml));
    }

    for (name, body) in parts {
        zip.start_file(name, options).expect("start zip entry");
        zip.write_all(body.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish xlsx");
}
