mod common;

use common::{build_docx, FailingRenderer, FakeRenderer};
use data_formatter::app::session::EntryState;
use data_formatter::domain::model::{CellValue, TargetFormat, UploadedFile};
use data_formatter::domain::ports::Storage;
use data_formatter::{FormatterEngine, FormatterError, LocalStorage, Session};
use tempfile::TempDir;

const PEOPLE_CSV: &[u8] = b"name,age\nAlice,30\nBob,\nAlice,30\n";

#[tokio::test]
async fn test_dedupe_then_fill_scenario() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![UploadedFile::new("people.csv", PEOPLE_CSV.to_vec())]);

    let dedup = session.remove_duplicates("people.csv")?;
    assert_eq!(dedup.rows_before, 3);
    assert_eq!(dedup.rows_after, 2);

    let fill = session.fill_missing("people.csv")?;
    assert_eq!(fill.filled, vec![("age".to_string(), 1)]);

    let table = session.preview("people.csv")?;
    let ages = &table.column("age").unwrap().values;
    assert_eq!(ages, &vec![CellValue::Number(30.0), CellValue::Number(30.0)]);
    assert_eq!(table.row(1)[0], &CellValue::Text("Bob".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_unsupported_file_does_not_block_siblings() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    let summaries = session.upload(vec![
        UploadedFile::new("report.txt", b"plain text".to_vec()),
        UploadedFile::new("people.csv", PEOPLE_CSV.to_vec()),
        UploadedFile::new("notes.docx", build_docx(&["Hello"])),
    ]);

    assert_eq!(summaries.len(), 3);
    assert!(matches!(
        session.entry("report.txt")?.state,
        EntryState::Failed(FormatterError::UnsupportedFormatError { .. })
    ));
    assert_eq!(summaries[1].kind, "table");
    assert_eq!(summaries[1].rows, Some(3));
    assert_eq!(summaries[2].kind, "document");
    assert_eq!(summaries[2].paragraphs, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_malformed_files_fail_with_parse_error() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![
        UploadedFile::new("broken.xlsx", b"not a zip archive".to_vec()),
        UploadedFile::new("broken.docx", b"not a zip archive".to_vec()),
        UploadedFile::new("ragged.csv", b"a,b\n1,2,3\n".to_vec()),
    ]);

    for name in ["broken.xlsx", "broken.docx", "ragged.csv"] {
        assert!(
            matches!(
                session.entry(name)?.state,
                EntryState::Failed(FormatterError::ParseError { .. })
            ),
            "{} should fail to parse",
            name
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_document_converts_to_pdf() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![UploadedFile::new(
        "notes.docx",
        build_docx(&["Title", "", "Body text"]),
    )]);

    let artifact = session.convert("notes.docx", TargetFormat::Pdf).await?;
    assert_eq!(artifact.filename, "notes.pdf");
    assert_eq!(artifact.mime_type, "application/pdf");
    assert!(artifact.bytes.starts_with(b"%PDF"));
    Ok(())
}

#[tokio::test]
async fn test_pdf_html_has_one_paragraph_per_entry() -> anyhow::Result<()> {
    let engine = FormatterEngine::new(FakeRenderer::default());
    let file = UploadedFile::new("notes.docx", build_docx(&["Title", "", "Fish & <Chips>"]));
    let paragraphs = match engine.load(&file)? {
        data_formatter::core::engine::LoadedContent::Document(p) => p,
        other => anyhow::bail!("expected a document, got {:?}", other),
    };

    data_formatter::core::pdf::export_document("notes.docx", &paragraphs, engine.renderer(), true)
        .await?;

    let html = engine.renderer().html.lock().unwrap()[0].clone();
    assert_eq!(html.matches("<p>").count(), 3);
    assert!(html.contains("<p>Title</p><p></p>"));
    assert!(html.contains("<p>Fish &amp; &lt;Chips&gt;</p>"));

    let scratch = engine.renderer().outputs.lock().unwrap()[0].clone();
    assert!(!scratch.exists());
    assert!(!scratch.parent().unwrap().exists());
    Ok(())
}

#[tokio::test]
async fn test_render_failure_is_isolated_and_cleaned_up() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FailingRenderer::default()), 5);
    session.upload(vec![
        UploadedFile::new("notes.docx", build_docx(&["Hello"])),
        UploadedFile::new("people.csv", PEOPLE_CSV.to_vec()),
    ]);

    let err = session
        .convert("notes.docx", TargetFormat::Pdf)
        .await
        .unwrap_err();
    assert!(matches!(err, FormatterError::RenderError { .. }));

    let csv = session.convert("people.csv", TargetFormat::Csv).await?;
    assert_eq!(csv.filename, "people.csv");
    Ok(())
}

#[tokio::test]
async fn test_missing_engine_reports_render_error() -> anyhow::Result<()> {
    let renderer = data_formatter::WkhtmltopdfRenderer::new("/nonexistent/bin/wkhtmltopdf");
    let mut session = Session::new(FormatterEngine::new(renderer), 5);
    session.upload(vec![UploadedFile::new("notes.docx", build_docx(&["Hello"]))]);

    let err = session
        .convert("notes.docx", TargetFormat::Pdf)
        .await
        .unwrap_err();
    assert!(matches!(err, FormatterError::RenderError { .. }));
    assert!(err.to_string().contains("not found"));
    Ok(())
}

#[tokio::test]
async fn test_csv_to_spreadsheet_download() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let storage = LocalStorage::new(temp_dir.path().to_string_lossy().into_owned());

    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![UploadedFile::new("data.csv", PEOPLE_CSV.to_vec())]);

    let artifact = session.convert("data.csv", TargetFormat::Spreadsheet).await?;
    assert_eq!(artifact.filename, "data.xlsx");
    assert_eq!(
        artifact.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    let saved = storage.save_artifact(&artifact).await?;
    assert!(saved.ends_with("data.xlsx"));

    // 存下來的活頁簿可以再次上傳
    let bytes = std::fs::read(temp_dir.path().join("data.xlsx"))?;
    session.upload(vec![UploadedFile::new("data.xlsx", bytes)]);
    let table = session.preview("data.xlsx")?;
    assert_eq!(table.column_names(), vec!["name", "age"]);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.row(1)[1], &CellValue::Absent);
    Ok(())
}

#[tokio::test]
async fn test_csv_round_trip_after_selection() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![UploadedFile::new(
        "people.csv",
        b"name,age,city\nAlice,30,Oslo\nBob,25.5,Rome\n".to_vec(),
    )]);
    session.select_columns("people.csv", Some(vec!["city".to_string(), "age".to_string()]))?;

    let artifact = session.convert("people.csv", TargetFormat::Csv).await?;
    assert_eq!(artifact.mime_type, "text/csv");
    assert_eq!(String::from_utf8(artifact.bytes.clone())?, "city,age\nOslo,30\nRome,25.5\n");

    session.upload(vec![UploadedFile::new("people.csv", artifact.bytes)]);
    let table = session.preview("people.csv")?;
    assert_eq!(table.column_names(), vec!["city", "age"]);
    assert!(table.column("age").unwrap().is_numeric());
    Ok(())
}

#[tokio::test]
async fn test_chart_uses_first_two_numeric_columns() -> anyhow::Result<()> {
    let mut session = Session::new(FormatterEngine::new(FakeRenderer::default()), 5);
    session.upload(vec![UploadedFile::new(
        "m.csv",
        b"label,x,note,y,z\na,1,n,2,3\nb,4,m,5,6\n".to_vec(),
    )]);

    assert_eq!(session.chart_data("m.csv")?.column_names(), vec!["x", "y"]);

    session.upload(vec![UploadedFile::new("t.csv", b"label\na\n".to_vec())]);
    assert_eq!(session.chart_data("t.csv")?.column_count(), 0);
    assert!(session.chart_data("m.csv").is_err());
    Ok(())
}
