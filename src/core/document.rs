use crate::domain::model::{ParagraphSequence, UploadedFile};
use crate::utils::error::{FormatterError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

pub fn load_document(file: &UploadedFile) -> Result<ParagraphSequence> {
    let xml = read_document_part(&file.name, &file.bytes)?;
    let paragraphs = extract_paragraphs(&xml).map_err(|e| FormatterError::parse(&file.name, e))?;

    tracing::debug!(
        "Parsed document '{}': {} paragraphs",
        file.name,
        paragraphs.len()
    );
    Ok(ParagraphSequence::new(paragraphs))
}

fn read_document_part(file_name: &str, bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FormatterError::parse(file_name, format!("invalid document container: {}", e)))?;

    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| FormatterError::parse(file_name, format!("missing {}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| FormatterError::parse(file_name, format!("unreadable {}: {}", DOCUMENT_PART, e)))?;
    Ok(xml)
}

/// 只收 body 底下的段落；表格、內容控制項裡的段落不算
fn extract_paragraphs(xml: &str) -> std::result::Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraph_depth = 0;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("malformed document XML: {}", e))?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if current.is_none() && name == b"p" && parent_is_body(&stack) {
                    current = Some(String::new());
                    paragraph_depth = stack.len();
                } else if let Some(text) = current.as_mut() {
                    if in_run(&stack, paragraph_depth) {
                        if name == b"t" {
                            in_text = true;
                        } else {
                            push_run_control(text, &e);
                        }
                    }
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                if current.is_none() && name.as_ref() == b"p" && parent_is_body(&stack) {
                    paragraphs.push(String::new());
                } else if let Some(text) = current.as_mut() {
                    if in_run(&stack, paragraph_depth) {
                        push_run_control(text, &e);
                    }
                }
            }
            Event::End(e) => {
                stack.pop();
                if e.local_name().as_ref() == b"t" {
                    in_text = false;
                }
                if current.is_some() && stack.len() == paragraph_depth {
                    paragraphs.extend(current.take());
                }
            }
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| format!("bad text in document XML: {}", e))?;
                    text.push_str(&unescaped);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("document XML ended before all elements were closed".to_string());
    }
    Ok(paragraphs)
}

fn parent_is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().map(|n| n.as_slice() == b"body").unwrap_or(false)
}

/// The innermost open element is a run of the current paragraph (directly or
/// through a hyperlink).
fn in_run(stack: &[Vec<u8>], paragraph_depth: usize) -> bool {
    match stack.len() - paragraph_depth {
        2 => stack[paragraph_depth + 1] == b"r",
        3 => stack[paragraph_depth + 1] == b"hyperlink" && stack[paragraph_depth + 2] == b"r",
        _ => false,
    }
}

fn push_run_control(text: &mut String, element: &BytesStart<'_>) {
    match element.local_name().as_ref() {
        b"tab" => text.push('\t'),
        b"cr" => text.push('\n'),
        b"br" => {
            // 分頁符號不輸出文字
            let page_break = element.attributes().flatten().any(|attr| {
                attr.key.local_name().as_ref() == b"type" && attr.value.as_ref() != b"textWrapping"
            });
            if !page_break {
                text.push('\n');
            }
        }
        _ => {}
    }
}
