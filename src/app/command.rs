use crate::domain::model::TargetFormat;
use crate::utils::error::{FormatterError, Result};

/// One line of user input in the interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload(Vec<String>),
    List,
    Preview(String),
    Dedupe(String),
    Fill(String),
    /// `None` resets to every column.
    Columns {
        file: String,
        selection: Option<Vec<String>>,
    },
    Chart(String),
    Convert {
        file: String,
        target: TargetFormat,
    },
    Summary,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  upload <path>...                  replace the current files with a new upload
  list                              show every uploaded file
  preview <file>                    first rows of the current view
  dedupe <file>                     remove duplicate rows
  fill <file>                       fill missing numeric values with the column mean
  columns <file> [a,b,...]          keep only these columns (no list = all, ',' = none)
  chart <file>                      bar chart of the first two numeric columns
  convert <file> <csv|xlsx|pdf>     convert and save to the output directory
  summary                           JSON summary of the session
  help                              show this message
  quit                              leave the session";

/// 以空白切分，雙引號內的空白保留
pub fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(FormatterError::ValidationError {
            message: "unterminated quote".to_string(),
        });
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn one_file(verb: &str, args: &[String]) -> Result<String> {
    match args {
        [file] => Ok(file.clone()),
        _ => Err(FormatterError::ValidationError {
            message: format!("usage: {} <file>", verb),
        }),
    }
}

impl Command {
    /// Parses a line; blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let args = split_args(line)?;
        let Some((verb, rest)) = args.split_first() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "upload" if !rest.is_empty() => Command::Upload(rest.to_vec()),
            "upload" => {
                return Err(FormatterError::ValidationError {
                    message: "usage: upload <path>...".to_string(),
                })
            }
            "list" | "ls" => Command::List,
            "preview" => Command::Preview(one_file("preview", rest)?),
            "dedupe" => Command::Dedupe(one_file("dedupe", rest)?),
            "fill" => Command::Fill(one_file("fill", rest)?),
            "chart" => Command::Chart(one_file("chart", rest)?),
            "columns" => match rest {
                [file] => Command::Columns {
                    file: file.clone(),
                    selection: None,
                },
                [file, list @ ..] => Command::Columns {
                    file: file.clone(),
                    selection: Some(
                        list.join(" ")
                            .split(',')
                            .map(str::trim)
                            .filter(|name| !name.is_empty())
                            .map(str::to_string)
                            .collect(),
                    ),
                },
                [] => {
                    return Err(FormatterError::ValidationError {
                        message: "usage: columns <file> [a,b,...]".to_string(),
                    })
                }
            },
            "convert" => match rest {
                [file, target] => Command::Convert {
                    file: file.clone(),
                    target: target.parse()?,
                },
                _ => {
                    return Err(FormatterError::ValidationError {
                        message: "usage: convert <file> <csv|xlsx|pdf>".to_string(),
                    })
                }
            },
            "summary" => Command::Summary,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(FormatterError::ValidationError {
                    message: format!("unknown command '{}', type 'help'", other),
                })
            }
        };
        Ok(Some(command))
    }
}
