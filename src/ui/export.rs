//! Itinerary export: serialize the latest rendered response into a
//! standalone HTML document with a fixed title, style block, and filename.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pulldown_cmark::{html, Parser};

use crate::core::constants::EXPORT_FILENAME;
use crate::core::message::Message;

const DOCUMENT_TITLE: &str = "FlightGenius Itinerary";

const STYLE_BLOCK: &str = "\
body { font-family: 'Segoe UI', Tahoma, sans-serif; direction: rtl; \
background: #0b0f17; color: #e2e8f0; max-width: 48rem; margin: 2rem auto; \
padding: 0 1rem; line-height: 1.7; }\n\
h1, h2, h3 { color: #38bdf8; }\n\
a { color: #38bdf8; }\n\
ol.sources { border-top: 1px solid #1e293b; margin-top: 2rem; padding-top: 1rem; \
font-size: 0.85rem; color: #94a3b8; }";

/// Render a model message into the export document body.
fn document_body(message: &Message) -> String {
    let mut body = String::new();
    html::push_html(&mut body, Parser::new(&message.text));

    if !message.citations.is_empty() {
        body.push_str("<ol class=\"sources\">\n");
        for citation in &message.citations {
            let title = if citation.title.is_empty() {
                &citation.uri
            } else {
                &citation.title
            };
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                citation.uri, title
            ));
        }
        body.push_str("</ol>\n");
    }
    body
}

/// Write the export document for `message` into `dir`, returning the path.
///
/// The filename is fixed; a prior export is overwritten.
pub fn export_itinerary(message: &Message, dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(EXPORT_FILENAME);
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "<!DOCTYPE html>")?;
    writeln!(writer, "<html dir=\"rtl\" lang=\"ar\">")?;
    writeln!(writer, "<head>")?;
    writeln!(writer, "<meta charset=\"utf-8\">")?;
    writeln!(writer, "<title>{DOCUMENT_TITLE}</title>")?;
    writeln!(writer, "<style>\n{STYLE_BLOCK}\n</style>")?;
    writeln!(writer, "</head>")?;
    writeln!(writer, "<body>")?;
    writer.write_all(document_body(message).as_bytes())?;
    writeln!(writer, "</body>")?;
    writeln!(writer, "</html>")?;
    writer.flush()?;

    Ok(path)
}
