use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use super::ExtractionError;

/// Rough characters per page used to estimate a page count (500 per block, 6 blocks).
const CHARS_PER_PAGE: usize = 3000;

/// Extracts the raw text of all paragraphs, one per line.
/// Legacy binary `.doc` content fails here as a parser error.
pub fn extract(file_name: &str, bytes: &[u8]) -> Result<(String, u32), ExtractionError> {
    let docx = read_docx(bytes).map_err(|e| ExtractionError::Word {
        file_name: file_name.to_string(),
        reason: e.to_string(),
    })?;

    let mut lines: Vec<String> = Vec::new();
    for child in docx.document.children.iter() {
        match child {
            DocumentChild::Paragraph(para) => push_paragraph(&mut lines, para),
            DocumentChild::Table(table) => push_table(&mut lines, table),
            _ => {}
        }
    }

    let text = lines.join("\n");
    let page_count = estimate_pages(text.chars().count());
    Ok((text, page_count))
}

pub fn estimate_pages(char_count: usize) -> u32 {
    let pages = char_count.div_ceil(CHARS_PER_PAGE).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

fn push_paragraph(lines: &mut Vec<String>, para: &Paragraph) {
    let text: String = para
        .children
        .iter()
        .filter_map(|pc| match pc {
            ParagraphChild::Run(run) => Some(
                run.children
                    .iter()
                    .filter_map(|rc| match rc {
                        RunChild::Text(t) => Some(t.text.as_str()),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    if !text.is_empty() {
        lines.push(text);
    }
}

fn push_table(lines: &mut Vec<String>, table: &Table) {
    let rows = table.rows.iter().filter_map(|child| match child {
        TableChild::TableRow(row) => Some(row),
    });
    for row in rows {
        let cells = row.cells.iter().filter_map(|child| match child {
            TableRowChild::TableCell(cell) => Some(cell),
        });
        for cell in cells {
            for content in cell.children.iter() {
                match content {
                    TableCellContent::Paragraph(para) => push_paragraph(lines, para),
                    TableCellContent::Table(nested) => push_table(lines, nested),
                    _ => {}
                }
            }
        }
    }
}
