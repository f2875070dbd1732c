//! A small WordprocessingML (.docx) model with a reader and a writer.
//!
//! Only the parts of the format the toolkit produces or inspects are modelled:
//! paragraphs with styled runs, tables with shaded cells, and header/footer
//! parts. Everything else in an input package is ignored on read.
//!
//! Colours in the model are `#RRGGBB` strings (see [`rgb_to_hex`]).

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use thiserror::Error;

pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const DOCUMENT_PART: &str = "word/document.xml";

/// Header/footer reference kinds, in the order parts are assigned to them.
const REFERENCE_KINDS: [&str; 3] = ["default", "first", "even"];

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a docx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("missing package part: {0}")]
    MissingPart(String),

    #[error("package part {0} exceeds size limit")]
    TooLarge(String),

    #[error("unexpected end of {0}")]
    UnexpectedEof(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Formats an RGB triple as `#RRGGBB`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub body: Vec<Block>,
    pub headers: Vec<Vec<Block>>,
    pub footers: Vec<Vec<Block>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    fn as_xml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    fn from_xml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Paragraph spacing in twentieths of a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacing {
    pub before: Option<u32>,
    pub after: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Style id, e.g. `Heading1`.
    pub style: Option<String>,
    pub alignment: Option<Alignment>,
    pub spacing: Option<Spacing>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding a single unformatted run.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
            ..Self::default()
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn space_after(mut self, twips: u32) -> Self {
        let spacing = self.spacing.get_or_insert_with(Spacing::default);
        spacing.after = Some(twips);
        self
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replaces every occurrence of `find`, keeping run formatting.
    pub fn replace(&mut self, find: &str, replace: &str) {
        if !find.is_empty() {
            replace_in_paragraph(self, find, replace);
        }
    }

    /// Replaces `find` only where it ends the paragraph. The replacement
    /// takes the formatting of the run the match starts in.
    pub fn replace_suffix(&mut self, find: &str, replace: &str) -> bool {
        if find.is_empty() || !self.text().ends_with(find) {
            return false;
        }
        let mut remaining = find.len();
        let mut first = None;
        for (i, run) in self.runs.iter_mut().enumerate().rev() {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(run.text.len());
            if take > 0 {
                let keep = run.text.len() - take;
                run.text.truncate(keep);
                remaining -= take;
                first = Some(i);
            }
        }
        if let Some(i) = first {
            self.runs[i].text.push_str(replace);
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// Run text. `\t` and `\n` are written as tab and line-break elements.
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub superscript: bool,
    /// `#RRGGBB`
    pub color: Option<String>,
    /// Font size in half-points.
    pub size: Option<u32>,
    /// A page break placed before the run text.
    pub page_break: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn page_break() -> Self {
        Self {
            page_break: true,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn superscript(mut self) -> Self {
        self.superscript = true;
        self
    }

    pub fn color(mut self, rgb: (u8, u8, u8)) -> Self {
        self.color = Some(rgb_to_hex(rgb.0, rgb.1, rgb.2));
        self
    }

    pub fn size(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub style: Option<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    /// Background fill, `#RRGGBB`.
    pub shading: Option<String>,
}

impl Cell {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![Paragraph::with_text(text)],
            shading: None,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body paragraphs in document order. Table cells are not included.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    /// Every paragraph in the package: body, table cells, headers and footers.
    pub fn all_paragraphs_mut(&mut self) -> Vec<&mut Paragraph> {
        let mut out = Vec::new();
        let parts = std::iter::once(&mut self.body)
            .chain(self.headers.iter_mut())
            .chain(self.footers.iter_mut());
        for blocks in parts {
            for block in blocks.iter_mut() {
                match block {
                    Block::Paragraph(p) => out.push(p),
                    Block::Table(table) => {
                        for row in table.rows.iter_mut() {
                            for cell in row.iter_mut() {
                                out.extend(cell.paragraphs.iter_mut());
                            }
                        }
                    }
                }
            }
        }
        out
    }

    pub fn push(&mut self, block: Block) {
        self.body.push(block);
    }

    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Index in `body` of the first paragraph whose trimmed text equals `text`.
    pub fn find_paragraph(&self, text: &str) -> Option<usize> {
        self.body.iter().position(|block| match block {
            Block::Paragraph(p) => p.text().trim() == text,
            Block::Table(_) => false,
        })
    }

    /// Inserts `blocks` into the body before position `index`, keeping their order.
    pub fn insert_blocks<I>(&mut self, index: usize, blocks: I)
    where
        I: IntoIterator<Item = Block>,
    {
        let index = index.min(self.body.len());
        let tail = self.body.split_off(index);
        self.body.extend(blocks);
        self.body.extend(tail);
    }

    /// Reads a .docx package.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        if !names.iter().any(|n| n == DOCUMENT_PART) {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }

        let xml = read_zip_entry_bounded(&mut archive, DOCUMENT_PART)?;
        let body = parse_blocks(&xml)?;

        let mut header_names: Vec<&String> = names.iter().filter(|n| is_part(n, "header")).collect();
        header_names.sort();
        let mut headers = Vec::new();
        for name in header_names {
            let xml = read_zip_entry_bounded(&mut archive, name)?;
            headers.push(parse_blocks(&xml)?);
        }

        let mut footer_names: Vec<&String> = names.iter().filter(|n| is_part(n, "footer")).collect();
        footer_names.sort();
        let mut footers = Vec::new();
        for name in footer_names {
            let xml = read_zip_entry_bounded(&mut archive, name)?;
            footers.push(parse_blocks(&xml)?);
        }

        Ok(Document {
            body,
            headers,
            footers,
        })
    }

    /// Writes the document as a .docx package.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let headers: Vec<&Vec<Block>> = self.headers.iter().take(REFERENCE_KINDS.len()).collect();
        let footers: Vec<&Vec<Block>> = self.footers.iter().take(REFERENCE_KINDS.len()).collect();

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let mut put = |name: &str, content: &str| -> Result<(), DocxError> {
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            writer.start_file(name, options)?;
            writer.write_all(content.as_bytes())?;
            Ok(())
        };

        put("[Content_Types].xml", &content_types_xml(headers.len(), footers.len()))?;
        put("_rels/.rels", PACKAGE_RELS)?;
        put(
            "word/_rels/document.xml.rels",
            &document_rels_xml(headers.len(), footers.len()),
        )?;
        put("word/styles.xml", STYLES_XML)?;
        put(DOCUMENT_PART, &self.document_xml(headers.len(), footers.len()))?;
        for (i, blocks) in headers.iter().enumerate() {
            put(&format!("word/header{}.xml", i + 1), &part_xml("hdr", blocks))?;
        }
        for (i, blocks) in footers.iter().enumerate() {
            put(&format!("word/footer{}.xml", i + 1), &part_xml("ftr", blocks))?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    fn document_xml(&self, header_count: usize, footer_count: usize) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push_str(&format!(
            r#"<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#,
            NS_W, NS_R
        ));
        write_blocks(&mut xml, &self.body);

        xml.push_str("<w:sectPr>");
        for (i, kind) in REFERENCE_KINDS.iter().take(header_count).enumerate() {
            xml.push_str(&format!(
                r#"<w:headerReference w:type="{}" r:id="{}"/>"#,
                kind,
                header_rel_id(i)
            ));
        }
        for (i, kind) in REFERENCE_KINDS.iter().take(footer_count).enumerate() {
            xml.push_str(&format!(
                r#"<w:footerReference w:type="{}" r:id="{}"/>"#,
                kind,
                footer_rel_id(i)
            ));
        }
        xml.push_str(
            r#"<w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
        );
        if header_count > 1 || footer_count > 1 {
            xml.push_str("<w:titlePg/>");
        }
        xml.push_str("</w:sectPr></w:body></w:document>");
        xml
    }
}

/// Replaces text throughout a document while keeping run formatting.
pub struct DocxReplace<'a> {
    document: &'a mut Document,
}

impl<'a> DocxReplace<'a> {
    pub fn new(document: &'a mut Document) -> Self {
        Self { document }
    }

    /// Replaces every occurrence of `find` in body, table, header and footer
    /// paragraphs.
    pub fn replace(&mut self, find: &str, replace: &str) -> &mut Self {
        if find.is_empty() {
            return self;
        }
        for paragraph in self.document.all_paragraphs_mut() {
            paragraph.replace(find, replace);
        }
        self
    }
}

/// Matches within one run are replaced in place. A match spanning runs is
/// written into the run where it starts and the remainder is consumed from
/// the runs that follow.
fn replace_in_paragraph(paragraph: &mut Paragraph, find: &str, replace: &str) {
    for run in paragraph.runs.iter_mut() {
        if run.text.contains(find) {
            run.text = run.text.replace(find, replace);
        }
    }

    let full = paragraph.text();
    if !full.contains(find) {
        return;
    }

    let mut starts = Vec::with_capacity(paragraph.runs.len());
    let mut offset = 0;
    for run in &paragraph.runs {
        starts.push(offset);
        offset += run.text.len();
    }
    let run_at = |pos: usize| -> usize {
        match starts.binary_search(&pos) {
            Ok(mut i) => {
                // skip empty runs sharing the same offset
                while i + 1 < starts.len() && starts[i + 1] == pos {
                    i += 1;
                }
                i
            }
            Err(i) => i - 1,
        }
    };

    let spanning: Vec<(usize, usize)> = full
        .match_indices(find)
        .map(|(start, m)| (start, start + m.len()))
        .filter(|&(start, end)| run_at(start) != run_at(end - 1))
        .collect();

    for &(start, end) in spanning.iter().rev() {
        let first = run_at(start);
        let within = start - starts[first];
        let first_end = starts[first] + paragraph.runs[first].text.len();

        let mut text = paragraph.runs[first].text[..within].to_string();
        text.push_str(replace);
        paragraph.runs[first].text = text;

        let mut remaining = end.saturating_sub(first_end);
        for run in paragraph.runs.iter_mut().skip(first + 1) {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(run.text.len());
            run.text.drain(..take);
            remaining -= take;
        }
    }
}

fn is_part(name: &str, kind: &str) -> bool {
    name.strip_prefix("word/")
        .and_then(|rest| rest.strip_prefix(kind))
        .is_some_and(|rest| rest.ends_with(".xml") && !rest.contains('/'))
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, DocxError> {
    let entry = archive.by_name(name)?;
    let mut out = Vec::new();
    entry.take(MAX_XML_ENTRY_BYTES).read_to_end(&mut out)?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(DocxError::TooLarge(name.to_string()));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DocxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// `w:b`, `w:i` and friends are on unless `w:val` says otherwise.
fn toggle_value(e: &BytesStart<'_>) -> Result<bool, DocxError> {
    Ok(!matches!(
        attr_value(e, b"val")?.as_deref(),
        Some("0") | Some("false") | Some("off")
    ))
}

fn parse_blocks(xml: &[u8]) -> Result<Vec<Block>, DocxError> {
    let mut reader = Reader::from_reader(xml);
    let mut blocks = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => blocks.push(Block::Paragraph(parse_paragraph(&mut reader)?)),
                b"tbl" => blocks.push(Block::Table(parse_table(&mut reader)?)),
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                blocks.push(Block::Paragraph(Paragraph::default()));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(blocks)
}

fn parse_paragraph(reader: &mut Reader<&[u8]>) -> Result<Paragraph, DocxError> {
    let mut paragraph = Paragraph::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => parse_paragraph_properties(reader, &mut paragraph)?,
                b"r" => paragraph.runs.push(parse_run(reader)?),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"p" => return Ok(paragraph),
            Event::Eof => return Err(DocxError::UnexpectedEof("paragraph")),
            _ => {}
        }
    }
}

fn parse_paragraph_properties(
    reader: &mut Reader<&[u8]>,
    paragraph: &mut Paragraph,
) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" => paragraph.style = attr_value(&e, b"val")?,
                b"jc" => {
                    paragraph.alignment = attr_value(&e, b"val")?
                        .as_deref()
                        .and_then(Alignment::from_xml);
                }
                b"spacing" => {
                    let before = attr_value(&e, b"before")?.and_then(|v| v.parse().ok());
                    let after = attr_value(&e, b"after")?.and_then(|v| v.parse().ok());
                    if before.is_some() || after.is_some() {
                        paragraph.spacing = Some(Spacing { before, after });
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"pPr" => return Ok(()),
            Event::Eof => return Err(DocxError::UnexpectedEof("paragraph properties")),
            _ => {}
        }
    }
}

fn parse_run(reader: &mut Reader<&[u8]>) -> Result<Run, DocxError> {
    let mut run = Run::default();
    // Text boxes nest whole paragraphs inside a run; their runs are folded in.
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => depth += 1,
                b"rPr" if depth == 0 => parse_run_properties(reader, &mut run)?,
                b"t" => read_text(reader, &mut run.text)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => run.text.push('\t'),
                b"br" | b"cr" => {
                    if attr_value(&e, b"type")?.as_deref() == Some("page") {
                        run.page_break = true;
                    } else {
                        run.text.push('\n');
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"r" => {
                if depth == 0 {
                    return Ok(run);
                }
                depth -= 1;
            }
            Event::Eof => return Err(DocxError::UnexpectedEof("run")),
            _ => {}
        }
    }
}

fn parse_run_properties(reader: &mut Reader<&[u8]>, run: &mut Run) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"b" => run.bold = toggle_value(&e)?,
                b"i" => run.italic = toggle_value(&e)?,
                b"vertAlign" => {
                    run.superscript = attr_value(&e, b"val")?.as_deref() == Some("superscript");
                }
                b"color" => {
                    run.color = attr_value(&e, b"val")?
                        .filter(|v| v.len() == 6 && v != "auto")
                        .map(|v| format!("#{}", v.to_ascii_uppercase()));
                }
                b"sz" => run.size = attr_value(&e, b"val")?.and_then(|v| v.parse().ok()),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"rPr" => return Ok(()),
            Event::Eof => return Err(DocxError::UnexpectedEof("run properties")),
            _ => {}
        }
    }
}

fn read_text(reader: &mut Reader<&[u8]>, out: &mut String) -> Result<(), DocxError> {
    loop {
        match reader.read_event()? {
            Event::Text(te) => out.push_str(&te.unescape()?),
            Event::CData(cdata) => out.push_str(&String::from_utf8_lossy(&cdata)),
            Event::End(e) if e.local_name().as_ref() == b"t" => return Ok(()),
            Event::Eof => return Err(DocxError::UnexpectedEof("text")),
            _ => {}
        }
    }
}

fn parse_table(reader: &mut Reader<&[u8]>) -> Result<Table, DocxError> {
    let mut table = Table::default();
    // Nested tables are flattened into the paragraphs of the enclosing cell.
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => depth += 1,
                b"tr" if depth == 0 => table.rows.push(Vec::new()),
                b"tc" if depth == 0 => {
                    if let Some(row) = table.rows.last_mut() {
                        row.push(Cell::default());
                    }
                }
                b"p" => {
                    let paragraph = parse_paragraph(reader)?;
                    if let Some(cell) = table.rows.last_mut().and_then(|row| row.last_mut()) {
                        cell.paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tblStyle" if depth == 0 => table.style = attr_value(&e, b"val")?,
                b"shd" if depth == 0 => {
                    let fill = attr_value(&e, b"fill")?
                        .filter(|v| v.len() == 6 && v != "auto")
                        .map(|v| format!("#{}", v.to_ascii_uppercase()));
                    if let Some(cell) = table.rows.last_mut().and_then(|row| row.last_mut()) {
                        cell.shading = fill;
                    }
                }
                b"p" => {
                    if let Some(cell) = table.rows.last_mut().and_then(|row| row.last_mut()) {
                        cell.paragraphs.push(Paragraph::default());
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"tbl" => {
                if depth == 0 {
                    return Ok(table);
                }
                depth -= 1;
            }
            Event::Eof => return Err(DocxError::UnexpectedEof("table")),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/><w:jc w:val="center"/></w:pPr><w:rPr><w:b/><w:sz w:val="40"/><w:szCs w:val="40"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="80"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="160" w:after="40"/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:i/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Header"><w:name w:val="header"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr></w:style>
<w:style w:type="paragraph" w:styleId="Footer"><w:name w:val="footer"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="0"/></w:pPr></w:style>
<w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>
<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:basedOn w:val="TableNormal"/><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style>
</w:styles>"#;

fn header_rel_id(index: usize) -> String {
    format!("rIdHeader{}", index + 1)
}

fn footer_rel_id(index: usize) -> String {
    format!("rIdFooter{}", index + 1)
}

fn content_types_xml(header_count: usize, footer_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#);
    xml.push_str(r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#);
    for i in 1..=header_count {
        xml.push_str(&format!(
            r#"<Override PartName="/word/header{}.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#,
            i
        ));
    }
    for i in 1..=footer_count {
        xml.push_str(&format!(
            r#"<Override PartName="/word/footer{}.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#,
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn document_rels_xml(header_count: usize, footer_count: usize) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    xml.push_str(r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#);
    for i in 0..header_count {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header{}.xml"/>"#,
            header_rel_id(i),
            i + 1
        ));
    }
    for i in 0..footer_count {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer{}.xml"/>"#,
            footer_rel_id(i),
            i + 1
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn part_xml(root: &str, blocks: &[Block]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!(
        r#"<w:{} xmlns:w="{}" xmlns:r="{}">"#,
        root, NS_W, NS_R
    ));
    write_blocks(&mut xml, blocks);
    if blocks.is_empty() {
        xml.push_str("<w:p/>");
    }
    xml.push_str(&format!("</w:{}>", root));
    xml
}

fn write_blocks(xml: &mut String, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(xml, p),
            Block::Table(t) => write_table(xml, t),
        }
    }
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<w:p>");
    if paragraph.style.is_some() || paragraph.alignment.is_some() || paragraph.spacing.is_some() {
        xml.push_str("<w:pPr>");
        if let Some(style) = &paragraph.style {
            xml.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape(style.as_str())));
        }
        if let Some(spacing) = paragraph.spacing {
            xml.push_str("<w:spacing");
            if let Some(before) = spacing.before {
                xml.push_str(&format!(r#" w:before="{}""#, before));
            }
            if let Some(after) = spacing.after {
                xml.push_str(&format!(r#" w:after="{}""#, after));
            }
            xml.push_str("/>");
        }
        if let Some(alignment) = paragraph.alignment {
            xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, alignment.as_xml()));
        }
        xml.push_str("</w:pPr>");
    }
    for run in &paragraph.runs {
        write_run(xml, run);
    }
    xml.push_str("</w:p>");
}

fn write_run(xml: &mut String, run: &Run) {
    xml.push_str("<w:r>");
    let has_props = run.bold
        || run.italic
        || run.superscript
        || run.color.is_some()
        || run.size.is_some();
    if has_props {
        xml.push_str("<w:rPr>");
        if run.bold {
            xml.push_str("<w:b/>");
        }
        if run.italic {
            xml.push_str("<w:i/>");
        }
        if let Some(color) = &run.color {
            xml.push_str(&format!(
                r#"<w:color w:val="{}"/>"#,
                escape(color.trim_start_matches('#'))
            ));
        }
        if let Some(size) = run.size {
            xml.push_str(&format!(r#"<w:sz w:val="{}"/><w:szCs w:val="{}"/>"#, size, size));
        }
        if run.superscript {
            xml.push_str(r#"<w:vertAlign w:val="superscript"/>"#);
        }
        xml.push_str("</w:rPr>");
    }
    if run.page_break {
        xml.push_str(r#"<w:br w:type="page"/>"#);
    }

    let mut segment = String::new();
    let flush = |xml: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            xml.push_str(r#"<w:t xml:space="preserve">"#);
            xml.push_str(&escape(segment.as_str()));
            xml.push_str("</w:t>");
            segment.clear();
        }
    };
    for c in run.text.chars() {
        match c {
            '\t' => {
                flush(xml, &mut segment);
                xml.push_str("<w:tab/>");
            }
            '\n' => {
                flush(xml, &mut segment);
                xml.push_str("<w:br/>");
            }
            _ => segment.push(c),
        }
    }
    flush(xml, &mut segment);
    xml.push_str("</w:r>");
}

fn write_table(xml: &mut String, table: &Table) {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    xml.push_str("<w:tbl><w:tblPr>");
    if let Some(style) = &table.style {
        xml.push_str(&format!(r#"<w:tblStyle w:val="{}"/>"#, escape(style.as_str())));
    }
    xml.push_str(r#"<w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid>"#);
    // 6.5in of text width shared between columns
    let width = if columns > 0 { 9360 / columns } else { 0 };
    for _ in 0..columns {
        xml.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, width));
    }
    xml.push_str("</w:tblGrid>");
    for row in &table.rows {
        xml.push_str("<w:tr>");
        for cell in row {
            xml.push_str("<w:tc><w:tcPr>");
            xml.push_str(&format!(r#"<w:tcW w:w="{}" w:type="dxa"/>"#, width));
            if let Some(fill) = &cell.shading {
                xml.push_str(&format!(
                    r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#,
                    escape(fill.trim_start_matches('#'))
                ));
            }
            xml.push_str("</w:tcPr>");
            if cell.paragraphs.is_empty() {
                xml.push_str("<w:p/>");
            }
            for paragraph in &cell.paragraphs {
                write_paragraph(xml, paragraph);
            }
            xml.push_str("</w:tc>");
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
}
