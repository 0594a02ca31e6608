#![forbid(unsafe_code)]

use eframe::egui;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Tag, TagEnd};

const INDENT: f32 = 12.0;

/// The document as drawable blocks, rebuilt whenever the buffer changes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Preview {
    blocks: Vec<Block>,
}

#[derive(Clone, Debug)]
enum Block {
    QuoteStart,
    QuoteEnd,
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    Paragraph {
        spans: Vec<Span>,
    },
    ListItem {
        depth: u16,
        task: Option<bool>,
        spans: Vec<Span>,
    },
    Code {
        language: Option<String>,
        code: String,
    },
    Table {
        rows: Vec<TableRow>,
    },
    Rule,
}

#[derive(Clone, Debug)]
struct TableRow {
    header: bool,
    cells: Vec<Vec<Span>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct SpanStyle {
    emphasis: bool,
    code: bool,
    strikethrough: bool,
    link: bool,
}

impl SpanStyle {
    const CODE: Self = Self {
        emphasis: false,
        code: true,
        strikethrough: false,
        link: false,
    };
}

#[derive(Clone, Debug)]
struct Span {
    text: String,
    style: SpanStyle,
}

#[derive(Clone, Copy, Debug)]
enum Open {
    Heading(u8),
    Paragraph,
    ListItem { depth: u16 },
}

#[derive(Debug, Default)]
struct CodeBlock {
    language: Option<String>,
    text: String,
    in_table: bool,
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<TableRow>,
    head: bool,
    row: Vec<Vec<Span>>,
    cell: Option<Vec<Span>>,
}

#[derive(Debug, Default)]
struct Builder {
    blocks: Vec<Block>,
    open: Option<Open>,
    spans: Vec<Span>,
    list_depth: u16,
    emphasis: u16,
    strikethrough: u16,
    links: u16,
    task: Option<bool>,
    code: Option<CodeBlock>,
    table: Option<Table>,
}

impl Preview {
    /// Build the preview from the same sanitized event stream the HTML export
    /// renders, so raw HTML shows up as literal text.
    pub(crate) fn parse(source: &str) -> Self {
        let mut builder = Builder::default();
        for event in mdpad_core::markdown::events(source) {
            builder.event(event);
        }
        Self {
            blocks: builder.blocks,
        }
    }

    pub(crate) fn show(&self, ui: &mut egui::Ui) {
        let mut quote_depth: u16 = 0;

        for (index, block) in self.blocks.iter().enumerate() {
            match block {
                Block::QuoteStart => quote_depth = quote_depth.saturating_add(1),
                Block::QuoteEnd => quote_depth = quote_depth.saturating_sub(1),
                _ => with_quote(ui, quote_depth, |ui| show_block(ui, index, block)),
            }
        }
    }
}

impl Builder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(end) => self.end(end),
            Event::TaskListMarker(checked) => {
                if self.table.is_none() {
                    self.task = Some(checked);
                }
            }
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut().filter(|code| !code.in_table) {
                    code.text.push_str(&text);
                } else if self.code.is_some() {
                    self.push(&text, SpanStyle::CODE);
                } else {
                    let style = self.inline_style();
                    self.push(&text, style);
                }
            }
            Event::Code(text) => self.push(&text, SpanStyle::CODE),
            Event::SoftBreak | Event::HardBreak => {
                if let Some(code) = self.code.as_mut().filter(|code| !code.in_table) {
                    code.text.push('\n');
                } else {
                    let style = self.inline_style();
                    self.push("\n", style);
                }
            }
            Event::Rule => self.blocks.push(Block::Rule),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::BlockQuote(_) => self.blocks.push(Block::QuoteStart),
            Tag::List(_) => self.list_depth = self.list_depth.saturating_add(1),
            Tag::Item => {
                // A nested list closes the text of the item that contains it.
                self.close_item();
                self.open = Some(Open::ListItem {
                    depth: self.list_depth,
                });
            }
            Tag::Paragraph | Tag::HtmlBlock => {
                if self.table.is_none() && self.open.is_none() {
                    self.open = Some(Open::Paragraph);
                    self.spans.clear();
                }
            }
            Tag::Heading { level, .. } => {
                self.open = Some(Open::Heading(heading_level(level)));
                self.spans.clear();
            }
            Tag::Emphasis => self.emphasis = self.emphasis.saturating_add(1),
            Tag::Strikethrough => self.strikethrough = self.strikethrough.saturating_add(1),
            Tag::Link { .. } => self.links = self.links.saturating_add(1),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) => {
                        let lang = lang.trim();
                        (!lang.is_empty()).then(|| lang.to_owned())
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeBlock {
                    language,
                    text: String::new(),
                    in_table: self.table.is_some(),
                });
            }
            Tag::Table(_) => self.table = Some(Table::default()),
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.head = true;
                    table.row.clear();
                }
            }
            Tag::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(Vec::new());
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, end: TagEnd) {
        match end {
            TagEnd::BlockQuote(_) => self.blocks.push(Block::QuoteEnd),
            TagEnd::List(_) => self.list_depth = self.list_depth.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            TagEnd::Link => self.links = self.links.saturating_sub(1),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take()
                    && !code.in_table
                {
                    self.blocks.push(Block::Code {
                        language: code.language,
                        code: code.text,
                    });
                }
            }
            TagEnd::Heading(_) => {
                if let Some(Open::Heading(level)) = self.open {
                    self.open = None;
                    let spans = self.take_spans();
                    self.blocks.push(Block::Heading { level, spans });
                }
            }
            TagEnd::Paragraph | TagEnd::HtmlBlock => {
                if matches!(self.open, Some(Open::Paragraph)) {
                    self.open = None;
                    let spans = self.take_spans();
                    self.blocks.push(Block::Paragraph { spans });
                }
            }
            TagEnd::Item => self.close_item(),
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    let cells = std::mem::take(&mut table.row);
                    table.rows.push(TableRow {
                        header: true,
                        cells,
                    });
                    table.head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let cells = std::mem::take(&mut table.row);
                    table.rows.push(TableRow {
                        header: table.head,
                        cells,
                    });
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    let cell = table.cell.take().unwrap_or_default();
                    table.row.push(cell);
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table { rows: table.rows });
                }
            }
            _ => {}
        }
    }

    fn close_item(&mut self) {
        let Some(Open::ListItem { depth }) = self.open else {
            return;
        };
        self.open = None;
        let task = self.task.take();
        let spans = self.take_spans();
        if task.is_some() || !spans.is_empty() {
            self.blocks.push(Block::ListItem { depth, task, spans });
        }
    }

    fn inline_style(&self) -> SpanStyle {
        SpanStyle {
            emphasis: self.emphasis > 0,
            code: false,
            strikethrough: self.strikethrough > 0,
            link: self.links > 0,
        }
    }

    fn take_spans(&mut self) -> Vec<Span> {
        let mut spans = std::mem::take(&mut self.spans);
        if let Some(last) = spans.last_mut() {
            let trimmed = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed);
            if last.text.is_empty() {
                spans.pop();
            }
        }
        spans
    }

    fn push(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        // Text outside any block, e.g. a table cell or loose inline text.
        let spans = match self.table.as_mut().and_then(|table| table.cell.as_mut()) {
            Some(cell) => cell,
            None => {
                if self.open.is_none() {
                    self.open = Some(Open::Paragraph);
                }
                &mut self.spans
            }
        };
        match spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => spans.push(Span {
                text: text.to_owned(),
                style,
            }),
        }
    }
}

fn show_block(ui: &mut egui::Ui, index: usize, block: &Block) {
    match block {
        Block::Heading { level, spans } => {
            let font = heading_font(ui, *level);
            ui.add(egui::Label::new(layout(ui, spans, font)).wrap());
            ui.add_space(4.0);
        }
        Block::Paragraph { spans } => {
            let font = body_font(ui);
            ui.add(egui::Label::new(layout(ui, spans, font)).wrap());
            ui.add_space(6.0);
        }
        Block::ListItem { depth, task, spans } => {
            let font = body_font(ui);
            ui.horizontal_wrapped(|ui| {
                ui.add_space(f32::from(depth.saturating_sub(1)) * INDENT);
                match task {
                    Some(checked) => {
                        let mut checked = *checked;
                        ui.add_enabled(false, egui::Checkbox::new(&mut checked, ""));
                    }
                    None => {
                        ui.label("\u{2022}");
                    }
                }
                ui.add(egui::Label::new(layout(ui, spans, font)).wrap());
            });
            ui.add_space(4.0);
        }
        Block::Code { language, code } => {
            if let Some(language) = language.as_deref() {
                ui.label(egui::RichText::new(language).weak());
            }
            egui::Frame::group(ui.style())
                .fill(ui.visuals().faint_bg_color)
                .inner_margin(egui::Margin::same(8))
                .show(ui, |ui| {
                    ui.add(
                        egui::Label::new(egui::RichText::new(code).monospace())
                            .wrap()
                            .selectable(true),
                    );
                });
            ui.add_space(6.0);
        }
        Block::Table { rows } => {
            let font = body_font(ui);
            let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
            egui::Grid::new(ui.id().with(("table", index)))
                .striped(true)
                .show(ui, |ui| {
                    for row in rows {
                        for cell in &row.cells {
                            let mut job = layout(ui, cell, font.clone());
                            if row.header {
                                let stroke = egui::Stroke::new(1.0, ui.visuals().weak_text_color());
                                for section in &mut job.sections {
                                    section.format.underline = stroke;
                                }
                            }
                            ui.add(egui::Label::new(job).wrap());
                        }
                        for _ in row.cells.len()..columns {
                            ui.label("");
                        }
                        ui.end_row();
                    }
                });
            ui.add_space(6.0);
        }
        Block::Rule => {
            ui.separator();
            ui.add_space(6.0);
        }
        Block::QuoteStart | Block::QuoteEnd => {}
    }
}

fn with_quote(ui: &mut egui::Ui, depth: u16, add_contents: impl FnOnce(&mut egui::Ui)) {
    if depth == 0 {
        add_contents(ui);
        return;
    }

    ui.horizontal(|ui| {
        ui.add_space(f32::from(depth - 1) * INDENT);
        ui.colored_label(ui.visuals().weak_text_color(), "|");
        ui.add_space(4.0);
        ui.vertical(add_contents);
    });
}

const fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn text_style_font(ui: &egui::Ui, style: &egui::TextStyle, fallback: egui::FontId) -> egui::FontId {
    ui.style()
        .text_styles
        .get(style)
        .cloned()
        .unwrap_or(fallback)
}

fn body_font(ui: &egui::Ui) -> egui::FontId {
    text_style_font(ui, &egui::TextStyle::Body, egui::FontId::proportional(16.0))
}

fn heading_font(ui: &egui::Ui, level: u8) -> egui::FontId {
    let base = text_style_font(ui, &egui::TextStyle::Heading, egui::FontId::proportional(22.0));
    let scale = match level {
        1 => 1.20,
        2 => 1.10,
        3 => 1.05,
        _ => 1.0,
    };
    egui::FontId {
        size: base.size * scale,
        family: base.family,
    }
}

fn layout(ui: &egui::Ui, spans: &[Span], base_font: egui::FontId) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    let visuals = ui.visuals();

    for span in spans {
        let font_id = if span.style.code {
            text_style_font(
                ui,
                &egui::TextStyle::Monospace,
                egui::FontId::monospace(base_font.size),
            )
        } else {
            base_font.clone()
        };
        let mut format = egui::text::TextFormat {
            font_id,
            color: visuals.text_color(),
            italics: span.style.emphasis,
            ..Default::default()
        };
        if span.style.strikethrough {
            format.strikethrough = egui::Stroke::new(1.0, format.color);
        }
        if span.style.link {
            format.color = visuals.hyperlink_color;
            format.underline = egui::Stroke::new(1.0, visuals.hyperlink_color);
        }
        job.append(&span.text, 0.0, format);
    }

    job
}
