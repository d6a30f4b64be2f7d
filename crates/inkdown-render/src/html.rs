//! Event-stream HTML writer.
//!
//! Follows the push-renderer shape: one pass over parser events with
//! small state for tables, quotes and code capture. Differences from a
//! stock CommonMark writer, all dialect decisions:
//!
//! - raw HTML (block and inline) is escaped to visible text
//! - fenced code is syntax-highlighted when the language is known
//! - task list items get the `task-list-item` class
//! - math and mermaid become inert placeholder elements recorded for the
//!   post-processor
//! - callout-marked blockquotes become `callout` containers

use std::collections::VecDeque;

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, Tag, TagEnd};
use pulldown_cmark_escape::{
    FmtWriter, StrWrite, escape_href, escape_html, escape_html_body_text,
};
use smol_str::format_smolstr;
use tracing::warn;

use crate::callout;
use crate::highlight;
use crate::types::{Extensions, Placeholder, PlaceholderKind};

enum TableState {
    Head,
    Body,
}

/// How the enclosing blockquote was opened, so the end tag matches.
enum QuoteKind {
    Plain,
    Callout,
}

enum CodeMode<'a> {
    Plain,
    Fenced(CowStr<'a>),
    Mermaid,
}

/// Fenced/indented code is captured whole, then emitted on the end tag.
struct CodeCapture<'a> {
    mode: CodeMode<'a>,
    text: String,
}

struct HtmlWriter<'a, I, W> {
    iter: I,
    writer: W,
    /// Whether or not the last write wrote a newline.
    end_newline: bool,
    /// Replay buffer for lookahead (callout detection, task list items).
    queue: VecDeque<Event<'a>>,
    table_state: TableState,
    table_alignments: Vec<Alignment>,
    table_cell_index: usize,
    quotes: Vec<QuoteKind>,
    code: Option<CodeCapture<'a>>,
    extensions: Extensions,
    placeholders: Vec<Placeholder>,
    math_counter: usize,
    diagram_counter: usize,
}

impl<'a, I, W> HtmlWriter<'a, I, W>
where
    I: Iterator<Item = Event<'a>>,
    W: StrWrite,
{
    fn new(iter: I, writer: W, extensions: Extensions) -> Self {
        Self {
            iter,
            writer,
            end_newline: true,
            queue: VecDeque::new(),
            table_state: TableState::Head,
            table_alignments: vec![],
            table_cell_index: 0,
            quotes: vec![],
            code: None,
            extensions,
            placeholders: vec![],
            math_counter: 0,
            diagram_counter: 0,
        }
    }

    fn next_event(&mut self) -> Option<Event<'a>> {
        self.queue.pop_front().or_else(|| self.iter.next())
    }

    fn peek_event(&mut self) -> Option<&Event<'a>> {
        if self.queue.is_empty() {
            let next = self.iter.next()?;
            self.queue.push_back(next);
        }
        self.queue.front()
    }

    #[inline]
    fn write_newline(&mut self) -> Result<(), W::Error> {
        self.end_newline = true;
        self.writer.write_str("\n")
    }

    /// Writes a buffer, and tracks whether or not a newline was written.
    #[inline]
    fn write(&mut self, s: &str) -> Result<(), W::Error> {
        self.writer.write_str(s)?;
        if !s.is_empty() {
            self.end_newline = s.ends_with('\n');
        }
        Ok(())
    }

    fn run(mut self) -> Result<Vec<Placeholder>, W::Error> {
        while let Some(event) = self.next_event() {
            match event {
                Event::Start(tag) => self.start_tag(tag)?,
                Event::End(tag) => self.end_tag(tag)?,
                Event::Text(text) => {
                    if let Some(code) = &mut self.code {
                        code.text.push_str(&text);
                    } else {
                        escape_html_body_text(&mut self.writer, &text)?;
                        self.end_newline = text.ends_with('\n');
                    }
                }
                Event::Code(text) => {
                    self.write("<code>")?;
                    escape_html_body_text(&mut self.writer, &text)?;
                    self.write("</code>")?;
                }
                Event::InlineMath(text) => self.emit_math(&text, false)?,
                Event::DisplayMath(text) => self.emit_math(&text, true)?,
                // Raw HTML is disabled: it renders as visible text.
                Event::Html(html) | Event::InlineHtml(html) => {
                    escape_html_body_text(&mut self.writer, &html)?;
                    self.end_newline = html.ends_with('\n');
                }
                Event::SoftBreak => self.write_newline()?,
                Event::HardBreak => self.write("<br />\n")?,
                Event::Rule => {
                    if self.end_newline {
                        self.write("<hr />\n")?;
                    } else {
                        self.write("\n<hr />\n")?;
                    }
                }
                Event::TaskListMarker(true) => {
                    self.write("<input disabled=\"\" type=\"checkbox\" checked=\"\"/>\n")?;
                }
                Event::TaskListMarker(false) => {
                    self.write("<input disabled=\"\" type=\"checkbox\"/>\n")?;
                }
                // Not reachable with the dialect options used here.
                _ => {}
            }
        }
        Ok(self.placeholders)
    }

    fn start_tag(&mut self, tag: Tag<'a>) -> Result<(), W::Error> {
        match tag {
            Tag::Paragraph => {
                if self.end_newline {
                    self.write("<p>")
                } else {
                    self.write("\n<p>")
                }
            }
            Tag::Heading {
                level,
                id,
                classes,
                attrs: _,
            } => {
                if self.end_newline {
                    self.write("<")?;
                } else {
                    self.write("\n<")?;
                }
                write!(&mut self.writer, "{}", level)?;
                if let Some(id) = id {
                    self.write(" id=\"")?;
                    escape_html(&mut self.writer, &id)?;
                    self.write("\"")?;
                }
                let mut classes = classes.iter();
                if let Some(class) = classes.next() {
                    self.write(" class=\"")?;
                    escape_html(&mut self.writer, class)?;
                    for class in classes {
                        self.write(" ")?;
                        escape_html(&mut self.writer, class)?;
                    }
                    self.write("\"")?;
                }
                self.write(">")
            }
            Tag::Table(alignments) => {
                self.table_alignments = alignments;
                self.write("<table>")
            }
            Tag::TableHead => {
                self.table_state = TableState::Head;
                self.table_cell_index = 0;
                self.write("<thead><tr>")
            }
            Tag::TableRow => {
                self.table_cell_index = 0;
                self.write("<tr>")
            }
            Tag::TableCell => {
                match self.table_state {
                    TableState::Head => self.write("<th")?,
                    TableState::Body => self.write("<td")?,
                }
                match self.table_alignments.get(self.table_cell_index) {
                    Some(&Alignment::Left) => self.write(" style=\"text-align: left\">"),
                    Some(&Alignment::Center) => self.write(" style=\"text-align: center\">"),
                    Some(&Alignment::Right) => self.write(" style=\"text-align: right\">"),
                    _ => self.write(">"),
                }
            }
            Tag::BlockQuote(_) => {
                if self.extensions.callouts {
                    self.start_quote_with_callout_check()
                } else {
                    self.start_plain_quote()
                }
            }
            Tag::CodeBlock(kind) => {
                if !self.end_newline {
                    self.write_newline()?;
                }
                let mode = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let lang: CowStr = match info.split(' ').next() {
                            Some(lang) if !lang.is_empty() => lang.to_string().into(),
                            _ => CowStr::Borrowed(""),
                        };
                        if self.extensions.mermaid && &*lang == "mermaid" {
                            CodeMode::Mermaid
                        } else if lang.is_empty() {
                            CodeMode::Plain
                        } else {
                            CodeMode::Fenced(lang)
                        }
                    }
                    CodeBlockKind::Indented => CodeMode::Plain,
                };
                self.code = Some(CodeCapture {
                    mode,
                    text: String::new(),
                });
                Ok(())
            }
            Tag::List(Some(1)) => {
                if self.end_newline {
                    self.write("<ol>\n")
                } else {
                    self.write("\n<ol>\n")
                }
            }
            Tag::List(Some(start)) => {
                if self.end_newline {
                    self.write("<ol start=\"")?;
                } else {
                    self.write("\n<ol start=\"")?;
                }
                write!(&mut self.writer, "{}", start)?;
                self.write("\">\n")
            }
            Tag::List(None) => {
                if self.end_newline {
                    self.write("<ul>\n")
                } else {
                    self.write("\n<ul>\n")
                }
            }
            Tag::Item => {
                let task_item = matches!(self.peek_event(), Some(Event::TaskListMarker(_)));
                let open = if task_item {
                    "<li class=\"task-list-item\">"
                } else {
                    "<li>"
                };
                if self.end_newline {
                    self.write(open)
                } else {
                    self.write("\n")?;
                    self.write(open)
                }
            }
            Tag::Emphasis => self.write("<em>"),
            Tag::Strong => self.write("<strong>"),
            Tag::Strikethrough => self.write("<del>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.write("<a href=\"")?;
                escape_href(&mut self.writer, &dest_url)?;
                if !title.is_empty() {
                    self.write("\" title=\"")?;
                    escape_html(&mut self.writer, &title)?;
                }
                self.write("\">")
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.write("<img src=\"")?;
                escape_href(&mut self.writer, &dest_url)?;
                self.write("\" alt=\"")?;
                self.raw_text()?;
                if !title.is_empty() {
                    self.write("\" title=\"")?;
                    escape_html(&mut self.writer, &title)?;
                }
                self.write("\" />")
            }
            Tag::HtmlBlock => {
                if self.end_newline {
                    self.write("<p>")
                } else {
                    self.write("\n<p>")
                }
            }
            _ => Ok(()),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) -> Result<(), W::Error> {
        match tag {
            TagEnd::Paragraph => self.write("</p>\n"),
            TagEnd::Heading(level) => {
                self.write("</")?;
                write!(&mut self.writer, "{}", level)?;
                self.write(">\n")
            }
            TagEnd::Table => self.write("</tbody></table>\n"),
            TagEnd::TableHead => {
                self.table_state = TableState::Body;
                self.write("</tr></thead><tbody>\n")
            }
            TagEnd::TableRow => self.write("</tr>\n"),
            TagEnd::TableCell => {
                let closed = match self.table_state {
                    TableState::Head => "</th>",
                    TableState::Body => "</td>",
                };
                self.table_cell_index += 1;
                self.write(closed)
            }
            TagEnd::BlockQuote(_) => match self.quotes.pop() {
                Some(QuoteKind::Callout) => self.write("</div>\n"),
                _ => self.write("</blockquote>\n"),
            },
            TagEnd::CodeBlock => self.flush_code(),
            TagEnd::List(true) => self.write("</ol>\n"),
            TagEnd::List(false) => self.write("</ul>\n"),
            TagEnd::Item => self.write("</li>\n"),
            TagEnd::Emphasis => self.write("</em>"),
            TagEnd::Strong => self.write("</strong>"),
            TagEnd::Strikethrough => self.write("</del>"),
            TagEnd::Link => self.write("</a>"),
            TagEnd::Image => Ok(()), // handled in start
            TagEnd::HtmlBlock => self.write("</p>\n"),
            _ => Ok(()),
        }
    }

    /// Open a blockquote, deciding between a callout container and a plain
    /// quote from the first paragraph line.
    fn start_quote_with_callout_check(&mut self) -> Result<(), W::Error> {
        let Some(first) = self.next_event() else {
            return self.start_plain_quote();
        };
        if !matches!(first, Event::Start(Tag::Paragraph)) {
            self.queue.push_front(first);
            return self.start_plain_quote();
        }

        // Collect the leading text run. The marker may arrive split across
        // several Text events when bracket parsing backtracks.
        let mut texts: Vec<CowStr<'a>> = vec![];
        let stopper = loop {
            match self.next_event() {
                Some(Event::Text(t)) => texts.push(t),
                Some(other) => break Some(other),
                None => break None,
            }
        };

        let line = texts.concat();
        let head = match &stopper {
            Some(Event::SoftBreak) | Some(Event::HardBreak) | Some(Event::End(TagEnd::Paragraph)) => {
                callout::parse_marker(&line)
            }
            _ => None,
        };

        let Some(head) = head else {
            // Not a callout: replay everything behind a plain quote.
            if let Some(stopper) = stopper {
                self.queue.push_front(stopper);
            }
            for text in texts.into_iter().rev() {
                self.queue.push_front(Event::Text(text));
            }
            self.queue.push_front(Event::Start(Tag::Paragraph));
            return self.start_plain_quote();
        };

        self.quotes.push(QuoteKind::Callout);
        let open = if self.end_newline { "" } else { "\n" };
        self.write(open)?;
        self.write("<div class=\"callout callout-")?;
        self.write(head.kind.class_suffix())?;
        self.write("\">\n<div class=\"callout-title\">")?;
        escape_html(&mut self.writer, &head.title)?;
        self.write("</div>\n")?;

        match stopper {
            // Marker-only paragraph: drop it entirely.
            Some(Event::End(TagEnd::Paragraph)) | None => Ok(()),
            // Body continues on the next line of the same paragraph.
            _ => self.write("<p>"),
        }
    }

    fn start_plain_quote(&mut self) -> Result<(), W::Error> {
        self.quotes.push(QuoteKind::Plain);
        if self.end_newline {
            self.write("<blockquote>\n")
        } else {
            self.write("\n<blockquote>\n")
        }
    }

    /// Emit the captured code block: diagram placeholder, highlighted
    /// fence, or escaped plain block.
    fn flush_code(&mut self) -> Result<(), W::Error> {
        let Some(capture) = self.code.take() else {
            return Ok(());
        };

        match capture.mode {
            CodeMode::Mermaid => self.emit_diagram(&capture.text),
            CodeMode::Fenced(lang) => {
                self.write("<pre><code class=\"language-")?;
                escape_html(&mut self.writer, &lang)?;
                self.write("\">")?;
                match highlight::find_syntax(&lang) {
                    Some(syntax) => match highlight::highlight_block(&capture.text, syntax) {
                        Ok(html) => self.write(&html)?,
                        Err(err) => {
                            warn!(
                                target: "inkdown::render",
                                lang = &*lang,
                                error = %err,
                                "highlighting failed, falling back to plain text"
                            );
                            escape_html_body_text(&mut self.writer, &capture.text)?;
                        }
                    },
                    None => escape_html_body_text(&mut self.writer, &capture.text)?,
                }
                self.write("</code></pre>\n")
            }
            CodeMode::Plain => {
                self.write("<pre><code>")?;
                escape_html_body_text(&mut self.writer, &capture.text)?;
                self.write("</code></pre>\n")
            }
        }
    }

    fn emit_math(&mut self, source: &str, display: bool) -> Result<(), W::Error> {
        let id = format_smolstr!("math-{}", self.math_counter);
        self.math_counter += 1;

        let mut escaped = String::new();
        let _ = escape_html(&mut escaped, source);

        let (kind, fragment) = if display {
            (
                PlaceholderKind::MathBlock,
                format!("<div class=\"katex-block\" id=\"{id}\" data-katex-source=\"{escaped}\"></div>"),
            )
        } else {
            (
                PlaceholderKind::MathInline,
                format!("<span class=\"katex-inline\" id=\"{id}\" data-katex-source=\"{escaped}\"></span>"),
            )
        };

        self.write(&fragment)?;
        self.placeholders.push(Placeholder {
            id,
            kind,
            source: source.to_owned(),
            fragment,
        });
        Ok(())
    }

    fn emit_diagram(&mut self, source: &str) -> Result<(), W::Error> {
        let id = format_smolstr!("diagram-{}", self.diagram_counter);
        self.diagram_counter += 1;

        if source.trim().is_empty() {
            self.write(&format!(
                "<div class=\"mermaid-diagram mermaid-empty\" id=\"{id}\"></div>"
            ))?;
            return self.write_newline();
        }

        let mut escaped = String::new();
        let _ = escape_html(&mut escaped, source);
        let fragment = format!(
            "<div class=\"mermaid-diagram\" id=\"{id}\" data-diagram-source=\"{escaped}\"></div>"
        );
        self.write(&fragment)?;
        self.placeholders.push(Placeholder {
            id,
            kind: PlaceholderKind::Diagram,
            source: source.to_owned(),
            fragment,
        });
        self.write_newline()
    }

    /// Consume inner events as plain text, for alt attributes.
    fn raw_text(&mut self) -> Result<(), W::Error> {
        let mut nest = 0;
        while let Some(event) = self.next_event() {
            match event {
                Event::Start(_) => nest += 1,
                Event::End(_) => {
                    if nest == 0 {
                        break;
                    }
                    nest -= 1;
                }
                Event::InlineHtml(text) | Event::Code(text) | Event::Text(text) => {
                    escape_html(&mut self.writer, &text)?;
                    self.end_newline = text.ends_with('\n');
                }
                Event::InlineMath(text) => {
                    self.write("$")?;
                    escape_html(&mut self.writer, &text)?;
                    self.write("$")?;
                }
                Event::DisplayMath(text) => {
                    self.write("$$")?;
                    escape_html(&mut self.writer, &text)?;
                    self.write("$$")?;
                }
                Event::SoftBreak | Event::HardBreak | Event::Rule => {
                    self.write(" ")?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Render events to a `String`, returning the placeholders that were
/// emitted along the way.
pub(crate) fn push_html<'a, I>(
    out: &mut String,
    iter: I,
    extensions: Extensions,
) -> Result<Vec<Placeholder>, core::fmt::Error>
where
    I: Iterator<Item = Event<'a>>,
{
    HtmlWriter::new(iter, FmtWriter(out), extensions).run()
}
