//! Bare-URL autolinking as an event pass.
//!
//! `AutoLinker` wraps the parser's event stream and splits plain `Text`
//! events around `http(s)://` and `www.` runs, wrapping each in a link.
//! Text inside code blocks, inline code, and existing links passes through
//! untouched (inline code arrives as `Code` events, so only block code and
//! link bodies need tracking).

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)[^\s<>]+").unwrap());

/// One linkable run inside a text fragment, with the href to use.
#[derive(Debug, PartialEq, Eq)]
struct LinkSpan {
    range: Range<usize>,
    dest: String,
}

/// Find linkable URL runs in `text`, byte-addressed.
///
/// Trailing sentence punctuation is left out of the link, and a trailing
/// `)` is only kept while the run has unbalanced `(` before it.
fn find_links(text: &str) -> Vec<LinkSpan> {
    let mut spans = Vec::new();
    for m in URL_RE.find_iter(text) {
        let mut end = m.end();
        loop {
            let run = &text[m.start()..end];
            let Some(last) = run.chars().last() else {
                break;
            };
            let trim = match last {
                '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\'' => true,
                ')' => {
                    let opens = run.matches('(').count();
                    let closes = run.matches(')').count();
                    closes > opens
                }
                _ => false,
            };
            if !trim {
                break;
            }
            end -= last.len_utf8();
        }

        let run = &text[m.start()..end];
        let dest = if let Some(rest) = run.strip_prefix("www.") {
            if rest.is_empty() {
                continue;
            }
            format!("http://{run}")
        } else if let Some((_, rest)) = run.split_once("://") {
            if rest.is_empty() {
                continue;
            }
            run.to_owned()
        } else {
            // Trimming ate everything after the prefix.
            continue;
        };

        spans.push(LinkSpan {
            range: m.start()..end,
            dest,
        });
    }
    spans
}

/// Event adapter that inserts autolinks into plain text.
pub struct AutoLinker<'a, I: Iterator<Item = Event<'a>>> {
    iter: I,
    queue: VecDeque<Event<'a>>,
    code_depth: usize,
    link_depth: usize,
}

impl<'a, I: Iterator<Item = Event<'a>>> AutoLinker<'a, I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            queue: VecDeque::new(),
            code_depth: 0,
            link_depth: 0,
        }
    }

    fn split_text(&mut self, text: CowStr<'a>) -> Event<'a> {
        let spans = find_links(&text);
        if spans.is_empty() {
            return Event::Text(text);
        }

        let mut pos = 0;
        for span in &spans {
            if span.range.start > pos {
                self.queue
                    .push_back(Event::Text(text[pos..span.range.start].to_string().into()));
            }
            self.queue.push_back(Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: span.dest.clone().into(),
                title: CowStr::Borrowed(""),
                id: CowStr::Borrowed(""),
            }));
            self.queue
                .push_back(Event::Text(text[span.range.clone()].to_string().into()));
            self.queue.push_back(Event::End(TagEnd::Link));
            pos = span.range.end;
        }
        if pos < text.len() {
            self.queue
                .push_back(Event::Text(text[pos..].to_string().into()));
        }

        self.queue.pop_front().unwrap_or(Event::Text("".into()))
    }
}

impl<'a, I: Iterator<Item = Event<'a>>> Iterator for AutoLinker<'a, I> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Event<'a>> {
        if let Some(queued) = self.queue.pop_front() {
            return Some(queued);
        }

        let event = self.iter.next()?;
        match &event {
            Event::Start(Tag::CodeBlock(_)) => self.code_depth += 1,
            Event::End(TagEnd::CodeBlock) => self.code_depth -= 1,
            Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                self.link_depth += 1
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => self.link_depth -= 1,
            Event::Text(_) if self.code_depth == 0 && self.link_depth == 0 => {
                let Event::Text(text) = event else {
                    unreachable!()
                };
                return Some(self.split_text(text));
            }
            _ => {}
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_link(text: &str) -> LinkSpan {
        let mut spans = find_links(text);
        assert_eq!(spans.len(), 1, "expected one link in {text:?}");
        spans.remove(0)
    }

    #[test]
    fn plain_https_url() {
        let span = one_link("see https://example.com/page for details");
        assert_eq!(&span.dest, "https://example.com/page");
        assert_eq!(span.range, 4..28);
    }

    #[test]
    fn trailing_punctuation_is_not_linked() {
        let span = one_link("read https://example.com.");
        assert_eq!(&span.dest, "https://example.com");

        let span = one_link("really (see https://example.com)");
        assert_eq!(&span.dest, "https://example.com");
    }

    #[test]
    fn balanced_parens_stay_in_the_url() {
        let span = one_link("https://en.wikipedia.org/wiki/Rust_(language)");
        assert_eq!(&span.dest, "https://en.wikipedia.org/wiki/Rust_(language)");
    }

    #[test]
    fn www_gets_a_scheme() {
        let span = one_link("visit www.example.com today");
        assert_eq!(&span.dest, "http://www.example.com");
    }

    #[test]
    fn bare_scheme_and_bare_www_are_ignored() {
        assert!(find_links("https:// is a prefix").is_empty());
        assert!(find_links("www. alone").is_empty());
        assert!(find_links("no urls here").is_empty());
    }

    #[test]
    fn multiple_urls_in_one_fragment() {
        let spans = find_links("a https://one.example b www.two.example c");
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn existing_links_pass_through() {
        use pulldown_cmark::{Options, Parser};

        let events: Vec<Event> = AutoLinker::new(Parser::new_ext(
            "[already](https://example.com) linked",
            Options::empty(),
        ))
        .collect();

        let links = events
            .iter()
            .filter(|e| matches!(e, Event::Start(Tag::Link { .. })))
            .count();
        assert_eq!(links, 1);
    }

    #[test]
    fn code_block_text_is_untouched() {
        use pulldown_cmark::{Options, Parser};

        let events: Vec<Event> = AutoLinker::new(Parser::new_ext(
            "```\nhttps://example.com\n```",
            Options::empty(),
        ))
        .collect();

        assert!(
            !events
                .iter()
                .any(|e| matches!(e, Event::Start(Tag::Link { .. })))
        );
    }
}
