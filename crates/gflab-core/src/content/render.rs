//! Render segmentation for post and comment bodies.
//!
//! A single left-to-right pass splits raw text into segments: recognized
//! embeds (YouTube videos, X/Twitter statuses, Instagram posts), generic
//! hyperlinks, `@mention` and `#tag` highlights, and plain text. Embed
//! patterns are tried before the generic link rule, and a produced
//! segment is never re-scanned, so the pass is idempotent by
//! construction.

use std::sync::LazyLock;

use regex::Regex;

/// A recognized embeddable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedKind {
    YouTube { video_id: String },
    Tweet { status_id: String },
    InstagramPost { shortcode: String },
}

/// One piece of rendered content, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Embed { kind: EmbedKind, url: String },
    Link { url: String },
    /// Mention handle without the leading `@`.
    Mention { handle: String },
    /// Tag name without the leading `#`, lowercased.
    Hashtag { name: String },
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?P<url>https?://\S+)
        | (?P<mention>@(?:[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}|[A-Za-z0-9_]+))
        | (?P<tag>\#\w+)
        ",
    )
    .expect("token pattern")
});

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?(?:youtube\.com/watch\?(?:[^#&]*&)*v=|youtu\.be/)([A-Za-z0-9_-]{6,})",
    )
    .expect("youtube pattern")
});

static TWEET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:twitter\.com|x\.com)/[A-Za-z0-9_]{1,15}/status(?:es)?/(\d+)")
        .expect("tweet pattern")
});

static INSTAGRAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?instagram\.com/(?:p|reel)/([A-Za-z0-9_-]+)")
        .expect("instagram pattern")
});

/// Punctuation that ends a sentence rather than a URL.
const URL_TRAILERS: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '\'', '"'];

fn classify_url(url: &str) -> Segment {
    if let Some(caps) = YOUTUBE_RE.captures(url) {
        return Segment::Embed {
            kind: EmbedKind::YouTube {
                video_id: caps[1].to_string(),
            },
            url: url.to_string(),
        };
    }
    if let Some(caps) = TWEET_RE.captures(url) {
        return Segment::Embed {
            kind: EmbedKind::Tweet {
                status_id: caps[1].to_string(),
            },
            url: url.to_string(),
        };
    }
    if let Some(caps) = INSTAGRAM_RE.captures(url) {
        return Segment::Embed {
            kind: EmbedKind::InstagramPost {
                shortcode: caps[1].to_string(),
            },
            url: url.to_string(),
        };
    }
    Segment::Link {
        url: url.to_string(),
    }
}

/// Split raw text into render segments.
pub fn render(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    let push_text = |segments: &mut Vec<Segment>, chunk: &str| {
        if chunk.is_empty() {
            return;
        }
        // Merge with a preceding text segment so trimmed URL trailers do
        // not fragment the output.
        if let Some(Segment::Text(prev)) = segments.last_mut() {
            prev.push_str(chunk);
        } else {
            segments.push(Segment::Text(chunk.to_string()));
        }
    };

    for caps in TOKEN_RE.captures_iter(text) {
        let whole = caps.get(0).expect("match");
        push_text(&mut segments, &text[cursor..whole.start()]);
        cursor = whole.end();

        if let Some(url_match) = caps.name("url") {
            let raw = url_match.as_str();
            let trimmed = raw.trim_end_matches(URL_TRAILERS);
            segments.push(classify_url(trimmed));
            // Sentence punctuation trimmed off the URL stays as text.
            push_text(&mut segments, &raw[trimmed.len()..]);
        } else if let Some(mention) = caps.name("mention") {
            segments.push(Segment::Mention {
                handle: mention.as_str()[1..].to_string(),
            });
        } else if let Some(tag) = caps.name("tag") {
            segments.push(Segment::Hashtag {
                name: tag.as_str()[1..].to_lowercase(),
            });
        }
    }
    push_text(&mut segments, &text[cursor..]);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(
            render("nothing special here"),
            vec![Segment::Text("nothing special here".into())]
        );
    }

    #[test]
    fn youtube_watch_and_short_links_become_embeds() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
        ] {
            let segments = render(url);
            assert_eq!(
                segments,
                vec![Segment::Embed {
                    kind: EmbedKind::YouTube {
                        video_id: "dQw4w9WgXcQ".into()
                    },
                    url: url.into(),
                }]
            );
        }
    }

    #[test]
    fn status_permalinks_become_embeds() {
        let segments = render("see https://x.com/lab/status/12345 today");
        assert_eq!(
            segments[1],
            Segment::Embed {
                kind: EmbedKind::Tweet {
                    status_id: "12345".into()
                },
                url: "https://x.com/lab/status/12345".into(),
            }
        );
    }

    #[test]
    fn instagram_post_permalink_becomes_embed() {
        let segments = render("https://www.instagram.com/p/Cxyz_12/");
        assert!(matches!(
            &segments[0],
            Segment::Embed {
                kind: EmbedKind::InstagramPost { shortcode },
                ..
            } if shortcode == "Cxyz_12"
        ));
    }

    #[test]
    fn embed_rule_takes_precedence_over_generic_link() {
        let segments = render("https://www.youtube.com/watch?v=abc123xyz and https://example.com/page");
        assert!(matches!(segments[0], Segment::Embed { .. }));
        assert_eq!(
            segments[2],
            Segment::Link {
                url: "https://example.com/page".into()
            }
        );
    }

    #[test]
    fn trailing_punctuation_is_not_part_of_the_url() {
        let segments = render("read https://example.com/a.");
        assert_eq!(
            segments,
            vec![
                Segment::Text("read ".into()),
                Segment::Link {
                    url: "https://example.com/a".into()
                },
                Segment::Text(".".into()),
            ]
        );
    }

    #[test]
    fn mentions_and_tags_are_highlighted() {
        let segments = render("ask @jane@x.com about #news");
        assert_eq!(
            segments,
            vec![
                Segment::Text("ask ".into()),
                Segment::Mention {
                    handle: "jane@x.com".into()
                },
                Segment::Text(" about ".into()),
                Segment::Hashtag {
                    name: "news".into()
                },
            ]
        );
    }

    #[test]
    fn url_fragments_are_not_rescanned_for_tags_or_mentions() {
        let segments = render("https://example.com/page#section?user=@bob");
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], Segment::Link { .. }));
    }

    #[test]
    fn repeated_embeds_each_render_once() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        let segments = render(&format!("{url} {url}"));
        let embeds = segments
            .iter()
            .filter(|s| matches!(s, Segment::Embed { .. }))
            .count();
        assert_eq!(embeds, 2);
    }
}
