//! Log entry model: editable rendering, reload and on-disk format

use crate::domain::LogDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the text file inside an entry's directory
pub const ENTRY_FILE: &str = "entry.txt";

/// Prefix of the diagnostic lines the edit loop puts on top of the buffer.
/// Leading lines carrying it are ignored by [`LogEntry::reload`].
pub const COMMENT_PREFIX: &str = "# klog:";

/// Edited text that cannot be turned back into an entry.
///
/// Recoverable: the edit loop shows the message and offers another attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MalformedEntry(String);

impl MalformedEntry {
    fn new(message: &str) -> Self {
        MalformedEntry(message.to_string())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A media file attached in this session, copied into the entry directory
/// when the entry is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedMedia {
    pub name: String,
    pub source: PathBuf,
}

/// One journal entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub date: LogDate,
    pub index: usize,
    pub topic: String,
    pub body: String,
    /// Last day of an entry spanning several days
    pub end: Option<LogDate>,
    /// Free-form note kept next to the date, e.g. a time of day
    pub appendix: Option<String>,
    pub media: Vec<String>,
    staged: Vec<StagedMedia>,
    detached: Vec<String>,
}

impl LogEntry {
    /// Blank entry for `date` stored under `index`
    pub fn new(date: LogDate, index: usize) -> Self {
        LogEntry {
            date,
            index,
            topic: String::new(),
            body: String::new(),
            end: None,
            appendix: None,
            media: Vec::new(),
            staged: Vec::new(),
            detached: Vec::new(),
        }
    }

    /// Directory of this entry relative to the repository root:
    /// `YYYY/MM/DD/<index>`
    pub fn relative_dir(&self) -> PathBuf {
        Path::new(&format!("{:04}", self.date.year()))
            .join(format!("{:02}", self.date.month()))
            .join(format!("{:02}", self.date.day()))
            .join(self.index.to_string())
    }

    pub fn is_blank(&self) -> bool {
        self.topic.is_empty() && self.body.is_empty()
    }

    /// One-line summary used in listings and commit messages
    pub fn shortlog(&self) -> String {
        format!("{}: {}", self.date, self.topic)
    }

    /// Editable text: topic line, blank line, body
    pub fn render(&self) -> String {
        if self.is_blank() {
            String::new()
        } else if self.body.is_empty() {
            format!("{}\n", self.topic)
        } else {
            format!("{}\n\n{}\n", self.topic, self.body)
        }
    }

    /// Replace topic and body with the content of edited text.
    ///
    /// The entry is left untouched when the text is malformed.
    pub fn reload(&mut self, text: &str) -> Result<(), MalformedEntry> {
        let (topic, body) = parse_editable(text)?;
        self.topic = topic;
        self.body = body;
        Ok(())
    }

    /// Record a media file to copy into the entry directory on commit.
    /// Re-attaching a name replaces the earlier source.
    pub fn stage_media(&mut self, name: String, source: PathBuf) {
        if let Some(staged) = self.staged.iter_mut().find(|s| s.name == name) {
            staged.source = source;
        } else {
            self.staged.push(StagedMedia {
                name: name.clone(),
                source,
            });
        }

        self.detached.retain(|n| n != &name);
        if !self.media.contains(&name) {
            self.media.push(name);
        }
    }

    /// Drop the media file at `position` of [`LogEntry::media`].
    /// A stored file is deleted on commit.
    pub fn detach_media(&mut self, position: usize) -> Option<String> {
        if position >= self.media.len() {
            return None;
        }

        let name = self.media.remove(position);
        self.staged.retain(|s| s.name != name);
        if !self.detached.contains(&name) {
            self.detached.push(name.clone());
        }
        Some(name)
    }

    pub fn staged_media(&self) -> &[StagedMedia] {
        &self.staged
    }

    pub fn detached_media(&self) -> &[String] {
        &self.detached
    }

    /// Forget pending media copies and removals
    pub fn clear_pending(&mut self) {
        self.staged.clear();
        self.detached.clear();
    }

    /// Contents of `entry.txt`
    pub fn to_file_contents(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "BEGIN: {}", self.date);
        let _ = writeln!(out, "END: {}", format_optional(self.end.map(|d| d.to_string())));
        let _ = writeln!(out, "TOPIC: {}", self.topic);
        let _ = writeln!(out, "APPENDIX: {}", format_optional(self.appendix.clone()));
        for name in &self.media {
            let _ = writeln!(out, "MEDIA: {}", name);
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\n');
        out
    }

    /// Parse `entry.txt` contents. The error is a human-readable reason.
    pub fn from_file_contents(contents: &str, index: usize) -> Result<Self, String> {
        let contents = contents.replace("\r\n", "\n");
        let (headers, body) = contents
            .split_once("\n\n")
            .ok_or_else(|| "missing blank line between headers and body".to_string())?;

        let mut begin = None;
        let mut end = None;
        let mut topic = None;
        let mut appendix = None;
        let mut media = Vec::new();

        for line in headers.lines() {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| format!("malformed header line '{}'", line))?;
            let key = key.trim();
            let value = value.trim();

            match key {
                "BEGIN" => begin = parse_optional_date(key, value)?,
                "END" => end = parse_optional_date(key, value)?,
                "TOPIC" => topic = Some(value.to_string()),
                "APPENDIX" => appendix = parse_optional(value).map(str::to_string),
                "MEDIA" => media.push(value.to_string()),
                other => return Err(format!("unknown header '{}'", other)),
            }
        }

        let date = begin.ok_or_else(|| "missing BEGIN header".to_string())?;
        let topic = match topic {
            Some(t) if t.starts_with(COMMENT_PREFIX) => {
                return Err(format!("TOPIC must not start with '{}'", COMMENT_PREFIX))
            }
            Some(t) if !t.is_empty() => t,
            _ => return Err("missing TOPIC header".to_string()),
        };

        Ok(LogEntry {
            date,
            index,
            topic,
            body: body.trim_end().to_string(),
            end,
            appendix,
            media,
            staged: Vec::new(),
            detached: Vec::new(),
        })
    }
}

/// Header values `None` and empty mean "not set"
fn parse_optional(value: &str) -> Option<&str> {
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value)
    }
}

fn parse_optional_date(key: &str, value: &str) -> Result<Option<LogDate>, String> {
    parse_optional(value)
        .map(|v| LogDate::parse(v).map_err(|_| format!("invalid {} header '{}'", key, v)))
        .transpose()
}

fn format_optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "None".to_string())
}

/// Put `error` on top of `text` as a comment, dropping earlier diagnostics
pub fn annotate(text: &str, error: &MalformedEntry) -> String {
    format!(
        "{} error: {}\n{}",
        COMMENT_PREFIX,
        error.message(),
        strip_comments(text)
    )
}

fn strip_comments(text: &str) -> &str {
    let mut rest = text;
    while rest.starts_with(COMMENT_PREFIX) {
        rest = match rest.split_once('\n') {
            Some((_, tail)) => tail,
            None => "",
        };
    }
    rest
}

fn parse_editable(text: &str) -> Result<(String, String), MalformedEntry> {
    let text = text.replace("\r\n", "\n");
    let text = strip_comments(&text).trim_end();

    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };

    let topic = first.trim();
    if topic.is_empty() {
        return Err(MalformedEntry::new(
            "missing topic line: the first line must hold the entry topic",
        ));
    }

    let body = match rest {
        None => "",
        Some(rest) => {
            let (separator, body) = rest.split_once('\n').unwrap_or((rest, ""));
            if !separator.trim().is_empty() {
                return Err(MalformedEntry::new(
                    "the topic line must be followed by a blank line",
                ));
            }
            body
        }
    };

    Ok((topic.to_string(), body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> LogDate {
        LogDate::parse("2023-05-01").unwrap()
    }

    fn entry(topic: &str, body: &str) -> LogEntry {
        let mut e = LogEntry::new(date(), 0);
        e.topic = topic.to_string();
        e.body = body.to_string();
        e
    }

    #[test]
    fn test_relative_dir() {
        let e = LogEntry::new(LogDate::parse("2023-05-01").unwrap(), 2);
        assert_eq!(e.relative_dir(), Path::new("2023").join("05").join("01").join("2"));
    }

    #[test]
    fn test_render_blank_entry_is_empty() {
        assert_eq!(LogEntry::new(date(), 0).render(), "");
    }

    #[test]
    fn test_render_topic_and_body() {
        assert_eq!(entry("Title", "Body text").render(), "Title\n\nBody text\n");
        assert_eq!(entry("Title", "").render(), "Title\n");
    }

    #[test]
    fn test_reload_render_round_trip() {
        let cases = [
            ("Title", "Body text"),
            ("Title", ""),
            ("Pizza night", "Dough rested 48h.\n\nOven at 300C.\n  - indented"),
            ("Title", "\nstarts with a blank line"),
            ("# not a comment", "# heading in the body"),
        ];
        for (topic, body) in cases {
            let original = entry(topic, body);
            let mut reloaded = LogEntry::new(date(), 0);
            reloaded.reload(&original.render()).unwrap();
            assert_eq!(reloaded.topic, topic);
            assert_eq!(reloaded.body, body);
        }
    }

    #[test]
    fn test_reload_user_text() {
        let mut e = LogEntry::new(date(), 0);
        e.reload("Title\n\nBody text").unwrap();
        assert_eq!(e.topic, "Title");
        assert_eq!(e.body, "Body text");
    }

    #[test]
    fn test_reload_trims_trailing_whitespace() {
        let mut e = LogEntry::new(date(), 0);
        e.reload("  Title  \n\nBody\n\n\n").unwrap();
        assert_eq!(e.topic, "Title");
        assert_eq!(e.body, "Body");
    }

    #[test]
    fn test_reload_missing_topic_fails_without_mutation() {
        let mut e = entry("Kept", "Kept body");
        let err = e.reload("\nBody without topic").unwrap_err();
        assert!(err.message().contains("missing topic line"));
        assert_eq!(e, entry("Kept", "Kept body"));
    }

    #[test]
    fn test_reload_missing_separator_fails() {
        let mut e = LogEntry::new(date(), 0);
        let err = e.reload("Title\nBody").unwrap_err();
        assert!(err.message().contains("blank line"));
        assert!(e.is_blank());
    }

    #[test]
    fn test_reload_ignores_leading_diagnostics() {
        let mut e = LogEntry::new(date(), 0);
        e.reload("# klog: error: something\nTitle\n\nBody").unwrap();
        assert_eq!(e.topic, "Title");
        assert_eq!(e.body, "Body");
    }

    #[test]
    fn test_reload_crlf() {
        let mut e = LogEntry::new(date(), 0);
        e.reload("Title\r\n\r\nLine one\r\nLine two\r\n").unwrap();
        assert_eq!(e.body, "Line one\nLine two");
    }

    #[test]
    fn test_annotate_replaces_previous_diagnostic() {
        let err = MalformedEntry::new("first");
        let once = annotate("\nbody", &err);
        assert_eq!(once, "# klog: error: first\n\nbody");

        let err = MalformedEntry::new("second");
        let twice = annotate(&once, &err);
        assert_eq!(twice, "# klog: error: second\n\nbody");
    }

    #[test]
    fn test_annotated_text_still_fails_with_same_error() {
        let mut e = LogEntry::new(date(), 0);
        let err = e.reload("\nbody").unwrap_err();
        let again = e.reload(&annotate("\nbody", &err)).unwrap_err();
        assert_eq!(err, again);
    }

    #[test]
    fn test_stage_media_no_duplicates() {
        let mut e = entry("Title", "");
        e.stage_media("a.jpg".to_string(), PathBuf::from("/tmp/one/a.jpg"));
        e.stage_media("b.jpg".to_string(), PathBuf::from("/tmp/b.jpg"));
        e.stage_media("a.jpg".to_string(), PathBuf::from("/tmp/two/a.jpg"));

        assert_eq!(e.media, vec!["a.jpg", "b.jpg"]);
        assert_eq!(e.staged_media().len(), 2);
        assert_eq!(e.staged_media()[0].source, PathBuf::from("/tmp/two/a.jpg"));

        e.clear_pending();
        assert!(e.staged_media().is_empty());
        assert_eq!(e.media.len(), 2);
    }

    #[test]
    fn test_detach_media() {
        let mut e = entry("Title", "");
        e.media = vec!["stored.jpg".to_string()];
        e.stage_media("new.jpg".to_string(), PathBuf::from("/tmp/new.jpg"));

        assert_eq!(e.detach_media(2), None);
        assert_eq!(e.detach_media(1).as_deref(), Some("new.jpg"));
        assert!(e.staged_media().is_empty());
        assert_eq!(e.detach_media(0).as_deref(), Some("stored.jpg"));
        assert!(e.media.is_empty());
        assert_eq!(e.detached_media(), ["new.jpg", "stored.jpg"]);

        // Attaching again cancels the pending removal
        e.stage_media("stored.jpg".to_string(), PathBuf::from("/tmp/stored.jpg"));
        assert_eq!(e.detached_media(), ["new.jpg"]);
        assert_eq!(e.media, vec!["stored.jpg"]);

        e.clear_pending();
        assert!(e.detached_media().is_empty());
    }

    #[test]
    fn test_file_contents_round_trip() {
        let mut e = entry("Title", "Body\n\nmore");
        e.index = 3;
        e.media = vec!["a.jpg".to_string(), "b.png".to_string()];

        let contents = e.to_file_contents();
        assert_eq!(
            contents,
            "BEGIN: 2023-05-01\nEND: None\nTOPIC: Title\nAPPENDIX: None\n\
             MEDIA: a.jpg\nMEDIA: b.png\n\nBody\n\nmore\n"
        );
        assert_eq!(LogEntry::from_file_contents(&contents, 3).unwrap(), e);
    }

    #[test]
    fn test_file_contents_empty_body() {
        let e = entry("Title", "");
        let parsed = LogEntry::from_file_contents(&e.to_file_contents(), 0).unwrap();
        assert_eq!(parsed, e);
    }

    #[test]
    fn test_end_and_appendix_survive_round_trip() {
        let mut e = entry("Hackathon", "Three days of soldering");
        e.end = Some(LogDate::parse("2023-05-03").unwrap());
        e.appendix = Some("18:00 Uhr".to_string());

        let contents = e.to_file_contents();
        assert!(contents.contains("END: 2023-05-03\n"));
        assert!(contents.contains("APPENDIX: 18:00 Uhr\n"));
        assert_eq!(LogEntry::from_file_contents(&contents, 0).unwrap(), e);
    }

    #[test]
    fn test_read_converted_entry() {
        let contents = "BEGIN: 2018-03-09\nEND: none\nTOPIC: Pizza\nAPPENDIX: \n\nDough\n";
        let e = LogEntry::from_file_contents(contents, 1).unwrap();
        assert_eq!(e.date, LogDate::parse("2018-03-09").unwrap());
        assert_eq!(e.end, None);
        assert_eq!(e.appendix, None);
        assert_eq!(e.topic, "Pizza");
        assert_eq!(e.body, "Dough");
    }

    #[test]
    fn test_corrupt_file_contents() {
        assert!(LogEntry::from_file_contents("BEGIN: 2023-05-01\nTOPIC: x", 0).is_err());
        assert!(LogEntry::from_file_contents("TOPIC: x\n\nbody", 0)
            .unwrap_err()
            .contains("BEGIN"));
        assert!(LogEntry::from_file_contents("BEGIN: None\nTOPIC: x\n\nbody", 0)
            .unwrap_err()
            .contains("BEGIN"));
        assert!(LogEntry::from_file_contents("BEGIN: 2023-05-01\n\nbody", 0)
            .unwrap_err()
            .contains("TOPIC"));
        assert!(LogEntry::from_file_contents("BEGIN: 2023-05-01\nTOPIC: x\nFOO: y\n\nbody", 0)
            .unwrap_err()
            .contains("unknown header"));
        assert!(LogEntry::from_file_contents("BEGIN: 2023-5-1\nTOPIC: x\n\nbody", 0).is_err());
        assert!(LogEntry::from_file_contents("BEGIN: 2023-05-01\nEND: soon\nTOPIC: x\n\n", 0)
            .unwrap_err()
            .contains("END"));
    }

    #[test]
    fn test_topic_with_comment_prefix_is_corrupt() {
        let contents = "BEGIN: 2023-05-01\nTOPIC: # klog: error: x\n\nbody\n";
        let err = LogEntry::from_file_contents(contents, 0).unwrap_err();
        assert!(err.contains(COMMENT_PREFIX));
    }

    #[test]
    fn test_shortlog() {
        assert_eq!(entry("Title", "x").shortlog(), "2023-05-01: Title");
    }
}
