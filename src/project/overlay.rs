//! Virtual file overlay description writer.
//!
//! Produces the YAML-compatible JSON that clang-based tools read with
//! `-ivfsoverlay`: mapped files are grouped under the directories of their
//! virtual paths, nested directories named relative to their parent.

use std::fmt::Write as _;
use std::path::{Component, Path};

use crate::error::OverlayError;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mapping {
    virtual_path: String,
    real_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct VirtualFileOverlay {
    mappings: Vec<Mapping>,
    case_sensitive: Option<bool>,
}

impl VirtualFileOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the absolute `virtual_path` onto `real_path`.
    pub fn add_file_mapping(
        &mut self,
        virtual_path: &str,
        real_path: &str,
    ) -> Result<(), OverlayError> {
        if real_path.is_empty() {
            return Err(OverlayError::InvalidArguments(
                "real path is empty".to_string(),
            ));
        }
        if !is_clean_absolute(Path::new(virtual_path)) {
            return Err(OverlayError::InvalidArguments(format!(
                "virtual path '{virtual_path}' must be absolute without '.' or '..'"
            )));
        }
        self.mappings.push(Mapping {
            virtual_path: virtual_path.to_string(),
            real_path: real_path.to_string(),
        });
        Ok(())
    }

    pub fn set_case_sensitivity(&mut self, case_sensitive: bool) {
        self.case_sensitive = Some(case_sensitive);
    }

    pub fn write_to_buffer(&self) -> String {
        let mut mappings = self.mappings.clone();
        mappings.sort_by(|a, b| a.virtual_path.cmp(&b.virtual_path));

        let mut writer = Writer::default();
        writer.out.push_str("{\n  'version': 0,\n");
        if let Some(case_sensitive) = self.case_sensitive {
            let _ = writeln!(writer.out, "  'case-sensitive': '{case_sensitive}',");
        }
        writer.out.push_str("  'roots': [\n");

        if let Some((first, rest)) = mappings.split_first() {
            writer.start_directory(parent_of(&first.virtual_path));
            writer.write_entry(file_name_of(&first.virtual_path), &first.real_path);

            for mapping in rest {
                let dir = parent_of(&mapping.virtual_path);
                if writer.stack.last().map(String::as_str) == Some(dir) {
                    writer.out.push_str(",\n");
                } else {
                    while writer
                        .stack
                        .last()
                        .is_some_and(|top| !contained_in(top, dir))
                    {
                        writer.out.push('\n');
                        writer.end_directory();
                    }
                    writer.out.push_str(",\n");
                    writer.start_directory(dir);
                }
                writer.write_entry(file_name_of(&mapping.virtual_path), &mapping.real_path);
            }

            while !writer.stack.is_empty() {
                writer.out.push('\n');
                writer.end_directory();
            }
            writer.out.push('\n');
        }

        writer.out.push_str("  ]\n}\n");
        writer.out
    }
}

#[derive(Default)]
struct Writer {
    out: String,
    stack: Vec<String>,
}

impl Writer {
    fn dir_indent(&self) -> usize {
        4 * self.stack.len()
    }

    fn file_indent(&self) -> usize {
        4 * (self.stack.len() + 1)
    }

    fn indent(&mut self, width: usize) {
        self.out.extend(std::iter::repeat_n(' ', width));
    }

    fn start_directory(&mut self, path: &str) {
        let name = match self.stack.last() {
            Some(parent) => contained_part(parent, path).to_string(),
            None => path.to_string(),
        };
        self.stack.push(path.to_string());
        let indent = self.dir_indent();
        self.indent(indent);
        self.out.push_str("{\n");
        self.indent(indent + 2);
        self.out.push_str("'type': 'directory',\n");
        self.indent(indent + 2);
        let _ = writeln!(self.out, "'name': \"{}\",", escape(&name));
        self.indent(indent + 2);
        self.out.push_str("'contents': [\n");
    }

    fn end_directory(&mut self) {
        let indent = self.dir_indent();
        self.indent(indent + 2);
        self.out.push_str("]\n");
        self.indent(indent);
        self.out.push('}');
        self.stack.pop();
    }

    fn write_entry(&mut self, name: &str, real_path: &str) {
        let indent = self.file_indent();
        self.indent(indent);
        self.out.push_str("{\n");
        self.indent(indent + 2);
        self.out.push_str("'type': 'file',\n");
        self.indent(indent + 2);
        let _ = writeln!(self.out, "'name': \"{}\",", escape(name));
        self.indent(indent + 2);
        let _ = writeln!(self.out, "'external-contents': \"{}\"", escape(real_path));
        self.indent(indent);
        self.out.push('}');
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether every component of `parent` is a leading component of `path`.
fn contained_in(parent: &str, path: &str) -> bool {
    let mut parent = Path::new(parent).components();
    let mut child = Path::new(path).components();
    loop {
        match (parent.next(), child.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(a), Some(b)) if a != b => return false,
            _ => {}
        }
    }
}

/// `path` relative to `parent`, which must contain it.
fn contained_part<'a>(parent: &str, path: &'a str) -> &'a str {
    let skip = if parent.ends_with('/') {
        parent.len()
    } else {
        parent.len() + 1
    };
    path.get(skip..).unwrap_or_default()
}

/// YAML double-quoted scalar escaping.
fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c if c.is_ascii() => out.push(c),
            '\u{85}' => out.push_str("\\N"),
            '\u{a0}' => out.push_str("\\_"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c => {
                let code = c as u32;
                let _ = match code {
                    0..=0xFF => write!(out, "\\x{code:02X}"),
                    0x100..=0xFFFF => write!(out, "\\u{code:04X}"),
                    _ => write!(out, "\\U{code:08X}"),
                };
            }
        }
    }
    out
}

/// Absolute and free of `.` and `..` components.
fn is_clean_absolute(path: &Path) -> bool {
    path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::Normal(_)))
        && !path.to_string_lossy().split('/').any(|piece| piece == ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_follow_yaml() {
        assert_eq!(escape("/path/\u{266B}"), "/path/\\u266B");
        assert_eq!(escape("a\"b\\"), "a\\\"b\\\\");
        assert_eq!(escape("\u{e9}"), "\\xE9");
        assert_eq!(escape("\u{1F600}"), "\\U0001F600");
    }

    #[test]
    fn containment_is_by_component() {
        assert!(contained_in("/path", "/path/foo"));
        assert!(!contained_in("/path/foo", "/path/foobar"));
        assert!(!contained_in("/path/foobar", "/path"));
        assert_eq!(contained_part("/path/virtual/dir", "/path/virtual/dir/in/subdir"), "in/subdir");
        assert_eq!(contained_part("/", "/usr"), "usr");
    }

    #[test]
    fn clean_paths() {
        assert!(is_clean_absolute(Path::new("/a/b.h")));
        assert!(!is_clean_absolute(Path::new("/a/./b.h")));
        assert!(!is_clean_absolute(Path::new("/a/../b.h")));
        assert!(!is_clean_absolute(Path::new("a/b.h")));
    }
}
