// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the Topology structure: a Gromacs `.top`/`.itp` file
//! represented as an ordered list of typed lines.

use regex::Regex;

/// Regular expression matching the include of force field parameters.
fn forcefield_regex() -> Regex {
    Regex::new(r#"#include.*forcefield\.itp""#).expect(
        "FATAL GMXBB ERROR | topology::forcefield_regex | Could not construct regular expression.",
    )
}

/// Regular expression capturing a quoted string.
fn quoted_regex() -> Regex {
    Regex::new(r#""([^"]*)""#).expect(
        "FATAL GMXBB ERROR | topology::quoted_regex | Could not construct regular expression.",
    )
}

/// Type of a single line of a topology file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// `#include "file"` directive. Contains the included file.
    Include(String),
    /// `#ifdef NAME` directive. Contains the name of the define.
    IfDef(String),
    /// `#endif` directive.
    EndIf,
    /// Any other preprocessor directive.
    Directive,
    /// Section header, e.g. `[ molecules ]`. Contains the name of the section.
    Section(String),
    /// Line starting with `;`.
    Comment,
    /// Line containing only whitespace.
    Blank,
    /// Any other line.
    Data,
}

/// Single line of a topology file.
/// The raw text (including the line terminator) is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyLine {
    raw: String,
    kind: LineKind,
}

impl TopologyLine {
    /// Classify a raw line of a topology file.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        let kind = if trimmed.is_empty() {
            LineKind::Blank
        } else if trimmed.starts_with(';') {
            LineKind::Comment
        } else if let Some(directive) = trimmed.strip_prefix('#') {
            let mut split = directive.split_whitespace();
            match split.next() {
                Some("include") => {
                    let file = match quoted_regex().captures(trimmed) {
                        Some(captures) => captures[1].to_owned(),
                        None => split.next().unwrap_or_default().to_owned(),
                    };
                    LineKind::Include(file)
                }
                Some("ifdef") => LineKind::IfDef(split.next().unwrap_or_default().to_owned()),
                Some("endif") => LineKind::EndIf,
                _ => LineKind::Directive,
            }
        } else if trimmed.starts_with('[') && trimmed.contains(']') {
            LineKind::Section(trimmed.replace(['[', ']'], "").trim().to_owned())
        } else {
            LineKind::Data
        };

        TopologyLine {
            raw: raw.to_owned(),
            kind,
        }
    }

    /// Get the raw text of the line.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Get the type of the line.
    pub fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// Get the first whitespace-delimited token of the line.
    pub fn first_token(&self) -> Option<&str> {
        self.raw.split_whitespace().next()
    }
}

/// Gromacs topology (or include topology) as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    lines: Vec<TopologyLine>,
}

impl Topology {
    /// Parse topology from text. Converting the topology back to text
    /// reproduces the original text exactly.
    pub fn from_text(text: &str) -> Self {
        Topology {
            lines: text.split_inclusive('\n').map(TopologyLine::parse).collect(),
        }
    }

    /// Convert the topology to text.
    pub fn to_text(&self) -> String {
        self.lines.iter().map(|line| line.raw.as_str()).collect()
    }

    /// Check whether the topology contains no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the lines of the topology.
    pub fn lines(&self) -> &[TopologyLine] {
        &self.lines
    }

    /// Find the index of the first line including the force field parameters
    /// (`#include "....forcefield.itp"`).
    pub fn find_forcefield_include(&self) -> Option<usize> {
        let regex = forcefield_regex();
        self.lines
            .iter()
            .position(|line| regex.is_match(&line.raw))
    }

    /// Insert `lines` into the topology so that the first of them has index `at`.
    /// Each line should be terminated by a newline. If the line preceding
    /// the inserted lines is not terminated by a newline, a newline is added to it.
    ///
    /// ## Panics
    /// Panics if `at` is larger than the number of lines.
    pub fn insert_lines(&mut self, at: usize, lines: &[&str]) {
        if let Some(previous) = at.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            if !previous.raw.ends_with('\n') {
                previous.raw.push('\n');
            }
        }

        let parsed = lines.iter().map(|line| TopologyLine::parse(line));
        self.lines.splice(at..at, parsed);
    }

    /// Append lines to the end of the topology.
    pub fn append_lines(&mut self, lines: &[&str]) {
        let at = self.lines.len();
        self.insert_lines(at, lines);
    }

    /// Get indices of data rows of the section with the given name (case-insensitive).
    /// Rows of all sections with this name are returned.
    pub fn section_rows(&self, section: &str) -> Vec<usize> {
        let mut inside = false;
        let mut rows = Vec::new();

        for (i, line) in self.lines.iter().enumerate() {
            match line.kind() {
                LineKind::Section(name) => inside = name.eq_ignore_ascii_case(section),
                LineKind::Data if inside => rows.push(i),
                _ => (),
            }
        }

        rows
    }

    /// Find the last row of the `[ molecules ]` section
    /// starting with `protein` (case-insensitive).
    pub fn find_last_protein_molecule(&self) -> Option<usize> {
        self.section_rows("molecules").into_iter().rev().find(|&i| {
            self.lines[i]
                .raw
                .trim_start()
                .to_lowercase()
                .starts_with("protein")
        })
    }

    /// Register `count` molecules of type `name` in the `[ molecules ]` section.
    ///
    /// The row is placed right after the last `Protein` row.
    /// If there is no such row, it is placed at the end of the topology.
    pub fn add_molecule(&mut self, name: &str, count: usize) {
        let row = format!("{:<20}{}\n", name, count);

        match self.find_last_protein_molecule() {
            Some(i) => self.insert_lines(i + 1, &[&row]),
            None => self.append_lines(&[&row]),
        }
    }

    /// Get the name of the first molecule type defined in the topology,
    /// i.e. the first token of the first data row after `[ moleculetype ]`.
    pub fn moleculetype_name(&self) -> Option<String> {
        self.section_rows("moleculetype")
            .first()
            .and_then(|&i| self.lines[i].first_token())
            .map(str::to_owned)
    }

    /// Get the name of the file included right after `#ifdef POSRES`.
    ///
    /// Only a define named exactly `POSRES` is matched.
    pub fn find_posres_include(&self) -> Option<String> {
        let ifdef = self
            .lines
            .iter()
            .position(|line| matches!(line.kind(), LineKind::IfDef(name) if name == "POSRES"))?;

        let next = self.lines.get(ifdef + 1)?;
        quoted_regex()
            .captures(&next.raw)
            .map(|captures| captures[1].to_owned())
    }

    /// Get the names of all files included by the topology.
    pub fn includes(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line.kind() {
                LineKind::Include(file) => Some(file.as_str()),
                _ => None,
            })
            .collect()
    }
}
