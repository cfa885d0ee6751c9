//! Native Rust argv tokenizer in the getopt tradition.
//!
//! - `ParseState::getopt_long` yields one [`Event`] per call
//! - [`reorder`] moves options ahead of operands, in place and stably
//! - Nothing is copied or allocated: every returned `&str` borrows from the
//!   caller's argument vector

use std::cell::Cell;

mod reorder;

pub use reorder::reorder;

/// `failed_char` after `init`, before any failure was reported.
const UNKNOWN_MARKER: i32 = '?' as i32;

// ============================================================================
// Arity / LongOption
// ============================================================================

/// Whether a long option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Required,
    Optional,
}

/// One entry of a long option table.
///
/// With `flag` set, a match stores `val` into the cell and reports
/// [`Event::FlagSet`]; otherwise the match reports `val` as the option code.
#[derive(Debug, Clone, Copy)]
pub struct LongOption<'a> {
    pub name: &'a str,
    pub arity: Arity,
    pub flag: Option<&'a Cell<i32>>,
    pub val: i32,
}

impl<'a> LongOption<'a> {
    pub const fn new(name: &'a str, arity: Arity, val: i32) -> Self {
        LongOption {
            name,
            arity,
            flag: None,
            val,
        }
    }

    pub fn flag(mut self, cell: &'a Cell<i32>) -> Self {
        self.flag = Some(cell);
        self
    }
}

// ============================================================================
// Event — one scan result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// Vector exhausted, or a bare `--` was consumed.
    End,
    /// Operand: does not start with `-`, or is exactly `-`.
    Positional(&'a str),
    /// Short option (`code` is the character) or long option (`code` is
    /// its `val`), with the value if one was supplied.
    Opt { code: i32, value: Option<&'a str> },
    /// Long option whose flag cell was written.
    FlagSet,
    /// Unrecognized short character, or 0 for an unknown/ambiguous long name.
    Unknown(i32),
    /// Required value missing; only reported when the grammar starts with `:`.
    MissingValue(i32),
}

// ============================================================================
// ParseState — the scan cursor
// ============================================================================

/// Position inside `argv[index]`, as a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    index: usize,
    offset: usize,
}

/// Scan state owned by the caller and threaded through every call.
///
/// The state stores indices, never references, so the same vector may be
/// mutated between scans (this is what [`reorder`] relies on). A state must
/// be reset with [`ParseState::init`] before scanning a different vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    next_index: usize,
    failed_char: i32,
    // Progress through a bundled short cluster; always inside
    // argv[next_index - 1].
    cursor: Option<Cursor>,
    value: Option<Cursor>,
}

impl Default for ParseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseState {
    pub fn new() -> Self {
        ParseState {
            next_index: 1,
            failed_char: UNKNOWN_MARKER,
            cursor: None,
            value: None,
        }
    }

    /// Restart scanning from `argv[1]`.
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Index of the next unconsumed element.
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Offending character (or long `val`, or 0) of the last
    /// `Unknown`/`MissingValue`.
    pub fn failed_char(&self) -> i32 {
        self.failed_char
    }

    /// Value attached to the last result, borrowed from `argv`.
    pub fn current_value<'a, S: AsRef<str>>(&self, argv: &'a [S]) -> Option<&'a str> {
        let value = self.value?;
        argv.get(value.index)?.as_ref().get(value.offset..)
    }

    /// True while a short cluster still has characters left to scan.
    pub(crate) fn in_cluster<S: AsRef<str>>(&self, argv: &[S]) -> bool {
        self.cursor.is_some_and(|c| {
            argv.get(c.index)
                .is_some_and(|arg| c.offset < arg.as_ref().len())
        })
    }

    fn at_end<S: AsRef<str>>(&self, argv: &[S]) -> bool {
        self.next_index >= argv.len()
    }

    /// Short options only.
    pub fn getopt<'a, S: AsRef<str>>(&mut self, argv: &'a [S], optstring: &str) -> Event<'a> {
        self.getopt_long(argv, optstring, None, None)
    }

    /// Scan the next option or operand of `argv`.
    ///
    /// `optstring` lists short options: `c` alone takes no value, `c:`
    /// requires one (attached or the next element), `c::` accepts one only
    /// when attached. A leading `:` reports missing values as
    /// [`Event::MissingValue`] instead of [`Event::Unknown`].
    ///
    /// Long options are matched by exact name or unambiguous prefix. When
    /// `longindex` is given, the index of the matched entry is written to it.
    pub fn getopt_long<'a, S: AsRef<str>>(
        &mut self,
        argv: &'a [S],
        optstring: &str,
        longopts: Option<&[LongOption<'_>]>,
        longindex: Option<&mut usize>,
    ) -> Event<'a> {
        self.value = None;

        if argv.len() < 2 {
            return Event::End;
        }

        let cursor = match self.cursor {
            Some(cursor) if self.in_cluster(argv) => cursor,
            _ => {
                if self.at_end(argv) {
                    return Event::End;
                }

                let index = self.next_index;
                let arg: &'a str = argv[index].as_ref();
                self.next_index += 1;
                self.cursor = None;

                if !arg.starts_with('-') || arg == "-" {
                    self.value = Some(Cursor { index, offset: 0 });
                    return Event::Positional(arg);
                }

                if arg == "--" {
                    return Event::End;
                }

                if let Some(longopts) = longopts {
                    if arg.starts_with("--") {
                        return self.match_long(argv, index, optstring, longopts, longindex);
                    }
                }

                Cursor { index, offset: 1 }
            }
        };

        self.match_short(argv, cursor, optstring)
    }

    fn match_short<'a, S: AsRef<str>>(
        &mut self,
        argv: &'a [S],
        cursor: Cursor,
        optstring: &str,
    ) -> Event<'a> {
        let arg: &'a str = argv[cursor.index].as_ref();
        let c = match arg[cursor.offset..].chars().next() {
            Some(c) => c,
            None => return Event::End,
        };
        let code = c as i32;
        let after = Cursor {
            index: cursor.index,
            offset: cursor.offset + c.len_utf8(),
        };

        let arity = match short_arity(optstring, c) {
            Some(arity) => arity,
            None => {
                self.failed_char = code;
                self.cursor = Some(after);
                return Event::Unknown(code);
            }
        };

        if arity == Arity::None {
            self.cursor = Some(after);
            return Event::Opt { code, value: None };
        }

        // Rest of the cluster is the value
        if after.offset < arg.len() {
            self.cursor = None;
            self.value = Some(after);
            return Event::Opt {
                code,
                value: Some(&arg[after.offset..]),
            };
        }

        if arity == Arity::Optional {
            self.cursor = Some(after);
            return Event::Opt { code, value: None };
        }

        if self.at_end(argv) {
            self.failed_char = code;
            self.cursor = Some(after);
            return missing_value(optstring, code);
        }

        let index = self.next_index;
        self.next_index += 1;
        self.cursor = None;
        self.value = Some(Cursor { index, offset: 0 });
        Event::Opt {
            code,
            value: Some(argv[index].as_ref()),
        }
    }

    fn match_long<'a, S: AsRef<str>>(
        &mut self,
        argv: &'a [S],
        index: usize,
        optstring: &str,
        longopts: &[LongOption<'_>],
        longindex: Option<&mut usize>,
    ) -> Event<'a> {
        let token = &argv[index].as_ref()[2..];
        let (name, equals) = match token.find('=') {
            Some(pos) => (&token[..pos], Some(pos)),
            None => (token, None),
        };

        // Long options never bundle
        self.cursor = None;

        let found = match find_long(longopts, name) {
            Some(found) => found,
            None => {
                self.failed_char = 0;
                return Event::Unknown(0);
            }
        };

        if let Some(slot) = longindex {
            *slot = found;
        }

        let opt = &longopts[found];
        let failed = if opt.flag.is_some() { 0 } else { opt.val };

        match equals {
            Some(_) if opt.arity == Arity::None => {
                self.failed_char = failed;
                return missing_value(optstring, failed);
            }
            Some(pos) => {
                self.value = Some(Cursor {
                    index,
                    offset: 2 + pos + 1,
                });
            }
            None if opt.arity == Arity::Required => {
                if self.at_end(argv) {
                    self.failed_char = failed;
                    return missing_value(optstring, failed);
                }
                self.value = Some(Cursor {
                    index: self.next_index,
                    offset: 0,
                });
                self.next_index += 1;
            }
            None => {}
        }

        match opt.flag {
            Some(cell) => {
                cell.set(opt.val);
                Event::FlagSet
            }
            None => Event::Opt {
                code: opt.val,
                value: self.current_value(argv),
            },
        }
    }
}

/// Look up `c` in a short option grammar.
fn short_arity(optstring: &str, c: char) -> Option<Arity> {
    if c == ':' {
        return None;
    }
    let pos = optstring.find(c)?;
    let tail = &optstring[pos + c.len_utf8()..];
    if tail.starts_with("::") {
        Some(Arity::Optional)
    } else if tail.starts_with(':') {
        Some(Arity::Required)
    } else {
        Some(Arity::None)
    }
}

/// Exact name wins; otherwise the prefix must match exactly one entry.
fn find_long(longopts: &[LongOption<'_>], name: &str) -> Option<usize> {
    let mut found = None;
    let mut matches = 0;

    for (i, opt) in longopts.iter().enumerate() {
        if opt.name.starts_with(name) {
            if opt.name.len() == name.len() {
                return Some(i);
            }
            found = Some(i);
            matches += 1;
        }
    }

    if matches == 1 {
        found
    } else {
        None
    }
}

fn missing_value<'a>(optstring: &str, code: i32) -> Event<'a> {
    if optstring.starts_with(':') {
        Event::MissingValue(code)
    } else {
        Event::Unknown(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: i32 = 'v' as i32;
    const O: i32 = 'o' as i32;

    fn opt(c: char) -> Event<'static> {
        Event::Opt {
            code: c as i32,
            value: None,
        }
    }

    fn opt_with(c: char, value: &'static str) -> Event<'static> {
        Event::Opt {
            code: c as i32,
            value: Some(value),
        }
    }

    fn verbose_output() -> [LongOption<'static>; 2] {
        [
            LongOption::new("verbose", Arity::None, V),
            LongOption::new("output", Arity::Required, O),
        ]
    }

    // -- short options --

    #[test]
    fn operands_only() {
        let argv = ["prog", "a", "b", "c"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "ab"), Event::Positional("a"));
        assert_eq!(ps.current_value(&argv), Some("a"));
        assert_eq!(ps.getopt(&argv, "ab"), Event::Positional("b"));
        assert_eq!(ps.getopt(&argv, "ab"), Event::Positional("c"));
        assert_eq!(ps.getopt(&argv, "ab"), Event::End);
        assert_eq!(ps.getopt(&argv, "ab"), Event::End);
    }

    #[test]
    fn program_name_only() {
        let argv = ["prog"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "a"), Event::End);
        assert_eq!(ps.next_index(), 1);

        let empty: [&str; 0] = [];
        assert_eq!(ps.getopt(&empty, "a"), Event::End);
    }

    #[test]
    fn single_dash_is_operand() {
        let argv = ["prog", "-"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "a"), Event::Positional("-"));
        assert_eq!(ps.getopt(&argv, "a"), Event::End);
    }

    #[test]
    fn bundled_cluster_takes_next_element() {
        let argv = ["prog", "-abc", "value", "rest"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "abc:"), opt('a'));
        assert_eq!(ps.next_index(), 2);
        assert_eq!(ps.getopt(&argv, "abc:"), opt('b'));
        assert_eq!(ps.getopt(&argv, "abc:"), opt_with('c', "value"));
        assert_eq!(ps.current_value(&argv), Some("value"));
        assert_eq!(ps.next_index(), 3);
        assert_eq!(ps.getopt(&argv, "abc:"), Event::Positional("rest"));
        assert_eq!(ps.getopt(&argv, "abc:"), Event::End);
    }

    #[test]
    fn attached_value_ends_cluster() {
        let argv = ["prog", "-aofile", "-a"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "ao:"), opt('a'));
        assert_eq!(ps.getopt(&argv, "ao:"), opt_with('o', "file"));
        assert_eq!(ps.getopt(&argv, "ao:"), opt('a'));
        assert_eq!(ps.getopt(&argv, "ao:"), Event::End);
    }

    #[test]
    fn unknown_short_continues_cluster() {
        let argv = ["prog", "-xa"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "a"), Event::Unknown('x' as i32));
        assert_eq!(ps.failed_char(), 'x' as i32);
        assert_eq!(ps.getopt(&argv, "a"), opt('a'));
        assert_eq!(ps.getopt(&argv, "a"), Event::End);
    }

    #[test]
    fn colon_is_never_an_option() {
        let argv = ["prog", "-:"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, ":a:"), Event::Unknown(':' as i32));
    }

    #[test]
    fn missing_short_value_with_leading_colon() {
        let argv = ["prog", "-o"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, ":vo:"), Event::MissingValue(O));
        assert_eq!(ps.failed_char(), O);
        assert_eq!(ps.next_index(), 2);
        assert_eq!(ps.getopt(&argv, ":vo:"), Event::End);
    }

    #[test]
    fn missing_short_value_downgrades_to_unknown() {
        let argv = ["prog", "-o"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "vo:"), Event::Unknown(O));
        assert_eq!(ps.failed_char(), O);
    }

    #[test]
    fn optional_short_value_only_attached() {
        let argv = ["prog", "-s", "10"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, ":s::"), opt('s'));
        assert_eq!(ps.current_value(&argv), None);
        assert_eq!(ps.getopt(&argv, ":s::"), Event::Positional("10"));
        assert_eq!(ps.getopt(&argv, ":s::"), Event::End);

        let argv = ["prog", "-s10"];
        ps.init();
        assert_eq!(ps.getopt(&argv, ":s::"), opt_with('s', "10"));
    }

    #[test]
    fn double_dash_terminates() {
        let argv = ["prog", "-a", "--", "-a"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "a"), opt('a'));
        assert_eq!(ps.getopt(&argv, "a"), Event::End);
        assert_eq!(ps.next_index(), 3);
    }

    #[test]
    fn double_dash_without_long_options_is_short_cluster() {
        let argv = ["prog", "--a"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "a"), Event::Unknown('-' as i32));
        assert_eq!(ps.getopt(&argv, "a"), opt('a'));
    }

    #[test]
    fn multibyte_short_option() {
        let argv = ["prog", "-éa", "-ñval"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "éañ:"), opt('é'));
        assert_eq!(ps.getopt(&argv, "éañ:"), opt('a'));
        assert_eq!(ps.getopt(&argv, "éañ:"), opt_with('ñ', "val"));
    }

    #[test]
    fn init_restarts_scan() {
        let argv = vec!["prog".to_string(), "-a".to_string(), "x".to_string()];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt(&argv, "b"), Event::Unknown('a' as i32));
        assert_eq!(ps.getopt(&argv, "b"), Event::Positional("x"));
        ps.init();
        assert_eq!(ps, ParseState::new());
        assert_eq!(ps.failed_char(), '?' as i32);
        assert_eq!(ps.getopt(&argv, "a"), opt('a'));
    }

    // -- long options --

    #[test]
    fn long_exact_and_prefix() {
        let longopts = verbose_output();
        let argv = ["prog", "--verbose", "--verb", "--out", "file"];
        let mut ps = ParseState::new();
        let mut index = usize::MAX;
        assert_eq!(
            ps.getopt_long(&argv, "vo:", Some(&longopts), Some(&mut index)),
            opt('v')
        );
        assert_eq!(index, 0);
        assert_eq!(ps.getopt_long(&argv, "vo:", Some(&longopts), None), opt('v'));
        assert_eq!(
            ps.getopt_long(&argv, "vo:", Some(&longopts), Some(&mut index)),
            opt_with('o', "file")
        );
        assert_eq!(index, 1);
        assert_eq!(ps.next_index(), 5);
        assert_eq!(ps.getopt_long(&argv, "vo:", Some(&longopts), None), Event::End);
    }

    #[test]
    fn unknown_long_sets_failed_char_zero() {
        let longopts = [LongOption::new("verbose", Arity::None, V)];
        let argv = ["prog", "--unknown"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, ":v", Some(&longopts), None),
            Event::Unknown(0)
        );
        assert_eq!(ps.failed_char(), 0);
        assert_eq!(ps.next_index(), 2);
        assert_eq!(ps.getopt_long(&argv, ":v", Some(&longopts), None), Event::End);
    }

    #[test]
    fn ambiguous_prefix_is_unknown() {
        let longopts = [
            LongOption::new("verbose", Arity::None, V),
            LongOption::new("version", Arity::None, 'V' as i32),
        ];
        let argv = ["prog", "--ver", "file"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, "vV", Some(&longopts), None),
            Event::Unknown(0)
        );
        assert_eq!(ps.next_index(), 2);
        assert_eq!(
            ps.getopt_long(&argv, "vV", Some(&longopts), None),
            Event::Positional("file")
        );
    }

    #[test]
    fn exact_name_beats_longer_prefix_match() {
        let longopts = [
            LongOption::new("color-scheme", Arity::None, 1),
            LongOption::new("color", Arity::None, 2),
            LongOption::new("colors", Arity::None, 3),
        ];
        let argv = ["prog", "--color"];
        let mut ps = ParseState::new();
        let mut index = 0;
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), Some(&mut index)),
            Event::Opt { code: 2, value: None }
        );
        assert_eq!(index, 1);
    }

    #[test]
    fn long_inline_value() {
        let longopts = verbose_output();
        let argv = ["prog", "--output=a=b", "--output=", "x"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            opt_with('o', "a=b")
        );
        assert_eq!(ps.current_value(&argv), Some("a=b"));
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            opt_with('o', "")
        );
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            Event::Positional("x")
        );
    }

    #[test]
    fn long_inline_value_rejected_for_no_value_option() {
        let longopts = verbose_output();
        let argv = ["prog", "--verbose=yes"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, ":", Some(&longopts), None),
            Event::MissingValue(V)
        );
        ps.init();
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            Event::Unknown(V)
        );
        assert_eq!(ps.failed_char(), V);
    }

    #[test]
    fn missing_required_long_value() {
        let longopts = verbose_output();
        let argv = ["prog", "--output"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, ":o:", Some(&longopts), None),
            Event::MissingValue(O)
        );
        assert_eq!(ps.failed_char(), O);
        assert_eq!(ps.next_index(), 2);
    }

    #[test]
    fn optional_long_value() {
        let longopts = [LongOption::new("size", Arity::Optional, 's' as i32)];
        let argv = ["prog", "--size", "4", "--size=8"];
        let mut ps = ParseState::new();
        assert_eq!(ps.getopt_long(&argv, "", Some(&longopts), None), opt('s'));
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            Event::Positional("4")
        );
        assert_eq!(
            ps.getopt_long(&argv, "", Some(&longopts), None),
            opt_with('s', "8")
        );
    }

    #[test]
    fn long_flag_target() {
        let mode = Cell::new(0);
        let longopts = [
            LongOption::new("fast", Arity::None, 7).flag(&mode),
            LongOption::new("level", Arity::Required, 9).flag(&mode),
        ];
        let argv = ["prog", "--fast", "--level", "3", "--level"];
        let mut ps = ParseState::new();
        assert_eq!(
            ps.getopt_long(&argv, ":", Some(&longopts), None),
            Event::FlagSet
        );
        assert_eq!(mode.get(), 7);
        assert_eq!(
            ps.getopt_long(&argv, ":", Some(&longopts), None),
            Event::FlagSet
        );
        assert_eq!(mode.get(), 9);
        assert_eq!(ps.current_value(&argv), Some("3"));

        // Flag options report 0 when their value is missing
        assert_eq!(
            ps.getopt_long(&argv, ":", Some(&longopts), None),
            Event::MissingValue(0)
        );
    }

    #[test]
    fn long_and_short_mixed() {
        let longopts = verbose_output();
        let argv = ["prog", "-v", "--output", "out.txt", "in", "-oX"];
        let mut ps = ParseState::new();
        let mut seen = Vec::new();
        loop {
            match ps.getopt_long(&argv, ":vo:", Some(&longopts), None) {
                Event::End => break,
                event => seen.push(event),
            }
        }
        assert_eq!(
            seen,
            vec![
                opt('v'),
                opt_with('o', "out.txt"),
                Event::Positional("in"),
                opt_with('o', "X"),
            ]
        );
    }
}
